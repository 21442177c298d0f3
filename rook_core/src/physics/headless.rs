// rook_core/src/physics/headless.rs
use crate::physics::backend::*;
use glam::Vec2;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle the embedding host uses to feed contact notifications into
/// a [`HeadlessPhysics`] world. Queued events are reported by the next
/// `step` call, in push order.
#[derive(Clone, Default)]
pub struct ContactInjector {
    queue: Rc<RefCell<Vec<ContactEvent>>>,
}

impl ContactInjector {
    pub fn push(&self, event: ContactEvent) {
        self.queue.borrow_mut().push(event);
    }

    fn drain(&self) -> Vec<ContactEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

struct Body {
    kind: BodyKind,
    position: Vec2,
    angle: f32,
    velocity: Vec2,
    angular_velocity: f32,
    gravity_scale: f32,
    force: Vec2,
    fixtures: Vec<FixtureInit>,
}

/// Minimal in-tree implementation of the physics boundary: kinematic
/// integration and ray queries only. It detects no contacts itself; the
/// host injects them through [`ContactInjector`]. A real solver slots in
/// behind the same trait.
pub struct HeadlessPhysics {
    gravity: Vec2,
    bodies: HashMap<BodyHandle, Body>,
    next_handle: u32,
    contacts: ContactInjector,
}

impl Default for HeadlessPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPhysics {
    pub fn new() -> Self {
        Self {
            gravity: Vec2::new(0.0, 9.8),
            bodies: HashMap::new(),
            next_handle: 0,
            contacts: ContactInjector::default(),
        }
    }

    /// Injector handle; clone it out before boxing the backend.
    pub fn contact_injector(&self) -> ContactInjector {
        self.contacts.clone()
    }
}

impl PhysicsBackend for HeadlessPhysics {
    fn create_body(&mut self, init: &BodyInit) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;

        self.bodies.insert(
            handle,
            Body {
                kind: init.kind,
                position: init.position,
                angle: init.angle,
                velocity: Vec2::ZERO,
                angular_velocity: 0.0,
                gravity_scale: init.gravity_scale,
                force: Vec2::ZERO,
                fixtures: init.fixtures.clone(),
            },
        );

        handle
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn position(&self, handle: BodyHandle) -> Vec2 {
        self.bodies.get(&handle).map_or(Vec2::ZERO, |b| b.position)
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.position = position;
        }
    }

    fn rotation(&self, handle: BodyHandle) -> f32 {
        self.bodies.get(&handle).map_or(0.0, |b| b.angle)
    }

    fn set_rotation(&mut self, handle: BodyHandle, radians: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.angle = radians;
        }
    }

    fn velocity(&self, handle: BodyHandle) -> Vec2 {
        self.bodies.get(&handle).map_or(Vec2::ZERO, |b| b.velocity)
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity = velocity;
        }
    }

    fn angular_velocity(&self, handle: BodyHandle) -> f32 {
        self.bodies.get(&handle).map_or(0.0, |b| b.angular_velocity)
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, radians_per_sec: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.angular_velocity = radians_per_sec;
        }
    }

    fn gravity_scale(&self, handle: BodyHandle) -> f32 {
        self.bodies.get(&handle).map_or(1.0, |b| b.gravity_scale)
    }

    fn set_gravity_scale(&mut self, handle: BodyHandle, scale: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.gravity_scale = scale;
        }
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.force += force;
        }
    }

    fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        for body in self.bodies.values_mut() {
            match body.kind {
                BodyKind::Dynamic => {
                    // Unit mass; forces are cleared every step.
                    body.velocity += (self.gravity * body.gravity_scale + body.force) * dt;
                    body.force = Vec2::ZERO;
                    body.position += body.velocity * dt;
                    body.angle += body.angular_velocity * dt;
                }
                BodyKind::Kinematic => {
                    body.position += body.velocity * dt;
                    body.angle += body.angular_velocity * dt;
                }
                BodyKind::Static => {}
            }
        }

        self.contacts.drain()
    }

    fn raycast(&self, origin: Vec2, direction: Vec2, distance: f32) -> Vec<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || distance <= 0.0 {
            return Vec::new();
        }

        let mut hits = Vec::new();

        for (handle, body) in &self.bodies {
            for fixture in &body.fixtures {
                if fixture.role == FixtureRole::Phantom {
                    continue;
                }

                let hit = match fixture.shape {
                    Shape::Box { width, height } => {
                        ray_vs_box(origin, direction, distance, body.position, width, height)
                    }
                    Shape::Circle { radius } => {
                        ray_vs_circle(origin, direction, distance, body.position, radius)
                    }
                };

                if let Some((point, normal, fraction)) = hit {
                    hits.push(RayHit {
                        body: *handle,
                        point,
                        normal,
                        fraction,
                        is_sensor: fixture.role == FixtureRole::Trigger,
                    });
                }
            }
        }

        hits
    }
}

/// Slab test against an axis-aligned box centered on `center`. Body
/// rotation is ignored; rays from inside the box report no hit.
fn ray_vs_box(
    origin: Vec2,
    direction: Vec2,
    distance: f32,
    center: Vec2,
    width: f32,
    height: f32,
) -> Option<(Vec2, Vec2, f32)> {
    let half = Vec2::new(width * 0.5, height * 0.5);
    let min = center - half;
    let max = center + half;

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, lo, hi) = match axis {
            0 => (origin.x, direction.x, min.x, max.x),
            _ => (origin.y, direction.y, min.y, max.y),
        };

        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let mut t0 = (lo - o) / d;
        let mut t1 = (hi - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            normal = if axis == 0 {
                Vec2::new(-d.signum(), 0.0)
            } else {
                Vec2::new(0.0, -d.signum())
            };
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 || t_enter > distance {
        return None;
    }

    Some((
        origin + direction * t_enter,
        normal,
        t_enter / distance,
    ))
}

/// Nearest entering intersection with a circle; rays from inside report no
/// hit, matching the box test.
fn ray_vs_circle(
    origin: Vec2,
    direction: Vec2,
    distance: f32,
    center: Vec2,
    radius: f32,
) -> Option<(Vec2, Vec2, f32)> {
    let to_origin = origin - center;
    let b = to_origin.dot(direction);
    let c = to_origin.length_squared() - radius * radius;

    // Inside the circle.
    if c < 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    if t < 0.0 || t > distance {
        return None;
    }

    let point = origin + direction * t;
    let normal = (point - center).normalize_or_zero();
    Some((point, normal, t / distance))
}
