// rook_core/src/physics/backend.rs
use glam::Vec2;

/// Opaque handle to a body owned by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    #[default]
    Dynamic,
    Static,
    Kinematic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box { width: f32, height: f32 },
    Circle { radius: f32 },
}

/// What a fixture participates in. Phantom fixtures exist so the body has
/// mass but interact with nothing: no contacts, no ray hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureRole {
    Collider,
    Trigger,
    Phantom,
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureInit {
    pub shape: Shape,
    pub role: FixtureRole,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Declared body state handed to the collaborator at creation.
#[derive(Debug, Clone)]
pub struct BodyInit {
    pub kind: BodyKind,
    pub position: Vec2,
    /// Radians.
    pub angle: f32,
    pub bullet: bool,
    pub gravity_scale: f32,
    pub angular_damping: f32,
    pub fixtures: Vec<FixtureInit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

/// One contact notification produced by a physics step.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub sensor_a: bool,
    pub sensor_b: bool,
    /// World manifold point; only meaningful on collision begin.
    pub point: Vec2,
    pub normal: Vec2,
    pub relative_velocity: Vec2,
}

/// One fixture hit along a ray query.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub body: BodyHandle,
    pub point: Vec2,
    pub normal: Vec2,
    /// Distance along the ray as a fraction of the queried length.
    pub fraction: f32,
    pub is_sensor: bool,
}

/// The narrow contract this runtime consumes from a physics engine. The
/// solver itself stays external; the runtime only creates/destroys bodies,
/// reads and writes their coarse state, steps the world and receives the
/// contact events the step produced.
pub trait PhysicsBackend {
    fn create_body(&mut self, init: &BodyInit) -> BodyHandle;
    fn destroy_body(&mut self, handle: BodyHandle);

    fn position(&self, handle: BodyHandle) -> Vec2;
    fn set_position(&mut self, handle: BodyHandle, position: Vec2);
    /// Radians.
    fn rotation(&self, handle: BodyHandle) -> f32;
    fn set_rotation(&mut self, handle: BodyHandle, radians: f32);
    fn velocity(&self, handle: BodyHandle) -> Vec2;
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    /// Radians per second.
    fn angular_velocity(&self, handle: BodyHandle) -> f32;
    fn set_angular_velocity(&mut self, handle: BodyHandle, radians_per_sec: f32);
    fn gravity_scale(&self, handle: BodyHandle) -> f32;
    fn set_gravity_scale(&mut self, handle: BodyHandle, scale: f32);
    fn apply_force(&mut self, handle: BodyHandle, force: Vec2);

    /// Advances the simulation and reports the contacts that began or
    /// ended during the step, in occurrence order.
    fn step(&mut self, dt: f32) -> Vec<ContactEvent>;

    /// All non-phantom fixtures intersected by the segment from `origin`
    /// along `direction` for `distance` units. Order is unspecified.
    fn raycast(&self, origin: Vec2, direction: Vec2, distance: f32) -> Vec<RayHit>;
}
