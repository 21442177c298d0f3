// rook_core/src/physics/rigidbody.rs
use crate::actor::actor::{Actor, ActorRef};
use crate::constants::RIGIDBODY_TYPE;
use crate::console_warn;
use crate::physics::backend::*;
use crate::scripting::value::Value;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// The native physics component. Declared fields mirror what templates and
/// scenes may override; once `on_start` has created the body, the live body
/// is authoritative and the declared fields only serve re-creation.
#[derive(Debug, Clone)]
pub struct Rigidbody {
    pub key: String,
    pub enabled: bool,

    pub body_type: String,
    pub collider_type: String,
    pub trigger_type: String,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub trigger_width: f32,
    pub trigger_height: f32,
    pub trigger_radius: f32,
    pub friction: f32,
    pub bounciness: f32,
    pub x: f32,
    pub y: f32,
    pub precise: bool,
    pub gravity_scale: f32,
    pub density: f32,
    pub angular_friction: f32,
    pub rotation_degrees: f32,
    pub has_collider: bool,
    pub has_trigger: bool,

    body: Option<BodyHandle>,
    owner: Weak<RefCell<Actor>>,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            key: String::new(),
            enabled: true,
            body_type: "dynamic".to_string(),
            collider_type: "box".to_string(),
            trigger_type: "box".to_string(),
            width: 1.0,
            height: 1.0,
            radius: 0.5,
            trigger_width: 1.0,
            trigger_height: 1.0,
            trigger_radius: 0.5,
            friction: 0.3,
            bounciness: 0.3,
            x: 0.0,
            y: 0.0,
            precise: true,
            gravity_scale: 1.0,
            density: 1.0,
            angular_friction: 0.3,
            rotation_degrees: 0.0,
            has_collider: true,
            has_trigger: true,
            body: None,
            owner: Weak::new(),
        }
    }
}

impl Rigidbody {
    pub fn type_name(&self) -> &'static str {
        RIGIDBODY_TYPE
    }

    /// Callbacks the native component takes part in.
    pub fn has_callback(name: &str) -> bool {
        name == "OnStart" || name == "OnDestroy"
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn owner(&self) -> Option<ActorRef> {
        self.owner.upgrade()
    }

    pub fn set_owner(&mut self, actor: &ActorRef) {
        self.owner = Rc::downgrade(actor);
    }

    /// Deep copy of the declared state, detached from any body or actor.
    /// Used when an actor is cloned from a template.
    pub fn clone_detached(&self) -> Rigidbody {
        Rigidbody {
            body: None,
            owner: Weak::new(),
            ..self.clone()
        }
    }

    /// Typed override application by field name.
    pub fn set_field(&mut self, name: &str, value: &Value) {
        match name {
            "key" => {
                if let Some(v) = value.as_str() {
                    self.key = v.to_string();
                }
            }
            "enabled" => {
                if let Some(v) = value.as_bool() {
                    self.enabled = v;
                }
            }
            "body_type" => {
                if let Some(v) = value.as_str() {
                    self.body_type = v.to_string();
                }
            }
            "collider_type" => {
                if let Some(v) = value.as_str() {
                    self.collider_type = v.to_string();
                }
            }
            "trigger_type" => {
                if let Some(v) = value.as_str() {
                    self.trigger_type = v.to_string();
                }
            }
            "width" => {
                if let Some(v) = value.as_f32() {
                    self.width = v;
                }
            }
            "height" => {
                if let Some(v) = value.as_f32() {
                    self.height = v;
                }
            }
            "radius" => {
                if let Some(v) = value.as_f32() {
                    self.radius = v;
                }
            }
            "trigger_width" => {
                if let Some(v) = value.as_f32() {
                    self.trigger_width = v;
                }
            }
            "trigger_height" => {
                if let Some(v) = value.as_f32() {
                    self.trigger_height = v;
                }
            }
            "trigger_radius" => {
                if let Some(v) = value.as_f32() {
                    self.trigger_radius = v;
                }
            }
            "friction" => {
                if let Some(v) = value.as_f32() {
                    self.friction = v;
                }
            }
            "bounciness" => {
                if let Some(v) = value.as_f32() {
                    self.bounciness = v;
                }
            }
            "x" => {
                if let Some(v) = value.as_f32() {
                    self.x = v;
                }
            }
            "y" => {
                if let Some(v) = value.as_f32() {
                    self.y = v;
                }
            }
            "gravity_scale" => {
                if let Some(v) = value.as_f32() {
                    self.gravity_scale = v;
                }
            }
            "density" => {
                if let Some(v) = value.as_f32() {
                    self.density = v;
                }
            }
            "angular_friction" => {
                if let Some(v) = value.as_f32() {
                    self.angular_friction = v;
                }
            }
            "rotation" => {
                if let Some(v) = value.as_f32() {
                    self.rotation_degrees = v;
                }
            }
            "precise" => {
                if let Some(v) = value.as_bool() {
                    self.precise = v;
                }
            }
            "has_collider" => {
                if let Some(v) = value.as_bool() {
                    self.has_collider = v;
                }
            }
            "has_trigger" => {
                if let Some(v) = value.as_bool() {
                    self.has_trigger = v;
                }
            }
            "type" => {}
            _ => console_warn!("Rigidbody has no field '{}'.", name),
        }
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "key" => Value::Str(self.key.clone()),
            "type" => Value::Str(self.type_name().to_string()),
            "enabled" => Value::Bool(self.enabled),
            "body_type" => Value::Str(self.body_type.clone()),
            "collider_type" => Value::Str(self.collider_type.clone()),
            "trigger_type" => Value::Str(self.trigger_type.clone()),
            "width" => Value::Float(self.width as f64),
            "height" => Value::Float(self.height as f64),
            "radius" => Value::Float(self.radius as f64),
            "trigger_width" => Value::Float(self.trigger_width as f64),
            "trigger_height" => Value::Float(self.trigger_height as f64),
            "trigger_radius" => Value::Float(self.trigger_radius as f64),
            "friction" => Value::Float(self.friction as f64),
            "bounciness" => Value::Float(self.bounciness as f64),
            "x" => Value::Float(self.x as f64),
            "y" => Value::Float(self.y as f64),
            "precise" => Value::Bool(self.precise),
            "gravity_scale" => Value::Float(self.gravity_scale as f64),
            "density" => Value::Float(self.density as f64),
            "angular_friction" => Value::Float(self.angular_friction as f64),
            "rotation" => Value::Float(self.rotation_degrees as f64),
            "has_collider" => Value::Bool(self.has_collider),
            "has_trigger" => Value::Bool(self.has_trigger),
            _ => return None,
        };
        Some(value)
    }

    /// Translates the declared fields into engine primitives and creates
    /// the body. Returns the handle so the caller can register it for
    /// contact dispatch.
    pub fn on_start(&mut self, physics: &mut dyn PhysicsBackend) -> BodyHandle {
        let kind = match self.body_type.as_str() {
            "dynamic" => BodyKind::Dynamic,
            "kinematic" => BodyKind::Kinematic,
            _ => BodyKind::Static,
        };

        let mut fixtures = Vec::new();

        if self.has_collider {
            fixtures.push(FixtureInit {
                shape: self.shape(&self.collider_type, self.width, self.height, self.radius),
                role: FixtureRole::Collider,
                density: self.density,
                friction: self.friction,
                restitution: self.bounciness,
            });
        }

        if self.has_trigger {
            fixtures.push(FixtureInit {
                shape: self.shape(
                    &self.trigger_type,
                    self.trigger_width,
                    self.trigger_height,
                    self.trigger_radius,
                ),
                role: FixtureRole::Trigger,
                density: self.density,
                friction: self.friction,
                restitution: self.bounciness,
            });
        }

        // Bodies with neither collider nor trigger still need mass.
        if fixtures.is_empty() {
            fixtures.push(FixtureInit {
                shape: Shape::Box {
                    width: self.width,
                    height: self.height,
                },
                role: FixtureRole::Phantom,
                density: self.density,
                friction: self.friction,
                restitution: self.bounciness,
            });
        }

        let handle = physics.create_body(&BodyInit {
            kind,
            position: Vec2::new(self.x, self.y),
            angle: self.rotation_degrees.to_radians(),
            bullet: self.precise,
            gravity_scale: self.gravity_scale,
            angular_damping: self.angular_friction,
            fixtures,
        });

        self.body = Some(handle);
        handle
    }

    pub fn on_destroy(&mut self, physics: &mut dyn PhysicsBackend) {
        if let Some(handle) = self.body.take() {
            physics.destroy_body(handle);
        }
    }

    fn shape(&self, shape_type: &str, width: f32, height: f32, radius: f32) -> Shape {
        match shape_type {
            "circle" => Shape::Circle { radius },
            _ => Shape::Box { width, height },
        }
    }

    // Accessors fall back to the declared fields while no body exists.

    pub fn position(&self, physics: &dyn PhysicsBackend) -> Vec2 {
        match self.body {
            Some(handle) => physics.position(handle),
            None => Vec2::new(self.x, self.y),
        }
    }

    pub fn set_position(&mut self, physics: &mut dyn PhysicsBackend, position: Vec2) {
        match self.body {
            Some(handle) => physics.set_position(handle, position),
            None => {
                self.x = position.x;
                self.y = position.y;
            }
        }
    }

    pub fn rotation(&self, physics: &dyn PhysicsBackend) -> f32 {
        match self.body {
            Some(handle) => physics.rotation(handle).to_degrees(),
            None => self.rotation_degrees,
        }
    }

    pub fn set_rotation(&mut self, physics: &mut dyn PhysicsBackend, degrees_clockwise: f32) {
        match self.body {
            Some(handle) => physics.set_rotation(handle, degrees_clockwise.to_radians()),
            None => self.rotation_degrees = degrees_clockwise,
        }
    }

    pub fn velocity(&self, physics: &dyn PhysicsBackend) -> Vec2 {
        match self.body {
            Some(handle) => physics.velocity(handle),
            None => Vec2::ZERO,
        }
    }

    pub fn set_velocity(&mut self, physics: &mut dyn PhysicsBackend, velocity: Vec2) {
        if let Some(handle) = self.body {
            physics.set_velocity(handle, velocity);
        }
    }

    pub fn angular_velocity(&self, physics: &dyn PhysicsBackend) -> f32 {
        match self.body {
            Some(handle) => physics.angular_velocity(handle).to_degrees(),
            None => 0.0,
        }
    }

    pub fn set_angular_velocity(&mut self, physics: &mut dyn PhysicsBackend, degrees_clockwise: f32) {
        if let Some(handle) = self.body {
            physics.set_angular_velocity(handle, degrees_clockwise.to_radians());
        }
    }

    pub fn gravity_scale(&self, physics: &dyn PhysicsBackend) -> f32 {
        match self.body {
            Some(handle) => physics.gravity_scale(handle),
            None => self.gravity_scale,
        }
    }

    pub fn set_gravity_scale(&mut self, physics: &mut dyn PhysicsBackend, scale: f32) {
        match self.body {
            Some(handle) => physics.set_gravity_scale(handle, scale),
            None => self.gravity_scale = scale,
        }
    }

    pub fn add_force(&mut self, physics: &mut dyn PhysicsBackend, force: Vec2) {
        if let Some(handle) = self.body {
            physics.apply_force(handle, force);
        }
    }

    /// Unit vector pointing "up" for the body (screen space, y down).
    pub fn up_direction(&self, physics: &dyn PhysicsBackend) -> Vec2 {
        match self.body {
            Some(handle) => {
                let angle = physics.rotation(handle);
                Vec2::new(angle.sin(), -angle.cos())
            }
            None => Vec2::new(0.0, -1.0),
        }
    }

    pub fn set_up_direction(&mut self, physics: &mut dyn PhysicsBackend, direction: Vec2) {
        if let Some(handle) = self.body {
            let direction = direction.normalize_or_zero();
            let angle = direction.x.atan2(-direction.y);
            physics.set_rotation(handle, angle);
        }
    }

    pub fn right_direction(&self, physics: &dyn PhysicsBackend) -> Vec2 {
        match self.body {
            Some(handle) => {
                let angle = physics.rotation(handle);
                Vec2::new(angle.cos(), angle.sin())
            }
            None => Vec2::new(1.0, 0.0),
        }
    }

    pub fn set_right_direction(&mut self, physics: &mut dyn PhysicsBackend, direction: Vec2) {
        if let Some(handle) = self.body {
            let direction = direction.normalize_or_zero();
            let angle = direction.x.atan2(-direction.y) - std::f32::consts::FRAC_PI_2;
            physics.set_rotation(handle, angle);
        }
    }
}
