// rook_core/src/physics/contact_bridge.rs
use crate::actor::actor::{Actor, ActorRef};
use crate::physics::backend::BodyHandle;
use glam::Vec2;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Placeholder point/normal used when a contact has no meaningful world
/// manifold (trigger contacts, and every contact end).
pub const CONTACT_SENTINEL: Vec2 = Vec2::new(-999.0, -999.0);

/// Payload delivered to collision and trigger callbacks.
#[derive(Clone)]
pub struct Collision {
    pub other: ActorRef,
    pub point: Vec2,
    pub normal: Vec2,
    pub relative_velocity: Vec2,
}

/// Maps physics bodies back to the actors that own them, the piece of
/// contact translation that survives on this side of the boundary.
#[derive(Default)]
pub struct ContactBridge {
    body_to_actor: HashMap<BodyHandle, Weak<RefCell<Actor>>>,
}

impl ContactBridge {
    pub fn register(&mut self, handle: BodyHandle, actor: &ActorRef) {
        self.body_to_actor.insert(handle, Rc::downgrade(actor));
    }

    pub fn unregister(&mut self, handle: BodyHandle) {
        self.body_to_actor.remove(&handle);
    }

    /// The owning actor, if the body is registered and the actor is alive.
    pub fn actor_for(&self, handle: BodyHandle) -> Option<ActorRef> {
        self.body_to_actor.get(&handle).and_then(Weak::upgrade)
    }
}
