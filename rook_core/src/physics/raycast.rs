// rook_core/src/physics/raycast.rs
use crate::actor::actor::ActorRef;
use crate::runtime::runtime::Runtime;
use glam::Vec2;

/// One ray hit translated back to the actor level.
#[derive(Clone)]
pub struct HitResult {
    pub actor: ActorRef,
    pub point: Vec2,
    pub normal: Vec2,
    pub is_trigger: bool,
}

impl Runtime {
    /// First hit along the ray, or `None` when nothing non-ignored lies
    /// within the distance.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, distance: f32) -> Option<HitResult> {
        self.raycast_all(origin, direction, distance).into_iter().next()
    }

    /// Every hit along the ray, ordered by ascending hit fraction. Hits on
    /// bodies not registered to a live actor are skipped.
    pub fn raycast_all(&self, origin: Vec2, direction: Vec2, distance: f32) -> Vec<HitResult> {
        let mut hits = self.physics.raycast(origin, direction, distance);
        hits.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));

        hits.into_iter()
            .filter_map(|hit| {
                self.bridge.actor_for(hit.body).map(|actor| HitResult {
                    actor,
                    point: hit.point,
                    normal: hit.normal,
                    is_trigger: hit.is_sensor,
                })
            })
            .collect()
    }
}
