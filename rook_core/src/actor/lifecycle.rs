// rook_core/src/actor/lifecycle.rs
use strum_macros::{AsRefStr, EnumIter, IntoStaticStr};

/// The callbacks a component may take part in. Bucket membership is decided
/// once, when the component is added to its actor, by probing for a callable
/// of the variant's name through the delegation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, EnumIter)]
pub enum LifecycleEvent {
    OnStart,
    OnUpdate,
    OnLateUpdate,
    OnDestroy,
    OnCollisionEnter,
    OnCollisionExit,
    OnTriggerEnter,
    OnTriggerExit,
}

impl LifecycleEvent {
    /// The field name probed on components.
    pub fn callback_name(&self) -> &'static str {
        self.into()
    }
}
