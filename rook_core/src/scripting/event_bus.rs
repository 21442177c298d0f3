// rook_core/src/scripting/event_bus.rs
use crate::scripting::component::ComponentRef;
use crate::scripting::value::Callable;
use std::collections::HashMap;
use std::rc::Rc;

/// One registered (event type, component, callback) triple.
#[derive(Clone)]
pub struct Subscription {
    pub event_type: String,
    pub component: ComponentRef,
    pub callback: Callable,
}

impl Subscription {
    /// Removal identity: same component and same callback. The payload and
    /// the event type it was queued under play no part.
    fn matches(&self, other: &Subscription) -> bool {
        Rc::ptr_eq(&self.component, &other.component) && self.callback.ptr_eq(&other.callback)
    }
}

/// Decoupled publish/subscribe messaging between components. Subscribe and
/// unsubscribe only enqueue; the live subscriber table changes once per
/// frame when the queues drain, so doing either from inside a callback can
/// never corrupt an in-progress publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<String, Vec<Subscription>>,
    subscribe_queue: Vec<Subscription>,
    unsubscribe_queue: Vec<Subscription>,
}

impl EventBus {
    pub fn subscribe(&mut self, event_type: impl Into<String>, component: ComponentRef, callback: Callable) {
        self.subscribe_queue.push(Subscription {
            event_type: event_type.into(),
            component,
            callback,
        });
    }

    pub fn unsubscribe(&mut self, event_type: impl Into<String>, component: ComponentRef, callback: Callable) {
        self.unsubscribe_queue.push(Subscription {
            event_type: event_type.into(),
            component,
            callback,
        });
    }

    /// Drains the pending queues: additions in subscribe order, then
    /// removals. Both queues are cleared.
    pub fn handle_subscription_queues(&mut self) {
        for subscription in self.subscribe_queue.drain(..) {
            self.subscribers
                .entry(subscription.event_type.clone())
                .or_default()
                .push(subscription);
        }

        for pending in self.unsubscribe_queue.drain(..) {
            if let Some(subscriptions) = self.subscribers.get_mut(&pending.event_type) {
                subscriptions.retain(|existing| !existing.matches(&pending));
            }
        }
    }

    /// Snapshot of the live subscribers for one event type, in
    /// subscription order. The publish loop iterates this copy so that
    /// queue drains cannot touch it.
    pub fn subscribers_snapshot(&self, event_type: &str) -> Vec<Subscription> {
        self.subscribers
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }
}
