// rook_core/src/actor/actor.rs
use crate::actor::lifecycle::LifecycleEvent;
use crate::scripting::component::ComponentRef;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use strum::IntoEnumIterator;

pub type ActorRef = Rc<RefCell<Actor>>;

/// A game entity: a keyed set of components plus the per-event buckets and
/// queues that keep structural mutation off the iteration paths. Queries
/// never see a component that is pending removal; structural changes only
/// land during `process_component_queues`.
#[derive(Debug)]
pub struct Actor {
    pub id: u32,
    pub name: String,
    pub enabled: bool,
    components: BTreeMap<String, ComponentRef>,
    components_by_type: HashMap<String, BTreeSet<String>>,
    buckets: HashMap<LifecycleEvent, BTreeMap<String, ComponentRef>>,
    add_queue: Vec<ComponentRef>,
    pending_removal: BTreeMap<String, ComponentRef>,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            enabled: true,
            components: BTreeMap::new(),
            components_by_type: HashMap::new(),
            buckets: LifecycleEvent::iter()
                .map(|event| (event, BTreeMap::new()))
                .collect(),
            add_queue: Vec::new(),
            pending_removal: BTreeMap::new(),
        }
    }

    pub fn into_ref(self) -> ActorRef {
        Rc::new(RefCell::new(self))
    }

    pub fn component_by_key(&self, key: &str) -> Option<ComponentRef> {
        if self.pending_removal.contains_key(key) {
            return None;
        }
        self.components.get(key).cloned()
    }

    /// First live component of the type, smallest key winning the tie.
    pub fn component_of_type(&self, type_name: &str) -> Option<ComponentRef> {
        let keys = self.components_by_type.get(type_name)?;
        keys.iter()
            .find(|key| !self.pending_removal.contains_key(*key))
            .and_then(|key| self.components.get(key))
            .cloned()
    }

    /// All live components of the type in ascending key order.
    pub fn components_of_type(&self, type_name: &str) -> Vec<ComponentRef> {
        let Some(keys) = self.components_by_type.get(type_name) else {
            return Vec::new();
        };
        keys.iter()
            .filter(|key| !self.pending_removal.contains_key(*key))
            .filter_map(|key| self.components.get(key))
            .cloned()
            .collect()
    }

    /// Immediate insertion into the live maps, used while parsing scenes
    /// and templates. Runtime additions go through `queue_add` instead.
    pub fn insert_component(&mut self, key: String, component: ComponentRef) {
        self.components_by_type
            .entry(component.type_name())
            .or_default()
            .insert(key.clone());
        self.components.insert(key, component);
    }

    /// Queues a component for admission at the next flush.
    pub fn queue_add(&mut self, component: ComponentRef) {
        self.add_queue.push(component);
    }

    /// Disables the component and hides it from queries immediately; the
    /// structural erase happens at the next flush.
    pub fn remove_component(&mut self, component: &ComponentRef) {
        component.set_enabled(false);
        self.pending_removal
            .insert(component.key(), component.clone());
    }

    /// Queues every held component for removal and disables the actor.
    pub fn setup_for_destruction(&mut self) {
        for (key, component) in &self.components {
            self.pending_removal.insert(key.clone(), component.clone());
        }
        self.enabled = false;
    }

    /// Applies the queued structural mutations: admissions first (bucket
    /// classification, enable, live-map insertion), then removals. Removals
    /// only purge the Start/Update/LateUpdate buckets; Destroy membership
    /// must survive for the destroy pass and the contact buckets rely on
    /// the disabled flag until the actor itself goes away.
    pub fn process_component_queues(&mut self) {
        let added: Vec<ComponentRef> = self.add_queue.drain(..).collect();
        for component in added {
            let key = component.key();
            self.classify_lifecycle(&key, &component);
            component.set_enabled(true);
            self.insert_component(key, component);
        }

        let removed = std::mem::take(&mut self.pending_removal);
        for (key, component) in removed {
            // componentsByType first, while the type field is still readable.
            let type_name = component.type_name();
            if let Some(keys) = self.components_by_type.get_mut(&type_name) {
                keys.remove(&key);
            }
            self.components.remove(&key);

            for event in [
                LifecycleEvent::OnStart,
                LifecycleEvent::OnUpdate,
                LifecycleEvent::OnLateUpdate,
            ] {
                if let Some(bucket) = self.buckets.get_mut(&event) {
                    bucket.remove(&key);
                }
            }
        }
    }

    /// Installs the component into every bucket whose callback it exposes.
    /// Membership is fixed here and never re-evaluated.
    pub fn classify_lifecycle(&mut self, key: &str, component: &ComponentRef) {
        for event in LifecycleEvent::iter() {
            if component.has_callback(event.callback_name()) {
                self.buckets
                    .entry(event)
                    .or_default()
                    .insert(key.to_string(), component.clone());
            }
        }
    }

    /// Snapshot of a bucket in key order, safe to iterate while callbacks
    /// mutate the actor.
    pub fn bucket_components(&self, event: LifecycleEvent) -> Vec<ComponentRef> {
        self.buckets
            .get(&event)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear_bucket(&mut self, event: LifecycleEvent) {
        if let Some(bucket) = self.buckets.get_mut(&event) {
            bucket.clear();
        }
    }

    /// Components queued for removal that registered an OnDestroy callback,
    /// in key order. The destroy pass walks this before the flush erases
    /// them.
    pub fn pending_destroy_components(&self) -> Vec<ComponentRef> {
        let Some(bucket) = self.buckets.get(&LifecycleEvent::OnDestroy) else {
            return Vec::new();
        };
        self.pending_removal
            .iter()
            .filter(|(key, _)| bucket.contains_key(*key))
            .map(|(_, component)| component.clone())
            .collect()
    }

    /// Snapshot of every held component, pending removals included.
    pub fn components_snapshot(&self) -> Vec<(String, ComponentRef)> {
        self.components
            .iter()
            .map(|(key, component)| (key.clone(), component.clone()))
            .collect()
    }
}
