// rook_core/src/scene/scene.rs
use crate::actor::actor::{Actor, ActorRef};
use crate::error::EngineError;
use crate::scene::template::{apply_overrides, clone_from_blueprint, TemplateStore};
use crate::scripting::component_store::ComponentStore;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// The live actor set for the current scene, the name index, and the
/// queues that defer actor admission/removal to the structural flush.
#[derive(Default)]
pub struct Scene {
    name: String,
    actors: Vec<ActorRef>,
    actors_by_name: HashMap<String, Vec<ActorRef>>,
    actors_to_add: Vec<ActorRef>,
    actors_to_remove: HashSet<u32>,
    dont_destroy: Vec<ActorRef>,
    total_actors: u32,
    pending_scene: Option<String>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the currently loaded scene.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the live actors in registration order; pass drivers
    /// iterate this copy so callbacks can queue structural changes freely.
    pub fn actors_snapshot(&self) -> Vec<ActorRef> {
        self.actors.clone()
    }

    /// First actor with the name, by registration order, skipping actors
    /// flagged for removal. A miss is an empty result, not an error.
    pub fn actor(&self, name: &str) -> Option<ActorRef> {
        let actors = self.actors_by_name.get(name)?;
        actors
            .iter()
            .find(|actor| !self.actors_to_remove.contains(&actor.borrow().id))
            .cloned()
    }

    /// All live actors with the name, in registration order.
    pub fn actors_named(&self, name: &str) -> Vec<ActorRef> {
        let Some(actors) = self.actors_by_name.get(name) else {
            return Vec::new();
        };
        actors
            .iter()
            .filter(|actor| !self.actors_to_remove.contains(&actor.borrow().id))
            .cloned()
            .collect()
    }

    /// Registers a runtime-instantiated actor: it receives its id and is
    /// findable by name immediately, but only joins the live vector (and
    /// gets its lifecycle buckets) at the next flush.
    pub fn register(&mut self, actor: ActorRef) {
        actor.borrow_mut().id = self.total_actors;
        self.total_actors += 1;

        let name = actor.borrow().name.clone();
        self.actors_by_name.entry(name).or_default().push(actor.clone());
        self.actors_to_add.push(actor);
    }

    /// Flags the actor for removal and tears it down: queries stop
    /// returning it now, the structural erase happens at the flush.
    pub fn destroy(&mut self, actor: &ActorRef) {
        self.actors_to_remove.insert(actor.borrow().id);
        actor.borrow_mut().setup_for_destruction();
    }

    /// Keeps the actor alive across scene loads.
    pub fn dont_destroy_on_load(&mut self, actor: &ActorRef) {
        if !self.dont_destroy.iter().any(|kept| Rc::ptr_eq(kept, actor)) {
            self.dont_destroy.push(actor.clone());
        }
    }

    /// Defers a scene switch: every live actor is queued for removal and
    /// the parse itself runs at the top of the next update, never in the
    /// middle of a pass.
    pub fn queue_scene(&mut self, name: impl Into<String>) {
        for actor in &self.actors {
            self.actors_to_remove.insert(actor.borrow().id);
        }
        self.pending_scene = Some(name.into());
    }

    pub fn take_pending_scene(&mut self) -> Option<String> {
        self.pending_scene.take()
    }

    /// Resets the live set for a fresh load: only "don't destroy" actors
    /// carry over, re-sorted by id, and the name index is rebuilt around
    /// them. Removal flags consumed by the replacement are dropped.
    pub fn begin_load(&mut self, name: &str) {
        self.name = name.to_string();
        self.actors = self.dont_destroy.clone();
        self.actors.sort_by_key(|actor| actor.borrow().id);
        self.actors_to_remove.clear();

        self.actors_by_name.clear();
        for actor in &self.actors {
            let actor_name = actor.borrow().name.clone();
            self.actors_by_name
                .entry(actor_name)
                .or_default()
                .push(actor.clone());
        }
    }

    /// Adds a freshly parsed actor to the live set with the next id.
    pub fn add_parsed_actor(&mut self, actor: ActorRef) {
        actor.borrow_mut().id = self.total_actors;
        self.total_actors += 1;

        let name = actor.borrow().name.clone();
        self.actors.push(actor.clone());
        self.actors_by_name.entry(name).or_default().push(actor);
    }

    /// Structural flush for actors: queued admissions join the live vector
    /// and get owner links plus lifecycle-bucket membership for every
    /// component; flagged actors leave the vector and the name index.
    pub fn process_actor_queues(&mut self) {
        let added: Vec<ActorRef> = self.actors_to_add.drain(..).collect();
        for actor in added {
            self.actors.push(actor.clone());

            let components = actor.borrow().components_snapshot();
            for (key, component) in components {
                component.set_owner(&actor);
                actor.borrow_mut().classify_lifecycle(&key, &component);
            }
        }

        if self.actors_to_remove.is_empty() {
            return;
        }

        let removed = std::mem::take(&mut self.actors_to_remove);
        self.actors
            .retain(|actor| !removed.contains(&actor.borrow().id));
        for actors in self.actors_by_name.values_mut() {
            actors.retain(|actor| !removed.contains(&actor.borrow().id));
        }
    }
}

/// Parses one scene actor entry: either a template clone with per-field
/// overrides layered onto the cloned instances, or inline components
/// loaded fresh from the store.
pub(crate) fn parse_actor(
    components: &mut ComponentStore,
    templates: &mut TemplateStore,
    entry: &serde_json::Value,
    scene_name: &str,
) -> Result<ActorRef, EngineError> {
    let mut template_keys: HashSet<String> = HashSet::new();

    let actor = match entry.get("template").and_then(|v| v.as_str()) {
        Some(template_name) => {
            let blueprint = templates.load(template_name, components)?;
            let actor = clone_from_blueprint(components, &blueprint);

            let inherited = actor.borrow().components_snapshot();
            for (key, component) in inherited {
                component.set_owner(&actor);
                actor.borrow_mut().classify_lifecycle(&key, &component);
                template_keys.insert(key);
            }
            actor
        }
        None => Actor::new("").into_ref(),
    };

    if let Some(name) = entry.get("name").and_then(|v| v.as_str()) {
        actor.borrow_mut().name = name.to_string();
    }

    if let Some(entries) = entry.get("components").and_then(|v| v.as_object()) {
        for (key, component_entry) in entries {
            let object = component_entry
                .as_object()
                .ok_or_else(|| EngineError::MalformedScene {
                    name: scene_name.to_string(),
                    message: format!("component '{key}' is not an object"),
                })?;

            if template_keys.contains(key) {
                // Inherited component: the overrides land directly on the
                // already-cloned instance, never on the template.
                let component = actor.borrow().component_by_key(key);
                if let Some(component) = component {
                    apply_overrides(&component, object);
                    actor.borrow_mut().classify_lifecycle(key, &component);
                }
            } else {
                let type_name = object
                    .get("type")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| EngineError::MalformedScene {
                        name: scene_name.to_string(),
                        message: format!("component '{key}' has no type"),
                    })?;

                let component = components.load(key, type_name)?;
                component.set_owner(&actor);
                actor
                    .borrow_mut()
                    .insert_component(key.clone(), component.clone());
                apply_overrides(&component, object);
                actor.borrow_mut().classify_lifecycle(key, &component);
            }
        }
    }

    Ok(actor)
}
