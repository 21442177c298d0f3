// rook_core/src/scene/template.rs
use crate::actor::actor::{Actor, ActorRef};
use crate::constants::TEMPLATE_EXT;
use crate::error::EngineError;
use crate::scripting::component::ComponentRef;
use crate::scripting::component_store::ComponentStore;
use crate::scripting::value::Value;
use crate::storage::json::read_json_file;
use std::collections::HashMap;
use std::path::PathBuf;

/// Parse-once, cache-forever loader for actor blueprints. A template is an
/// unregistered actor (id 0, never in a scene) whose components are
/// instances with the file's overrides already applied; scene actors clone
/// from it.
pub struct TemplateStore {
    template_dir: PathBuf,
    cache: HashMap<String, ActorRef>,
}

impl TemplateStore {
    pub fn new(template_dir: PathBuf) -> Self {
        Self {
            template_dir,
            cache: HashMap::new(),
        }
    }

    pub fn load(
        &mut self,
        name: &str,
        components: &mut ComponentStore,
    ) -> Result<ActorRef, EngineError> {
        let path = self.template_dir.join(format!("{name}.{TEMPLATE_EXT}"));
        if !path.exists() {
            return Err(EngineError::MissingTemplate(name.to_string()));
        }

        if let Some(blueprint) = self.cache.get(name) {
            return Ok(blueprint.clone());
        }

        let document = read_json_file(&path)?;
        let blueprint = parse_template(name, &document, components)?;
        self.cache.insert(name.to_string(), blueprint.clone());
        Ok(blueprint)
    }
}

fn parse_template(
    name: &str,
    document: &serde_json::Value,
    components: &mut ComponentStore,
) -> Result<ActorRef, EngineError> {
    let actor_name = document
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let mut actor = Actor::new(actor_name);

    if let Some(entries) = document.get("components").and_then(|v| v.as_object()) {
        for (key, entry) in entries {
            let object = entry
                .as_object()
                .ok_or_else(|| EngineError::MalformedTemplate {
                    name: name.to_string(),
                    message: format!("component '{key}' is not an object"),
                })?;
            let type_name = object
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| EngineError::MalformedTemplate {
                    name: name.to_string(),
                    message: format!("component '{key}' has no type"),
                })?;

            let component = components.load(key, type_name)?;
            apply_overrides(&component, object);
            actor.insert_component(key.clone(), component);
        }
    }

    Ok(actor.into_ref())
}

/// Applies every non-`type` member of a template or scene component entry
/// onto the instance, switching on the JSON kind. Non-scalar members are
/// skipped, the same way unknown kinds always have been.
pub(crate) fn apply_overrides(
    component: &ComponentRef,
    entry: &serde_json::Map<String, serde_json::Value>,
) {
    for (field, raw) in entry {
        if field == "type" {
            continue;
        }
        if let Some(value) = Value::from_json(raw) {
            component.set(field, value);
        }
    }
}

/// Assignment-copy of a blueprint actor: every scripted component becomes a
/// fresh instance delegating to the blueprint's instance, every native
/// component is deep-cloned. Lifecycle membership and owner links are the
/// caller's job, exactly as with a hand-built actor.
pub(crate) fn clone_from_blueprint(
    components: &ComponentStore,
    blueprint: &ActorRef,
) -> ActorRef {
    let source = blueprint.borrow();
    let mut actor = Actor::new(source.name.clone());

    for (key, component) in source.components_snapshot() {
        actor.insert_component(key, components.clone_component(&component));
    }

    actor.into_ref()
}
