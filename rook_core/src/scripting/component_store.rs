// rook_core/src/scripting/component_store.rs
use crate::constants::{COMPONENT_EXT, RIGIDBODY_TYPE, RUNTIME_KEY_PREFIX};
use crate::error::EngineError;
use crate::physics::rigidbody::Rigidbody;
use crate::scripting::component::{Component, ComponentRef, FIELD_ENABLED, FIELD_KEY, FIELD_TYPE};
use crate::scripting::value::{Callable, Value};
use crate::storage::json::read_json_file;
use std::collections::HashMap;
use std::path::PathBuf;

/// Loads component type definitions once, caches them as canonical
/// prototypes and produces per-actor instances that delegate to them.
///
/// A scripted type is the pair of its definition file (field defaults)
/// and the native callables the host registered for the type name; both
/// end up as fields of the canonical definition. The `Rigidbody` type is
/// native: instances are fresh structs, never delegating.
pub struct ComponentStore {
    component_dir: PathBuf,
    definitions: HashMap<String, ComponentRef>,
    behaviors: HashMap<String, Vec<Callable>>,
    runtime_counters: HashMap<String, u32>,
}

impl ComponentStore {
    pub fn new(component_dir: PathBuf) -> Self {
        Self {
            component_dir,
            definitions: HashMap::new(),
            behaviors: HashMap::new(),
            runtime_counters: HashMap::new(),
        }
    }

    /// Registers native callables for a type name. Each callable is stored
    /// on the definition under its own name, so `Callable::new("OnUpdate",
    /// ..)` becomes the type's update callback. Must happen before the
    /// type's definition is first loaded.
    pub fn register_behavior(
        &mut self,
        type_name: impl Into<String>,
        callbacks: impl IntoIterator<Item = Callable>,
    ) {
        self.behaviors
            .entry(type_name.into())
            .or_default()
            .extend(callbacks);
    }

    /// Component instance for a declared key. The instance delegates to the
    /// type's canonical definition; only `key` is stamped locally.
    pub fn load(&mut self, key: &str, type_name: &str) -> Result<ComponentRef, EngineError> {
        if type_name == RIGIDBODY_TYPE {
            let mut rigidbody = Rigidbody::default();
            rigidbody.key = key.to_string();
            return Ok(Component::from_rigidbody(rigidbody));
        }

        let definition = self.definition(type_name)?;
        let instance = Component::inheriting(&definition);
        instance.set(FIELD_KEY, Value::Str(key.to_string()));
        Ok(instance)
    }

    /// Runtime variant: the key is auto-generated ("r0", "r1", ... per
    /// type) and the instance starts disabled so it cannot execute before
    /// the owning actor processes its add queue.
    pub fn load_runtime(&mut self, type_name: &str) -> Result<ComponentRef, EngineError> {
        let counter = self.runtime_counters.entry(type_name.to_string()).or_insert(0);
        let key = format!("{RUNTIME_KEY_PREFIX}{counter}");
        *counter += 1;

        if type_name == RIGIDBODY_TYPE {
            let mut rigidbody = Rigidbody::default();
            rigidbody.key = key;
            rigidbody.enabled = false;
            return Ok(Component::from_rigidbody(rigidbody));
        }

        let definition = self.definition(type_name)?;
        let instance = Component::inheriting(&definition);
        instance.set(FIELD_KEY, Value::Str(key));
        instance.set(FIELD_ENABLED, Value::Bool(false));
        Ok(instance)
    }

    /// Fresh instance for an actor cloned from a template: scripted
    /// components delegate to the template's own instance (not the type
    /// definition), native components are deep-copied.
    pub fn clone_component(&self, original: &ComponentRef) -> ComponentRef {
        match original.as_rigidbody() {
            Some(cell) => Component::from_rigidbody(cell.borrow().clone_detached()),
            None => Component::inheriting(original),
        }
    }

    /// The canonical definition for a type, loaded from its source file
    /// exactly once for the process lifetime.
    fn definition(&mut self, type_name: &str) -> Result<ComponentRef, EngineError> {
        if let Some(definition) = self.definitions.get(type_name) {
            return Ok(definition.clone());
        }
        let definition = self.load_definition(type_name)?;
        self.definitions
            .insert(type_name.to_string(), definition.clone());
        Ok(definition)
    }

    fn load_definition(&self, type_name: &str) -> Result<ComponentRef, EngineError> {
        let path = self
            .component_dir
            .join(format!("{type_name}.{COMPONENT_EXT}"));
        if !path.exists() {
            return Err(EngineError::MissingComponent(type_name.to_string()));
        }

        let document = read_json_file(&path)?;
        let object = document
            .as_object()
            .ok_or_else(|| EngineError::MalformedComponent {
                type_name: type_name.to_string(),
                message: "definition is not an object".to_string(),
            })?;

        let definition = Component::new_script();
        for (field, raw) in object {
            let value =
                Value::from_json(raw).ok_or_else(|| EngineError::MalformedComponent {
                    type_name: type_name.to_string(),
                    message: format!("field '{field}' has an unsupported kind"),
                })?;
            definition.set(field, value);
        }

        if let Some(callbacks) = self.behaviors.get(type_name) {
            for callback in callbacks {
                definition.set(callback.name(), Value::Callable(callback.clone()));
            }
        }

        definition.set(FIELD_TYPE, Value::Str(type_name.to_string()));
        definition.set(FIELD_ENABLED, Value::Bool(true));
        Ok(definition)
    }
}
