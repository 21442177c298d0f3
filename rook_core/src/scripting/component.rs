// rook_core/src/scripting/component.rs
use crate::actor::actor::{Actor, ActorRef};
use crate::physics::rigidbody::Rigidbody;
use crate::scripting::value::{Callable, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

pub const FIELD_KEY: &str = "key";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_ENABLED: &str = "enabled";

/// A component instance attached to (at most) one actor. Scripted
/// components are dynamic field records with prototype delegation; the
/// native rigidbody carries the same key/type/enabled contract on struct
/// fields instead.
#[derive(Debug)]
pub enum Component {
    Script(ScriptComponent),
    Rigidbody(RefCell<Rigidbody>),
}

pub type ComponentRef = Rc<Component>;

/// Dynamic field record with an optional fallback parent. Reads that find
/// nothing locally follow the parent link; writes always land locally.
/// Parents may themselves delegate, so template-instance-of-type-instance
/// chains resolve transitively.
#[derive(Debug, Default)]
pub struct ScriptComponent {
    parent: Option<ComponentRef>,
    fields: RefCell<BTreeMap<String, Value>>,
    owner: RefCell<Weak<RefCell<Actor>>>,
}

impl ScriptComponent {
    fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.fields.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}

impl Component {
    /// Fresh scripted component with no delegation link.
    pub fn new_script() -> ComponentRef {
        Rc::new(Component::Script(ScriptComponent::default()))
    }

    /// Scripted component whose failed lookups fall through to `parent`.
    pub fn inheriting(parent: &ComponentRef) -> ComponentRef {
        Rc::new(Component::Script(ScriptComponent {
            parent: Some(parent.clone()),
            fields: RefCell::new(BTreeMap::new()),
            owner: RefCell::new(Weak::new()),
        }))
    }

    pub fn from_rigidbody(rigidbody: Rigidbody) -> ComponentRef {
        Rc::new(Component::Rigidbody(RefCell::new(rigidbody)))
    }

    pub fn as_rigidbody(&self) -> Option<&RefCell<Rigidbody>> {
        match self {
            Component::Rigidbody(cell) => Some(cell),
            _ => None,
        }
    }

    /// Field read through the delegation chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self {
            Component::Script(script) => script.get(name),
            Component::Rigidbody(cell) => cell.borrow().get_field(name),
        }
    }

    /// Field write. Never touches a delegation parent.
    pub fn set(&self, name: &str, value: Value) {
        match self {
            Component::Script(script) => script.set(name, value),
            Component::Rigidbody(cell) => cell.borrow_mut().set_field(name, &value),
        }
    }

    pub fn key(&self) -> String {
        match self {
            Component::Script(script) => script
                .get(FIELD_KEY)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            Component::Rigidbody(cell) => cell.borrow().key.clone(),
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Component::Script(script) => script
                .get(FIELD_TYPE)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            Component::Rigidbody(cell) => cell.borrow().type_name().to_string(),
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Component::Script(script) => script
                .get(FIELD_ENABLED)
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            Component::Rigidbody(cell) => cell.borrow().enabled,
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        match self {
            Component::Script(script) => script.set(FIELD_ENABLED, Value::Bool(enabled)),
            Component::Rigidbody(cell) => cell.borrow_mut().enabled = enabled,
        }
    }

    /// Whether a callable of this name is reachable through the chain.
    /// Lifecycle bucket membership is decided with this probe at add time.
    pub fn has_callback(&self, name: &str) -> bool {
        match self {
            Component::Script(script) => {
                matches!(script.get(name), Some(Value::Callable(_)))
            }
            Component::Rigidbody(_) => Rigidbody::has_callback(name),
        }
    }

    pub fn callback(&self, name: &str) -> Option<Callable> {
        match self {
            Component::Script(script) => match script.get(name) {
                Some(Value::Callable(callable)) => Some(callable),
                _ => None,
            },
            Component::Rigidbody(_) => None,
        }
    }

    /// The actor this component is attached to, if still alive.
    pub fn owner(&self) -> Option<ActorRef> {
        match self {
            Component::Script(script) => script.owner.borrow().upgrade(),
            Component::Rigidbody(cell) => cell.borrow().owner(),
        }
    }

    /// Links the component back to its actor so self-reference resolves
    /// from inside callbacks.
    pub fn set_owner(&self, actor: &ActorRef) {
        match self {
            Component::Script(script) => {
                *script.owner.borrow_mut() = Rc::downgrade(actor);
            }
            Component::Rigidbody(cell) => cell.borrow_mut().set_owner(actor),
        }
    }
}
