// rook_core/src/scripting/value.rs
use crate::physics::contact_bridge::Collision;
use crate::runtime::runtime::Runtime;
use crate::scripting::component::ComponentRef;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Error raised by a component callback. Caught and logged at the dispatch
/// site; never propagates past the single invocation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ScriptError {
    pub message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message with backslashes normalized for the console.
    pub fn sanitized_message(&self) -> String {
        self.message.replace('\\', "/")
    }
}

impl From<String> for ScriptError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ScriptError {
    fn from(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type CallbackResult = Result<(), ScriptError>;

/// Argument block handed to a callback alongside its own component.
#[derive(Clone)]
pub enum Payload {
    /// Plain lifecycle invocation.
    None,
    /// Collision or trigger contact.
    Collision(Collision),
    /// Event-bus publish payload.
    Event(Value),
}

impl Payload {
    pub fn collision(&self) -> Option<&Collision> {
        match self {
            Payload::Collision(c) => Some(c),
            _ => None,
        }
    }

    pub fn event(&self) -> Option<&Value> {
        match self {
            Payload::Event(v) => Some(v),
            _ => None,
        }
    }
}

type CallbackFn = dyn Fn(&mut Runtime, &ComponentRef, &Payload) -> CallbackResult;

/// A named native function stored as a component field. Identity (not the
/// name) is what subscription matching and removal compare.
#[derive(Clone)]
pub struct Callable {
    name: Rc<str>,
    func: Rc<CallbackFn>,
}

impl Callable {
    pub fn new<F>(name: impl Into<Rc<str>>, func: F) -> Self
    where
        F: Fn(&mut Runtime, &ComponentRef, &Payload) -> CallbackResult + 'static,
    {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(
        &self,
        runtime: &mut Runtime,
        component: &ComponentRef,
        payload: &Payload,
    ) -> CallbackResult {
        (self.func)(runtime, component, payload)
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<callable {}>", self.name)
    }
}

/// A dynamically-typed component field.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Callable(Callable),
}

impl Value {
    /// Typed conversion from a JSON member. Only scalar kinds carry over;
    /// arrays, objects and null have no field representation.
    pub fn from_json(raw: &serde_json::Value) -> Option<Value> {
        if let Some(s) = raw.as_str() {
            return Some(Value::Str(s.to_string()));
        }
        if let Some(i) = raw.as_i64() {
            return Some(Value::Int(i));
        }
        if let Some(f) = raw.as_f64() {
            return Some(Value::Float(f));
        }
        raw.as_bool().map(Value::Bool)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|f| f as f32)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }
}
