//! Runtime values produced by expressions.
//!
//! A handful of classes (number, text, boolean) are built in because the
//! matcher itself needs to recognize their literal forms (§4.4 step 2,
//! §4.5 list-literal coercion, §4.4 boolean handling of `true`/`false`).
//! Everything else is an opaque `Object` tagged with its registered class,
//! since concrete element types (players, items, ...) are external
//! collaborators per spec.md's scope.

use crate::class::ClassId;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    List(Vec<Value>),
    Object(ClassId, Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn object<T: Any + Send + Sync>(class: ClassId, value: T) -> Self {
        Value::Object(class, Arc::new(value))
    }

    pub fn downcast_object<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            Value::Object(_, obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Text(t) => write!(f, "Text({t:?})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Object(class, _) => write!(f, "Object({class:?})"),
        }
    }
}
