//! Field values and their semantic type tags
//!
//! A `Value` is what flows through a transform function. `Value::Null` stands
//! for an absent source field, which is what skip-on-null semantics key on.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of a property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    String,
    List(Box<ValueType>),
    /// A nested object, tagged with its type name
    Object(String),
}

impl ValueType {
    /// Representative non-null value used when probing transforms
    pub fn sample(&self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(true),
            ValueType::Int => Value::Int(1),
            ValueType::Float => Value::Float(1.5),
            ValueType::String => Value::String("sample".into()),
            ValueType::List(inner) => Value::List(vec![inner.sample()]),
            ValueType::Object(_) => Value::Map(BTreeMap::new()),
        }
    }

    /// Shorthand for `ValueType::List(Box::new(inner))`
    pub fn list_of(inner: ValueType) -> Self {
        ValueType::List(Box::new(inner))
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::String => write!(f, "string"),
            ValueType::List(inner) => write!(f, "list<{}>", inner),
            ValueType::Object(name) => write!(f, "{}", name),
        }
    }
}

/// A field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value may be stored in a property of type `typ`.
    /// `Null` conforms to every type.
    pub fn conforms_to(&self, typ: &ValueType) -> bool {
        match (self, typ) {
            (Value::Null, _) => true,
            (Value::Bool(_), ValueType::Bool) => true,
            (Value::Int(_), ValueType::Int) => true,
            (Value::Float(_), ValueType::Float) => true,
            (Value::String(_), ValueType::String) => true,
            (Value::List(items), ValueType::List(inner)) => {
                items.iter().all(|i| i.conforms_to(inner))
            }
            (Value::Map(_), ValueType::Object(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                let strs: Vec<_> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", strs.join(", "))
            }
            Value::Map(m) => {
                let pairs: Vec<_> = m.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{ {} }}", pairs.join(", "))
            }
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
