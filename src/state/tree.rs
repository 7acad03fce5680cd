//! JSON state tree made of named top-level slices.

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the connectivity flag every merged tree carries.
pub const ONLINE_KEY: &str = "online";

/// A JSON object whose top-level keys are state slices.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateTree(Map<String, Value>);

impl StateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Parse serialized page state. Anything but a JSON object is `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                log::warn!("discarding unparseable state: {e}");
                None
            }
        }
    }

    pub fn slice(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set_slice(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn remove_slice(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn slice_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copy every slice of `other` over this tree; `other` wins on conflicts.
    pub fn overlay(&mut self, other: &StateTree) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// The connectivity flag, if present and boolean.
    pub fn online(&self) -> Option<bool> {
        self.0.get(ONLINE_KEY).and_then(Value::as_bool)
    }

    /// `auth.user`, when a non-null user is present.
    pub fn auth_user(&self) -> Option<&Value> {
        self.slice("auth")
            .and_then(|auth| auth.get("user"))
            .filter(|user| !user.is_null())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for StateTree {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
