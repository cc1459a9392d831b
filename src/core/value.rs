//! Declared build-description values.
//!
//! The declarative-language parser (an external collaborator) produces one
//! [`DeclaredValues`] store per target declaration. The generator looks
//! values up by symbolic name with a consume flag; consumed names are
//! tracked so the enclosing framework can report unused assignments.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A typed value from the build description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Human-readable name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convenience constructor for a list of strings.
    pub fn string_list<I, S>(items: I) -> Value
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }
}

/// Declaration site of a value: the build file and line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub file: PathBuf,
    pub line: u32,
}

impl Origin {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Origin {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// A value together with its declaration site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredValue {
    pub value: Value,
    pub origin: Origin,
}

/// Per-declaration store of named values with consume tracking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclaredValues {
    values: BTreeMap<String, DeclaredValue>,
    consumed: BTreeSet<String>,
}

impl DeclaredValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value, origin: Origin) {
        self.values
            .insert(name.into(), DeclaredValue { value, origin });
    }

    /// Look up a value by name. With `consume` set, the name is marked as
    /// used for later unused-assignment reporting; presence checks that
    /// should not count as a use pass `false`.
    pub fn get(&mut self, name: &str, consume: bool) -> Option<&DeclaredValue> {
        if consume && self.values.contains_key(name) {
            self.consumed.insert(name.to_string());
        }
        self.values.get(name)
    }

    /// Names that were declared but never consumed.
    pub fn unconsumed(&self) -> Vec<&str> {
        self.values
            .keys()
            .filter(|name| !self.consumed.contains(*name))
            .map(String::as_str)
            .collect()
    }
}
