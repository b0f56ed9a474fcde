//! Core types for discovery stub resolution.

use std::collections::HashSet;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Reserved object key holding an object-level description.
pub const DOCS_KEY: &str = "__DOCS";

/// Placeholder for references to blacklisted schemas.
pub const BLACKLISTED: &str = "(hidden: blacklisted)";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Which side of a method a schema is resolved for.
///
/// Request and response streams carry independent limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    /// Returns the method key holding the schema reference for this direction.
    pub fn method_key(&self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }

    /// Returns the stub file name written for this direction.
    pub fn file_name(&self) -> &'static str {
        match self {
            Direction::Request => "request.json",
            Direction::Response => "response.json",
        }
    }

    /// Create direction from a request flag (true = Request, false = Response).
    pub fn from_request_flag(is_request: bool) -> Self {
        if is_request {
            Direction::Request
        } else {
            Direction::Response
        }
    }
}

/// Depth and branch limits for one resolution stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Hard recursion ceiling. Objects, maps and arrays at this depth collapse
    /// to a placeholder.
    pub max_depth: usize,
    /// Largest property count an object may have once `start_depth` is reached.
    pub max_branches: usize,
    /// Depth at which `max_branches` starts to apply.
    pub start_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_branches: 10,
            start_depth: 1,
        }
    }
}

/// Options for schema resolution.
///
/// Built once per stream (request, response) and shared by every method.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Whether resolving for request or response.
    pub direction: Direction,
    pub limits: Limits,
    /// Schema names that always collapse to [`BLACKLISTED`].
    pub blacklist: HashSet<String>,
    /// Embed description text in the output.
    pub include_docs: bool,
}

impl ResolveOptions {
    /// Create options with default limits, an empty blacklist and docs off.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            limits: Limits::default(),
            blacklist: HashSet::new(),
            include_docs: false,
        }
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the blacklisted schema names. Blank names are ignored.
    pub fn blacklist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = names
            .into_iter()
            .map(Into::into)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        self
    }

    pub fn include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = include_docs;
        self
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(name)
    }
}

/// A resolved stub: nested objects and arrays with placeholder string leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTree {
    /// Ordered mapping; entries keep schema declaration order.
    Object(Vec<(String, ValueTree)>),
    Array(Vec<ValueTree>),
    Leaf(String),
}

impl ValueTree {
    pub fn leaf(text: impl Into<String>) -> Self {
        ValueTree::Leaf(text.into())
    }

    /// Returns the leaf text, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            ValueTree::Leaf(text) => Some(text),
            _ => None,
        }
    }

    /// Look up an object entry by key.
    pub fn get(&self, key: &str) -> Option<&ValueTree> {
        match self {
            ValueTree::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Convert into a JSON value, preserving entry order.
    pub fn to_json(&self) -> Value {
        match self {
            ValueTree::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
            ValueTree::Array(items) => Value::Array(items.iter().map(ValueTree::to_json).collect()),
            ValueTree::Leaf(text) => Value::String(text.clone()),
        }
    }
}

impl Serialize for ValueTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ValueTree::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ValueTree::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ValueTree::Leaf(text) => serializer.serialize_str(text),
        }
    }
}
