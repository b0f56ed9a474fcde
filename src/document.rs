//! Discovery document loading and typed views.
//!
//! Only the parts of a discovery document the resolver needs are typed:
//! the schema table and the resource tree. Maps keep declaration order so
//! stubs list properties and methods the way the document does.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::LoadError;
use crate::types::{json_type_name, Direction};

/// Schema table keyed by schema name.
pub type SchemaTable = IndexMap<String, Schema>;

/// A parsed discovery document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryDocument {
    /// API name (e.g. "storage").
    #[serde(default)]
    pub name: Option<String>,

    /// API version (e.g. "v1").
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub schemas: SchemaTable,

    #[serde(default)]
    pub resources: IndexMap<String, Resource>,

    /// Methods declared at the root level (rare).
    #[serde(default)]
    pub methods: IndexMap<String, Method>,
}

impl DiscoveryDocument {
    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }
}

/// A collection of methods and nested resources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub methods: IndexMap<String, Method>,

    #[serde(default)]
    pub resources: IndexMap<String, Resource>,
}

/// Schema definition, inline or named.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default)]
    pub schema_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Name of another schema in the table.
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub properties: Option<IndexMap<String, Schema>>,

    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(default)]
    pub additional_properties: Option<Box<Schema>>,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,

    #[serde(default)]
    pub enum_descriptions: Vec<String>,
}

/// The shape a schema resolves as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    /// `$ref` to a named schema.
    Reference(&'a str),
    Enum,
    /// Array with its item schema, if declared.
    Array(Option<&'a Schema>),
    /// Object with declared properties; `None` when it declares none.
    Object(Option<&'a IndexMap<String, Schema>>),
    /// Object keyed by arbitrary strings (`additionalProperties`).
    Map(&'a Schema),
    /// Leaf type name, `unknown` when untyped.
    Primitive(&'a str),
}

impl Schema {
    /// Classify this schema. A `$ref` wins over everything else, then
    /// `enum`, then the declared type.
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(name) = self.reference.as_deref() {
            return SchemaKind::Reference(name);
        }
        if !self.enum_values.is_empty() {
            return SchemaKind::Enum;
        }

        match (self.schema_type.as_deref(), &self.properties) {
            (Some("array"), _) => SchemaKind::Array(self.items.as_deref()),
            (Some("object") | None, Some(properties)) => SchemaKind::Object(Some(properties)),
            (Some("object") | None, None) => match self.additional_properties.as_deref() {
                Some(values) => SchemaKind::Map(values),
                None if self.schema_type.is_some() => SchemaKind::Object(None),
                None => SchemaKind::Primitive("unknown"),
            },
            (Some(other), _) => SchemaKind::Primitive(other),
        }
    }

    /// Trimmed description, `None` when absent or blank.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Trimmed description for the enum value at `index`, if non-blank.
    pub fn enum_description(&self, index: usize) -> Option<&str> {
        self.enum_descriptions
            .get(index)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
    }
}

/// A method definition.
///
/// The typed fields drive resolution; `raw` keeps the original JSON object
/// untouched for `method.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Method {
    pub id: Option<String>,
    pub path: Option<String>,
    pub http_method: Option<String>,
    /// Request schema name.
    pub request: Option<String>,
    /// Response schema name.
    pub response: Option<String>,
    pub raw: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MethodFields {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    http_method: Option<String>,
    #[serde(default)]
    request: Option<SchemaRef>,
    #[serde(default)]
    response: Option<SchemaRef>,
}

#[derive(Deserialize)]
struct SchemaRef {
    #[serde(rename = "$ref", default)]
    reference: Option<String>,
}

impl TryFrom<Value> for Method {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let fields = MethodFields::deserialize(&raw)?;
        Ok(Method {
            id: fields.id,
            path: fields.path,
            http_method: fields.http_method,
            request: fields.request.and_then(|r| r.reference),
            response: fields.response.and_then(|r| r.reference),
            raw,
        })
    }
}

impl Method {
    /// Schema name referenced for the given direction.
    pub fn schema_ref(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Request => self.request.as_deref(),
            Direction::Response => self.response.as_deref(),
        }
    }

    /// Upper-cased HTTP verb, `UNKNOWN` when the method has none.
    pub fn verb(&self) -> String {
        self.http_method
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "UNKNOWN".to_string())
    }

    /// Output directory relative to the stub root: the method path without
    /// its leading slash, followed by the verb. `None` for path-less methods.
    pub fn relative_dir(&self) -> Option<String> {
        let path = self.path.as_deref()?.trim_start_matches('/');
        if path.is_empty() {
            Some(self.verb())
        } else {
            Some(format!("{}/{}", path.trim_end_matches('/'), self.verb()))
        }
    }
}

/// Load a discovery document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or a parse
/// error if the file isn't a discovery document.
pub fn load_document(path: &Path) -> Result<DiscoveryDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content)
}

/// Load a discovery document from a JSON string.
pub fn load_document_str(content: &str) -> Result<DiscoveryDocument, LoadError> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;
    document_from_value(value)
}

/// Build a discovery document from an already parsed JSON value.
///
/// The value must be an object carrying `resources` or `methods`.
pub fn document_from_value(value: Value) -> Result<DiscoveryDocument, LoadError> {
    let Some(map) = value.as_object() else {
        return Err(LoadError::NotAnObject {
            actual: json_type_name(&value).to_string(),
        });
    };
    if !map.contains_key("resources") && !map.contains_key("methods") {
        return Err(LoadError::MissingResources);
    }

    serde_json::from_value(value).map_err(|source| LoadError::InvalidDocument { source })
}
