//! Discovery Stubs
//!
//! Expands Google API discovery documents into human-readable JSON stubs:
//! one `request.json` and `response.json` per HTTP method, plus the raw
//! method definition.
//!
//! Schema references are followed recursively and leaf types become
//! placeholder strings. Depth limits, branch limits and a schema blacklist keep
//! the output bounded on large or self-referential schemas.
//!
//! # Example
//!
//! ```
//! use discovery_stubs::{load_document_str, resolve_ref, Direction, ResolveOptions};
//! use serde_json::json;
//!
//! let doc = load_document_str(r#"{
//!     "schemas": {
//!         "Status": {
//!             "type": "object",
//!             "properties": {
//!                 "code": { "type": "integer" },
//!                 "status": { "type": "string", "enum": ["OK", "ERROR"] }
//!             }
//!         }
//!     },
//!     "resources": {}
//! }"#).unwrap();
//!
//! let options = ResolveOptions::new(Direction::Response);
//! let stub = resolve_ref(&doc.schemas, "Status", &options).unwrap();
//!
//! assert_eq!(stub.to_json(), json!({"code": "<integer>", "status": "<OK|ERROR>"}));
//! ```
//!
//! # Placeholders
//!
//! - primitive: `"<string>"`, or `"<string: description>"` with docs
//! - enum: `"<A|B>"`, or `"<A: first|B>"` with docs; an enum's own
//!   description leads inside the brackets: `"<State.: A: first|B>"`
//! - object at `max_depth`: `"(N properties hidden: max recursion exceeded)"`
//! - object over `max_branches`: `"(N properties hidden: max branches exceeded)"`
//! - blacklisted `$ref`: `"(hidden: blacklisted)"`
//! - array or map nested past `max_depth`: `"<array>"` / `"<object>"`
//!
//! With docs enabled, object descriptions appear under the `__DOCS` key and
//! array descriptions as a leading `"(DOCS: ...)"` entry.

mod document;
mod error;
mod filter;
mod resolver;
mod types;
mod walker;
mod writer;

pub use document::{
    document_from_value, load_document, load_document_str, DiscoveryDocument, Method, Resource,
    Schema, SchemaKind, SchemaTable,
};
pub use error::{ConfigError, LoadError, ResolveError, WriteError};
pub use filter::{PathFilter, MATCH_ALL};
pub use resolver::{resolve_ref, resolve_schema};
pub use types::{Direction, Limits, ResolveOptions, ValueTree, BLACKLISTED, DOCS_KEY};
pub use walker::{methods, MethodStub, Methods, SelectedMethod, Walker};
pub use writer::{to_pretty_json, StubWriter, WrittenFile, METHOD_FILE};
