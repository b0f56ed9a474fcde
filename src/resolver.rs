//! Schema resolution - expands discovery schemas into placeholder stubs.
//!
//! Every descent into an object property, map value or array item costs one
//! level of depth. Objects collapse to a placeholder once `max_depth` is
//! reached; arrays and maps still resolve their item at the limit and only
//! fall back to their bare type (`<array>`, `<object>`) past it. That alone
//! bounds self-referential schemas; no visited set is kept. Following a `$ref`
//! does not cost depth.

use indexmap::IndexMap;

use crate::document::{Schema, SchemaKind, SchemaTable};
use crate::error::ResolveError;
use crate::types::{ResolveOptions, ValueTree, BLACKLISTED, DOCS_KEY};

/// Resolve a named schema from the table, starting at depth 0.
///
/// # Errors
///
/// Returns `ResolveError::DanglingRef` if `name`, or any schema reachable from
/// it within the depth limit, is not in the table.
pub fn resolve_ref(
    schemas: &SchemaTable,
    name: &str,
    options: &ResolveOptions,
) -> Result<ValueTree, ResolveError> {
    resolve_named(schemas, name, None, 0, options)
}

/// Resolve an inline schema at the given depth.
///
/// # Errors
///
/// Returns `ResolveError` if a reference cannot be followed.
pub fn resolve_schema(
    schemas: &SchemaTable,
    schema: &Schema,
    depth: usize,
    options: &ResolveOptions,
) -> Result<ValueTree, ResolveError> {
    resolve_node(schemas, schema, schema.description(), depth, options)
}

// --- Internal implementation ---

/// Resolve `schema` as its own kind. `description` is the effective
/// description: the reference site's when it has one, else the schema's.
fn resolve_node(
    schemas: &SchemaTable,
    schema: &Schema,
    description: Option<&str>,
    depth: usize,
    options: &ResolveOptions,
) -> Result<ValueTree, ResolveError> {
    match schema.kind() {
        SchemaKind::Reference(name) => resolve_named(schemas, name, description, depth, options),
        SchemaKind::Enum => Ok(enum_placeholder(schema, description, options)),
        SchemaKind::Array(items) => resolve_array(schemas, items, description, depth, options),
        SchemaKind::Object(properties) => {
            resolve_object(schemas, properties, description, depth, options)
        }
        SchemaKind::Map(values) => resolve_map(schemas, values, description, depth, options),
        SchemaKind::Primitive(type_name) => {
            Ok(primitive_placeholder(type_name, description, options))
        }
    }
}

/// Follow a reference chain to a concrete schema.
///
/// A table entry may itself be a bare `$ref`; such hops cost no depth, so a
/// chain longer than the table must loop back on itself.
fn resolve_named(
    schemas: &SchemaTable,
    name: &str,
    site_description: Option<&str>,
    depth: usize,
    options: &ResolveOptions,
) -> Result<ValueTree, ResolveError> {
    let mut name = name;
    let mut description = site_description;

    for _ in 0..=schemas.len() {
        let target = schemas.get(name);

        if options.is_blacklisted(name) {
            let description = description.or_else(|| target.and_then(Schema::description));
            return Ok(blacklisted_placeholder(description, options));
        }

        let target = target.ok_or_else(|| ResolveError::DanglingRef {
            name: name.to_string(),
        })?;
        description = description.or_else(|| target.description());

        match target.kind() {
            SchemaKind::Reference(next) => name = next,
            _ => return resolve_node(schemas, target, description, depth, options),
        }
    }

    Err(ResolveError::ReferenceCycle {
        name: name.to_string(),
    })
}

fn resolve_object(
    schemas: &SchemaTable,
    properties: Option<&IndexMap<String, Schema>>,
    description: Option<&str>,
    depth: usize,
    options: &ResolveOptions,
) -> Result<ValueTree, ResolveError> {
    let limits = &options.limits;
    let count = properties.map_or(0, IndexMap::len);

    if count > 0 {
        if depth >= limits.max_depth {
            return Ok(ValueTree::Leaf(format!(
                "({count} properties hidden: max recursion exceeded)"
            )));
        }
        if depth >= limits.start_depth && count > limits.max_branches {
            return Ok(ValueTree::Leaf(format!(
                "({count} properties hidden: max branches exceeded)"
            )));
        }
    }

    let mut entries = Vec::with_capacity(count + 1);
    push_docs_entry(&mut entries, description, options);

    for (key, property) in properties.into_iter().flatten() {
        let resolved = resolve_schema(schemas, property, depth + 1, options)?;
        entries.push((key.clone(), resolved));
    }

    Ok(ValueTree::Object(entries))
}

fn resolve_map(
    schemas: &SchemaTable,
    values: &Schema,
    description: Option<&str>,
    depth: usize,
    options: &ResolveOptions,
) -> Result<ValueTree, ResolveError> {
    if depth > options.limits.max_depth {
        return Ok(primitive_placeholder("object", description, options));
    }

    let mut entries = Vec::with_capacity(2);
    push_docs_entry(&mut entries, description, options);
    let resolved = resolve_schema(schemas, values, depth + 1, options)?;
    entries.push(("<string>".to_string(), resolved));

    Ok(ValueTree::Object(entries))
}

fn resolve_array(
    schemas: &SchemaTable,
    items: Option<&Schema>,
    description: Option<&str>,
    depth: usize,
    options: &ResolveOptions,
) -> Result<ValueTree, ResolveError> {
    if depth > options.limits.max_depth {
        return Ok(primitive_placeholder("array", description, options));
    }

    let item = match items {
        Some(item) => resolve_schema(schemas, item, depth + 1, options)?,
        None => ValueTree::leaf("<unknown>"),
    };

    let mut sequence = Vec::with_capacity(2);
    if options.include_docs {
        if let Some(description) = description {
            let item_description = items.and_then(|item| effective_description(schemas, item));
            if item_description != Some(description) {
                sequence.push(ValueTree::Leaf(format!("(DOCS: {description})")));
            }
        }
    }
    sequence.push(item);

    Ok(ValueTree::Array(sequence))
}

/// Description a schema would resolve with: its own, else its reference
/// target's.
fn effective_description<'a>(schemas: &'a SchemaTable, schema: &'a Schema) -> Option<&'a str> {
    schema.description().or_else(|| match schema.kind() {
        SchemaKind::Reference(name) => schemas.get(name).and_then(Schema::description),
        _ => None,
    })
}

fn push_docs_entry(
    entries: &mut Vec<(String, ValueTree)>,
    description: Option<&str>,
    options: &ResolveOptions,
) {
    if let (true, Some(description)) = (options.include_docs, description) {
        entries.push((DOCS_KEY.to_string(), ValueTree::leaf(description)));
    }
}

fn primitive_placeholder(
    type_name: &str,
    description: Option<&str>,
    options: &ResolveOptions,
) -> ValueTree {
    match description.filter(|_| options.include_docs) {
        Some(description) => ValueTree::Leaf(format!("<{type_name}: {description}>")),
        None => ValueTree::Leaf(format!("<{type_name}>")),
    }
}

fn enum_placeholder(schema: &Schema, description: Option<&str>, options: &ResolveOptions) -> ValueTree {
    let values = schema
        .enum_values
        .iter()
        .enumerate()
        .map(|(i, value)| match schema.enum_description(i) {
            Some(desc) if options.include_docs => format!("{value}: {desc}"),
            _ => value.clone(),
        })
        .collect::<Vec<_>>()
        .join("|");

    match description.filter(|_| options.include_docs) {
        Some(description) => ValueTree::Leaf(format!("<{description}: {values}>")),
        None => ValueTree::Leaf(format!("<{values}>")),
    }
}

fn blacklisted_placeholder(description: Option<&str>, options: &ResolveOptions) -> ValueTree {
    match description.filter(|_| options.include_docs) {
        Some(description) => ValueTree::Leaf(format!("(hidden: blacklisted: {description})")),
        None => ValueTree::leaf(BLACKLISTED),
    }
}
