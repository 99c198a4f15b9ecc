//! Loaded schema documents indexed by canonical location.
//!
//! The store is filled once and then only read, so generation can borrow
//! nodes straight out of it (and share it across threads).
use std::collections::{HashSet, VecDeque};
use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::location::Location;

/// Longest `$ref` / `extends` chain followed while resolving one property set.
pub const MAX_REFERENCE_HOPS: usize = 16;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub struct SchemaDocument {
    location: Location,
    root: Value,
}

/// One resolved property together with the document that declared it.
#[derive(Debug, Clone, Copy)]
pub struct Field<'s> {
    pub document: &'s SchemaDocument,
    pub node: &'s Value,
}

/// Ordered `name → field` view of an object schema's properties.
#[derive(Debug, Default)]
pub struct PropertySet<'s> {
    fields: IndexMap<&'s str, Field<'s>>,
}

#[derive(Debug, Default)]
pub struct SchemaStore {
    documents: IndexMap<Location, SchemaDocument>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaDocument {
    pub fn location(&self) -> &Location {
        &self.location
    }
    pub fn root(&self) -> &Value {
        &self.root
    }
    pub fn title(&self) -> Option<&str> {
        self.root.get("title").and_then(Value::as_str)
    }
}

impl<'s> PropertySet<'s> {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
    #[cfg(test)]
    fn len(&self) -> usize {
        self.fields.len()
    }
    #[cfg(test)]
    fn get(&self, name: &str) -> Option<&Field<'s>> {
        self.fields.get(name)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&'s str, &Field<'s>)> + '_ {
        self.fields.iter().map(|(name, field)| (*name, field))
    }
    pub fn names(&self) -> impl Iterator<Item = &'s str> + '_ {
        self.fields.keys().copied()
    }
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every path, then every file its `$ref`s point at.
    ///
    /// Documents that fail to read or parse are logged and left out.
    pub fn load<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut store = Self::new();
        let mut failed = HashSet::<Location>::new();
        let mut queue = paths
            .into_iter()
            .map(Location::from_path)
            .collect::<VecDeque<_>>();

        while let Some(location) = queue.pop_front() {
            if store.documents.contains_key(&location) || failed.contains(&location) {
                continue;
            }
            let Some(path) = location.as_file() else {
                debug!(%location, "remote schema not fetched");
                failed.insert(location);
                continue;
            };
            let root = match read_document(path) {
                Ok(root) => root,
                Err(message) => {
                    warn!(%location, "skipping schema: {message}");
                    failed.insert(location);
                    continue;
                }
            };
            let mut references = Vec::new();
            collect_references(&root, &mut references);
            for reference in references {
                let (base, _) = split_reference(reference);
                if base.is_empty() {
                    continue;
                }
                let target = location.join(base);
                if !store.documents.contains_key(&target) {
                    queue.push_back(target);
                }
            }
            store.insert(location, root);
        }
        store
    }

    /// Add a parsed document; an already-present location keeps its first document.
    pub fn insert(&mut self, location: Location, root: Value) -> &SchemaDocument {
        self.documents
            .entry(location.clone())
            .or_insert_with(|| SchemaDocument { location, root })
    }

    pub fn get(&self, location: &Location) -> Option<&SchemaDocument> {
        self.documents.get(location)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in load order.
    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.documents.values()
    }

    /// Properties of `schema`'s root (`field == None`) or of the sub-schema `field`.
    ///
    /// Follows `extends`/`allOf` parents and `$ref` targets. Anything that cannot
    /// be resolved contributes nothing; the result may be empty.
    pub fn resolve_properties<'s>(
        &'s self,
        schema: &'s SchemaDocument,
        field: Option<&'s Value>,
        field_id: &str,
    ) -> PropertySet<'s> {
        let node = field.unwrap_or(&schema.root);
        let mut properties = PropertySet::default();
        let mut merged = HashSet::new();
        self.merge_layers(schema, node, &mut properties, &mut merged, 0);
        if properties.is_empty() {
            debug!(field = field_id, location = %schema.location, "no properties resolved");
        }
        properties
    }

    /// Parents first, then the `$ref` target, then inline `properties`.
    ///
    /// `merged` holds every node already layered in during this resolution; each
    /// node contributes once, so cycles and fan-out through `allOf` stay linear.
    fn merge_layers<'s>(
        &'s self,
        document: &'s SchemaDocument,
        node: &'s Value,
        properties: &mut PropertySet<'s>,
        merged: &mut HashSet<*const Value>,
        hops: usize,
    ) {
        if hops > MAX_REFERENCE_HOPS {
            warn!(
                location = %document.location,
                "reference chain longer than {MAX_REFERENCE_HOPS} links, ignoring the rest"
            );
            return;
        }
        let Some(object) = node.as_object() else {
            return;
        };
        // nodes are borrowed from the store, so their address identifies them
        if !merged.insert(node as *const Value) {
            return;
        }
        for parent in parents(object) {
            self.merge_layers(document, parent, properties, merged, hops + 1);
        }
        if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
            match self.dereference(document, reference) {
                Some((target_document, target)) => {
                    self.merge_layers(target_document, target, properties, merged, hops + 1);
                }
                None => debug!(reference, location = %document.location, "unresolved reference"),
            }
        }
        if let Some(Value::Object(inline)) = object.get("properties") {
            for (name, node) in inline {
                if node.is_object() {
                    properties.fields.insert(name.as_str(), Field { document, node });
                }
            }
        }
    }

    fn dereference<'s>(
        &'s self,
        document: &'s SchemaDocument,
        reference: &str,
    ) -> Option<(&'s SchemaDocument, &'s Value)> {
        let (base, fragment) = split_reference(reference);
        let target = if base.is_empty() {
            document
        } else {
            self.get(&document.location.join(base))?
        };
        let node = match fragment {
            None | Some("") => &target.root,
            Some(pointer) if pointer.starts_with('/') => target.root.pointer(pointer)?,
            Some(_) => return None,
        };
        Some((target, node))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_document(path: &Path) -> Result<Value, String> {
    let source = std::fs::read_to_string(path).map_err(|error| format!("read failed: {error}"))?;
    serde_json::from_str::<Value>(&source).map_err(|error| format!("invalid JSON: {error}"))
}

fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (reference, None),
    }
}

fn collect_references<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(object) => {
            if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
                out.push(reference);
            }
            for child in object.values() {
                collect_references(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_references(child, out);
            }
        }
        _ => {}
    }
}

fn parents(object: &Map<String, Value>) -> impl Iterator<Item = &Value> {
    let extends = match object.get("extends") {
        Some(Value::Array(schemas)) => schemas.as_slice(),
        Some(schema @ Value::Object(_)) => std::slice::from_ref(schema),
        _ => &[],
    };
    let all_of = object
        .get("allOf")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    extends.iter().chain(all_of)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
