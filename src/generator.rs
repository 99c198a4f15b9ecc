//! Recursive schema → `CREATE TABLE` lowering.
//!
//! Every object or array-of-object field opens a STRUCT and moves one level
//! deeper. `max_depth` is the only thing that stops a schema which refers back
//! to itself, so every recursive path below checks it.
use serde_json::Value;
use tracing::warn;

use crate::config::GenerationConfig;
use crate::hql;
use crate::schema::{classify, kind, Field, FieldKind, PropertySet, SchemaDocument, SchemaStore};

/// Where the fields being rendered sit.
#[derive(Debug, Clone, Copy)]
struct Scope {
    depth: usize,
    /// between a column name and its type; struct members use `:`
    separator: char,
}

impl Scope {
    const ROOT: Scope = Scope { depth: 0, separator: ' ' };

    fn nested(self) -> Self {
        Scope { depth: self.depth + 1, separator: ':' }
    }
}

pub struct Generator<'s> {
    store: &'s SchemaStore,
    config: &'s GenerationConfig,
}

impl<'s> Generator<'s> {
    pub fn new(store: &'s SchemaStore, config: &'s GenerationConfig) -> Self {
        Self { store, config }
    }

    pub fn generate_table(&self, schema: &'s SchemaDocument, table_id: &str) -> String {
        let properties = self.store.resolve_properties(schema, None, table_id);
        let body = self.render_properties(&properties, Scope::ROOT);
        hql::create_table(table_id, &body)
    }

    fn render_properties(&self, properties: &PropertySet<'s>, scope: Scope) -> String {
        properties
            .iter()
            .filter(|(name, _)| !self.config.is_excluded(name))
            .filter_map(|(name, field)| self.render_field(name, field, scope))
            .filter(|fragment| !fragment.trim().is_empty())
            .collect::<Vec<_>>()
            .join(",\n")
    }

    fn render_field(&self, name: &str, field: &Field<'s>, scope: Scope) -> Option<String> {
        let kind = classify(field.node);
        let ty = match kind {
            FieldKind::String | FieldKind::Integer | FieldKind::Number | FieldKind::Boolean => {
                hql::render_primitive(kind)?.to_string()
            }
            FieldKind::Object => {
                // objects: strict bound
                if scope.depth >= self.config.max_depth {
                    return None;
                }
                let nested = self.store.resolve_properties(field.document, Some(field.node), name);
                self.render_struct(&nested, scope)?
            }
            FieldKind::Array => {
                // arrays: inclusive bound
                if scope.depth > self.config.max_depth {
                    return None;
                }
                self.render_array(name, field.document, field.node, scope)?
            }
            FieldKind::Unknown => {
                warn!(field = name, location = %field.document.location(), "no type resolvable, skipping");
                return None;
            }
        };
        Some(hql::column(name, scope.separator, &ty))
    }

    /// `None` when nothing survives inside the struct.
    fn render_struct(&self, properties: &PropertySet<'s>, scope: Scope) -> Option<String> {
        if properties.is_empty() {
            return None;
        }
        let body = self.render_properties(properties, scope.nested());
        if body.trim().is_empty() {
            return None;
        }
        Some(hql::struct_type(&body))
    }

    fn render_array(
        &self,
        name: &str,
        document: &'s SchemaDocument,
        node: &'s Value,
        scope: Scope,
    ) -> Option<String> {
        let Some(items) = kind::items(node) else {
            warn!(field = name, location = %document.location(), "array without an items schema, skipping");
            return None;
        };
        let item_kind = classify(items);
        let inner = match item_kind {
            FieldKind::String | FieldKind::Integer | FieldKind::Number | FieldKind::Boolean => {
                hql::render_primitive(item_kind)?.to_string()
            }
            FieldKind::Object => {
                let nested = self.store.resolve_properties(document, Some(items), name);
                self.render_struct(&nested, scope)?
            }
            // nested lists do not open a STRUCT, so they stay at this depth
            FieldKind::Array => self.render_array(name, document, items, scope)?,
            FieldKind::Unknown => {
                warn!(field = name, location = %document.location(), "no item type resolvable, skipping");
                return None;
            }
        };
        Some(hql::array_type(&inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Location;
    use serde_json::json;
    use std::path::PathBuf;

    fn config(max_depth: usize, exclusions: &[&str]) -> GenerationConfig {
        GenerationConfig {
            max_depth,
            exclusions: exclusions.iter().map(|name| name.to_string()).collect(),
            ..GenerationConfig::default()
        }
    }

    fn generate(schema: Value, max_depth: usize, exclusions: &[&str]) -> String {
        let location = Location::File(PathBuf::from("/virtual/table.json"));
        let mut store = SchemaStore::new();
        store.insert(location.clone(), schema);
        let config = config(max_depth, exclusions);
        let document = store.get(&location).unwrap();
        Generator::new(&store, &config).generate_table(document, "table")
    }

    /// The text between the table's parentheses.
    fn body(ddl: &str) -> &str {
        let (_, rest) = ddl.split_once("\n(\n").unwrap();
        let (body, _) = rest.split_once(")\nROW FORMAT").unwrap();
        body.trim_end_matches('\n')
    }

    fn activity() -> Value {
        json!({ "properties": {
            "id": { "type": "integer" },
            "tags": { "type": "array", "items": { "type": "string" } },
            "actor": { "type": "object", "properties": { "id": { "type": "string" } } }
        } })
    }

    #[test]
    fn renders_scalars_arrays_and_structs_in_order() {
        let ddl = generate(activity(), 2, &[]);
        assert_eq!(
            body(&ddl),
            "`id` INT,\n`tags` ARRAY<STRING>,\n`actor` STRUCT< `id`:STRING >",
        );
        assert!(ddl.starts_with("CREATE TABLE `table`\n(\n"));
    }

    #[test]
    fn zero_depth_drops_objects_but_keeps_arrays() {
        let ddl = generate(activity(), 0, &[]);
        assert_eq!(body(&ddl), "`id` INT,\n`tags` ARRAY<STRING>");
    }

    #[test]
    fn empty_schema_gives_an_empty_body() {
        let ddl = generate(json!({ "type": "object" }), 1, &[]);
        assert_eq!(body(&ddl), "");
        assert!(ddl.contains("`table`\n(\n)\n"));
        assert!(!ddl.contains(','));
    }

    #[test]
    fn object_at_max_depth_is_omitted() {
        let schema = json!({ "properties": { "outer": { "type": "object", "properties": {
            "inner": { "type": "object", "properties": { "x": { "type": "string" } } },
            "y": { "type": "string" }
        } } } });
        assert_eq!(body(&generate(schema, 1, &[])), "`outer` STRUCT< `y`:STRING >");
    }

    #[test]
    fn arrays_at_max_depth_are_kept() {
        let schema = json!({ "properties": { "outer": { "type": "object", "properties": {
            "tags": { "type": "array", "items": { "type": "string" } },
            "entries": { "type": "array", "items": { "type": "object", "properties": { "z": { "type": "integer" } } } }
        } } } });
        assert_eq!(
            body(&generate(schema, 1, &[])),
            "`outer` STRUCT< `tags`:ARRAY<STRING>,\n`entries`:ARRAY< STRUCT< `z`:INT > > >",
        );
    }

    #[test]
    fn arrays_past_max_depth_are_dropped() {
        let schema = json!({ "properties": { "outer": { "type": "object", "properties": {
            "tags": { "type": "array", "items": { "type": "string" } },
            "y": { "type": "boolean" }
        } } } });
        // depth 1 > max_depth 0, and the object itself is not opened at all
        assert_eq!(body(&generate(schema.clone(), 0, &[])), "");
        let schema = json!({ "properties": { "list": { "type": "array", "items": { "type": "object", "properties": {
            "tags": { "type": "array", "items": { "type": "string" } },
            "y": { "type": "boolean" }
        } } } } });
        assert_eq!(body(&generate(schema, 0, &[])), "`list` ARRAY< STRUCT< `y`:BOOLEAN > >");
    }

    #[test]
    fn exclusions_apply_at_every_depth() {
        let schema = json!({ "properties": {
            "secret": { "type": "string" },
            "actor": { "type": "object", "properties": {
                "secret": { "type": "object", "properties": { "a": { "type": "string" } } },
                "id": { "type": "string" }
            } },
            "list": { "type": "array", "items": { "type": "object", "properties": {
                "secret": { "type": "array", "items": { "type": "integer" } },
                "ok": { "type": "boolean" }
            } } }
        } });
        let ddl = generate(schema, 3, &["secret"]);
        assert!(!ddl.contains("`secret`"), "{ddl}");
        assert_eq!(
            body(&ddl),
            "`actor` STRUCT< `id`:STRING >,\n`list` ARRAY< STRUCT< `ok`:BOOLEAN > >",
        );
    }

    #[test]
    fn self_reference_stops_at_max_depth() {
        let schema = json!({ "properties": {
            "name": { "type": "string" },
            "parent": { "type": "object", "$ref": "#" }
        } });
        let ddl = generate(schema, 3, &[]);
        assert_eq!(ddl.matches("`parent`").count(), 3);
        assert_eq!(
            body(&ddl),
            "`name` STRING,\n`parent` STRUCT< `name`:STRING,\n`parent`:STRUCT< `name`:STRING,\n`parent`:STRUCT< `name`:STRING > > >",
        );
    }

    #[test]
    fn self_reference_through_arrays_terminates() {
        let schema = json!({ "properties": {
            "name": { "type": "string" },
            "children": { "type": "array", "items": { "type": "object", "$ref": "#" } }
        } });
        let ddl = generate(schema, 1, &[]);
        assert_eq!(ddl.matches("`children`").count(), 2);
        assert_eq!(
            body(&ddl),
            "`name` STRING,\n`children` ARRAY< STRUCT< `name`:STRING,\n`children`:ARRAY< STRUCT< `name`:STRING > > > >",
        );
    }

    #[test]
    fn generation_is_idempotent() {
        let schema = json!({ "properties": {
            "name": { "type": "string" },
            "parent": { "type": "object", "$ref": "#" },
            "tags": { "type": "array", "items": { "type": "string" } }
        } });
        let location = Location::File(PathBuf::from("/virtual/table.json"));
        let mut store = SchemaStore::new();
        store.insert(location.clone(), schema);
        let config = config(2, &[]);
        let generator = Generator::new(&store, &config);
        let document = store.get(&location).unwrap();
        assert_eq!(
            generator.generate_table(document, "t"),
            generator.generate_table(document, "t"),
        );
    }

    #[test]
    fn odd_field_names_are_escaped() {
        let schema = json!({ "properties": {
            "select": { "type": "string" },
            "we`ird": { "type": "integer" }
        } });
        let ddl = generate(schema, 1, &[]);
        assert_eq!(body(&ddl), "`select` STRING,\n`we``ird` INT");
    }

    #[test]
    fn untyped_fields_and_items_are_skipped() {
        let schema = json!({ "properties": {
            "a": {},
            "b": { "type": "date" },
            "c": { "type": "array" },
            "d": { "type": "array", "items": { "type": "whatever" } },
            "e": { "type": "string" },
            "f": "not a schema"
        } });
        assert_eq!(body(&generate(schema, 1, &[])), "`e` STRING");
    }

    #[test]
    fn nested_arrays_do_not_consume_depth() {
        let schema = json!({ "properties": {
            "matrix": { "type": "array", "items": { "type": "array", "items": { "type": "number" } } },
            "groups": { "type": "array", "items": { "type": "array", "items": {
                "type": "object", "properties": { "k": { "type": "string" } }
            } } }
        } });
        assert_eq!(
            body(&generate(schema, 0, &[])),
            "`matrix` ARRAY<ARRAY<FLOAT>>,\n`groups` ARRAY<ARRAY< STRUCT< `k`:STRING > >>",
        );
    }

    #[test]
    fn empty_structs_are_never_emitted() {
        let schema = json!({ "properties": {
            "bare": { "type": "object" },
            "list": { "type": "array", "items": { "type": "object" } },
            "hidden": { "type": "object", "properties": { "secret": { "type": "string" } } },
            "dangling": { "type": "object", "$ref": "missing.json" }
        } });
        let ddl = generate(schema, 2, &["secret"]);
        assert_eq!(body(&ddl), "");
        assert!(!ddl.contains("STRUCT"));
    }

    #[test]
    fn nested_refs_resolve_against_their_own_document() {
        let mut store = SchemaStore::new();
        let activity = Location::File(PathBuf::from("/virtual/activity.json"));
        store.insert(
            activity.clone(),
            json!({ "properties": {
                "verb": { "type": "string" },
                "actor": { "type": "object", "$ref": "objects/person.json" }
            } }),
        );
        store.insert(
            Location::File(PathBuf::from("/virtual/objects/person.json")),
            json!({ "properties": {
                "displayName": { "type": "string" },
                "image": { "type": "object", "$ref": "media.json" }
            } }),
        );
        store.insert(
            Location::File(PathBuf::from("/virtual/objects/media.json")),
            json!({ "properties": { "url": { "type": "string" }, "width": { "type": "integer" } } }),
        );
        let config = config(2, &[]);
        let document = store.get(&activity).unwrap();
        let ddl = Generator::new(&store, &config).generate_table(document, "activity");
        assert_eq!(
            body(&ddl),
            "`verb` STRING,\n`actor` STRUCT< `displayName`:STRING,\n`image`:STRUCT< `url`:STRING,\n`width`:INT > >",
        );
    }

    #[test]
    fn generator_can_be_shared_across_threads() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Generator<'static>>();
    }
}
