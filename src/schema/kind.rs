use serde_json::Value;

/// Semantic kind of a field's schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    /// missing or unrecognized `"type"`; callers skip the field
    Unknown,
}

impl FieldKind {
    fn from_name(name: &str) -> Self {
        match name {
            "string" => FieldKind::String,
            "integer" => FieldKind::Integer,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "object" => FieldKind::Object,
            "array" => FieldKind::Array,
            _ => FieldKind::Unknown,
        }
    }
}

/// Classify a field node by its declared `"type"`.
///
/// A union such as `["string", "null"]` takes its first recognized non-null member.
pub fn classify(node: &Value) -> FieldKind {
    let Some(ty) = node.as_object().and_then(|o| o.get("type")) else {
        return FieldKind::Unknown;
    };
    match ty {
        Value::String(name) => FieldKind::from_name(name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .filter(|name| *name != "null")
            .map(FieldKind::from_name)
            .find(|kind| *kind != FieldKind::Unknown)
            .unwrap_or(FieldKind::Unknown),
        _ => FieldKind::Unknown,
    }
}

/// The `"items"` sub-node of an array schema, when it is a single schema.
pub fn items(node: &Value) -> Option<&Value> {
    node.get("items").filter(|items| items.is_object())
}
