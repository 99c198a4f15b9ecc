//! Hive QL lexical forms: quoted identifiers, column types and the table wrapper.
use crate::schema::FieldKind;

/// Storage clause appended to every table; reads newline-delimited JSON.
pub const STORAGE_TEMPLATE: &str = concat!(
    "ROW FORMAT SERDE 'org.openx.data.jsonserde.JsonSerDe'\n",
    "WITH SERDEPROPERTIES (\"ignore.malformed.json\" = \"true\")\n",
    "STORED AS TEXTFILE\n",
    "LOCATION '${hiveconf:path}';\n",
);

pub fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Hive type of a scalar kind. Composite and unknown kinds have none.
pub fn render_primitive(kind: FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Integer => Some("INT"),
        FieldKind::Number => Some("FLOAT"),
        FieldKind::String => Some("STRING"),
        FieldKind::Boolean => Some("BOOLEAN"),
        FieldKind::Object | FieldKind::Array | FieldKind::Unknown => None,
    }
}

pub fn column(name: &str, separator: char, ty: &str) -> String {
    format!("{}{separator}{ty}", escape_identifier(name))
}

pub fn struct_type(body: &str) -> String {
    format!("STRUCT< {body} >")
}

pub fn array_type(inner: &str) -> String {
    if inner.starts_with("STRUCT") {
        format!("ARRAY< {inner} >")
    } else {
        format!("ARRAY<{inner}>")
    }
}

pub fn create_table(table_id: &str, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + STORAGE_TEMPLATE.len() + 64);
    out.push_str("CREATE TABLE ");
    out.push_str(&escape_identifier(table_id));
    out.push_str("\n(\n");
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push_str(")\n");
    out.push_str(STORAGE_TEMPLATE);
    out
}
