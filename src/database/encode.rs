//! CSV row encoding for `COPY ... WITH (FORMAT csv)`
//!
//! A field is quoted, with embedded quotes doubled, when it contains a
//! comma, a quote, or a line break. A null field is written empty.

use serde_json::Value;

/// One tabular row; `None` is SQL NULL
pub type Row = Vec<Option<String>>;

/// Encode a row as one CSV record terminated by `\n`
pub fn encode_row(row: &[Option<String>]) -> String {
    let mut out = String::new();
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if let Some(field) = field {
            encode_field(&mut out, field);
        }
    }
    out.push('\n');
    out
}

fn encode_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Text form of a JSON value in a CSV field.
///
/// Strings are written as-is, numbers and booleans in their JSON spelling,
/// objects and arrays as compact JSON.
pub fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
