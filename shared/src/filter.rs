//! Highlight predicates in MapLibre expression syntax.

use serde_json::{Value, json};

/// Compared against when nothing is selected. No boundary dataset carries it.
pub const UNMATCHED_SENTINEL: &str = "N/A";

/// Build `["==", <property>, <name>]` for a highlight layer.
///
/// With several keys the property is read as `["coalesce", ["get", k1], ...]`
/// so datasets that spell the name property differently still match.
/// A missing or empty `selected` name compares against [`UNMATCHED_SENTINEL`],
/// keeping the expression well-formed while matching nothing.
pub fn build_filter(selected: Option<&str>, keys: &[&str]) -> Value {
    let value = selected
        .filter(|name| !name.is_empty())
        .unwrap_or(UNMATCHED_SENTINEL);
    json!(["==", property_expr(keys), value])
}

fn property_expr(keys: &[&str]) -> Value {
    match keys {
        [key] => json!(["get", key]),
        _ => {
            let mut expr = vec![json!("coalesce")];
            expr.extend(keys.iter().map(|key| json!(["get", key])));
            Value::Array(expr)
        }
    }
}
