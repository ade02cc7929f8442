use serde_json::{Map, Value};

/// Collapse nested objects and arrays into a single-level map whose keys
/// are the `.`-joined paths to each leaf. Array indices become keys.
///
/// `{"a": {"b": 1, "c": [2, 3]}}` becomes `{"a.b": 1, "a.c.0": 2, "a.c.1": 3}`.
/// Empty nested containers produce no keys.
pub fn flatten_nested_object(obj: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in obj {
        flatten_into(&mut out, key.clone(), value);
    }
    out
}

fn flatten_into(out: &mut Map<String, Value>, path: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(out, format!("{path}.{key}"), nested);
            }
        }
        Value::Array(items) => {
            for (idx, nested) in items.iter().enumerate() {
                flatten_into(out, format!("{path}.{idx}"), nested);
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}
