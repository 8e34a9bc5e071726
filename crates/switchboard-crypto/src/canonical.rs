//! Deterministic JSON canonicalization.
//!
//! The canonical form is the hash input for plans and audit events, so the
//! byte sequence is fixed: no whitespace, object keys in bytewise lexical
//! order, array order preserved, scalars encoded exactly as `serde_json`
//! encodes them. Producers may order keys however they like; the canonical
//! form is identical.

use serde_json::Value;

/// Render a JSON value to its canonical string form.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(_) => {
            // serde_json's scalar encoder handles all escaping rules.
            if let Ok(encoded) = serde_json::to_string(value) {
                out.push_str(&encoded);
            }
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Ok(encoded) = serde_json::to_string(key) {
                    out.push_str(&encoded);
                }
                out.push(':');
                if let Some(value) = map.get(*key) {
                    write_canonical(value, out);
                }
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(canonical_json(&json!(null)), "null");
        assert_eq!(canonical_json(&json!(true)), "true");
        assert_eq!(canonical_json(&json!(42)), "42");
        assert_eq!(canonical_json(&json!(-1.5)), "-1.5");
        assert_eq!(canonical_json(&json!("a\"b")), "\"a\\\"b\"");
    }

    #[test]
    fn test_object_keys_sorted_bytewise() {
        let value = json!({"b": 1, "a": 2, "B": 3});
        // Uppercase sorts before lowercase in byte order.
        assert_eq!(canonical_json(&value), "{\"B\":3,\"a\":2,\"b\":1}");
    }

    #[test]
    fn test_array_order_preserved() {
        let value = json!([3, 1, 2]);
        assert_eq!(canonical_json(&value), "[3,1,2]");
    }

    #[test]
    fn test_nested_no_whitespace() {
        let value = json!({"z": [{"y": 1, "x": [true, null]}], "a": "s"});
        assert_eq!(
            canonical_json(&value),
            "{\"a\":\"s\",\"z\":[{\"x\":[true,null],\"y\":1}]}"
        );
    }

    #[test]
    fn test_key_permutation_is_idempotent() {
        let a = json!({"k1": {"n1": 1, "n2": 2}, "k2": [1, 2]});
        let b = json!({"k2": [1, 2], "k1": {"n2": 2, "n1": 1}});
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn test_unicode_passthrough() {
        let value = json!({"emoji": "🙂", "ctl": "\u{0007}"});
        let canon = canonical_json(&value);
        let reparsed: serde_json::Value = serde_json::from_str(&canon).unwrap();
        assert_eq!(reparsed, value);
    }
}
