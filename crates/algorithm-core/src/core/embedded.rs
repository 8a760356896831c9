//! Lenient decoding for fields the backend stores as JSON text inside JSON
//! (`input_options`, `validation_rules`, `tags`).
//!
//! A field may arrive as an embedded string (`"[\"a\",\"b\"]"`), as a native
//! JSON value, or not at all. Malformed content decodes to the default and the
//! failure is reported back to the caller so it can be surfaced as a diagnostic.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Open key-value map of validation rules attached to an input node.
pub type ValidationRules = BTreeMap<String, Value>;

/// Decode `raw` into `T`, falling back to `T::default()`.
///
/// Returns the decoded value and, on failure, a human-readable reason.
pub fn decode_lenient<T>(field: &str, raw: Option<&Value>) -> (T, Option<String>)
where
    T: DeserializeOwned + Default,
{
    let value = match raw {
        None | Some(Value::Null) => return (T::default(), None),
        Some(Value::String(s)) if s.trim().is_empty() => return (T::default(), None),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(v) => v,
            Err(e) => {
                return (
                    T::default(),
                    Some(format!("{field}: embedded JSON is malformed: {e}")),
                );
            }
        },
        Some(other) => other.clone(),
    };
    match serde_json::from_value::<T>(value) {
        Ok(v) => (v, None),
        Err(e) => (
            T::default(),
            Some(format!("{field}: unexpected shape: {e}")),
        ),
    }
}

/// Encode a decoded value back into the embedded-string wire form.
/// Empty collections encode as `null` so absent fields stay absent.
pub fn encode_embedded<T: serde::Serialize>(value: &T, is_empty: bool) -> Value {
    if is_empty {
        return Value::Null;
    }
    match serde_json::to_string(value) {
        Ok(s) => Value::String(s),
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_string_array_decodes() {
        let raw = json!("[\"mild\", \"severe\"]");
        let (options, issue): (Vec<String>, _) = decode_lenient("input_options", Some(&raw));
        assert_eq!(options, vec!["mild".to_string(), "severe".to_string()]);
        assert!(issue.is_none());
    }

    #[test]
    fn native_object_decodes() {
        let raw = json!({"min": 35, "max": 42});
        let (rules, issue): (ValidationRules, _) = decode_lenient("validation_rules", Some(&raw));
        assert_eq!(rules.get("min"), Some(&json!(35)));
        assert!(issue.is_none());
    }

    #[test]
    fn malformed_embedded_json_yields_default_and_reason() {
        let raw = json!("{min: 35");
        let (rules, issue): (ValidationRules, _) = decode_lenient("validation_rules", Some(&raw));
        assert!(rules.is_empty());
        assert!(issue.unwrap().contains("validation_rules"));
    }

    #[test]
    fn wrong_shape_yields_default_and_reason() {
        let raw = json!("{\"a\": 1}");
        let (options, issue): (Vec<String>, _) = decode_lenient("input_options", Some(&raw));
        assert!(options.is_empty());
        assert!(issue.is_some());
    }

    #[test]
    fn absent_and_null_are_silent_defaults() {
        let (a, ia): (Vec<String>, _) = decode_lenient("input_options", None);
        let (b, ib): (Vec<String>, _) = decode_lenient("input_options", Some(&Value::Null));
        assert!(a.is_empty() && b.is_empty());
        assert!(ia.is_none() && ib.is_none());
    }
}
