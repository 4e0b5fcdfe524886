//! JSON field codec.
//!
//! Semi-structured columns may come back from the store either already
//! decoded (JSONB object/array) or as an encoded string (legacy rows, clients
//! that posted `JSON.stringify`'d values). Callers always get the typed
//! structure; anything that fails to decode falls back to the field's
//! `Default` and is logged, never returned as an error.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a raw column value into `T`, falling back to `T::default()`.
pub fn decode<T>(field: &'static str, raw: Option<Value>) -> T
where
    T: DeserializeOwned + Default,
{
    let result = match raw {
        None | Some(Value::Null) => return T::default(),
        Some(Value::String(encoded)) => {
            if encoded.trim().is_empty() {
                return T::default();
            }
            serde_json::from_str::<T>(&encoded)
        }
        Some(value) => serde_json::from_value::<T>(value),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(field, error = %e, "failed to decode JSON field, using default");
        T::default()
    })
}

/// Encode a typed structure for storage.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value)
}

/// Normalize an incoming write value (structured or encoded) to `T`.
pub fn normalize<T>(field: &'static str, raw: Value) -> T
where
    T: DeserializeOwned + Default,
{
    decode(field, Some(raw))
}

/// Keeps an explicit `null` as `Some(Value::Null)` so a write can reset a
/// field. Pair with `#[serde(default)]` so an absent key stays `None`.
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ============================================================================
// Lenient scalars for embedded reference tuples
// ============================================================================

/// Accepts a JSON number or a numeric string. Anything else becomes `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|d| d.is_finite()))
}

/// Accepts a JSON integer or an integer string. Anything else becomes `None`.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Section {
        description: String,
        tags: Vec<String>,
    }

    #[test]
    fn test_decode_structured_value() {
        let section: Section = decode("section", Some(json!({ "description": "hi" })));
        assert_eq!(section.description, "hi");
        assert!(section.tags.is_empty());
    }

    #[test]
    fn test_decode_encoded_string() {
        let raw = Value::String(r#"{"description":"x","tags":["a"]}"#.to_string());
        let section: Section = decode("section", Some(raw));
        assert_eq!(section.tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_decode_malformed_string_yields_default() {
        let raw = Value::String("{not json".to_string());
        let section: Section = decode("section", Some(raw));
        assert_eq!(section, Section::default());

        let list: Vec<String> = decode("list", Some(Value::String("[1,".into())));
        assert!(list.is_empty());
    }

    #[test]
    fn test_decode_wrong_shape_yields_default() {
        let list: Vec<String> = decode("list", Some(json!({ "a": 1 })));
        assert!(list.is_empty());

        let section: Section = decode("section", Some(json!([1, 2, 3])));
        assert_eq!(section, Section::default());
    }

    #[test]
    fn test_decode_null_and_missing() {
        let a: Vec<String> = decode("list", None);
        let b: Vec<String> = decode("list", Some(Value::Null));
        let c: Vec<String> = decode("list", Some(Value::String("  ".into())));
        assert!(a.is_empty() && b.is_empty() && c.is_empty());
    }

    #[derive(Debug, Deserialize)]
    struct Tuple {
        #[serde(default, deserialize_with = "lenient_i64")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "lenient_f64")]
        distance: Option<f64>,
    }

    #[test]
    fn test_lenient_scalars() {
        let t: Tuple = serde_json::from_value(json!({ "id": "7", "distance": "0.5" })).unwrap();
        assert_eq!(t.id, Some(7));
        assert_eq!(t.distance, Some(0.5));

        let t: Tuple = serde_json::from_value(json!({ "id": 3, "distance": "far" })).unwrap();
        assert_eq!(t.id, Some(3));
        assert_eq!(t.distance, None);

        let t: Tuple = serde_json::from_value(json!({})).unwrap();
        assert_eq!(t.id, None);
        assert_eq!(t.distance, None);
    }
}
