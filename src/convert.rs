//! Conversions between engine values and JSON.
//!
//! JSON is the dominant carrier for the layered-configuration merges this
//! engine is used for, so both directions are provided. JSON objects map
//! to [`Value::Map`] and JSON arrays to [`Value::Seq`] (ordered, no
//! declared element type). The reverse direction is lossy for the
//! engine-only shapes: arrays drop their declared element type and
//! objects flatten to plain JSON objects of their fields.

use serde_json::{Number, Value as Json};

use crate::value::Value;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::Seq(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, item)| (key, Value::from(item)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Int(n) => Json::Number(n.into()),
            Value::Float(x) => Number::from_f64(x).map(Json::Number).unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s),
            Value::Array(arr) => {
                Json::Array(arr.into_items().into_iter().map(Json::from).collect())
            }
            Value::Seq(items) => Json::Array(items.into_iter().map(Json::from).collect()),
            Value::Map(map) => Json::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Json::from(item)))
                    .collect(),
            ),
            Value::Object(obj) => Json::Object(
                obj.fields
                    .into_iter()
                    .map(|(name, item)| (name, Json::from(item)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MergeEngine;
    use serde_json::json;

    #[test]
    fn json_round_trips_for_object_free_values() {
        let json = json!({
            "name": "dark",
            "depth": 3,
            "scale": 1.5,
            "enabled": true,
            "palette": ["#000", "#fff", null]
        });
        let value = Value::from(json.clone());
        assert_eq!(Json::from(value), json);
    }

    #[test]
    fn json_objects_become_maps_and_arrays_become_seqs() {
        let value = Value::from(json!({"items": [1, 2]}));
        assert_eq!(
            value,
            Value::map([("items", Value::seq([1, 2]))])
        );
    }

    #[test]
    fn large_unsigned_numbers_fall_back_to_float() {
        let value = Value::from(json!(u64::MAX));
        assert!(matches!(value, Value::Float(_)));
    }

    #[test]
    fn nan_free_floats_survive_the_reverse_direction() {
        assert_eq!(Json::from(Value::Float(2.5)), json!(2.5));
        assert_eq!(Json::from(Value::Float(f64::NAN)), Json::Null);
    }

    #[test]
    fn layered_json_configs_merge_end_to_end() {
        let engine = MergeEngine::default();
        let base = Value::from(json!({
            "window": {"width": 800, "height": 600},
            "recent": ["a.txt"]
        }));
        let overlay = Value::from(json!({
            "window": {"width": 1024},
            "recent": ["b.txt"]
        }));

        let merged = engine.merge(base, &overlay);
        assert_eq!(
            Json::from(merged),
            json!({
                "window": {"width": 1024, "height": 600},
                "recent": ["a.txt", "b.txt"]
            })
        );
    }
}
