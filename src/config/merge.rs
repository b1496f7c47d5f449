//! Field-by-field merging of configuration layers.
//!
//! Layers are plain JSON values (YAML files are read through `serde_yaml` into
//! `serde_json::Value`). Mappings merge key by key; every other value, lists
//! included, is replaced wholesale by the upper layer. A `null` in the upper
//! layer means "not set here" and keeps the lower value.

use serde_json::Value;

/// Apply `upper` on top of `lower` in place.
pub fn overlay(lower: &mut Value, upper: Value) {
    match upper {
        Value::Null => {}
        Value::Object(entries) => {
            if !lower.is_object() {
                *lower = Value::Object(Default::default());
            }
            if let Value::Object(target) = lower {
                for (key, value) in entries {
                    match target.get_mut(&key) {
                        Some(existing) => overlay(existing, value),
                        None if value.is_null() => {}
                        None => {
                            target.insert(key, value);
                        }
                    }
                }
            }
        }
        other => *lower = other,
    }
}

/// Merge layers from lowest to highest precedence.
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for layer in layers {
        overlay(&mut merged, layer);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_merge_individually() {
        let mut base = json!({
            "catch_up": false,
            "archive": {"suffix": "Archive", "marker_tag": "updated"}
        });
        overlay(&mut base, json!({"archive": {"marker_tag": "stamp"}}));
        assert_eq!(
            base,
            json!({
                "catch_up": false,
                "archive": {"suffix": "Archive", "marker_tag": "stamp"}
            })
        );
    }

    #[test]
    fn lists_are_replaced() {
        let merged = merge_layers([
            json!({"awareness_tags": ["should", "could"]}),
            json!({"awareness_tags": ["maybe"]}),
        ]);
        assert_eq!(merged, json!({"awareness_tags": ["maybe"]}));
    }

    #[test]
    fn null_keeps_lower_value() {
        let merged = merge_layers([
            json!({"recurring": "recurring.taskpaper", "simulate": true}),
            json!({"recurring": null, "simulate": false}),
        ]);
        assert_eq!(
            merged,
            json!({"recurring": "recurring.taskpaper", "simulate": false})
        );
    }

    #[test]
    fn empty_yaml_document_is_a_no_op() {
        let merged = merge_layers([json!({"catch_up": true}), Value::Null]);
        assert_eq!(merged, json!({"catch_up": true}));
    }
}
