//! # Spec Diffing
//!
//! Builds JSON merge patches (RFC 7386) that carry only the fields that differ
//! between the live object and the desired one.

use serde_json::{Map, Value};

/// Merge patch turning `current` into `desired`, or `None` when they are equal.
///
/// Keys present in `current` but absent from `desired` are cleared with `null`.
/// Arrays and scalars are replaced wholesale, as merge patches require.
pub fn merge_patch(current: &Value, desired: &Value) -> Option<Value> {
    if current == desired {
        return None;
    }

    match (current, desired) {
        (Value::Object(current), Value::Object(desired)) => {
            let mut patch = Map::new();
            for (key, desired_value) in desired {
                match current.get(key) {
                    Some(current_value) => {
                        if let Some(nested) = merge_patch(current_value, desired_value) {
                            patch.insert(key.clone(), nested);
                        }
                    }
                    None => {
                        patch.insert(key.clone(), desired_value.clone());
                    }
                }
            }
            for key in current.keys() {
                if !desired.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }
            Some(Value::Object(patch))
        }
        _ => Some(desired.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_values_need_no_patch() {
        let value = json!({"rclone": {"copyMethod": "None"}, "sourcePVC": "data"});
        assert_eq!(merge_patch(&value, &value), None);
    }

    #[test]
    fn test_only_changed_leaf_is_patched() {
        let current = json!({
            "sourcePVC": "data",
            "rclone": {"rcloneConfigSection": "s", "rcloneDestPath": "p", "copyMethod": "None"}
        });
        let desired = json!({
            "sourcePVC": "data",
            "rclone": {"rcloneConfigSection": "s", "rcloneDestPath": "p", "copyMethod": "Snapshot"}
        });

        assert_eq!(
            merge_patch(&current, &desired),
            Some(json!({"rclone": {"copyMethod": "Snapshot"}}))
        );
    }

    #[test]
    fn test_added_and_removed_keys() {
        let current = json!({"a": 1, "gone": "x"});
        let desired = json!({"a": 1, "new": {"b": true}});

        assert_eq!(
            merge_patch(&current, &desired),
            Some(json!({"gone": null, "new": {"b": true}}))
        );
    }

    #[test]
    fn test_arrays_are_replaced() {
        let current = json!({"list": [1, 2]});
        let desired = json!({"list": [1, 2, 3]});
        assert_eq!(
            merge_patch(&current, &desired),
            Some(json!({"list": [1, 2, 3]}))
        );
    }

    #[test]
    fn test_type_change_replaces_value() {
        let current = json!({"rclone": "legacy"});
        let desired = json!({"rclone": {"copyMethod": "Clone"}});
        assert_eq!(
            merge_patch(&current, &desired),
            Some(json!({"rclone": {"copyMethod": "Clone"}}))
        );
    }
}
