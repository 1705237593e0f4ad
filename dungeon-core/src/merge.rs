//! Recursive merge of a state delta into a JSON value tree.

use serde_json::Value;

/// Merge `delta` into `base`.
///
/// When both sides of a key are objects the merge recurses, so fields
/// the delta does not mention are preserved. Anything else (scalars,
/// arrays, a record replaced by a non-record) is replaced wholesale.
pub fn deep_merge(base: &mut Value, delta: &Value) {
    match (base, delta) {
        (Value::Object(base_map), Value::Object(delta_map)) => {
            for (key, value) in delta_map {
                match base_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, delta) => *base = delta.clone(),
    }
}
