//! Deep merge and path lookup over JSON values.
//!
//! The canonical state tree is typed, but partial updates combine at the
//! JSON layer: mapping values merge recursively, everything else (scalars,
//! arrays, type mismatches) replaces wholesale. Arrays are never merged
//! element-wise.

use crate::state::path::StatePath;
use serde_json::Value;

/// Merge `patch` into `base`, producing a new value.
///
/// Neither input is mutated; the previous tree stays valid for change
/// comparison after the merge.
pub(crate) fn deep_merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            let mut merged = base_map.clone();
            for (key, incoming) in patch_map {
                match base_map.get(key) {
                    Some(existing) => {
                        merged.insert(key.clone(), deep_merge(existing, incoming));
                    }
                    None => {
                        merged.insert(key.clone(), incoming.clone());
                    }
                }
            }
            Value::Object(merged)
        }
        // Scalar, array, or type mismatch: incoming replaces.
        (_, incoming) => incoming.clone(),
    }
}

/// Resolve `path` inside `root`, segment by segment.
///
/// A missing intermediate key resolves to `None`; two absent values count
/// as equal when comparing old and new trees.
pub(crate) fn value_at<'a>(root: &'a Value, path: &StatePath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
