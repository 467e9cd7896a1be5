//! Conversion between nested locale trees and dotted-key entries.

mod unflatten;

use serde_json::Value;

use crate::model::{FlatEntry, LocaleTree};

pub use unflatten::{expand, overlay, unflatten};

/// Separator placed between path segments of a dotted key.
pub const KEY_SEPARATOR: char = '.';

/// Flattens a locale tree into dotted-key entries in document order.
///
/// Nested objects are walked recursively and array elements are keyed by
/// their index (`list.0`); every other value is emitted as a leaf. `null`
/// behaves like an empty object and produces nothing.
pub fn flatten(tree: &LocaleTree) -> Vec<FlatEntry> {
    let mut entries = Vec::new();
    flatten_into(tree, "", &mut entries);
    entries
}

fn flatten_into(tree: &LocaleTree, prefix: &str, entries: &mut Vec<FlatEntry>) {
    for (key, value) in tree {
        flatten_value(value, join_key(prefix, key), entries);
    }
}

fn flatten_value(value: &Value, path: String, entries: &mut Vec<FlatEntry>) {
    match value {
        Value::Object(child) => flatten_into(child, &path, entries),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(item, join_key(&path, &index.to_string()), entries);
            }
        }
        Value::Null => {}
        leaf => entries.push(FlatEntry::new(path, leaf.clone())),
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{KEY_SEPARATOR}{key}")
    }
}
