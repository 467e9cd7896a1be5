use serde_json::{Map, Value};

use super::{KEY_SEPARATOR, join_key};
use crate::model::{FlatEntry, LocaleTree};

/// Rebuilds a locale tree from dotted-key entries.
pub fn unflatten<'a, I>(entries: I) -> LocaleTree
where
    I: IntoIterator<Item = &'a FlatEntry>,
{
    let mut tree = LocaleTree::new();
    overlay(&mut tree, entries);
    tree
}

/// Expands dotted keys already present in `tree` into nested objects, so
/// `{"a.b": "x"}` becomes `{"a": {"b": "x"}}`. Every leaf is kept, empty
/// strings and `null` included.
pub fn expand(tree: &LocaleTree) -> LocaleTree {
    let mut expanded = LocaleTree::new();
    expand_into(&mut expanded, tree, "");
    expanded
}

fn expand_into(target: &mut LocaleTree, tree: &LocaleTree, prefix: &str) {
    for (key, value) in tree {
        let path = join_key(prefix, key);
        match value {
            Value::Object(child) if !child.is_empty() => expand_into(target, child, &path),
            leaf => insert_path(target, &path, leaf.clone()),
        }
    }
}

/// Writes entries into an existing tree, creating intermediate objects as
/// needed.
///
/// Entries whose value is empty (`""` or `null`) are skipped so whatever the
/// tree already holds at that path survives. A numeric segment addresses an
/// existing array element; any other scalar or array sitting where an
/// intermediate object is needed is replaced by an object. The last entry
/// written to a path wins. Returns the number of entries applied.
pub fn overlay<'a, I>(tree: &mut LocaleTree, entries: I) -> usize
where
    I: IntoIterator<Item = &'a FlatEntry>,
{
    let mut applied = 0;
    for entry in entries {
        if is_empty_value(&entry.value) {
            continue;
        }
        insert_path(tree, &entry.key, entry.value.clone());
        applied += 1;
    }
    applied
}

fn insert_path(tree: &mut LocaleTree, key: &str, value: Value) {
    let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let slot = tree.entry(first.to_string()).or_insert(Value::Null);
    insert_into(slot, rest, value);
}

fn insert_into(slot: &mut Value, segments: &[&str], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };

    if let Value::Array(items) = &mut *slot {
        if let Some(item) = segment.parse::<usize>().ok().and_then(|index| items.get_mut(index)) {
            insert_into(item, rest, value);
            return;
        }
    }

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(child) = slot {
        let next = child.entry(segment.to_string()).or_insert(Value::Null);
        insert_into(next, rest, value);
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}
