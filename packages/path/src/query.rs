//! Query operations over `serde_json::Value` trees.
//!
//! All write operations consume the root and return the new root:
//! untouched branches are moved, never copied, so the caller's original
//! tree can never be observed half-mutated.

use serde_json::{Map, Value};

use crate::path::{Path, Segment};

/// Resolve a path against a value tree.
///
/// Returns `None` for an empty path (the root is not addressable) and
/// for paths that do not exist or traverse into primitives.
///
/// Wildcard segments fan out:
/// - a terminal `*` yields the container's values as an array (array
///   elements in order; object values in insertion order)
/// - a non-terminal `*` resolves the remaining path independently per
///   child and collects into a same-shaped container (array→array,
///   object→object with the same keys); children that fail to resolve
///   contribute `Null`
///
/// # Example
///
/// ```rust
/// use modux_path::{get_in, path};
/// use serde_json::json;
///
/// let tree = json!({"users": [{"name": "a"}, {"name": "b"}]});
/// assert_eq!(get_in(&tree, &path!("users[1].name")), Some(json!("b")));
/// assert_eq!(get_in(&tree, &path!("users.*.name")), Some(json!(["a", "b"])));
/// ```
pub fn get_in(root: &Value, path: &Path) -> Option<Value> {
    if path.is_empty() {
        return None;
    }
    resolve(root, path.segments())
}

fn resolve(node: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(node.clone());
    };
    match segment {
        Segment::Key(key) => match node {
            Value::Object(map) => map.get(key).and_then(|child| resolve(child, rest)),
            Value::Array(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .and_then(|child| resolve(child, rest)),
            _ => None,
        },
        Segment::Index(index) => match node {
            Value::Array(items) => items.get(*index).and_then(|child| resolve(child, rest)),
            // Objects may carry numeric string keys.
            Value::Object(map) => map
                .get(&index.to_string())
                .and_then(|child| resolve(child, rest)),
            _ => None,
        },
        Segment::Wildcard => match node {
            Value::Array(items) => Some(if rest.is_empty() {
                Value::Array(items.clone())
            } else {
                Value::Array(
                    items
                        .iter()
                        .map(|child| resolve(child, rest).unwrap_or(Value::Null))
                        .collect(),
                )
            }),
            Value::Object(map) => Some(if rest.is_empty() {
                Value::Array(map.values().cloned().collect())
            } else {
                Value::Object(
                    map.iter()
                        .map(|(key, child)| {
                            (key.clone(), resolve(child, rest).unwrap_or(Value::Null))
                        })
                        .collect(),
                )
            }),
            _ => None,
        },
    }
}

/// Set or delete the value at a path, returning the new root.
///
/// `Some(value)` assigns; `None` **deletes** the addressed location
/// (object: the key is removed; array: the element is spliced out,
/// shifting later indices). Assigning a representable "nothing" is
/// spelled `Some(Value::Null)`. Deleting a path that does not exist
/// leaves that level untouched.
///
/// Missing intermediate levels are created on the way down: a key
/// segment creates an object, an index segment creates an array (padded
/// with `Null` up to the index), and a wildcard over a missing container
/// matches nothing. Traversing *through* a primitive replaces it with a
/// fresh container.
///
/// A wildcard path applies the operation to every matched location.
#[must_use]
pub fn set_in(root: Value, path: &Path, value: Option<Value>) -> Value {
    map_in(root, path, |_| value.clone())
}

/// Delete the value at a path, returning the new root.
///
/// The explicit spelling of `set_in(root, path, None)`.
#[must_use]
pub fn delete_in(root: Value, path: &Path) -> Value {
    set_in(root, path, None)
}

/// Update the value at a path through a resolver closure.
///
/// The closure receives the current value at each addressed location
/// (`None` when absent) and its return value is assigned, with `None`
/// meaning delete, the same policy as [`set_in`]. With a wildcard path
/// the closure runs once per matched location.
///
/// # Example
///
/// ```rust
/// use modux_path::{map_in, path};
/// use serde_json::json;
///
/// let tree = json!({"count": 1});
/// let tree = map_in(tree, &path!("count"), |current| {
///     let n = current.and_then(|v| v.as_i64()).unwrap_or(0);
///     Some(json!(n + 1))
/// });
/// assert_eq!(tree, json!({"count": 2}));
/// ```
#[must_use]
pub fn map_in<F>(root: Value, path: &Path, mut resolver: F) -> Value
where
    F: FnMut(Option<&Value>) -> Option<Value>,
{
    if path.is_empty() {
        return root;
    }
    apply(Some(root), path.segments(), &mut resolver).unwrap_or(Value::Null)
}

fn apply<F>(node: Option<Value>, segments: &[Segment], resolver: &mut F) -> Option<Value>
where
    F: FnMut(Option<&Value>) -> Option<Value>,
{
    let Some((segment, rest)) = segments.split_first() else {
        return resolver(node.as_ref());
    };
    match segment {
        Segment::Key(key) => Some(apply_keyed(node, key.clone(), rest, resolver)),
        Segment::Index(index) => match node {
            // Objects may carry numeric string keys.
            node @ Some(Value::Object(_)) => {
                Some(apply_keyed(node, index.to_string(), rest, resolver))
            }
            other => Some(apply_indexed(other, *index, rest, resolver)),
        },
        Segment::Wildcard => match node {
            Some(Value::Array(items)) => Some(Value::Array(
                items
                    .into_iter()
                    .filter_map(|child| apply(Some(child), rest, resolver))
                    .collect(),
            )),
            Some(Value::Object(map)) => Some(Value::Object(
                map.into_iter()
                    .filter_map(|(key, child)| {
                        apply(Some(child), rest, resolver).map(|next| (key, next))
                    })
                    .collect(),
            )),
            // Nothing to match at this level.
            other => other,
        },
    }
}

fn apply_keyed<F>(node: Option<Value>, key: String, rest: &[Segment], resolver: &mut F) -> Value
where
    F: FnMut(Option<&Value>) -> Option<Value>,
{
    let mut map = match node {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    // Taking leaves Null behind; insert or shift_remove below cleans up
    // without disturbing the order of sibling keys.
    let child = map.get_mut(&key).map(std::mem::take);
    let existed = child.is_some();
    match apply(child, rest, resolver) {
        Some(next) => {
            map.insert(key, next);
        }
        None => {
            if existed {
                map.shift_remove(&key);
            }
        }
    }
    Value::Object(map)
}

fn apply_indexed<F>(node: Option<Value>, index: usize, rest: &[Segment], resolver: &mut F) -> Value
where
    F: FnMut(Option<&Value>) -> Option<Value>,
{
    let mut items = match node {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    if index < items.len() {
        let child = std::mem::take(&mut items[index]);
        match apply(Some(child), rest, resolver) {
            Some(next) => items[index] = next,
            None => {
                items.remove(index);
            }
        }
    } else if let Some(next) = apply(None, rest, resolver) {
        items.resize(index, Value::Null);
        items.push(next);
    }
    // Deleting past the end is a no-op.
    Value::Array(items)
}
