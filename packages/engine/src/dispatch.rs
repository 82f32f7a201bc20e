//! Dispatch call-shape normalization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use modux_core::{zip_payload, Action, ActionType};
use serde_json::Value;

use crate::store::{lock, Store};

/// Declared action signatures: namespace → canonical name → arg names.
///
/// Shared between the runtime (which fills it at registration) and
/// dispatchers (which zip payloads from it). Later registrations of a
/// namespace overwrite its entry.
pub(crate) type SignatureTable = Arc<Mutex<HashMap<String, HashMap<String, Vec<String>>>>>;

/// Normalizes heterogeneous dispatch call shapes into canonical
/// actions.
///
/// Three shapes are accepted:
/// - a prebuilt [`Action`], passed through as-is
/// - `"namespace.action"` plus positional args, resolved to the
///   canonical `@@namespace/NAME` type
/// - any other string, used as a literal action type
///
/// A dispatcher bound to a namespace (see
/// [`Runtime::scoped_dispatcher`]) additionally resolves bare names
/// against that namespace.
///
/// Nothing validates that the target exists: dispatching an unmatched
/// type is a silent no-op.
///
/// [`Runtime::scoped_dispatcher`]: crate::Runtime::scoped_dispatcher
#[derive(Clone)]
pub struct Dispatcher {
    store: Store,
    signatures: SignatureTable,
    scope: Option<String>,
}

impl Dispatcher {
    pub(crate) fn new(store: Store, signatures: SignatureTable, scope: Option<String>) -> Dispatcher {
        Dispatcher {
            store,
            signatures,
            scope,
        }
    }

    /// Dispatch a prebuilt action as-is.
    ///
    /// Takes the action by value: ownership transfer is what keeps the
    /// dispatched object from aliasing anything the caller retains.
    pub fn dispatch(&self, action: Action) {
        self.store.dispatch(action);
    }

    /// Dispatch by name with positional arguments.
    ///
    /// When the target resolves to a registered action, the declared
    /// parameter names are zipped over `args` to reconstruct the
    /// payload; otherwise the payload is empty and only `args` carry
    /// the data.
    pub fn dispatch_named(&self, target: &str, args: Vec<Value>) {
        let action = self.normalize(target, args);
        self.store.dispatch(action);
    }

    fn normalize(&self, target: &str, args: Vec<Value>) -> Action {
        let resolved = match target.split_once('.') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('.') =>
            {
                Some((namespace, name))
            }
            Some(_) => None,
            None => match &self.scope {
                Some(scope) if !target.starts_with("@@") => Some((scope.as_str(), target)),
                _ => None,
            },
        };
        match resolved {
            Some((namespace, name)) => {
                let ty = ActionType::scoped(namespace, name);
                let payload = lock(&self.signatures)
                    .get(namespace)
                    .and_then(|actions| actions.get(&ty.name))
                    .map(|arg_names| zip_payload(arg_names, &args))
                    .unwrap_or_default();
                Action::new(ty.to_string())
                    .with_payload(payload)
                    .with_args(args)
            }
            None => Action::new(target).with_args(args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signatures_with(namespace: &str, action: &str, arg_names: &[&str]) -> SignatureTable {
        let mut actions = HashMap::new();
        actions.insert(
            action.to_string(),
            arg_names.iter().map(|s| s.to_string()).collect(),
        );
        let mut table = HashMap::new();
        table.insert(namespace.to_string(), actions);
        Arc::new(Mutex::new(table))
    }

    fn dispatcher(scope: Option<&str>) -> Dispatcher {
        Dispatcher::new(
            Store::new(),
            signatures_with("foo", "UPDATE", &["message"]),
            scope.map(|s| s.to_string()),
        )
    }

    #[test]
    fn dot_path_resolves_and_zips_payload() {
        let action = dispatcher(None).normalize("foo.update", vec![json!("hello")]);
        assert_eq!(action.kind, "@@foo/UPDATE");
        assert_eq!(action.payload["message"], json!("hello"));
        assert_eq!(action.args, vec![json!("hello")]);
    }

    #[test]
    fn unknown_target_gets_empty_payload() {
        let action = dispatcher(None).normalize("bar.save", vec![json!(1)]);
        assert_eq!(action.kind, "@@bar/SAVE");
        assert!(action.payload.is_empty());
        assert_eq!(action.args, vec![json!(1)]);
    }

    #[test]
    fn dotless_string_is_literal_type() {
        let action = dispatcher(None).normalize("SOME_ACTION", vec![]);
        assert_eq!(action.kind, "SOME_ACTION");
        assert!(action.payload.is_empty());
    }

    #[test]
    fn multi_dot_string_is_literal_type() {
        let action = dispatcher(None).normalize("a.b.c", vec![]);
        assert_eq!(action.kind, "a.b.c");
    }

    #[test]
    fn scoped_dispatcher_resolves_bare_names() {
        let action = dispatcher(Some("foo")).normalize("update", vec![json!("hi")]);
        assert_eq!(action.kind, "@@foo/UPDATE");
        assert_eq!(action.payload["message"], json!("hi"));
    }

    #[test]
    fn scoped_dispatcher_leaves_canonical_types_alone() {
        let action = dispatcher(Some("foo")).normalize("@@other/THING", vec![]);
        assert_eq!(action.kind, "@@other/THING");
    }

    #[test]
    fn scope_does_not_shadow_dot_paths() {
        let action = dispatcher(Some("foo")).normalize("bar.save", vec![]);
        assert_eq!(action.kind, "@@bar/SAVE");
    }
}
