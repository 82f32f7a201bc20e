//! Declarative state modules.
//!
//! A module owns one namespace of the shared state tree: an initial
//! state, a table of user-triggered *actions*, and a table of
//! *handlers* reacting to arbitrary dispatched actions, including
//! foreign namespaces. Modules are immutable after declaration; the
//! engine derives a reducer from them deterministically.

use serde_json::{Map, Value};

use crate::action::{zip_payload, Action, ActionType};
use crate::error::ConfigError;
use crate::flow::{Flow, Updater};
use crate::matcher::Matcher;
use crate::name::canonical_action_name;

/// What an action or handler callback produced.
pub enum Outcome {
    /// No state change.
    None,
    /// A path-keyed partial state merged synchronously. Each top-level
    /// key is a path expression (`"foo.baz.message"` addresses a leaf).
    Fragment(Map<String, Value>),
    /// A fragment computed from the pre-merge namespace state.
    Updater(Updater),
    /// A multi-step asynchronous sequence, driven out-of-band.
    Flow(Box<dyn Flow>),
}

impl Outcome {
    /// Fragment outcome from any JSON value; a non-object collapses to
    /// [`Outcome::None`] since there are no paths to merge.
    pub fn fragment(value: Value) -> Outcome {
        match value {
            Value::Object(map) => Outcome::Fragment(map),
            _ => Outcome::None,
        }
    }

    /// Updater outcome from a closure over the pre-merge state.
    pub fn updater<F>(f: F) -> Outcome
    where
        F: FnOnce(&Value) -> Value + Send + 'static,
    {
        Outcome::Updater(Box::new(f))
    }

    /// Flow outcome from any [`Flow`] implementation.
    pub fn flow(flow: impl Flow + 'static) -> Outcome {
        Outcome::Flow(Box::new(flow))
    }
}

/// An action or handler body.
pub type Callback = Box<dyn Fn(&Action) -> Outcome + Send + Sync>;

pub(crate) struct ActionDef {
    /// Canonical SNAKE_UPPER name.
    pub name: String,
    /// Declared parameter names, zipped over positional args to build
    /// the payload of created actions.
    pub arg_names: Vec<String>,
    pub callback: Callback,
}

pub(crate) struct HandlerDef {
    pub matcher: Matcher,
    pub callback: Callback,
}

/// One namespace's declaration: initial state, actions, handlers.
///
/// # Example
///
/// ```rust
/// use modux_core::{Module, Outcome};
/// use serde_json::json;
///
/// let module = Module::new("counter")
///     .unwrap()
///     .with_state(json!({"count": 0}))
///     .action("increment", &[], |_action| {
///         Outcome::updater(|prev| {
///             let count = prev["count"].as_i64().unwrap_or(0);
///             json!({"count": count + 1})
///         })
///     });
/// assert_eq!(module.namespace(), "counter");
/// ```
pub struct Module {
    namespace: String,
    initial_state: Value,
    actions: Vec<ActionDef>,
    handlers: Vec<HandlerDef>,
}

impl Module {
    /// Declare a module for a namespace.
    ///
    /// The namespace becomes both the state-tree key and the action
    /// type prefix, so it must be non-empty and free of the reserved
    /// characters `/`, `.`, `*`, `@`, and whitespace. Violations are
    /// fatal configuration errors.
    pub fn new(namespace: impl Into<String>) -> Result<Module, ConfigError> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(ConfigError::InvalidNamespace {
                namespace,
                message: "must not be empty".to_string(),
            });
        }
        if let Some(bad) = namespace
            .chars()
            .find(|c| matches!(c, '/' | '.' | '*' | '@') || c.is_whitespace())
        {
            return Err(ConfigError::InvalidNamespace {
                namespace: namespace.clone(),
                message: format!("contains reserved character '{}'", bad),
            });
        }
        Ok(Module {
            namespace,
            initial_state: Value::Object(Map::new()),
            actions: Vec::new(),
            handlers: Vec::new(),
        })
    }

    /// Set the namespace's initial state.
    #[must_use]
    pub fn with_state(mut self, state: Value) -> Module {
        self.initial_state = state;
        self
    }

    /// Declare an action.
    ///
    /// `name` may use any case or separator style; it is normalized, so
    /// two declarations normalizing to the same name collide and the
    /// last one wins. `arg_names` are the declared parameter names used
    /// to reconstruct a payload object from positional arguments.
    #[must_use]
    pub fn action<F>(mut self, name: &str, arg_names: &[&str], callback: F) -> Module
    where
        F: Fn(&Action) -> Outcome + Send + Sync + 'static,
    {
        self.actions.push(ActionDef {
            name: canonical_action_name(name),
            arg_names: arg_names.iter().map(|s| s.to_string()).collect(),
            callback: Box::new(callback),
        });
        self
    }

    /// Declare a handler bound to a selector (see [`Matcher::parse`]).
    #[must_use]
    pub fn handler<F>(mut self, selector: &str, callback: F) -> Module
    where
        F: Fn(&Action) -> Outcome + Send + Sync + 'static,
    {
        self.handlers.push(HandlerDef {
            matcher: Matcher::parse(selector),
            callback: Box::new(callback),
        });
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn initial_state(&self) -> &Value {
        &self.initial_state
    }

    /// The canonical type of one of this module's actions.
    pub fn action_type(&self, name: &str) -> ActionType {
        ActionType::scoped(&self.namespace, name)
    }

    /// Build a dispatchable action from a declared action name and
    /// positional arguments, zipping the declared parameter names into
    /// the payload.
    pub fn create_action(&self, name: &str, args: Vec<Value>) -> Result<Action, ConfigError> {
        let canonical = canonical_action_name(name);
        let def = self
            .find_action(&canonical)
            .ok_or_else(|| ConfigError::UnknownAction {
                namespace: self.namespace.clone(),
                name: name.to_string(),
            })?;
        let ty = ActionType {
            namespace: Some(self.namespace.clone()),
            name: canonical,
            sub: None,
        };
        Ok(Action::new(ty.to_string())
            .with_payload(zip_payload(&def.arg_names, &args))
            .with_args(args))
    }

    /// Declared action signatures: `(canonical name, arg names)`.
    pub fn action_signatures(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.actions
            .iter()
            .map(|def| (def.name.as_str(), def.arg_names.as_slice()))
    }

    /// Look up an action by canonical name. Last registration wins.
    pub(crate) fn find_action(&self, canonical: &str) -> Option<&ActionDef> {
        self.actions.iter().rev().find(|def| def.name == canonical)
    }

    /// Look up a handler for an incoming type via matcher precedence.
    /// Within one precedence level, last registration wins.
    pub(crate) fn find_handler(&self, ty: &ActionType) -> Option<&HandlerDef> {
        Matcher::candidates(ty).into_iter().find_map(|candidate| {
            self.handlers
                .iter()
                .rev()
                .find(|def| def.matcher == candidate)
        })
    }

    /// Invoke this module's callback for an incoming main type, if any.
    ///
    /// Own actions are consulted first (only for this module's own
    /// namespace, never sub-typed), then the handler table.
    pub fn invoke(&self, ty: &ActionType, action: &Action) -> Option<Outcome> {
        if ty.sub.is_none() && ty.namespace.as_deref() == Some(self.namespace.as_str()) {
            if let Some(def) = self.find_action(&ty.name) {
                return Some((def.callback)(action));
            }
        }
        self.find_handler(ty).map(|def| (def.callback)(action))
    }

    /// Whether this namespace owns a main type: it declares the action,
    /// or one of its handlers matches it. Owning namespaces absorb the
    /// type's `UPDATE` sub-action payloads.
    pub fn owns_main(&self, main: &ActionType) -> bool {
        if main.namespace.as_deref() == Some(self.namespace.as_str())
            && self.find_action(&main.name).is_some()
        {
            return true;
        }
        self.find_handler(main).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> Outcome {
        Outcome::fragment(value)
    }

    #[test]
    fn empty_namespace_is_fatal() {
        assert!(matches!(
            Module::new(""),
            Err(ConfigError::InvalidNamespace { .. })
        ));
    }

    #[test]
    fn reserved_characters_are_fatal() {
        for bad in ["a/b", "a.b", "a b", "a*", "@@a"] {
            assert!(Module::new(bad).is_err(), "namespace {bad:?}");
        }
    }

    #[test]
    fn action_names_normalize() {
        let module = Module::new("todos")
            .unwrap()
            .action("add item", &["title"], |_| Outcome::None);
        assert_eq!(
            module.action_type("add item").to_string(),
            "@@todos/ADD_ITEM"
        );
        assert!(module.find_action("ADD_ITEM").is_some());
    }

    #[test]
    fn colliding_names_last_wins() {
        let module = Module::new("todos")
            .unwrap()
            .action("addItem", &[], |_| fragment(json!({"from": "first"})))
            .action("ADD_ITEM", &[], |_| fragment(json!({"from": "second"})));
        let def = module.find_action("ADD_ITEM").unwrap();
        match (def.callback)(&Action::new("@@todos/ADD_ITEM")) {
            Outcome::Fragment(map) => assert_eq!(map["from"], json!("second")),
            _ => panic!("expected a fragment"),
        }
    }

    #[test]
    fn create_action_zips_payload() {
        let module = Module::new("foo")
            .unwrap()
            .action("update", &["message"], |_| Outcome::None);
        let action = module
            .create_action("update", vec![json!("hello")])
            .unwrap();
        assert_eq!(action.kind, "@@foo/UPDATE");
        assert_eq!(action.payload["message"], json!("hello"));
        assert_eq!(action.args, vec![json!("hello")]);
    }

    #[test]
    fn create_action_unknown_name_errors() {
        let module = Module::new("foo").unwrap();
        assert!(matches!(
            module.create_action("missing", vec![]),
            Err(ConfigError::UnknownAction { .. })
        ));
    }

    #[test]
    fn invoke_prefers_own_action_over_handler() {
        let module = Module::new("foo")
            .unwrap()
            .action("save", &[], |_| fragment(json!({"via": "action"})))
            .handler("@@foo/SAVE", |_| fragment(json!({"via": "handler"})));
        let ty = ActionType::parse("@@foo/SAVE");
        match module.invoke(&ty, &Action::new("@@foo/SAVE")) {
            Some(Outcome::Fragment(map)) => assert_eq!(map["via"], json!("action")),
            _ => panic!("expected the action callback"),
        }
    }

    #[test]
    fn invoke_ignores_foreign_actions_without_handler() {
        let module = Module::new("foo")
            .unwrap()
            .action("save", &[], |_| fragment(json!({"hit": true})));
        let ty = ActionType::parse("@@bar/SAVE");
        assert!(module.invoke(&ty, &Action::new("@@bar/SAVE")).is_none());
    }

    #[test]
    fn handler_precedence_exact_over_namespace_over_catch_all() {
        let module = Module::new("audit")
            .unwrap()
            .handler("*", |_| fragment(json!({"via": "catch-all"})))
            .handler("@@foo", |_| fragment(json!({"via": "namespace"})))
            .handler("foo.save", |_| fragment(json!({"via": "exact"})));

        let hit = |kind: &str| {
            let ty = ActionType::parse(kind);
            match module.invoke(&ty, &Action::new(kind)) {
                Some(Outcome::Fragment(map)) => map["via"].clone(),
                _ => panic!("expected a fragment for {kind}"),
            }
        };
        assert_eq!(hit("@@foo/SAVE"), json!("exact"));
        assert_eq!(hit("@@foo/OTHER"), json!("namespace"));
        assert_eq!(hit("@@bar/SAVE"), json!("catch-all"));
        assert_eq!(hit("UNRELATED"), json!("catch-all"));
    }

    #[test]
    fn owns_main_via_action_or_handler() {
        let module = Module::new("baz")
            .unwrap()
            .action("load", &[], |_| Outcome::None)
            .handler("foo.update", |_| Outcome::None);
        assert!(module.owns_main(&ActionType::parse("@@baz/LOAD")));
        assert!(module.owns_main(&ActionType::parse("@@foo/UPDATE")));
        assert!(!module.owns_main(&ActionType::parse("@@foo/OTHER")));
    }

    #[test]
    fn default_state_is_empty_object() {
        let module = Module::new("empty").unwrap();
        assert_eq!(module.initial_state(), &json!({}));
    }

    #[test]
    fn outcome_fragment_from_non_object_is_none() {
        assert!(matches!(Outcome::fragment(json!(42)), Outcome::None));
    }
}
