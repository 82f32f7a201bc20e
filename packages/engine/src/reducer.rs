//! Per-namespace reducers derived from modules.

use modux_core::{Action, ActionType, Flow, Module, Outcome, SubType};
use modux_path::{set_in, Path};
use serde_json::{Map, Value};

/// A flow that escaped a reduce pass, to be driven out-of-band.
pub struct FlowEffect {
    pub flow: Box<dyn Flow>,
    /// Namespace whose module produced the flow; yielded updaters
    /// resolve against its latest state.
    pub namespace: String,
    /// Main type of the triggering action; the sequence's sub-actions
    /// derive from it.
    pub main_type: ActionType,
}

/// Wraps one module as a store reducer.
///
/// A namespace's state is uninitialized until the first reduce pass,
/// which seeds the module's initial state before anything else runs, so
/// state is never absent afterwards.
pub struct ModuleReducer {
    module: Module,
}

impl ModuleReducer {
    pub fn new(module: Module) -> ModuleReducer {
        ModuleReducer { module }
    }

    pub fn namespace(&self) -> &str {
        self.module.namespace()
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// One reduce pass for this namespace.
    ///
    /// - `UPDATE` sub-actions of a main type this namespace owns merge
    ///   the cached payload directly; the original callback already ran
    ///   once when the step fired and is never re-invoked.
    /// - Otherwise the module's own actions and handlers are consulted;
    ///   fragments and updaters merge synchronously, flows are pushed
    ///   onto `effects` and the state is returned unchanged.
    /// - An unmatched action returns the state unchanged.
    pub fn reduce(
        &self,
        state: Option<Value>,
        action: &Action,
        effects: &mut Vec<FlowEffect>,
    ) -> Value {
        let current = state.unwrap_or_else(|| self.module.initial_state().clone());
        let ty = action.action_type();

        if ty.sub == Some(SubType::Update) && self.module.owns_main(&ty.main()) {
            return merge_fragment(current, &action.payload);
        }

        let Some(outcome) = self.module.invoke(&ty, action) else {
            return current;
        };
        match outcome {
            Outcome::None => current,
            Outcome::Fragment(fragment) => merge_fragment(current, &fragment),
            Outcome::Updater(resolve) => {
                let fragment = resolve(&current);
                merge_resolved(current, fragment)
            }
            Outcome::Flow(flow) => {
                effects.push(FlowEffect {
                    flow,
                    namespace: self.module.namespace().to_string(),
                    main_type: ty.main(),
                });
                current
            }
        }
    }
}

/// Merge a path-keyed fragment into a state value.
///
/// Each top-level key is a path expression, so a fragment can address
/// nested leaves (`{"foo.baz.message": "hi"}`) without replacing the
/// containers along the way; sibling keys are preserved.
pub fn merge_fragment(state: Value, fragment: &Map<String, Value>) -> Value {
    let mut next = state;
    for (key, value) in fragment {
        next = set_in(next, &Path::parse(key), Some(value.clone()));
    }
    next
}

/// Merge an updater's resolved value; non-objects merge nothing.
pub(crate) fn merge_resolved(state: Value, resolved: Value) -> Value {
    match resolved {
        Value::Object(fragment) => merge_fragment(state, &fragment),
        _ => state,
    }
}
