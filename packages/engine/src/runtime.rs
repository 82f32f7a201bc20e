//! Process-wide runtime: module registry plus store ownership.
//!
//! The runtime is the explicit registry object modules are declared
//! against. It owns the single store instance, derives a reducer from
//! each registered module, and records action signatures so dot-path
//! dispatch can reconstruct payloads. Tests get a clean slate through
//! [`Runtime::reset`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use modux_core::Module;
use serde_json::Value;

use crate::dispatch::{Dispatcher, SignatureTable};
use crate::reducer::ModuleReducer;
use crate::sequencer::DEFAULT_STEP_CAP;
use crate::store::{lock, Store};

/// The process-wide state runtime. Cheap to clone; clones share the
/// store and registry.
#[derive(Clone)]
pub struct Runtime {
    store: Store,
    signatures: SignatureTable,
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime::with_step_cap(DEFAULT_STEP_CAP)
    }

    /// A runtime whose async sequences abort after `step_cap` steps.
    pub fn with_step_cap(step_cap: usize) -> Runtime {
        Runtime {
            store: Store::with_step_cap(step_cap),
            signatures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a module: its reducer joins the store and its action
    /// signatures join the lookup table.
    ///
    /// Declaring the same namespace again is non-fatal: a warning is
    /// logged and the newer module wins every namespace-keyed lookup.
    pub fn register(&self, module: Module) {
        let namespace = module.namespace().to_string();
        let signatures: HashMap<String, Vec<String>> = module
            .action_signatures()
            .map(|(name, arg_names)| (name.to_string(), arg_names.to_vec()))
            .collect();
        {
            let mut table = lock(&self.signatures);
            if table.insert(namespace.clone(), signatures).is_some() {
                log::warn!(
                    "duplicate namespace '{}': the newer module replaces the earlier registration",
                    namespace
                );
            }
        }
        self.store.add_reducer(ModuleReducer::new(module));
    }

    /// Remove a namespace's module. Returns whether one was registered.
    pub fn unregister(&self, namespace: &str) -> bool {
        let had_signatures = lock(&self.signatures).remove(namespace).is_some();
        self.store.remove_reducer(namespace) || had_signatures
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// A dispatcher over this runtime's store.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.store.clone(), Arc::clone(&self.signatures), None)
    }

    /// A dispatcher that resolves bare action names against one
    /// namespace.
    pub fn scoped_dispatcher(&self, namespace: &str) -> Dispatcher {
        Dispatcher::new(
            self.store.clone(),
            Arc::clone(&self.signatures),
            Some(namespace.to_string()),
        )
    }

    /// The whole state tree.
    pub fn state(&self) -> Value {
        self.store.state()
    }

    /// One namespace's state subtree.
    pub fn state_of(&self, namespace: &str) -> Option<Value> {
        self.store.state_of(namespace)
    }

    /// Block until every in-flight async sequence has finished. A
    /// runaway-sequence panic is propagated here.
    pub fn wait_idle(&self) {
        self.store.wait_idle();
    }

    /// Clean-slate hook for tests: drops all modules, state, listeners,
    /// and signature lookups.
    pub fn reset(&self) {
        lock(&self.signatures).clear();
        self.store.reset();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}
