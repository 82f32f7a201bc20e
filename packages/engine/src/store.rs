//! The single shared store.
//!
//! Holds the whole state tree keyed by namespace, the registered
//! reducers, and the listener table. Every dispatch is serialized: the
//! reducers run to completion under one lock, so state merges are
//! atomic and no reduce pass overlaps another. Flows collected during
//! the pass are scheduled on background sequencer threads after the
//! lock is released.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use modux_core::{Action, Matcher};
use modux_path::{get_in, Path};
use serde_json::{Map, Value};

use crate::reducer::{FlowEffect, ModuleReducer};
use crate::sequencer::{Sequencer, DEFAULT_STEP_CAP};

/// Token returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ListenerFn = Arc<dyn Fn(&Action) + Send + Sync>;

struct Listener {
    id: u64,
    matcher: Matcher,
    callback: ListenerFn,
}

struct Inner {
    state: Map<String, Value>,
    reducers: Vec<ModuleReducer>,
    listeners: Vec<Listener>,
    next_listener_id: u64,
}

/// Recover a usable guard from a poisoned lock: a panicking callback
/// must not wedge every later dispatch.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// The process-wide store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
    sequences: Arc<Mutex<Vec<JoinHandle<()>>>>,
    step_cap: usize,
}

impl Store {
    pub fn new() -> Store {
        Store::with_step_cap(DEFAULT_STEP_CAP)
    }

    /// A store whose async sequences abort after `step_cap` steps.
    pub fn with_step_cap(step_cap: usize) -> Store {
        Store {
            inner: Arc::new(Mutex::new(Inner {
                state: Map::new(),
                reducers: Vec::new(),
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
            sequences: Arc::new(Mutex::new(Vec::new())),
            step_cap,
        }
    }

    /// Register or replace the reducer for a namespace.
    ///
    /// The namespace's state is seeded with the module's initial state
    /// right away (unless an earlier registration left state behind),
    /// so reads before the first dispatch see the stable default.
    pub fn add_reducer(&self, reducer: ModuleReducer) {
        let mut inner = lock(&self.inner);
        let namespace = reducer.namespace().to_string();
        if !inner.state.contains_key(&namespace) {
            let initial = reducer.module().initial_state().clone();
            inner.state.insert(namespace.clone(), initial);
        }
        match inner
            .reducers
            .iter_mut()
            .find(|existing| existing.namespace() == namespace)
        {
            Some(slot) => *slot = reducer,
            None => inner.reducers.push(reducer),
        }
    }

    /// Remove a namespace's reducer. Its state subtree is left in
    /// place until [`Store::reset`].
    pub fn remove_reducer(&self, namespace: &str) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.reducers.len();
        inner.reducers.retain(|reducer| reducer.namespace() != namespace);
        inner.reducers.len() != before
    }

    /// Dispatch an action.
    ///
    /// Every registered reducer runs exactly once, in registration
    /// order, against its own namespace subtree. An action matched by
    /// nothing is a no-op. Listeners run after the state commit, and
    /// collected flows are scheduled once the store lock is released.
    pub fn dispatch(&self, action: Action) {
        log::debug!("dispatch {}", action.kind);
        let mut effects: Vec<FlowEffect> = Vec::new();
        let matched: Vec<ListenerFn> = {
            let mut guard = lock(&self.inner);
            let inner = &mut *guard;
            for reducer in &inner.reducers {
                let namespace = reducer.namespace().to_string();
                let previous = inner.state.get_mut(&namespace).map(std::mem::take);
                let next = reducer.reduce(previous, &action, &mut effects);
                inner.state.insert(namespace, next);
            }
            let candidates = Matcher::candidates(&action.action_type());
            inner
                .listeners
                .iter()
                .filter(|listener| candidates.contains(&listener.matcher))
                .map(|listener| Arc::clone(&listener.callback))
                .collect()
        };
        for listener in matched {
            listener(&action);
        }
        for effect in effects {
            self.schedule(effect);
        }
    }

    fn schedule(&self, effect: FlowEffect) {
        let sequencer = Sequencer::new(
            self.clone(),
            effect.namespace,
            effect.main_type,
            self.step_cap,
        );
        let handle = thread::spawn(move || sequencer.run(effect.flow));
        lock(&self.sequences).push(handle);
    }

    /// The whole state tree, namespaces as top-level keys.
    pub fn state(&self) -> Value {
        Value::Object(lock(&self.inner).state.clone())
    }

    /// One namespace's state subtree.
    pub fn state_of(&self, namespace: &str) -> Option<Value> {
        lock(&self.inner).state.get(namespace).cloned()
    }

    /// Resolve a dot-path query against current state.
    ///
    /// The first segment names the namespace; the rest is a path into
    /// its subtree (`"counter.count"`, `"todos.items[0].title"`). A
    /// bare namespace yields the whole subtree.
    pub fn select(&self, query: &str) -> Option<Value> {
        let (namespace, rest) = match query.split_once('.') {
            Some((namespace, rest)) => (namespace, Some(rest)),
            None => (query, None),
        };
        let subtree = self.state_of(namespace)?;
        match rest {
            None => Some(subtree),
            Some(rest) => get_in(&subtree, &Path::parse(rest)),
        }
    }

    /// Resolve several named queries at once; unresolved queries map to
    /// `Null`.
    pub fn select_map(&self, queries: &[(&str, &str)]) -> Map<String, Value> {
        queries
            .iter()
            .map(|(name, query)| {
                (
                    (*name).to_string(),
                    self.select(query).unwrap_or(Value::Null),
                )
            })
            .collect()
    }

    /// Subscribe a listener to dispatched actions.
    ///
    /// `selector` accepts the same forms as handler selectors (exact
    /// type, `"ns.action"`, `"@@ns/*"`, `"@@*/NAME"`, `"*"`). Listeners
    /// observe actions after reduction; they cannot change state.
    pub fn subscribe<F>(&self, selector: &str, listener: F) -> SubscriptionId
    where
        F: Fn(&Action) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push(Listener {
            id,
            matcher: Matcher::parse(selector),
            callback: Arc::new(listener),
        });
        SubscriptionId(id)
    }

    /// Drop a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.listeners.len();
        inner.listeners.retain(|listener| listener.id != id.0);
        inner.listeners.len() != before
    }

    /// Block until every in-flight async sequence has finished,
    /// including sequences those sequences started. A sequencer panic
    /// (runaway step cap) is propagated to the caller.
    pub fn wait_idle(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut sequences = lock(&self.sequences);
                sequences.drain(..).collect()
            };
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(panic) = handle.join() {
                    std::panic::resume_unwind(panic);
                }
            }
        }
    }

    /// Clean-slate hook for tests: drops all state, reducers, and
    /// listeners. Sequences already in flight dispatch into the empty
    /// store, where they match nothing.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        inner.state.clear();
        inner.reducers.clear();
        inner.listeners.clear();
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new()
    }
}
