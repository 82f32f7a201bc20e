//! Drives async flows to completion.
//!
//! One sequencer owns one in-flight flow, bound to the action that
//! started it. It runs on its own background thread: each yielded
//! fragment becomes an `UPDATE` sub-action dispatched before the flow
//! resumes (so observers see intermediate states), each yielded task is
//! executed and its result fed back in, and the sequence ends with
//! exactly one `COMPLETE` or `ERROR`. Independent sequences interleave
//! freely; sub-action ordering is only guaranteed within one sequence.

use modux_core::{Action, ActionType, Flow, FlowError, Resume, Step, SubType, Yielded};
use serde_json::{Map, Value};

use crate::store::Store;

/// Default bound on steps per sequence before it is treated as a
/// runaway.
pub const DEFAULT_STEP_CAP: usize = 1000;

/// Drives one flow, dispatching its sub-actions through the store.
pub struct Sequencer {
    store: Store,
    namespace: String,
    main_type: ActionType,
    max_steps: usize,
}

impl Sequencer {
    pub fn new(
        store: Store,
        namespace: String,
        main_type: ActionType,
        max_steps: usize,
    ) -> Sequencer {
        Sequencer {
            store,
            namespace,
            main_type,
            max_steps,
        }
    }

    /// Run the flow to completion.
    ///
    /// A flow that exceeds the step cap is a programming defect (an
    /// infinite yield loop), not a recoverable failure: this panics
    /// rather than dispatching `ERROR`. The panic surfaces through
    /// [`Store::wait_idle`].
    pub fn run(self, mut flow: Box<dyn Flow>) {
        let mut input = Resume::Start;
        let mut steps = 0usize;
        loop {
            steps += 1;
            if steps > self.max_steps {
                log::error!(
                    "async sequence for {} exceeded {} steps without completing",
                    self.main_type,
                    self.max_steps
                );
                panic!("runaway async sequence for {}", self.main_type);
            }
            input = match flow.next(input) {
                Err(error) => {
                    let mut payload = Map::new();
                    payload.insert("message".to_string(), Value::String(error.message));
                    self.dispatch_sub(SubType::Error, payload);
                    return;
                }
                Ok(Step::Done) => {
                    self.dispatch_sub(SubType::Complete, Map::new());
                    return;
                }
                Ok(Step::Yield(Yielded::Fragment(fragment))) => {
                    self.dispatch_update(fragment);
                    Resume::Start
                }
                Ok(Step::Yield(Yielded::Updater(resolve))) => {
                    let latest = self
                        .store
                        .state_of(&self.namespace)
                        .unwrap_or(Value::Null);
                    self.dispatch_update(resolve(&latest));
                    Resume::Start
                }
                Ok(Step::Yield(Yielded::Task(task))) => match task() {
                    Ok(value) => Resume::Value(value),
                    Err(error) => Resume::Error(error),
                },
                Ok(Step::Yield(Yielded::Join(tasks))) => {
                    let mut values = Vec::with_capacity(tasks.len());
                    let mut failure: Option<FlowError> = None;
                    for task in tasks {
                        match task() {
                            Ok(value) => values.push(value),
                            Err(error) => {
                                failure = Some(error);
                                break;
                            }
                        }
                    }
                    match failure {
                        Some(error) => Resume::Error(error),
                        None => Resume::Value(Value::Array(values)),
                    }
                }
            };
        }
    }

    fn dispatch_update(&self, fragment: Value) {
        let payload = match fragment {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.dispatch_sub(SubType::Update, payload);
    }

    fn dispatch_sub(&self, sub: SubType, payload: Map<String, Value>) {
        let kind = self.main_type.with_sub(sub).to_string();
        self.store.dispatch(Action::new(kind).with_payload(payload));
    }
}
