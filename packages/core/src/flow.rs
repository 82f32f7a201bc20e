//! Resumable multi-step callbacks.
//!
//! An asynchronous state transition is a *flow*: a paused computation
//! the engine advances one step at a time. Each step yields either a
//! state fragment (merged immediately, visible to observers before the
//! next step runs) or work to await; awaited results are fed back in on
//! the next resume. The engine depends only on the narrow [`Flow`]
//! trait, so a flow can be a hand-rolled state machine or a closure
//! wrapped in [`FnFlow`].

use serde_json::Value;

use crate::error::FlowError;

/// A deferred computation awaited by the sequencer.
///
/// Runs on the sequence's own thread; the result (or failure) resumes
/// the flow. This is the engine's rendition of an awaited promise.
pub type Task = Box<dyn FnOnce() -> Result<Value, FlowError> + Send>;

/// A fragment computed from the owning namespace's latest state.
///
/// The returned value is merged like any fragment: a JSON object whose
/// top-level keys are path expressions. A non-object return merges
/// nothing.
pub type Updater = Box<dyn FnOnce(&Value) -> Value + Send>;

/// One value yielded by a flow between suspension points.
pub enum Yielded {
    /// A path-keyed partial state, merged via an `UPDATE` sub-action
    /// before the flow resumes. Expected to be a JSON object whose
    /// top-level keys are path expressions; anything else merges
    /// nothing.
    Fragment(Value),
    /// Like `Fragment`, but resolved against the namespace's latest
    /// state at merge time.
    Updater(Updater),
    /// A single awaited computation; its result resumes the flow.
    Task(Task),
    /// Several computations awaited together. All results resume the
    /// flow as one array in original order; the first failure by
    /// position resumes it as an error instead.
    Join(Vec<Task>),
}

/// What one call to [`Flow::next`] produced.
pub enum Step {
    Yield(Yielded),
    Done,
}

/// The value fed into a flow when it resumes.
#[derive(Clone, Debug, PartialEq)]
pub enum Resume {
    /// No input: at sequence start and after a state-fragment yield.
    Start,
    /// The result of an awaited task (or array of tasks).
    Value(Value),
    /// An awaited task failed. The sequence is *not* terminated: the
    /// flow decides whether to recover or stop.
    Error(FlowError),
}

/// A paused, resumable multi-step computation bound to one in-flight
/// action.
pub trait Flow: Send {
    /// Advance to the next step.
    ///
    /// Returning `Err` is the uncaught-failure path: the engine
    /// terminates the sequence with an `ERROR` sub-action carrying the
    /// error's message.
    fn next(&mut self, input: Resume) -> Result<Step, FlowError>;

    /// Advance the flow to its finished state without running further
    /// steps. The engine never calls this; external drivers that
    /// abandon a sequence may.
    fn cancel(&mut self) {}
}

/// A flow built from a closure over `(input, step index)`.
///
/// The step index starts at 0 and increments on every resume, which is
/// usually all the state a short sequence needs.
///
/// # Example
///
/// ```rust
/// use modux_core::{FnFlow, Resume, Step, Yielded};
/// use serde_json::json;
///
/// let flow = FnFlow::new(|_input, step| {
///     Ok(match step {
///         0 => Step::Yield(Yielded::Task(Box::new(|| Ok(json!("data"))))),
///         _ => Step::Done,
///     })
/// });
/// # let _ = flow;
/// ```
pub struct FnFlow<F> {
    step: usize,
    f: F,
}

impl<F> FnFlow<F>
where
    F: FnMut(Resume, usize) -> Result<Step, FlowError> + Send,
{
    pub fn new(f: F) -> Self {
        FnFlow { step: 0, f }
    }
}

impl<F> Flow for FnFlow<F>
where
    F: FnMut(Resume, usize) -> Result<Step, FlowError> + Send,
{
    fn next(&mut self, input: Resume) -> Result<Step, FlowError> {
        let step = self.step;
        self.step += 1;
        (self.f)(input, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fn_flow_counts_steps() {
        let mut flow = FnFlow::new(|input, step| {
            Ok(match step {
                0 => {
                    assert_eq!(input, Resume::Start);
                    Step::Yield(Yielded::Fragment(json!({"status": "busy"})))
                }
                1 => Step::Done,
                _ => unreachable!("flow resumed past completion"),
            })
        });

        assert!(matches!(
            flow.next(Resume::Start),
            Ok(Step::Yield(Yielded::Fragment(_)))
        ));
        assert!(matches!(flow.next(Resume::Start), Ok(Step::Done)));
    }

    #[test]
    fn fn_flow_receives_resumed_values() {
        let mut flow = FnFlow::new(|input, step| {
            Ok(match step {
                0 => Step::Yield(Yielded::Task(Box::new(|| Ok(json!(7))))),
                1 => {
                    assert_eq!(input, Resume::Value(json!(7)));
                    Step::Done
                }
                _ => unreachable!(),
            })
        });

        let Ok(Step::Yield(Yielded::Task(task))) = flow.next(Resume::Start) else {
            panic!("expected a task yield");
        };
        let value = task().unwrap();
        assert!(matches!(flow.next(Resume::Value(value)), Ok(Step::Done)));
    }

    #[test]
    fn fn_flow_propagates_failures() {
        let mut flow: FnFlow<_> =
            FnFlow::new(|_input, _step| -> Result<Step, FlowError> { Err("boom".into()) });
        match flow.next(Resume::Start) {
            Err(error) => assert_eq!(error, FlowError::new("boom")),
            Ok(_) => panic!("expected failure"),
        }
    }
}
