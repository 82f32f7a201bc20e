//! modux: modular state management.
//!
//! Declarative state modules over one shared store. Each module owns a
//! namespace of the state tree and declares *actions* (user-triggered
//! transitions) and *handlers* (reactions to any dispatched action,
//! including other namespaces'). Transitions are synchronous fragment
//! merges or multi-step asynchronous flows driven through synthetic
//! `UPDATE`/`COMPLETE`/`ERROR` sub-actions.
//!
//! This crate is a facade over the layered workspace:
//! - [`modux_path`]: dot/bracket/wildcard path addressing
//! - [`modux_core`]: the module/action/flow data model
//! - [`modux_engine`]: the reducer engine, store, and runtime
//!
//! # Example
//!
//! ```rust
//! use modux::{Module, Outcome, Runtime};
//! use serde_json::json;
//!
//! let runtime = Runtime::new();
//! runtime.register(
//!     Module::new("counter")
//!         .unwrap()
//!         .with_state(json!({"count": 0}))
//!         .action("increment", &[], |_| {
//!             Outcome::updater(|prev| {
//!                 json!({"count": prev["count"].as_i64().unwrap_or(0) + 1})
//!             })
//!         }),
//! );
//!
//! let counter = runtime.scoped_dispatcher("counter");
//! counter.dispatch_named("increment", vec![]);
//! counter.dispatch_named("increment", vec![]);
//! assert_eq!(runtime.store().select("counter.count"), Some(json!(2)));
//! ```

pub use modux_core::{
    canonical_action_name, to_camel_case, to_snake_upper, zip_payload, Action, ActionType,
    Callback, ConfigError, FlowError, FnFlow, Flow, Matcher, Module, Outcome, Resume, Step,
    SubType, Task, Updater, Yielded,
};
pub use modux_engine::{
    merge_fragment, Dispatcher, FlowEffect, ModuleReducer, Runtime, Sequencer, Store,
    SubscriptionId, DEFAULT_STEP_CAP,
};
pub use modux_path::{delete_in, get_in, map_in, path, set_in, Path, Segment};
