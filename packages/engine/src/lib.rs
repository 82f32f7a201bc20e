//! The modux engine: reducers, the shared store, and async sequencing.
//!
//! This layer executes what `modux-core` declares:
//! - `ModuleReducer`: interprets incoming action types for one
//!   namespace and merges callback results into its state
//! - `Store`: the single shared state tree, reducer registry, and
//!   listener table; serializes every dispatch
//! - `Sequencer`: drives a module's multi-step flows to completion
//!   through synthetic `UPDATE`/`COMPLETE`/`ERROR` sub-actions
//! - `Dispatcher`: normalizes the supported dispatch call shapes
//! - `Runtime`: the process-wide registry tying it all together
//!
//! # Example
//!
//! ```rust
//! use modux_core::{Module, Outcome};
//! use modux_engine::Runtime;
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
//! runtime.dispatcher().dispatch_named("counter.increment", vec![]);
//! assert_eq!(runtime.store().select("counter.count"), Some(json!(1)));
//! ```

mod dispatch;
mod reducer;
mod runtime;
mod sequencer;
mod store;

pub use dispatch::Dispatcher;
pub use reducer::{merge_fragment, FlowEffect, ModuleReducer};
pub use runtime::Runtime;
pub use sequencer::{Sequencer, DEFAULT_STEP_CAP};
pub use store::{Store, SubscriptionId};
