//! Core modux: the declarative state-module data model.
//!
//! This layer defines everything a module declares and everything the
//! engine dispatches:
//! - `Action` / `ActionType` / `SubType`: the wire format and its
//!   structured parser
//! - `Matcher`: handler binding selectors, including cross-namespace
//!   and wildcard forms
//! - `Flow` / `Step` / `Yielded`: resumable multi-step callbacks
//! - `Module`: a namespace's initial state, actions, and handlers
//!
//! The engine layer (`modux-engine`) turns modules into reducers and
//! drives flows to completion; this crate has no execution machinery.

mod action;
mod error;
mod flow;
mod matcher;
mod module;
mod name;

pub use action::{zip_payload, Action, ActionType, SubType};
pub use error::{ConfigError, FlowError};
pub use flow::{FnFlow, Flow, Resume, Step, Task, Updater, Yielded};
pub use matcher::Matcher;
pub use module::{Callback, Module, Outcome};
pub use name::{canonical_action_name, to_camel_case, to_snake_upper};
