//! Path addressing for JSON value trees.
//!
//! This crate is the leaf layer of modux: a small query language over
//! `serde_json::Value` used by the reducer engine to merge path-keyed
//! state fragments.
//!
//! - `Path`: parsed dot/bracket/wildcard query paths
//! - `get_in` / `set_in` / `map_in` / `delete_in`: query operations
//!
//! # Example
//!
//! ```rust
//! use modux_path::{get_in, path};
//! use serde_json::json;
//!
//! let tree = json!({"foo": [{"fiz": "baz"}, {"fiz": "buzz"}]});
//! let values = get_in(&tree, &path!("foo.*.fiz")).unwrap();
//! assert_eq!(values, json!(["baz", "buzz"]));
//! ```

mod path;
mod query;

pub use path::{Path, Segment};
pub use query::{delete_in, get_in, map_in, set_in};
