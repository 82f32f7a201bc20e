//! Action wire format and the structured action-type parser.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::name::canonical_action_name;

/// Sub-action discriminator for async sequence progression.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum SubType {
    /// An intermediate state merge.
    Update,
    /// Normal termination; dispatched exactly once per sequence.
    Complete,
    /// Failed termination; dispatched exactly once per sequence.
    Error,
}

impl SubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubType::Update => "UPDATE",
            SubType::Complete => "COMPLETE",
            SubType::Error => "ERROR",
        }
    }

    fn parse(raw: &str) -> Option<SubType> {
        match raw {
            "UPDATE" => Some(SubType::Update),
            "COMPLETE" => Some(SubType::Complete),
            "ERROR" => Some(SubType::Error),
            _ => None,
        }
    }
}

impl fmt::Display for SubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured form of a dispatch identifier.
///
/// Canonical module-owned types render as `@@namespace/NAME` with an
/// optional `/UPDATE`, `/COMPLETE`, or `/ERROR` sub segment. Types
/// without the `@@` prefix are plain external actions: the whole string
/// is the name and there is no namespace.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ActionType {
    pub namespace: Option<String>,
    pub name: String,
    pub sub: Option<SubType>,
}

impl ActionType {
    /// Build the canonical type for a module-owned action, normalizing
    /// the name to SNAKE_UPPER.
    pub fn scoped(namespace: &str, name: &str) -> ActionType {
        ActionType {
            namespace: Some(namespace.to_string()),
            name: canonical_action_name(name),
            sub: None,
        }
    }

    /// Parse a raw type string.
    ///
    /// Only the three known sub-type suffixes split off a sub segment;
    /// any other trailing `/part` stays in the name, so the main type
    /// is always the longest `@@namespace/NAME` prefix.
    pub fn parse(raw: &str) -> ActionType {
        let Some(rest) = raw.strip_prefix("@@") else {
            return ActionType {
                namespace: None,
                name: raw.to_string(),
                sub: None,
            };
        };
        let (namespace, tail) = match rest.split_once('/') {
            Some((namespace, tail)) => (namespace, tail),
            None => (rest, ""),
        };
        let (name, sub) = match tail.rsplit_once('/') {
            Some((head, last)) => match SubType::parse(last) {
                Some(sub) => (head.to_string(), Some(sub)),
                None => (tail.to_string(), None),
            },
            None => (tail.to_string(), None),
        };
        ActionType {
            namespace: Some(namespace.to_string()),
            name,
            sub,
        }
    }

    /// The main type: this type with any sub segment stripped.
    #[must_use]
    pub fn main(&self) -> ActionType {
        ActionType {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            sub: None,
        }
    }

    /// This type with the given sub segment attached.
    #[must_use]
    pub fn with_sub(&self, sub: SubType) -> ActionType {
        ActionType {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            sub: Some(sub),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "@@{}", namespace)?;
            if !self.name.is_empty() {
                write!(f, "/{}", self.name)?;
            }
        } else {
            f.write_str(&self.name)?;
        }
        if let Some(sub) = self.sub {
            write!(f, "/{}", sub)?;
        }
        Ok(())
    }
}

/// A dispatched event.
///
/// `payload` holds named fields reconstructed from the declared
/// parameter names of the target action (introspection and sub-action
/// merges); `args` holds the raw positional arguments, which are the
/// authoritative data for callbacks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Action {
    pub fn new(kind: impl Into<String>) -> Action {
        Action {
            kind: kind.into(),
            payload: Map::new(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Action {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Action {
        self.args = args;
        self
    }

    /// Parse this action's type string.
    pub fn action_type(&self) -> ActionType {
        ActionType::parse(&self.kind)
    }

    /// First positional argument, if any.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

/// Zip declared parameter names over positional arguments.
///
/// Surplus arguments are dropped from the payload (they remain in
/// `args`); missing ones are simply absent.
pub fn zip_payload(arg_names: &[String], args: &[Value]) -> Map<String, Value> {
    arg_names
        .iter()
        .zip(args.iter())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
