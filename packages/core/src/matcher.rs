//! Handler binding selectors.
//!
//! A handler subscribes to dispatched actions through a selector
//! string. Selectors cover a precedence ladder from exact types down to
//! a catch-all, so one namespace can react to a specific foreign
//! action, to everything a namespace dispatches, to one action name
//! wherever it comes from, or to every action.

use std::fmt;

use crate::action::ActionType;

/// A resolved handler selector.
///
/// Parsed forms, in match precedence order:
///
/// 1. `Exact`: a literal action type (`"SOME_ACTION"`,
///    `"@@other/SOME_ACTION"`), or the `"otherNamespace.actionName"`
///    dot form resolved to that namespace's canonical type.
/// 2. `Namespace`: any action from one namespace via `"@@ns"`,
///    `"@@ns/"`, or `"@@ns/*"`.
/// 3. `Name`: the same action name from any namespace via `"@@*/NAME"`
///    or `"*/NAME"`.
/// 4. `CatchAll`: `"*"`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Matcher {
    Exact(String),
    Namespace(String),
    Name(String),
    CatchAll,
}

impl Matcher {
    /// Parse a handler selector.
    ///
    /// A string that fits none of the alias forms (including a dotted
    /// string that does not parse as `namespace.action`) is treated as
    /// a literal action type.
    pub fn parse(selector: &str) -> Matcher {
        if selector == "*" {
            return Matcher::CatchAll;
        }
        if let Some(name) = selector.strip_prefix("@@*/") {
            return Matcher::Name(name.to_string());
        }
        if let Some(name) = selector.strip_prefix("*/") {
            return Matcher::Name(name.to_string());
        }
        if let Some(rest) = selector.strip_prefix("@@") {
            return match rest.split_once('/') {
                None => Matcher::Namespace(rest.to_string()),
                Some((namespace, "")) | Some((namespace, "*")) => {
                    Matcher::Namespace(namespace.to_string())
                }
                Some(_) => Matcher::Exact(selector.to_string()),
            };
        }
        if let Some((namespace, name)) = selector.split_once('.') {
            if !namespace.is_empty() && !name.is_empty() && !name.contains('.') {
                return Matcher::Exact(ActionType::scoped(namespace, name).to_string());
            }
        }
        Matcher::Exact(selector.to_string())
    }

    /// The ordered candidate matchers for an incoming action type.
    ///
    /// A handler table is probed with each candidate in turn; the first
    /// hit wins. The exact candidate uses the full type string, so
    /// sub-typed actions only match exact selectors that spell the sub
    /// segment out; wildcard forms still see them.
    pub fn candidates(ty: &ActionType) -> Vec<Matcher> {
        let mut out = vec![Matcher::Exact(ty.to_string())];
        if let Some(namespace) = &ty.namespace {
            out.push(Matcher::Namespace(namespace.clone()));
        }
        if !ty.name.is_empty() {
            out.push(Matcher::Name(ty.name.clone()));
        }
        out.push(Matcher::CatchAll);
        out
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(ty) => f.write_str(ty),
            Matcher::Namespace(namespace) => write!(f, "@@{}/*", namespace),
            Matcher::Name(name) => write!(f, "@@*/{}", name),
            Matcher::CatchAll => f.write_str("*"),
        }
    }
}
