//! Name normalization for action types.
//!
//! User-facing action names arrive in any case or separator style and
//! normalize to a canonical SNAKE_UPPER form, so `"add item"`,
//! `"add-item"`, `"addItem"`, and `"ADD_ITEM"` all address the same
//! action.

/// Split a raw name into words.
///
/// Runs of `_`, `-`, and spaces break words, as do camelCase
/// boundaries. A fully-uppercase input is lowercased first so `"FOO"`
/// becomes the single word `foo` rather than splitting per letter.
fn split_words(raw: &str) -> Vec<String> {
    let has_alpha = raw.chars().any(|c| c.is_alphabetic());
    let all_upper = has_alpha
        && raw
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase());
    let source = if all_upper {
        raw.to_lowercase()
    } else {
        raw.to_string()
    };

    let chars: Vec<char> = source.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // Break at aB and at the last capital of an acronym run (ABc).
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert a raw name to camelCase.
///
/// # Examples
///
/// ```rust
/// use modux_core::to_camel_case;
///
/// assert_eq!(to_camel_case("add item"), "addItem");
/// assert_eq!(to_camel_case("ADD_ITEM"), "addItem");
/// assert_eq!(to_camel_case("addItem"), "addItem");
/// assert_eq!(to_camel_case("FOO"), "foo");
/// ```
pub fn to_camel_case(raw: &str) -> String {
    let mut out = String::new();
    for (i, word) in split_words(raw).iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// Convert a raw name to SNAKE_UPPER.
///
/// # Examples
///
/// ```rust
/// use modux_core::to_snake_upper;
///
/// assert_eq!(to_snake_upper("addItem"), "ADD_ITEM");
/// assert_eq!(to_snake_upper("add item"), "ADD_ITEM");
/// assert_eq!(to_snake_upper("HTTPServer"), "HTTP_SERVER");
/// ```
pub fn to_snake_upper(raw: &str) -> String {
    split_words(raw)
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Normalize a raw action name to its canonical SNAKE_UPPER form.
///
/// This is the composition the action-type synthesis uses:
/// camelize first (collapsing arbitrary separator styles), then
/// SNAKE_UPPER the result.
pub fn canonical_action_name(raw: &str) -> String {
    to_snake_upper(&to_camel_case(raw))
}
