//! Path type with dot, index, and wildcard segments.

use std::fmt;

/// One segment of a [`Path`].
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Segment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
    /// Every key or index at this level.
    Wildcard,
}

/// A parsed query path.
///
/// # Path syntax
///
/// - Segments are separated by `.`: `foo.bar`
/// - Array indices use brackets (`foo[2].bar`) or a bare numeric
///   segment (`foo.2.bar`); both parse to [`Segment::Index`]
/// - A `*` segment matches every key or index at that level
/// - Empty segments are ignored (normalizes `foo..bar` and trailing `.`)
///
/// Malformed paths are not validated: bracket text that does not parse
/// as an index is kept as a literal key, and an unterminated bracket is
/// folded into the preceding key text.
///
/// # Examples
///
/// ```rust
/// use modux_path::{Path, Segment};
///
/// let path = Path::parse("todos[0].title");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.segments()[1], Segment::Index(0));
///
/// assert_eq!(Path::parse("a.b."), Path::parse("a.b"));
/// ```
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parse a path string.
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        for piece in raw.split('.') {
            Self::parse_piece(piece, &mut segments);
        }
        Path { segments }
    }

    /// Split one dot-separated piece into key and bracket segments.
    fn parse_piece(piece: &str, segments: &mut Vec<Segment>) {
        if piece.is_empty() {
            return;
        }
        let mut rest = piece;
        loop {
            match rest.find('[') {
                None => {
                    if !rest.is_empty() {
                        segments.push(Self::classify(rest));
                    }
                    return;
                }
                Some(open) => {
                    let head = &rest[..open];
                    match rest[open..].find(']') {
                        None => {
                            // Unterminated bracket: keep the text literally.
                            segments.push(Self::classify(rest));
                            return;
                        }
                        Some(close) => {
                            if !head.is_empty() {
                                segments.push(Self::classify(head));
                            }
                            let body = &rest[open + 1..open + close];
                            match body.parse::<usize>() {
                                Ok(index) => segments.push(Segment::Index(index)),
                                Err(_) => {
                                    if !body.is_empty() {
                                        segments.push(Self::classify(body));
                                    }
                                }
                            }
                            rest = &rest[open + close + 1..];
                        }
                    }
                }
            }
        }
    }

    fn classify(text: &str) -> Segment {
        if text == "*" {
            return Segment::Wildcard;
        }
        match text.parse::<usize>() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Key(text.to_string()),
        }
    }

    /// Create a path from pre-built segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Path { segments }
    }

    /// The parsed segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Check if this path is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::Wildcard => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "*")?;
                }
            }
        }
        Ok(())
    }
}

/// Macro for building paths from literals.
///
/// # Example
///
/// ```rust
/// use modux_path::path;
///
/// let p = path!("users[0].name");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s)
    };
}
