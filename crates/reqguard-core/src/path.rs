//! # Paths
//!
//! Two unrelated notions of "path" live here:
//!
//! - [`PathTemplate`] — the declared route, e.g. `/users/{user_id}/posts`,
//!   and the ordered placeholder names it binds.
//! - [`FieldPath`] — the address of a value inside one request location,
//!   e.g. `nested.items.0`. Rendered with `.` between segments.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DeclarationError;

// -- Route templates ----------------------------------------------------------

/// A declared route template with named placeholders.
///
/// Accepts `{name}`, `{*name}` (wildcard) and `:name` placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    placeholders: Vec<String>,
}

impl PathTemplate {
    /// Parse a template, collecting its placeholders in declared order.
    pub fn parse(template: impl Into<String>) -> Result<Self, DeclarationError> {
        let raw = template.into();
        let invalid = |reason: &str| DeclarationError::InvalidPathTemplate {
            template: raw.clone(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut placeholders = Vec::new();
        for segment in raw.split('/').skip(1) {
            let name = if let Some(inner) = segment.strip_prefix('{') {
                let inner = inner
                    .strip_suffix('}')
                    .ok_or_else(|| invalid("unterminated '{' placeholder"))?;
                Some(inner.strip_prefix('*').unwrap_or(inner))
            } else if let Some(rest) = segment.strip_prefix(':') {
                Some(rest)
            } else if segment.contains('{') || segment.contains('}') {
                return Err(invalid("placeholders must span a whole segment"));
            } else {
                None
            };

            if let Some(name) = name {
                if name.is_empty() {
                    return Err(invalid("empty placeholder name"));
                }
                if placeholders.iter().any(|p| p == name) {
                    return Err(invalid(&format!("placeholder '{name}' appears twice")));
                }
                placeholders.push(name.to_string());
            }
        }

        Ok(Self { raw, placeholders })
    }

    /// The template exactly as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in the order they appear in the template.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// The template in `{name}` placeholder spelling.
    pub fn canonical(&self) -> Cow<'_, str> {
        canonical_route(&self.raw)
    }
}

/// Rewrite `:name` placeholder segments as `{name}`.
///
/// Routers report matched routes in one spelling or the other; cache keys
/// always use the braced form.
pub fn canonical_route(route: &str) -> Cow<'_, str> {
    if !route.contains("/:") {
        return Cow::Borrowed(route);
    }
    let rewritten = route
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");
    Cow::Owned(rewritten)
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = DeclarationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for PathTemplate {
    type Error = DeclarationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.raw
    }
}

// -- Field paths --------------------------------------------------------------

/// One step into a value: an object key or an array index.
///
/// Paths decoded from a JSON Pointer only ever hold keys; an array parent
/// reads a key as its decimal index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object member name, or raw pointer token.
    Key(String),
    /// Zero-based array position.
    Index(usize),
}

impl PathSegment {
    /// The array position this segment addresses, if it can address one.
    ///
    /// RFC 6901 array tokens are `0` or a digit string without leading
    /// zeros; `"01"` is only ever an object key.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(key) => {
                let canonical = key == "0"
                    || (!key.is_empty()
                        && !key.starts_with('0')
                        && key.bytes().all(|b| b.is_ascii_digit()));
                if canonical {
                    key.parse().ok()
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Root-relative address of a value within one request location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The location root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Decode an RFC 6901 JSON Pointer (`/nested/items/0`).
    ///
    /// Every token is kept as a [`PathSegment::Key`] with its exact text; a
    /// pointer alone cannot tell `"01"` the object key from an array index.
    /// Schema lookups decide by the parent node.
    pub fn from_json_pointer(pointer: &str) -> Self {
        let segments = pointer
            .split('/')
            .skip(1)
            .map(|token| PathSegment::Key(token.replace("~1", "/").replace("~0", "~")))
            .collect();
        Self(segments)
    }

    /// True for the location root itself.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// A new path one key deeper.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(key.into()));
        next
    }

    /// A new path one array index deeper.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
