//! Spans and labeled annotations.
//!
//! An [`Annotation`] is a half-open character range plus a label. On the wire
//! it is the triple `[start, end, "LABEL"]`:
//!
//! ```
//! use tagspan_core::{Annotation, Span};
//!
//! let ann: Annotation = serde_json::from_str(r#"[0, 3, "PERSON"]"#).unwrap();
//! assert_eq!(ann.span, Span::new(0, 3));
//! assert_eq!(ann.label, "PERSON");
//! assert_eq!(serde_json::to_string(&ann).unwrap(), r#"[0,3,"PERSON"]"#);
//! ```
//!
//! # Identity
//!
//! Two annotations are identical iff `(start, end, label)` all match. The same
//! span may carry several different labels at once; each is a separate
//! annotation with its own [`AnnotationKey`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Character offset (start, inclusive)
    pub start: usize,
    /// Character offset (end, exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span without validation.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span, rejecting empty or inverted ranges.
    pub fn try_new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length in characters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if `other` lies entirely within this span.
    #[must_use]
    pub const fn contains_span(&self, other: &Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Check if the two spans share at least one character.
    #[must_use]
    pub const fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Character range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Identity key of an annotation: `(start, end, label)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationKey {
    /// Character offset (start, inclusive)
    pub start: usize,
    /// Character offset (end, exclusive)
    pub end: usize,
    /// Label name
    pub label: String,
}

impl std::fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.start, self.end, self.label)
    }
}

/// A labeled span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize, String)", into = "(usize, usize, String)")]
pub struct Annotation {
    /// Covered character range
    pub span: Span,
    /// Label name, e.g. `"PERSON"`
    pub label: String,
}

impl Annotation {
    /// Create an annotation, validating the span and the label.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSpan`] for empty or inverted spans and
    /// [`Error::InvalidInput`] for an empty label.
    pub fn new(span: Span, label: impl Into<String>) -> Result<Self> {
        let span = Span::try_new(span.start, span.end)?;
        let label = label.into();
        if label.trim().is_empty() {
            return Err(Error::invalid_input("annotation label must not be empty"));
        }
        Ok(Self { span, label })
    }

    /// Start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.span.start
    }

    /// End offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.end
    }

    /// Identity key.
    #[must_use]
    pub fn key(&self) -> AnnotationKey {
        AnnotationKey {
            start: self.span.start,
            end: self.span.end,
            label: self.label.clone(),
        }
    }

    /// Check identity against a span and label without allocating a key.
    #[must_use]
    pub fn is(&self, span: Span, label: &str) -> bool {
        self.span == span && self.label == label
    }

    /// Build an annotation from raw JSON.
    ///
    /// Accepts both the stored triple form `[start, end, "LABEL"]` and the
    /// object form `{"start": .., "end": .., "label": ..}`. The value is
    /// validated like [`Annotation::new`].
    ///
    /// ```
    /// use tagspan_core::Annotation;
    /// use serde_json::json;
    ///
    /// let a = Annotation::from_raw(&json!([8, 13, "PERSON"])).unwrap();
    /// let b = Annotation::from_raw(&json!({"start": 8, "end": 13, "label": "PERSON"})).unwrap();
    /// assert_eq!(a, b);
    /// assert!(Annotation::from_raw(&json!("PERSON")).is_err());
    /// ```
    pub fn from_raw(value: &serde_json::Value) -> Result<Self> {
        let (start, end, label) = match value {
            serde_json::Value::Array(items) if items.len() == 3 => {
                (items[0].as_u64(), items[1].as_u64(), items[2].as_str())
            }
            serde_json::Value::Object(map) => (
                map.get("start").and_then(serde_json::Value::as_u64),
                map.get("end").and_then(serde_json::Value::as_u64),
                map.get("label").and_then(serde_json::Value::as_str),
            ),
            other => {
                return Err(Error::parse(format!(
                    "expected [start, end, label] or {{start, end, label}}, got {}",
                    other
                )))
            }
        };
        match (start, end, label) {
            (Some(start), Some(end), Some(label)) => {
                Self::new(Span::new(start as usize, end as usize), label)
            }
            _ => Err(Error::parse(format!("malformed annotation: {}", value))),
        }
    }
}

impl TryFrom<(usize, usize, String)> for Annotation {
    type Error = Error;

    fn try_from((start, end, label): (usize, usize, String)) -> Result<Self> {
        Self::new(Span::new(start, end), label)
    }
}

impl From<Annotation> for (usize, usize, String) {
    fn from(a: Annotation) -> Self {
        (a.span.start, a.span.end, a.label)
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.span)
    }
}
