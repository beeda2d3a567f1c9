//! Annotation store for one subject (a document plus one annotator's view).
//!
//! The store owns the document's token sequence and a list of annotations,
//! and keeps a **token index**: for every annotation, the range of token
//! indices it covers. The index answers the two rendering queries:
//!
//! - [`AnnotationStore::annotations_touching`]: which annotations cover token T
//! - [`AnnotationStore::tokens_in`]: which tokens an annotation covers
//!
//! # Index layout
//!
//! ```text
//! tokens        Bob  ␠  met  ␠  Alice
//!               0    1  2    3  4
//!
//! annotations   [0]  (0, 3,  PERSON)    index[0] = 0..1
//!               [1]  (8, 13, PERSON)    index[1] = 4..5
//!               [2]  (0, 13, EVENT)     index[2] = 0..5
//! ```
//!
//! `index` is parallel to `annotations`: entry `i` always describes
//! annotation `i`, so removing an annotation removes its index entry in the
//! same step and no stale entry can survive.
//!
//! # Alignment
//!
//! Every stored annotation starts on a token start and ends on a token end.
//! Misaligned spans are rejected with [`Error::Misaligned`]. Bulk setters
//! validate everything before touching state: a failed call changes nothing.
//!
//! # Change notification
//!
//! Mutations do not notify on their own. The caller decides when a batch of
//! edits is complete and calls [`AnnotationStore::emit_changed`].

use crate::error::{Error, Result};
use crate::notify::{SubscriptionId, Subscribers};
use std::ops::Range;
use tagspan_core::{Annotation, Span, Token};

/// Tokens and annotations of one subject, plus the token index.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    tokens: Vec<Token>,
    annotations: Vec<Annotation>,
    /// Token index range per annotation, parallel to `annotations`.
    index: Vec<Range<usize>>,
    revision: u64,
    subscribers: Subscribers<[Annotation]>,
}

impl AnnotationStore {
    /// Create an empty store (no tokens, no annotations).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over a token sequence with no annotations.
    #[must_use]
    pub fn with_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            ..Self::default()
        }
    }

    /// (Re)initialize the subject with a fresh token sequence and annotations.
    ///
    /// # Errors
    /// [`Error::Misaligned`] if any annotation does not align to the new
    /// tokens. The store is left unchanged in that case.
    pub fn set_tokens_and_annotations(
        &mut self,
        tokens: Vec<Token>,
        annotations: Vec<Annotation>,
    ) -> Result<()> {
        let index = build_index(&tokens, &annotations)?;
        self.tokens = tokens;
        self.annotations = annotations;
        self.index = index;
        self.bump();
        log::debug!(
            "store reset: {} tokens, {} annotations",
            self.tokens.len(),
            self.annotations.len()
        );
        Ok(())
    }

    /// Replace the annotation set, keeping the tokens.
    ///
    /// Used when switching whose annotations are displayed.
    ///
    /// # Errors
    /// [`Error::Misaligned`] if any annotation does not align. The store is
    /// left unchanged in that case.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) -> Result<()> {
        let index = build_index(&self.tokens, &annotations)?;
        self.annotations = annotations;
        self.index = index;
        self.bump();
        Ok(())
    }

    /// Recompute the token index for every annotation.
    pub fn rebuild_index(&mut self) {
        self.index = self
            .annotations
            .iter()
            .map(|a| {
                locate(&self.tokens, a.span).unwrap_or_else(|| {
                    log::warn!("annotation {} no longer aligns; indexing it as empty", a);
                    0..0
                })
            })
            .collect();
    }

    /// Insert `(span, label)` unless an identical annotation exists.
    ///
    /// Returns `Ok(false)` for the duplicate no-op. An annotation with the same
    /// span but a different label is a separate entry and is added.
    ///
    /// # Errors
    /// - [`Error::Core`] for an empty span or blank label
    /// - [`Error::Misaligned`] if the span does not align to token boundaries
    pub fn add_or_update(&mut self, span: Span, label: &str) -> Result<bool> {
        if self.contains(span, label) {
            return Ok(false);
        }
        let annotation = Annotation::new(span, label)?;
        let range = locate(&self.tokens, span).ok_or_else(|| Error::misaligned(span))?;
        log::debug!("add {} -> tokens {:?}", annotation, range);
        self.annotations.push(annotation);
        self.index.push(range);
        self.bump();
        Ok(true)
    }

    /// [`add_or_update`](Self::add_or_update) for an existing value.
    pub fn add(&mut self, annotation: &Annotation) -> Result<bool> {
        self.add_or_update(annotation.span, &annotation.label)
    }

    /// Remove the first annotation matching `(span, label)` exactly.
    ///
    /// Returns whether a removal occurred.
    pub fn remove(&mut self, span: Span, label: &str) -> bool {
        match self.position(span, label) {
            Some(i) => {
                let removed = self.annotations.remove(i);
                self.index.remove(i);
                self.bump();
                log::debug!("remove {}", removed);
                true
            }
            None => false,
        }
    }

    /// [`remove`](Self::remove) for an existing value.
    pub fn remove_annotation(&mut self, annotation: &Annotation) -> bool {
        self.remove(annotation.span, &annotation.label)
    }

    /// Remove every annotation and clear the index.
    pub fn remove_all(&mut self) {
        self.annotations.clear();
        self.index.clear();
        self.bump();
    }

    /// Drop tokens and annotations. Subscribers stay registered.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.annotations.clear();
        self.index.clear();
        self.bump();
    }

    /// Token sequence.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token at `index`.
    #[must_use]
    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Annotations in insertion order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Owned copy of the annotation list, for read-only observers.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// True when there are no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Check for an identical annotation.
    #[must_use]
    pub fn contains(&self, span: Span, label: &str) -> bool {
        self.position(span, label).is_some()
    }

    /// Every annotation whose token range includes `token_index`, in the
    /// order added.
    #[must_use]
    pub fn annotations_touching(&self, token_index: usize) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .zip(&self.index)
            .filter(|(_, range)| range.contains(&token_index))
            .map(|(a, _)| a)
            .collect()
    }

    /// True if any annotation covers `token_index`.
    #[must_use]
    pub fn is_covered(&self, token_index: usize) -> bool {
        self.index.iter().any(|range| range.contains(&token_index))
    }

    /// Token index range of a stored annotation.
    #[must_use]
    pub fn token_range(&self, annotation: &Annotation) -> Option<Range<usize>> {
        self.position(annotation.span, &annotation.label)
            .map(|i| self.index[i].clone())
    }

    /// The contiguous tokens covered by a stored annotation.
    ///
    /// Returns `None` if the annotation is not in the store.
    #[must_use]
    pub fn tokens_in(&self, annotation: &Annotation) -> Option<&[Token]> {
        let range = self.token_range(annotation)?;
        self.tokens.get(range)
    }

    /// Document text covered by a stored annotation.
    #[must_use]
    pub fn text_of(&self, annotation: &Annotation) -> Option<String> {
        self.tokens_in(annotation)
            .map(|tokens| tokens.iter().map(Token::text).collect())
    }

    /// Counter incremented by every mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Annotation]) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Tell every listener that the annotation set changed.
    pub fn emit_changed(&mut self) {
        self.subscribers.notify(&self.annotations);
    }

    fn position(&self, span: Span, label: &str) -> Option<usize> {
        self.annotations.iter().position(|a| a.is(span, label))
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

/// Span covering a run of consecutive tokens.
#[must_use]
pub fn span_of(tokens: &[Token]) -> Option<Span> {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => Some(Span::new(first.start(), last.end())),
        _ => None,
    }
}

/// Find the token range an aligned span covers.
///
/// One forward pass over tokens sorted by offset: records the first and last
/// token lying fully inside `span` and stops at the first token past its end.
/// Returns `None` unless the first token starts exactly at `span.start` and
/// the last one ends exactly at `span.end`.
#[must_use]
pub fn locate(tokens: &[Token], span: Span) -> Option<Range<usize>> {
    let mut first = None;
    let mut last = None;
    for (i, token) in tokens.iter().enumerate() {
        if token.start() >= span.end {
            break;
        }
        if token.start() >= span.start && token.end() <= span.end {
            first.get_or_insert(i);
            last = Some(i);
        }
    }
    let (first, last) = (first?, last?);
    if tokens[first].start() != span.start || tokens[last].end() != span.end {
        return None;
    }
    Some(first..last + 1)
}

fn build_index(tokens: &[Token], annotations: &[Annotation]) -> Result<Vec<Range<usize>>> {
    annotations
        .iter()
        .map(|a| locate(tokens, a.span).ok_or_else(|| Error::misaligned(a.span)))
        .collect()
}
