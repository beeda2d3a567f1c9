//! Annotation session: one document, one subject view, one selection.
//!
//! The session turns pointer gestures into [`Selection`] and
//! [`AnnotationStore`] calls, tracks unsaved edits, and brokers loads and
//! saves with the persistence collaborators.
//!
//! # Gestures
//!
//! ```text
//!   press(t)        start or extend the selection at t
//!   hover(t, held)  extend while dragging; a release off-token opens the popover
//!   release(t)      open the label popover if t is selected
//!   click(t)        press + release
//!   confirm_label   label the selection, or relabel what t is part of
//!   request_removal drop the selection, or remove what t is part of
//! ```
//!
//! Every gesture is suppressed (no selection or store call at all) unless
//! the session is editable: a document is loaded, the user may annotate it,
//! and the user is looking at their own annotations.
//!
//! # Loading and saving
//!
//! Both are two-phase so the transport can be asynchronous:
//!
//! ```text
//!   begin_load()  ─▶  (caller fetches)  ─▶  finish_load(result)
//!   begin_save()  ─▶  (caller stores)   ─▶  finish_save(result)
//! ```
//!
//! The session is busy in between and refuses a second load or save.
//! [`Session::load_with`] and [`Session::save_with`] run both phases against
//! a synchronous collaborator.

use crate::error::{Error, Result};
use crate::labels::{Label, LabelSet};
use crate::notify::SubscriptionId;
use crate::persist::{AnnotationSink, DocumentSource, LoadedDocument, SaveReceipt, SaveRequest};
use crate::render::{self, TokenView};
use crate::selection::{OverlapPolicy, Selection};
use crate::store::{span_of, AnnotationStore};
use crate::tokenizer::{Tokenizer, WordTokenizer};
use std::collections::BTreeMap;
use std::fmt;
use tagspan_core::{record, Annotation, Span};

// =============================================================================
// Outcomes
// =============================================================================

/// What a gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The view is not editable; nothing was touched.
    Suppressed,
    /// The gesture had no effect.
    Ignored,
    /// A new selection was started.
    Started,
    /// The selection grew.
    Extended,
    /// The label popover was opened on the selection.
    PopoverOpened,
    /// The selection was discarded.
    Cleared,
    /// Store mutations were attempted; `changes` of them took effect.
    Applied {
        /// Number of annotations actually added or removed.
        changes: usize,
    },
}

impl GestureOutcome {
    /// True if the annotation set changed.
    #[must_use]
    pub const fn changed_store(&self) -> bool {
        matches!(self, GestureOutcome::Applied { changes } if *changes > 0)
    }
}

/// Result of a finished save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The sink accepted the annotations.
    pub saved: bool,
    /// Document to open next, if an advance was requested and one exists.
    pub next_document: Option<String>,
}

/// A whole-document label and whether it is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLabel {
    /// Label definition.
    pub label: Label,
    /// Checked for this document.
    pub checked: bool,
}

#[derive(Debug, Clone)]
enum Pending {
    Load,
    Save {
        revision: u64,
        annotations: Vec<Annotation>,
    },
}

impl Pending {
    const fn name(&self) -> &'static str {
        match self {
            Pending::Load => "load",
            Pending::Save { .. } => "save",
        }
    }
}

#[derive(Debug, Clone)]
struct Document {
    id: String,
    collection_id: String,
    text: String,
}

// =============================================================================
// Session
// =============================================================================

/// Interactive annotation session.
pub struct Session {
    tokenizer: Box<dyn Tokenizer>,
    document: Option<Document>,
    store: AnnotationStore,
    selection: Selection,
    labels: LabelSet,
    can_annotate: bool,
    /// `None` while viewing the active user's own annotations.
    showing: Option<String>,
    changed: bool,
    pending: Option<Pending>,
    pointer_down: bool,
    /// Last saved (or loaded) own annotations.
    mine: Vec<Annotation>,
    checked: Vec<String>,
    others_ner: BTreeMap<String, Vec<Annotation>>,
    others_doc: BTreeMap<String, Vec<String>>,
    others: Vec<String>,
    agreement: Option<f64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("document", &self.document.as_ref().map(|d| &d.id))
            .field("showing", &self.showing)
            .field("annotations", &self.store.len())
            .field("selection", &self.selection.len())
            .field("changed", &self.changed)
            .field("pending", &self.pending.as_ref().map(Pending::name))
            .finish()
    }
}

impl Session {
    /// Empty session using the default tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tokenizer(WordTokenizer)
    }

    /// Empty session using `tokenizer`.
    #[must_use]
    pub fn with_tokenizer(tokenizer: impl Tokenizer + 'static) -> Self {
        Self {
            tokenizer: Box::new(tokenizer),
            document: None,
            store: AnnotationStore::new(),
            selection: Selection::default(),
            labels: LabelSet::default(),
            can_annotate: false,
            showing: None,
            changed: false,
            pending: None,
            pointer_down: false,
            mine: Vec::new(),
            checked: Vec::new(),
            others_ner: BTreeMap::new(),
            others_doc: BTreeMap::new(),
            others: Vec::new(),
            agreement: None,
        }
    }

    // -------------------------------------------------------------------------
    // State queries
    // -------------------------------------------------------------------------

    /// True once a document has loaded successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Loaded document id.
    #[must_use]
    pub fn document_id(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.id.as_str())
    }

    /// Loaded document's collection id.
    #[must_use]
    pub fn collection_id(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.collection_id.as_str())
    }

    /// Loaded document text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.text.as_str())
    }

    /// Annotation store of the current subject view.
    #[must_use]
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// In-progress selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Collection labels.
    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Collection overlap policy.
    #[must_use]
    pub fn overlap(&self) -> OverlapPolicy {
        self.selection.policy()
    }

    /// Unsaved edits exist.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.changed
    }

    /// A load or save is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// The active user may annotate the loaded document.
    #[must_use]
    pub const fn can_annotate(&self) -> bool {
        self.can_annotate
    }

    /// Gestures currently reach the selection and store.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.is_loaded() && self.can_annotate && self.showing.is_none()
    }

    /// Whose annotations are displayed; `None` for the active user's own.
    #[must_use]
    pub fn showing(&self) -> Option<&str> {
        self.showing.as_deref()
    }

    /// Other annotators with annotations for this document, sorted.
    #[must_use]
    pub fn others(&self) -> &[String] {
        &self.others
    }

    /// Another annotator's document labels.
    #[must_use]
    pub fn doc_labels_of(&self, creator_id: &str) -> &[String] {
        self.others_doc
            .get(creator_id)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Inter-annotator agreement for the document, if known.
    #[must_use]
    pub fn agreement(&self) -> Option<f64> {
        self.agreement
    }

    /// Rendering state for token `index`.
    #[must_use]
    pub fn token_view(&self, index: usize) -> Option<TokenView> {
        render::token_view(&self.store, &self.selection, &self.labels, index)
    }

    /// Rendering state for every token.
    #[must_use]
    pub fn token_views(&self) -> Vec<TokenView> {
        render::token_views(&self.store, &self.selection, &self.labels)
    }

    /// Listen for annotation set changes.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&[Annotation]) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Stop listening.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // -------------------------------------------------------------------------
    // Gestures
    // -------------------------------------------------------------------------

    /// Pointer pressed on token `index`.
    pub fn press(&mut self, index: usize) -> GestureOutcome {
        if !self.is_editable() {
            return GestureOutcome::Suppressed;
        }
        let Some(token) = self.store.token(index).cloned() else {
            return GestureOutcome::Ignored;
        };
        self.pointer_down = true;

        if self.selection.contains(&token) {
            GestureOutcome::Ignored
        } else if self.selection.can_add(&self.store, &token) {
            self.selection.add(&self.store, &token);
            log::debug!("selection extended to token {}", index);
            GestureOutcome::Extended
        } else if self.selection.is_empty() {
            self.selection.clear(true);
            self.selection.start(&token);
            log::debug!("selection started at token {}", index);
            GestureOutcome::Started
        } else {
            GestureOutcome::Ignored
        }
    }

    /// Pointer entered token `index`, with the primary button `held` or not.
    ///
    /// Dragging extends the selection. Entering a token with the button up
    /// after a press means the drag ended outside any token; the popover
    /// opens on the selection as if released there.
    pub fn hover(&mut self, index: usize, held: bool) -> GestureOutcome {
        if !self.is_editable() {
            return GestureOutcome::Suppressed;
        }
        if !held {
            if self.pointer_down {
                self.pointer_down = false;
                if !self.selection.is_empty() {
                    self.selection.attach_popover();
                    return GestureOutcome::PopoverOpened;
                }
            }
            return GestureOutcome::Ignored;
        }
        let Some(token) = self.store.token(index).cloned() else {
            return GestureOutcome::Ignored;
        };
        if !self.selection.contains(&token) && self.selection.can_add(&self.store, &token) {
            self.selection.add(&self.store, &token);
            GestureOutcome::Extended
        } else {
            GestureOutcome::Ignored
        }
    }

    /// Pointer released on token `index`.
    pub fn release(&mut self, index: usize) -> GestureOutcome {
        if !self.is_editable() {
            return GestureOutcome::Suppressed;
        }
        if !std::mem::take(&mut self.pointer_down) {
            return GestureOutcome::Ignored;
        }
        if self.selection.contains_index(index) {
            self.selection.attach_popover();
            GestureOutcome::PopoverOpened
        } else {
            GestureOutcome::Ignored
        }
    }

    /// Press and release on the same token. Reports the press outcome.
    pub fn click(&mut self, index: usize) -> GestureOutcome {
        let pressed = self.press(index);
        if pressed != GestureOutcome::Suppressed {
            self.release(index);
        }
        pressed
    }

    /// Apply `label` from the popover shown on token `index`.
    ///
    /// A selected token commits the selection as one annotation. Otherwise
    /// every annotation the token belongs to gets a copy with `label` on the
    /// same span.
    ///
    /// # Errors
    /// [`Error::UnknownLabel`] if `label` is not in the collection's set.
    pub fn confirm_label(&mut self, index: usize, label: &str) -> Result<GestureOutcome> {
        if !self.is_editable() {
            return Ok(GestureOutcome::Suppressed);
        }
        if !self.labels.contains(label) {
            return Err(Error::UnknownLabel(label.to_string()));
        }

        let spans: Vec<Span> = if self.selection.contains_index(index) {
            let run = self.selection.clear(false);
            self.selection.release_popover();
            span_of(&run).into_iter().collect()
        } else {
            self.store
                .annotations_touching(index)
                .into_iter()
                .map(|a| a.span)
                .collect()
        };
        if spans.is_empty() {
            return Ok(GestureOutcome::Ignored);
        }

        let mut changes = 0;
        for span in spans {
            if self.store.add_or_update(span, label)? {
                changes += 1;
            }
        }
        self.after_mutation(changes);
        Ok(GestureOutcome::Applied { changes })
    }

    /// Removal requested from the popover shown on token `index`.
    ///
    /// A selected token discards the selection. Otherwise every annotation
    /// the token belongs to is removed.
    pub fn request_removal(&mut self, index: usize) -> GestureOutcome {
        if !self.is_editable() {
            return GestureOutcome::Suppressed;
        }
        if self.selection.contains_index(index) {
            self.selection.clear(true);
            return GestureOutcome::Cleared;
        }
        let doomed: Vec<Annotation> = self
            .store
            .annotations_touching(index)
            .into_iter()
            .cloned()
            .collect();
        if doomed.is_empty() {
            return GestureOutcome::Ignored;
        }
        let mut changes = 0;
        for annotation in &doomed {
            if self.store.remove_annotation(annotation) {
                changes += 1;
            }
        }
        self.after_mutation(changes);
        GestureOutcome::Applied { changes }
    }

    /// Remove one specific annotation (e.g. from an annotation table).
    pub fn remove_annotation(&mut self, annotation: &Annotation) -> GestureOutcome {
        if !self.is_editable() {
            return GestureOutcome::Suppressed;
        }
        let changes = usize::from(self.store.remove_annotation(annotation));
        self.after_mutation(changes);
        GestureOutcome::Applied { changes }
    }

    fn after_mutation(&mut self, changes: usize) {
        if changes > 0 {
            self.changed = true;
            self.store.emit_changed();
        }
    }

    // -------------------------------------------------------------------------
    // Document labels
    // -------------------------------------------------------------------------

    /// Collection labels with their checked state for this document.
    #[must_use]
    pub fn doc_labels(&self) -> Vec<DocLabel> {
        self.labels
            .iter()
            .map(|label| DocLabel {
                label: label.clone(),
                checked: self.checked.iter().any(|c| *c == label.name),
            })
            .collect()
    }

    /// Check or uncheck a whole-document label.
    ///
    /// # Errors
    /// [`Error::UnknownLabel`] if `name` is not in the collection's set.
    pub fn set_doc_label(&mut self, name: &str, checked: bool) -> Result<GestureOutcome> {
        if !self.is_editable() {
            return Ok(GestureOutcome::Suppressed);
        }
        if !self.labels.contains(name) {
            return Err(Error::UnknownLabel(name.to_string()));
        }
        let present = self.checked.iter().any(|c| c == name);
        let changes = match (present, checked) {
            (false, true) => {
                self.checked.push(name.to_string());
                1
            }
            (true, false) => {
                self.checked.retain(|c| c != name);
                1
            }
            _ => 0,
        };
        if changes > 0 {
            self.changed = true;
        }
        Ok(GestureOutcome::Applied { changes })
    }

    // -------------------------------------------------------------------------
    // Subject switching
    // -------------------------------------------------------------------------

    /// Display `creator_id`'s annotations (read-only), or the active user's
    /// own with `None`.
    ///
    /// # Errors
    /// - [`Error::UnsavedChanges`] if edits would be lost and `force` is false
    /// - [`Error::NotLoaded`] / [`Error::Busy`] outside a loaded, idle session
    /// - [`Error::InvalidInput`](tagspan_core::Error::InvalidInput) for an
    ///   annotator with nothing on this document
    /// - [`Error::Misaligned`] if that annotator's spans do not align
    pub fn show_annotations_of(&mut self, creator_id: Option<&str>, force: bool) -> Result<()> {
        if !self.is_loaded() {
            return Err(Error::NotLoaded);
        }
        if let Some(pending) = &self.pending {
            return Err(Error::Busy(pending.name()));
        }
        if self.changed && !force {
            return Err(Error::UnsavedChanges);
        }

        let annotations = match creator_id {
            None => self.mine.clone(),
            Some(id) => match self.others_ner.get(id) {
                Some(anns) => anns.clone(),
                None if self.others_doc.contains_key(id) => Vec::new(),
                None => {
                    return Err(Error::invalid_input(format!(
                        "{} has no annotations for this document",
                        id
                    )))
                }
            },
        };

        self.selection.clear(true);
        self.pointer_down = false;
        self.store.set_annotations(annotations)?;
        self.showing = creator_id.map(str::to_string);
        self.changed = false;
        self.store.emit_changed();
        log::info!(
            "showing annotations of {}",
            creator_id.unwrap_or("the active user")
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Mark a load as outstanding.
    ///
    /// # Errors
    /// [`Error::Busy`] if a load or save is already outstanding.
    pub fn begin_load(&mut self) -> Result<()> {
        if let Some(pending) = &self.pending {
            return Err(Error::Busy(pending.name()));
        }
        self.pending = Some(Pending::Load);
        Ok(())
    }

    /// Complete an outstanding load.
    ///
    /// On success the session shows the active user's annotations with no
    /// unsaved edits. On failure it is left unloaded.
    ///
    /// # Errors
    /// The load error itself, [`Error::Misaligned`] if the user's saved
    /// annotations do not align to the text, or
    /// [`Error::InvalidInput`](tagspan_core::Error::InvalidInput) if no load
    /// was outstanding.
    pub fn finish_load(&mut self, result: Result<LoadedDocument>) -> Result<()> {
        if !matches!(self.pending, Some(Pending::Load)) {
            return Err(Error::invalid_input("no load in progress"));
        }
        self.pending = None;
        self.unload();

        let applied = result.and_then(|doc| self.apply_loaded(doc));
        if let Err(e) = &applied {
            log::warn!("load failed: {}", e);
            self.unload();
        }
        applied
    }

    /// Load `document_id` from a synchronous source.
    pub fn load_with(&mut self, source: &mut impl DocumentSource, document_id: &str) -> Result<()> {
        self.begin_load()?;
        let result = source.load(document_id);
        self.finish_load(result)
    }

    fn apply_loaded(&mut self, doc: LoadedDocument) -> Result<()> {
        let tokens = self.tokenizer.tokenize(&doc.text);
        let mine = record::ner_annotations(&doc.mine);
        self.store.set_tokens_and_annotations(tokens, mine.clone())?;

        let checked = record::doc_labels(&doc.mine);
        self.checked = checked
            .into_iter()
            .filter(|l| doc.labels.contains(l))
            .collect();
        self.others_ner = record::ner_annotations_by_creator(&doc.others);
        self.others_doc = record::doc_labels_by_creator(&doc.others);
        let mut others: Vec<String> = self
            .others_ner
            .keys()
            .chain(self.others_doc.keys())
            .cloned()
            .collect();
        others.sort();
        others.dedup();
        self.others = others;

        self.mine = mine;
        self.labels = doc.labels;
        self.selection = Selection::new(doc.overlap);
        self.can_annotate = doc.can_annotate;
        self.agreement = doc.agreement;
        log::info!(
            "loaded document {}: {} tokens, {} annotations, {} other annotator(s)",
            doc.document_id,
            self.store.tokens().len(),
            self.store.len(),
            self.others.len()
        );
        self.document = Some(Document {
            id: doc.document_id,
            collection_id: doc.collection_id,
            text: doc.text,
        });
        self.store.emit_changed();
        Ok(())
    }

    fn unload(&mut self) {
        self.document = None;
        self.store.clear();
        self.selection.clear(true);
        self.can_annotate = false;
        self.showing = None;
        self.changed = false;
        self.pointer_down = false;
        self.mine.clear();
        self.checked.clear();
        self.others_ner.clear();
        self.others_doc.clear();
        self.others.clear();
        self.agreement = None;
    }

    // -------------------------------------------------------------------------
    // Saving
    // -------------------------------------------------------------------------

    /// Build the save payload and mark a save as outstanding.
    ///
    /// # Errors
    /// - [`Error::NotLoaded`] without a document
    /// - [`Error::Busy`] while a load or save is outstanding
    /// - [`Error::ReadOnly`] if the user may not annotate, or is viewing
    ///   someone else's annotations
    pub fn begin_save(&mut self, and_advance: bool) -> Result<SaveRequest> {
        let Some(document) = &self.document else {
            return Err(Error::NotLoaded);
        };
        if let Some(pending) = &self.pending {
            return Err(Error::Busy(pending.name()));
        }
        if !self.can_annotate {
            return Err(Error::read_only(format!(
                "cannot annotate document {}",
                document.id
            )));
        }
        if let Some(other) = &self.showing {
            return Err(Error::read_only(format!(
                "viewing annotations of {}",
                other
            )));
        }

        let request = SaveRequest {
            document_id: document.id.clone(),
            collection_id: document.collection_id.clone(),
            doc_labels: self
                .labels
                .names()
                .filter(|n| self.checked.iter().any(|c| c == n))
                .map(str::to_string)
                .collect(),
            annotations: self.store.snapshot(),
            and_advance,
        };
        self.pending = Some(Pending::Save {
            revision: self.store.revision(),
            annotations: request.annotations.clone(),
        });
        Ok(request)
    }

    /// Complete an outstanding save.
    ///
    /// A successful save clears the unsaved flag unless the annotations were
    /// edited after [`begin_save`](Self::begin_save). A failed or refused
    /// save keeps all local state.
    ///
    /// # Errors
    /// The save error itself, or
    /// [`Error::InvalidInput`](tagspan_core::Error::InvalidInput) if no save
    /// was outstanding.
    pub fn finish_save(&mut self, result: Result<SaveReceipt>) -> Result<SaveOutcome> {
        let (revision, annotations) = match self.pending.take() {
            Some(Pending::Save {
                revision,
                annotations,
            }) => (revision, annotations),
            other => {
                self.pending = other;
                return Err(Error::invalid_input("no save in progress"));
            }
        };

        match result {
            Ok(receipt) if receipt.saved => {
                self.mine = annotations;
                self.changed = self.store.revision() != revision;
                log::info!(
                    "saved {} annotation(s) for {}",
                    self.mine.len(),
                    self.document_id().unwrap_or("?")
                );
                Ok(SaveOutcome {
                    saved: true,
                    next_document: receipt.next_document,
                })
            }
            Ok(_) => {
                log::warn!("annotations were NOT saved");
                Ok(SaveOutcome {
                    saved: false,
                    next_document: None,
                })
            }
            Err(e) => {
                log::warn!("save failed: {}", e);
                Err(e)
            }
        }
    }

    /// Save through a synchronous sink.
    pub fn save_with(
        &mut self,
        sink: &mut impl AnnotationSink,
        and_advance: bool,
    ) -> Result<SaveOutcome> {
        let request = self.begin_save(and_advance)?;
        let result = sink.save(&request);
        self.finish_save(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(text: &str) -> LoadedDocument {
        LoadedDocument {
            document_id: "d1".into(),
            collection_id: "c1".into(),
            text: text.into(),
            can_annotate: true,
            overlap: OverlapPolicy::Allow,
            labels: LabelSet::from_names(["PERSON", "ORG"]),
            mine: Vec::new(),
            others: Vec::new(),
            agreement: None,
        }
    }

    fn session(text: &str) -> Session {
        let mut s = Session::new();
        s.begin_load().unwrap();
        s.finish_load(Ok(loaded(text))).unwrap();
        s
    }

    #[test]
    fn test_scenario_click_then_label() {
        let mut s = session("Bob met Alice");
        assert_eq!(s.click(0), GestureOutcome::Started);
        assert!(s.token_view(0).unwrap().popover);

        let outcome = s.confirm_label(0, "PERSON").unwrap();
        assert_eq!(outcome, GestureOutcome::Applied { changes: 1 });
        assert!(s.is_changed());
        assert!(s.selection().is_empty());
        assert!(!s.token_view(0).unwrap().popover);
        assert_eq!(s.store().annotations_touching(0).len(), 1);
        assert!(s.store().annotations_touching(2).is_empty());
    }

    #[test]
    fn test_press_extends_across_space() {
        let mut s = session("Bob met Alice");
        s.press(0);
        s.release(0);
        assert_eq!(s.press(2), GestureOutcome::Extended);
        assert_eq!(s.selection().span(), Some(Span::new(0, 7)));
        assert_eq!(s.press(1), GestureOutcome::Ignored);
    }

    #[test]
    fn test_drag_selection() {
        let mut s = session("Bob met Alice");
        s.press(0);
        assert_eq!(s.hover(2, true), GestureOutcome::Extended);
        assert_eq!(s.hover(4, true), GestureOutcome::Extended);
        assert_eq!(s.release(4), GestureOutcome::PopoverOpened);
        assert_eq!(s.selection().len(), 5);
    }

    #[test]
    fn test_drag_released_off_token() {
        let mut s = session("Bob met Alice");
        s.press(0);
        assert_eq!(s.hover(4, false), GestureOutcome::PopoverOpened);
        assert_eq!(s.selection().popover_anchors(), &[0]);
    }

    #[test]
    fn test_relabel_existing_annotation() {
        let mut s = session("Bob met Alice");
        s.click(0);
        s.confirm_label(0, "PERSON").unwrap();
        let outcome = s.confirm_label(0, "ORG").unwrap();
        assert_eq!(outcome, GestureOutcome::Applied { changes: 1 });
        assert_eq!(s.store().len(), 2);
        assert_eq!(s.token_view(0).unwrap().tooltip, "PERSON, ORG");
        assert_eq!(
            s.confirm_label(0, "ORG").unwrap(),
            GestureOutcome::Applied { changes: 0 }
        );
    }

    #[test]
    fn test_unknown_label() {
        let mut s = session("Bob met Alice");
        s.click(0);
        assert!(matches!(
            s.confirm_label(0, "LOC"),
            Err(Error::UnknownLabel(_))
        ));
        assert!(!s.selection().is_empty());
    }

    #[test]
    fn test_request_removal() {
        let mut s = session("Bob met Alice");
        s.click(0);
        assert_eq!(s.request_removal(0), GestureOutcome::Cleared);
        assert!(s.selection().is_empty());
        assert!(!s.is_changed());

        s.click(4);
        s.confirm_label(4, "PERSON").unwrap();
        assert_eq!(
            s.request_removal(4),
            GestureOutcome::Applied { changes: 1 }
        );
        assert!(s.store().is_empty());
        assert_eq!(s.request_removal(4), GestureOutcome::Ignored);
    }

    #[test]
    fn test_read_only_suppresses_everything() {
        let mut doc = loaded("Bob met Alice");
        doc.can_annotate = false;
        let mut s = Session::new();
        s.begin_load().unwrap();
        s.finish_load(Ok(doc)).unwrap();

        assert_eq!(s.press(0), GestureOutcome::Suppressed);
        assert_eq!(s.click(0), GestureOutcome::Suppressed);
        assert_eq!(s.hover(0, true), GestureOutcome::Suppressed);
        assert_eq!(
            s.confirm_label(0, "NOPE").unwrap(),
            GestureOutcome::Suppressed
        );
        assert!(s.selection().is_empty());
        assert!(matches!(s.begin_save(false), Err(Error::ReadOnly(_))));
    }

    #[test]
    fn test_not_loaded_suppresses() {
        let mut s = Session::new();
        assert_eq!(s.press(0), GestureOutcome::Suppressed);
        assert!(matches!(s.begin_save(false), Err(Error::NotLoaded)));
    }

    #[test]
    fn test_busy_refuses_second_load() {
        let mut s = Session::new();
        s.begin_load().unwrap();
        assert!(s.is_busy());
        assert!(matches!(s.begin_load(), Err(Error::Busy("load"))));
    }

    #[test]
    fn test_failed_load_leaves_unloaded() {
        let mut s = session("Bob met Alice");
        s.begin_load().unwrap();
        let err = s
            .finish_load(Err(Error::persistence("offline")))
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(!s.is_loaded());
        assert!(s.store().tokens().is_empty());
        assert!(!s.is_busy());
    }

    #[test]
    fn test_misaligned_saved_annotation_fails_load() {
        let mut doc = loaded("Bob met Alice");
        doc.mine = vec![tagspan_core::AnnotationRecord::new(
            "me",
            "c1",
            "d1",
            vec![],
            vec![Annotation::new(Span::new(1, 3), "PERSON").unwrap()],
        )];
        let mut s = Session::new();
        s.begin_load().unwrap();
        assert!(matches!(
            s.finish_load(Ok(doc)),
            Err(Error::Misaligned { start: 1, end: 3 })
        ));
        assert!(!s.is_loaded());
    }

    #[test]
    fn test_save_cycle() {
        let mut s = session("Bob met Alice");
        s.click(0);
        s.confirm_label(0, "PERSON").unwrap();
        s.set_doc_label("ORG", true).unwrap();

        let request = s.begin_save(true).unwrap();
        assert!(s.is_busy());
        assert_eq!(request.doc_labels, ["ORG"]);
        assert_eq!(request.annotations.len(), 1);
        assert!(request.and_advance);

        let outcome = s
            .finish_save(Ok(SaveReceipt {
                saved: true,
                next_document: Some("d2".into()),
            }))
            .unwrap();
        assert_eq!(outcome.next_document.as_deref(), Some("d2"));
        assert!(!s.is_changed());
        assert!(!s.is_busy());
    }

    #[test]
    fn test_edit_during_save_stays_changed() {
        let mut s = session("Bob met Alice");
        s.click(0);
        s.confirm_label(0, "PERSON").unwrap();
        s.begin_save(false).unwrap();
        s.click(4);
        s.confirm_label(4, "PERSON").unwrap();
        s.finish_save(Ok(SaveReceipt {
            saved: true,
            next_document: None,
        }))
        .unwrap();
        assert!(s.is_changed());
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let mut s = session("Bob met Alice");
        s.click(0);
        s.confirm_label(0, "PERSON").unwrap();
        s.begin_save(false).unwrap();
        assert!(s.finish_save(Err(Error::persistence("500"))).is_err());
        assert!(s.is_changed());
        assert_eq!(s.store().len(), 1);

        s.begin_save(false).unwrap();
        let outcome = s.finish_save(Ok(SaveReceipt::default())).unwrap();
        assert!(!outcome.saved);
        assert!(s.is_changed());
    }

    #[test]
    fn test_finish_without_begin() {
        let mut s = session("x");
        assert!(s.finish_save(Ok(SaveReceipt::default())).is_err());
        assert!(s.finish_load(Ok(loaded("x"))).is_err());
    }

    #[test]
    fn test_doc_labels() {
        let mut s = session("x");
        assert!(s.doc_labels().iter().all(|d| !d.checked));
        assert_eq!(
            s.set_doc_label("PERSON", true).unwrap(),
            GestureOutcome::Applied { changes: 1 }
        );
        assert_eq!(
            s.set_doc_label("PERSON", true).unwrap(),
            GestureOutcome::Applied { changes: 0 }
        );
        assert!(s.is_changed());
        assert!(matches!(
            s.set_doc_label("LOC", true),
            Err(Error::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_subscribers_hear_label_commits() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut s = session("Bob met Alice");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        s.subscribe(move |anns| sink.borrow_mut().push(anns.len()));
        s.click(0);
        s.confirm_label(0, "PERSON").unwrap();
        s.confirm_label(0, "PERSON").unwrap();
        assert_eq!(*seen.borrow(), vec![1]);
    }
}
