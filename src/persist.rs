//! Persistence collaborators.
//!
//! The session never talks to storage directly. It is handed a
//! [`LoadedDocument`] and hands back a [`SaveRequest`]; whoever implements
//! [`DocumentSource`] and [`AnnotationSink`] decides where those live.
//!
//! [`JsonFileStore`] is a directory-backed implementation:
//!
//! ```text
//! store/
//! ├── doc1.json               DocumentFile
//! ├── doc1.annotations.json   [AnnotationRecord, ...]  (all annotators)
//! └── doc2.json
//! ```

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::labels::{Label, LabelSet};
use crate::selection::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tagspan_core::{Annotation, AnnotationRecord};

// =============================================================================
// Collaborator contracts
// =============================================================================

/// Everything needed to open a document for annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Document id.
    pub document_id: String,
    /// Owning collection id.
    pub collection_id: String,
    /// Document text.
    pub text: String,
    /// Whether the active user may annotate this document.
    pub can_annotate: bool,
    /// Collection overlap policy.
    pub overlap: OverlapPolicy,
    /// Collection labels.
    pub labels: LabelSet,
    /// The active user's records for this document.
    pub mine: Vec<AnnotationRecord>,
    /// Other annotators' records for this document.
    pub others: Vec<AnnotationRecord>,
    /// Inter-annotator agreement for this document, if known.
    pub agreement: Option<f64>,
}

/// Finalized annotation set handed to an [`AnnotationSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    /// Document id.
    pub document_id: String,
    /// Owning collection id.
    pub collection_id: String,
    /// Checked whole-document labels.
    pub doc_labels: Vec<String>,
    /// NER annotations, in store order.
    pub annotations: Vec<Annotation>,
    /// Ask the sink for the next document to annotate.
    pub and_advance: bool,
}

impl SaveRequest {
    /// Record form for `creator_id`.
    #[must_use]
    pub fn to_record(&self, creator_id: &str) -> AnnotationRecord {
        AnnotationRecord::new(
            creator_id,
            self.collection_id.clone(),
            self.document_id.clone(),
            self.doc_labels.iter().cloned(),
            self.annotations.iter().cloned(),
        )
    }
}

/// Outcome reported by an [`AnnotationSink`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveReceipt {
    /// The sink accepted the annotations.
    pub saved: bool,
    /// Next document to annotate, when an advance was requested and one exists.
    pub next_document: Option<String>,
}

/// Supplies documents and existing annotations.
pub trait DocumentSource {
    /// Load `document_id` for the active user.
    fn load(&mut self, document_id: &str) -> Result<LoadedDocument>;
}

/// Accepts finalized annotation sets.
pub trait AnnotationSink {
    /// Persist `request` for the active user.
    fn save(&mut self, request: &SaveRequest) -> Result<SaveReceipt>;
}

// =============================================================================
// JSON directory store
// =============================================================================

/// Label entry in a document file: a bare name or a name with a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelEntry {
    /// Name only; color assigned from the palette.
    Name(String),
    /// Name and explicit color.
    Colored(Label),
}

/// On-disk document (`<id>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Document id. Defaults to the file stem when absent.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Owning collection id.
    #[serde(default)]
    pub collection_id: String,
    /// Document text.
    pub text: String,
    /// Whether annotators may edit. Defaults to true.
    #[serde(default = "default_true")]
    pub can_annotate: bool,
    /// Collection overlap policy; the store's configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<OverlapPolicy>,
    /// Collection labels; the store's configured labels when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelEntry>,
    /// Inter-annotator agreement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl DocumentFile {
    /// Minimal document with no collection settings.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection_id: String::new(),
            text: text.into(),
            can_annotate: true,
            overlap: None,
            labels: Vec::new(),
            agreement: None,
        }
    }

    /// Resolve this document's label set.
    ///
    /// Bare names are sorted and colored from the palette, explicit colors
    /// are kept as written. Mixed lists keep the explicit entries first.
    #[must_use]
    pub fn label_set(&self) -> LabelSet {
        let mut colored = Vec::new();
        let mut names = Vec::new();
        for entry in &self.labels {
            match entry {
                LabelEntry::Colored(label) => colored.push(label.clone()),
                LabelEntry::Name(name) => names.push(name.clone()),
            }
        }
        let generated = LabelSet::from_names(names);
        LabelSet::new(colored.into_iter().chain(generated.iter().cloned()))
    }
}

/// Directory of JSON documents and annotation records.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    user: String,
    defaults: SessionConfig,
}

impl JsonFileStore {
    /// Open `root` on behalf of `user`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            user: user.into(),
            defaults: SessionConfig::default(),
        }
    }

    /// Fallback overlap policy and labels for documents that define none.
    #[must_use]
    pub fn with_defaults(mut self, defaults: SessionConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Store directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active user.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Sorted ids of every document in the directory.
    pub fn document_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let Ok(name) = entry?.file_name().into_string() else {
                continue;
            };
            if let Some(id) = name.strip_suffix(".json") {
                if !id.ends_with(".annotations") {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Read `<id>.json`.
    pub fn read_document(&self, document_id: &str) -> Result<DocumentFile> {
        let path = self.document_path(document_id);
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::persistence(format!("cannot read document {}: {}", path.display(), e))
        })?;
        let mut doc: DocumentFile = serde_json::from_str(&text)?;
        if doc.id.is_empty() {
            doc.id = document_id.to_string();
        }
        Ok(doc)
    }

    /// Write `<id>.json`.
    pub fn write_document(&self, doc: &DocumentFile) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(self.document_path(&doc.id), json)?;
        Ok(())
    }

    /// Read every annotator's records for a document. Missing file means none.
    pub fn read_records(&self, document_id: &str) -> Result<Vec<AnnotationRecord>> {
        let path = self.records_path(document_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Replace every annotator's records for a document.
    pub fn write_records(&self, document_id: &str, records: &[AnnotationRecord]) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(records)?;
        fs::write(self.records_path(document_id), json)?;
        Ok(())
    }

    fn document_path(&self, document_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", document_id))
    }

    fn records_path(&self, document_id: &str) -> PathBuf {
        self.root.join(format!("{}.annotations.json", document_id))
    }

    /// First document after `current` (in id order) the user has no record for.
    fn next_unannotated(&self, current: &str) -> Result<Option<String>> {
        for id in self.document_ids()? {
            if id.as_str() <= current {
                continue;
            }
            let annotated = self
                .read_records(&id)?
                .iter()
                .any(|r| r.creator_id == self.user);
            if !annotated {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

impl DocumentSource for JsonFileStore {
    fn load(&mut self, document_id: &str) -> Result<LoadedDocument> {
        let doc = self.read_document(document_id)?;
        let (mine, others): (Vec<_>, Vec<_>) = self
            .read_records(document_id)?
            .into_iter()
            .partition(|r| r.creator_id == self.user);

        let labels = if doc.labels.is_empty() {
            self.defaults.label_set()
        } else {
            let fallback = self.defaults.label_set().fallback().to_string();
            doc.label_set().with_fallback(fallback)
        };

        log::debug!(
            "loaded {} from {}: {} own record(s), {} other(s)",
            document_id,
            self.root.display(),
            mine.len(),
            others.len()
        );
        Ok(LoadedDocument {
            document_id: doc.id,
            collection_id: doc.collection_id,
            text: doc.text,
            can_annotate: doc.can_annotate,
            overlap: doc.overlap.unwrap_or(self.defaults.overlap),
            labels,
            mine,
            others,
            agreement: doc.agreement,
        })
    }
}

impl AnnotationSink for JsonFileStore {
    fn save(&mut self, request: &SaveRequest) -> Result<SaveReceipt> {
        if !self.document_path(&request.document_id).exists() {
            return Err(Error::persistence(format!(
                "unknown document {}",
                request.document_id
            )));
        }
        let mut records = self.read_records(&request.document_id)?;
        let mut record = request.to_record(&self.user);

        match records.iter_mut().find(|r| r.creator_id == self.user) {
            Some(existing) => {
                record.id = existing.id.take();
                *existing = record;
            }
            None => records.push(record),
        }
        self.write_records(&request.document_id, &records)?;

        let next_document = if request.and_advance {
            self.next_unannotated(&request.document_id)?
        } else {
            None
        };
        Ok(SaveReceipt {
            saved: true,
            next_document,
        })
    }
}
