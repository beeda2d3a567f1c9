//! Raw annotation records as exchanged with a persistence collaborator.
//!
//! One record holds everything a single annotator saved for one document:
//! whole-document labels (bare strings) and NER annotations (triples) mixed
//! in a single list.
//!
//! ```json
//! {
//!   "creator_id": "ann1",
//!   "collection_id": "c1",
//!   "document_id": "d1",
//!   "annotation": ["NEWS", [0, 3, "PERSON"], [8, 13, "PERSON"]]
//! }
//! ```
//!
//! Entries that are neither are kept as [`RawEntry::Unrecognized`] so a record
//! round-trips without silently dropping data.

use crate::annotation::Annotation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One entry of a record's `annotation` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEntry {
    /// Whole-document label.
    DocLabel(String),
    /// NER span annotation.
    Ner(Annotation),
    /// Anything else, preserved verbatim.
    Unrecognized(serde_json::Value),
}

/// All annotations saved by one annotator for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Record identifier assigned by the store, if any
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Annotator who created the record
    pub creator_id: String,
    /// Collection the document belongs to
    #[serde(default)]
    pub collection_id: String,
    /// Annotated document
    pub document_id: String,
    /// Mixed document labels and NER triples
    #[serde(default)]
    pub annotation: Vec<RawEntry>,
}

impl AnnotationRecord {
    /// Build a record from document labels and NER annotations.
    #[must_use]
    pub fn new(
        creator_id: impl Into<String>,
        collection_id: impl Into<String>,
        document_id: impl Into<String>,
        doc_labels: impl IntoIterator<Item = String>,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> Self {
        let annotation = doc_labels
            .into_iter()
            .map(RawEntry::DocLabel)
            .chain(annotations.into_iter().map(RawEntry::Ner))
            .collect();
        Self {
            id: None,
            creator_id: creator_id.into(),
            collection_id: collection_id.into(),
            document_id: document_id.into(),
            annotation,
        }
    }

    /// Document labels in this record, in stored order.
    pub fn doc_labels(&self) -> impl Iterator<Item = &str> {
        self.annotation.iter().filter_map(|e| match e {
            RawEntry::DocLabel(label) => Some(label.as_str()),
            _ => None,
        })
    }

    /// NER annotations in this record, in stored order.
    pub fn ner_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotation.iter().filter_map(|e| match e {
            RawEntry::Ner(a) => Some(a),
            _ => None,
        })
    }

    /// Number of entries that were neither a label nor a triple.
    #[must_use]
    pub fn unrecognized(&self) -> usize {
        self.annotation
            .iter()
            .filter(|e| matches!(e, RawEntry::Unrecognized(_)))
            .count()
    }
}

/// Distinct document labels across records, first occurrence order.
#[must_use]
pub fn doc_labels(records: &[AnnotationRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(AnnotationRecord::doc_labels)
        .filter(|l| seen.insert(*l))
        .map(str::to_string)
        .collect()
}

/// Document labels grouped by creator.
///
/// Every creator with a record gets an entry, even when it has no labels.
#[must_use]
pub fn doc_labels_by_creator(records: &[AnnotationRecord]) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in records {
        out.entry(record.creator_id.clone())
            .or_default()
            .extend(record.doc_labels().map(str::to_string));
    }
    out
}

/// Distinct NER annotations across records, first occurrence order.
#[must_use]
pub fn ner_annotations(records: &[AnnotationRecord]) -> Vec<Annotation> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(AnnotationRecord::ner_annotations)
        .filter(|a| seen.insert(a.key()))
        .cloned()
        .collect()
}

/// NER annotations grouped by creator.
///
/// Every creator with a record gets an entry, even when it has no spans.
#[must_use]
pub fn ner_annotations_by_creator(
    records: &[AnnotationRecord],
) -> BTreeMap<String, Vec<Annotation>> {
    let mut out: BTreeMap<String, Vec<Annotation>> = BTreeMap::new();
    for record in records {
        out.entry(record.creator_id.clone())
            .or_default()
            .extend(record.ner_annotations().cloned());
    }
    out
}
