//! # tagspan-core
//!
//! Value types shared across the tagspan workspace.
//!
//! This crate provides:
//! - **Tokens**: [`Token`], [`TokenKind`]
//! - **Annotations**: [`Span`], [`Annotation`], [`AnnotationKey`]
//! - **Raw records**: [`AnnotationRecord`], [`RawEntry`], the shape annotations
//!   have when they arrive from (or leave for) a persistence collaborator
//!
//! No engine logic lives here. The tokenizer, the annotation store and the
//! selection state machine are in the `tagspan` crate.

#![warn(missing_docs)]

pub mod annotation;
pub mod error;
pub mod record;
pub mod token;

pub use annotation::{Annotation, AnnotationKey, Span};
pub use error::{Error, Result};
pub use record::{
    doc_labels, doc_labels_by_creator, ner_annotations, ner_annotations_by_creator,
    AnnotationRecord, RawEntry,
};
pub use token::{is_word_char, Token, TokenKind};
