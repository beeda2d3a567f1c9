//! # tagspan
//!
//! Interactive span annotation for NER labeling.
//!
//! - **Tokenizer**: word runs, single punctuation marks, single spaces and
//!   line breaks, with stable character offsets
//! - **Annotation store**: token-aligned `[start, end, "LABEL"]` annotations
//!   with a token index and explicit change notification
//! - **Selection**: a run of tokens grown gesture by gesture, able to jump
//!   whitespace but nothing else, honoring the collection's overlap policy
//! - **Session**: turns pointer gestures into selection and store calls,
//!   tracks unsaved edits, and brokers loads and saves
//!
//! ## Quick Start
//!
//! ```rust
//! use tagspan::{tokenize, AnnotationStore, Selection, Span};
//!
//! let mut store = AnnotationStore::with_tokens(tokenize("Bob met Alice"));
//! let mut selection = Selection::default();
//!
//! selection.start(&store.tokens()[4]);
//! let span = selection.span().unwrap();
//! selection.clear(true);
//!
//! assert!(store.add_or_update(span, "PERSON").unwrap());
//! assert_eq!(span, Span::new(8, 13));
//! assert_eq!(store.annotations_touching(4).len(), 1);
//! assert!(store.annotations_touching(2).is_empty());
//! ```
//!
//! ## Sessions
//!
//! ```rust
//! use tagspan::{GestureOutcome, LabelSet, LoadedDocument, OverlapPolicy, Session};
//!
//! let mut session = Session::new();
//! session.begin_load().unwrap();
//! session
//!     .finish_load(Ok(LoadedDocument {
//!         document_id: "d1".into(),
//!         collection_id: "c1".into(),
//!         text: "Bob met Alice".into(),
//!         can_annotate: true,
//!         overlap: OverlapPolicy::Allow,
//!         labels: LabelSet::from_names(["PERSON"]),
//!         mine: vec![],
//!         others: vec![],
//!         agreement: None,
//!     }))
//!     .unwrap();
//!
//! assert_eq!(session.click(0), GestureOutcome::Started);
//! session.confirm_label(0, "PERSON").unwrap();
//! assert!(session.is_changed());
//! assert_eq!(session.token_view(0).unwrap().tooltip, "PERSON");
//! ```
//!
//! ## Offsets
//!
//! All spans are half-open ranges of **characters** (Unicode scalar values).
//! See [`offset`] for byte and UTF-16 conversion.

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod labels;
pub mod notify;
pub mod offset;
pub mod persist;
pub mod render;
pub mod selection;
pub mod session;
pub mod store;
pub mod tokenizer;

#[cfg(feature = "cli")]
#[allow(missing_docs)]
pub mod cli;

pub use tagspan_core::{
    record, Annotation, AnnotationKey, AnnotationRecord, RawEntry, Span, Token, TokenKind,
};

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use labels::{Label, LabelSet};
pub use notify::SubscriptionId;
pub use persist::{
    AnnotationSink, DocumentFile, DocumentSource, JsonFileStore, LoadedDocument, SaveReceipt,
    SaveRequest,
};
pub use render::{DisplayHint, Fill, TokenView};
pub use selection::{OverlapPolicy, Selection};
pub use session::{DocLabel, GestureOutcome, SaveOutcome, Session};
pub use store::AnnotationStore;
pub use tokenizer::{tokenize, Tokenizer, WordTokenizer};

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use tagspan::prelude::*;
    //!
    //! let store = AnnotationStore::with_tokens(tokenize("Hi, you"));
    //! assert_eq!(store.tokens().len(), 4);
    //! ```
    pub use crate::error::{Error, Result};
    pub use crate::labels::{Label, LabelSet};
    pub use crate::persist::{AnnotationSink, DocumentSource, LoadedDocument};
    pub use crate::selection::{OverlapPolicy, Selection};
    pub use crate::session::{GestureOutcome, Session};
    pub use crate::store::AnnotationStore;
    pub use crate::tokenizer::tokenize;
    pub use tagspan_core::{Annotation, Span, Token};
}
