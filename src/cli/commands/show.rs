//! Show command - Render a document with its annotations

use super::super::output::{color, label_color, render_inline};
use super::super::utils::{format_error, read_input_file};
use crate::config::SessionConfig;
use crate::persist::DocumentFile;
use crate::store::AnnotationStore;
use crate::tokenizer::tokenize;
use clap::Parser;
use tagspan_core::{ner_annotations, AnnotationRecord};

/// Show a document with highlighted annotations
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Document JSON file ({"text": ..., "labels": [...]})
    #[arg(value_name = "DOC")]
    pub document: String,

    /// Annotation records JSON file ([{"creator_id": ..., "annotation": [...]}])
    #[arg(long, value_name = "FILE")]
    pub annotations: Option<String>,

    /// Only show this annotator's annotations (default: everyone's, merged)
    #[arg(long, value_name = "ID")]
    pub creator: Option<String>,
}

pub fn run(args: ShowArgs, config: &SessionConfig) -> Result<(), String> {
    let doc: DocumentFile = serde_json::from_str(&read_input_file(&args.document)?)
        .map_err(|e| format_error("parse document", &format!("{}: {}", args.document, e)))?;

    let records: Vec<AnnotationRecord> = match &args.annotations {
        Some(path) => serde_json::from_str(&read_input_file(path)?)
            .map_err(|e| format_error("parse annotations", &format!("{}: {}", path, e)))?,
        None => Vec::new(),
    };
    let records: Vec<AnnotationRecord> = match &args.creator {
        Some(creator) => {
            let mine: Vec<_> = records
                .into_iter()
                .filter(|r| &r.creator_id == creator)
                .collect();
            if mine.is_empty() {
                return Err(format!("No annotations by {} in this file", creator));
            }
            mine
        }
        None => records,
    };

    let labels = if doc.labels.is_empty() {
        config.label_set()
    } else {
        doc.label_set()
    };

    let mut store = AnnotationStore::with_tokens(tokenize(&doc.text));
    store
        .set_annotations(ner_annotations(&records))
        .map_err(|e| format_error("apply annotations", &e.to_string()))?;

    let title = if doc.id.is_empty() {
        args.document.as_str()
    } else {
        doc.id.as_str()
    };
    println!(
        "{} ({} tokens, {} annotations)",
        color("1", title),
        store.tokens().len(),
        store.len()
    );
    println!();
    println!("{}", render_inline(&store, &labels));

    if !store.is_empty() {
        println!();
        for annotation in store.annotations() {
            let text = store.text_of(annotation).unwrap_or_default();
            println!(
                "  {:>12}  {}  {:?}",
                annotation.span.to_string(),
                color(label_color(&labels, &annotation.label), &annotation.label),
                text
            );
        }
    }
    Ok(())
}
