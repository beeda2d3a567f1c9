//! Validate command - Check annotation records against their documents

use super::super::output::color;
use super::super::utils::open_document_path;
use crate::config::SessionConfig;
use crate::offset::SpanConverter;
use crate::store::locate;
use crate::tokenizer::tokenize;
use clap::Parser;
use std::collections::HashSet;

/// Check annotation records against their documents
///
/// Each FILE is a document (`<id>.json`); its records are read from
/// `<id>.annotations.json` in the same directory.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Document files to validate
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<String>,

    /// Record offsets count UTF-16 code units (browser-based tools)
    #[arg(long)]
    pub utf16: bool,
}

pub fn run(args: ValidateArgs, config: &SessionConfig) -> Result<(), String> {
    let mut total_errors = 0;
    let mut total_warnings = 0;
    let mut total_annotations = 0;

    for file in &args.files {
        let (store, id) = open_document_path(file, "", config)?;
        let doc = store
            .read_document(&id)
            .map_err(|e| format!("{}: {}", file, e))?;
        let records = store
            .read_records(&id)
            .map_err(|e| format!("{}: invalid annotations: {}", file, e))?;
        let labels = if doc.labels.is_empty() {
            config.label_set()
        } else {
            doc.label_set()
        };
        let tokens = tokenize(&doc.text);
        let converter = SpanConverter::new(&doc.text);

        let mut error = |msg: String| {
            eprintln!("{} {}", color("31", "error"), msg);
            total_errors += 1;
        };
        let mut warnings = Vec::new();

        for record in &records {
            let who = format!("{}:{}", file, record.creator_id);
            if record.document_id != id {
                warnings.push(format!(
                    "{}: record is for document {:?}",
                    who, record.document_id
                ));
            }
            if record.unrecognized() > 0 {
                warnings.push(format!(
                    "{}: {} unrecognized entr{}",
                    who,
                    record.unrecognized(),
                    if record.unrecognized() == 1 { "y" } else { "ies" }
                ));
            }
            for label in record.doc_labels() {
                if !labels.is_empty() && !labels.contains(label) {
                    warnings.push(format!("{}: unknown document label {:?}", who, label));
                }
            }

            let mut seen = HashSet::new();
            for annotation in record.ner_annotations() {
                total_annotations += 1;
                if !seen.insert(annotation.key()) {
                    warnings.push(format!("{}: duplicate annotation {}", who, annotation));
                }
                let span = if args.utf16 {
                    converter.span_from_utf16(annotation.span)
                } else {
                    Some(annotation.span)
                };
                match span {
                    None => error(format!(
                        "{}: {} splits a surrogate pair or runs past the text",
                        who, annotation
                    )),
                    Some(span) if locate(&tokens, span).is_none() => error(format!(
                        "{}: {} does not align to token boundaries",
                        who, annotation
                    )),
                    Some(_) => {}
                }
                if !labels.is_empty() && !labels.contains(&annotation.label) {
                    error(format!("{}: {} uses an unknown label", who, annotation));
                }
            }
        }

        for warning in warnings {
            eprintln!("{} {}", color("33", "warn"), warning);
            total_warnings += 1;
        }
    }

    println!();
    println!(
        "Validated {} annotations in {} document(s)",
        total_annotations,
        args.files.len()
    );
    if total_errors > 0 {
        println!("{} {} errors", color("31", "x"), total_errors);
    }
    if total_warnings > 0 {
        println!("{} {} warnings", color("33", "!"), total_warnings);
    }
    if total_errors == 0 && total_warnings == 0 {
        println!("{} All valid", color("32", "ok:"));
    }

    if total_errors > 0 {
        return Err(format!("{} validation errors", total_errors));
    }
    Ok(())
}
