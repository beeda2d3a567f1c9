//! Apply command - Replay a gesture script through an annotation session
//!
//! The script is JSON lines, one gesture per line:
//!
//! ```text
//! {"op": "click", "token": 0}
//! {"op": "label", "token": 0, "label": "PERSON"}
//! {"op": "press", "token": 4}
//! {"op": "hover", "token": 6, "held": true}
//! {"op": "release", "token": 6}
//! {"op": "remove", "token": 2}
//! {"op": "doc_label", "label": "NEWS", "checked": true}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use super::super::output::{color, log_info};
use super::super::utils::{format_error, log_success, read_input_file};
use crate::config::SessionConfig;
use crate::persist::JsonFileStore;
use crate::session::{GestureOutcome, Session};
use clap::Parser;
use serde::Deserialize;

/// Replay a gesture script through an annotation session and save
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Store directory (<id>.json, <id>.annotations.json)
    #[arg(long, value_name = "DIR")]
    pub store: String,

    /// Document id
    #[arg(long, value_name = "ID")]
    pub doc: String,

    /// Gesture script (JSON lines)
    #[arg(long, value_name = "FILE")]
    pub script: String,

    /// Annotator id the annotations are saved under
    #[arg(long, value_name = "ID", default_value = "annotator")]
    pub creator: String,

    /// Report the next unannotated document after saving
    #[arg(long)]
    pub advance: bool,

    /// Replay without saving
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// One scripted gesture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Pointer down on a token.
    Press { token: usize },
    /// Pointer enters a token.
    Hover {
        token: usize,
        #[serde(default = "default_true")]
        held: bool,
    },
    /// Pointer up on a token.
    Release { token: usize },
    /// Press and release.
    Click { token: usize },
    /// Choose a label from the popover on a token.
    Label { token: usize, label: String },
    /// Choose "remove" from the popover on a token.
    Remove { token: usize },
    /// Check or uncheck a whole-document label.
    DocLabel {
        label: String,
        #[serde(default = "default_true")]
        checked: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Parse a gesture script.
pub fn parse_script(text: &str) -> Result<Vec<(usize, Step)>, String> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map(|step| (i + 1, step))
                .map_err(|e| format!("script line {}: {}", i + 1, e))
        })
        .collect()
}

/// Run one step against the session.
pub fn apply_step(session: &mut Session, step: &Step) -> crate::Result<GestureOutcome> {
    Ok(match step {
        Step::Press { token } => session.press(*token),
        Step::Hover { token, held } => session.hover(*token, *held),
        Step::Release { token } => session.release(*token),
        Step::Click { token } => session.click(*token),
        Step::Label { token, label } => session.confirm_label(*token, label)?,
        Step::Remove { token } => session.request_removal(*token),
        Step::DocLabel { label, checked } => session.set_doc_label(label, *checked)?,
    })
}

pub fn run(args: ApplyArgs, config: &SessionConfig) -> Result<(), String> {
    let steps = parse_script(&read_input_file(&args.script)?)?;
    let mut store = JsonFileStore::new(&args.store, &args.creator).with_defaults(config.clone());

    let mut session = Session::new();
    session
        .load_with(&mut store, &args.doc)
        .map_err(|e| format_error("load document", &e.to_string()))?;
    if !session.is_editable() {
        return Err(format!(
            "{} may not annotate document {}",
            args.creator, args.doc
        ));
    }
    log_info(
        &format!(
            "Loaded {} ({} tokens, {} saved annotation(s))",
            args.doc,
            session.store().tokens().len(),
            session.store().len()
        ),
        args.quiet,
    );

    for (line, step) in &steps {
        let outcome = apply_step(&mut session, step)
            .map_err(|e| format!("script line {}: {}", line, e))?;
        log::debug!("line {}: {:?} -> {:?}", line, step, outcome);
        if outcome == GestureOutcome::Ignored && !args.quiet {
            eprintln!("{} line {}: {:?} had no effect", color("33", "warn"), line, step);
        }
    }

    if !session.selection().is_empty() && !args.quiet {
        eprintln!(
            "{} script ended with an uncommitted selection of {} token(s)",
            color("33", "warn"),
            session.selection().len()
        );
    }

    if args.dry_run {
        println!(
            "{} annotation(s) after {} step(s) (not saved)",
            session.store().len(),
            steps.len()
        );
        return Ok(());
    }

    if !session.is_changed() && !args.advance {
        println!("No changes to save");
        return Ok(());
    }

    let outcome = session
        .save_with(&mut store, args.advance)
        .map_err(|e| format_error("save annotations", &e.to_string()))?;
    if !outcome.saved {
        return Err("Document annotations were NOT saved".to_string());
    }
    log_success(
        &format!(
            "Saved {} annotation(s) for {} as {}",
            session.store().len(),
            args.doc,
            args.creator
        ),
        args.quiet,
    );
    if args.advance {
        match outcome.next_document {
            Some(next) => println!("Next document: {}", next),
            None => println!("Finished annotating all documents!"),
        }
    }
    Ok(())
}
