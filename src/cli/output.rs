//! Output formatting utilities for CLI commands

use is_terminal::IsTerminal;
use std::io;

use crate::labels::LabelSet;
use crate::store::AnnotationStore;

/// Log info message (respects quiet flag)
pub fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Colorize text with ANSI escape codes (only if stdout is a terminal)
pub fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// ANSI code for a label, cycling by its position in the label set.
///
/// Labels missing from the set get plain bold white.
pub fn label_color(labels: &LabelSet, label: &str) -> &'static str {
    const CODES: &[&str] = &["1;34", "1;32", "1;33", "1;35", "1;36", "1;31", "34", "32"];
    labels
        .names()
        .position(|n| n == label)
        .map_or("1;37", |i| CODES[i % CODES.len()])
}

/// Render token text for a single-line table cell.
pub fn escape_token(text: &str) -> String {
    text.escape_debug().to_string()
}

/// Render a document with its annotations inline.
///
/// Each annotation is wrapped as `[text](LABEL)`. Overlapping annotations
/// nest by start position; annotations closing on the same token close
/// innermost (latest start) first.
///
/// ```text
/// [Bob](PERSON) met [Alice](PERSON)
/// ```
pub fn render_inline(store: &AnnotationStore, labels: &LabelSet) -> String {
    let tokens = store.tokens();
    let mut opens = vec![0usize; tokens.len()];
    let mut closes: Vec<Vec<(usize, &str)>> = vec![Vec::new(); tokens.len()];

    for annotation in store.annotations() {
        let Some(range) = store.token_range(annotation) else {
            continue;
        };
        if range.is_empty() {
            continue;
        }
        opens[range.start] += 1;
        closes[range.end - 1].push((range.start, annotation.label.as_str()));
    }

    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        out.push_str(&"[".repeat(opens[i]));
        let touching = store.annotations_touching(i);
        match touching.last() {
            Some(a) => out.push_str(&color(label_color(labels, &a.label), token.text())),
            None => out.push_str(token.text()),
        }
        let mut ending = std::mem::take(&mut closes[i]);
        ending.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, label) in ending {
            out.push_str("](");
            out.push_str(&color(label_color(labels, label), label));
            out.push(')');
        }
    }
    out
}
