//! Tokenize command - Show how text splits into tokens

use super::super::output::{color, escape_token};
use super::super::utils::get_input_text;
use crate::tokenizer::tokenize;
use clap::Parser;
use serde::Serialize;

/// Split text into tokens with offsets
#[derive(Parser, Debug)]
pub struct TokenizeArgs {
    /// File to tokenize (reads stdin when neither a file nor -t is given)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Text to tokenize
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Print tokens as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TokenRow<'a> {
    index: usize,
    start: usize,
    end: usize,
    kind: &'static str,
    text: &'a str,
}

pub fn run(args: TokenizeArgs) -> Result<(), String> {
    let text = get_input_text(&args.text, args.file.as_deref())?;
    let tokens = tokenize(&text);
    log::debug!("{} chars -> {} tokens", text.chars().count(), tokens.len());

    if args.json {
        let rows: Vec<TokenRow<'_>> = tokens
            .iter()
            .map(|t| TokenRow {
                index: t.index(),
                start: t.start(),
                end: t.end(),
                kind: t.kind().as_str(),
                text: t.text(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| format!("Failed to serialize tokens: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "{:>5}  {:>12}  {:<12}  {}",
        color("1", "#"),
        color("1", "span"),
        color("1", "kind"),
        color("1", "text")
    );
    for token in &tokens {
        let span = format!("[{}, {})", token.start(), token.end());
        println!(
            "{:>5}  {:>12}  {:<12}  {}",
            token.index(),
            span,
            token.kind().as_str(),
            escape_token(token.text())
        );
    }
    println!();
    println!("{} tokens", tokens.len());
    Ok(())
}
