//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand};

use super::commands;

/// Span annotation engine CLI - tokenize, inspect, validate and replay annotations
#[derive(Parser)]
#[command(name = "tagspan")]
#[command(
    author,
    version,
    about = "Span annotation engine CLI - tokenize, inspect, validate and replay annotations",
    long_about = r#"
tagspan - token-aligned span annotation

CONCEPTS:
  • Token      - a word run, one punctuation mark, one space or one line break
  • Annotation - [start, end, "LABEL"] in character offsets, on token boundaries
  • Selection  - a run of tokens grown by clicking; it may jump spaces and tabs
                 but never words, punctuation or line breaks

STORE LAYOUT (apply, validate):
  <dir>/<id>.json               {"text": "...", "labels": [...], "overlap": "allow"}
  <dir>/<id>.annotations.json   [{"creator_id": "...", "annotation": [...]}]

EXAMPLES:
  tagspan tokenize -t "Bob met Alice"
  tagspan show store/d1.json --annotations store/d1.annotations.json
  tagspan validate store/*.json
  tagspan apply --store store --doc d1 --script gestures.jsonl --creator ann1
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Session config file (TOML): overlap policy, labels, fallback color
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split text into tokens with offsets
    #[command(visible_alias = "t")]
    Tokenize(commands::TokenizeArgs),

    /// Show a document with highlighted annotations
    #[command(visible_alias = "s")]
    Show(commands::ShowArgs),

    /// Check annotation records against their documents
    #[command(visible_alias = "v")]
    Validate(commands::ValidateArgs),

    /// Replay a gesture script through an annotation session and save
    #[command(visible_alias = "a")]
    Apply(commands::ApplyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
