//! tagspan - span annotation CLI
//!
//! Tokenize text, render annotated documents, validate annotation records
//! and replay gesture scripts against a directory of JSON documents.
//!
//! # Usage
//!
//! ```bash
//! # How does a sentence split?
//! tagspan tokenize -t "Bob met Alice"
//!
//! # Render a document with everyone's annotations merged
//! tagspan show store/d1.json --annotations store/d1.annotations.json
//!
//! # Check every record lines up with token boundaries and known labels
//! tagspan validate store/*.json
//!
//! # Replay a gesture script as annotator ann1, then save and advance
//! tagspan apply --store store --doc d1 --script gestures.jsonl --creator ann1 --advance
//! ```
//!
//! Logging goes to stderr. `-v`/`-vv`/`-vvv` raise the level; `RUST_LOG`
//! overrides it entirely.

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use tagspan::cli::commands::*;
use tagspan::cli::output::color;
use tagspan::cli::parser::{Cli, Commands};
use tagspan::cli::utils::load_config;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tagspan={level},tagspan_cli={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<(), String> = match load_config(cli.config.as_deref()) {
        Err(e) => Err(e),
        Ok(config) => {
            log::debug!(
                "config: overlap={:?}, {} label(s)",
                config.overlap,
                config.labels.len()
            );
            match cli.command {
                Commands::Tokenize(args) => tokenize::run(args),
                Commands::Show(args) => show::run(args, &config),
                Commands::Validate(args) => validate::run(args, &config),
                Commands::Apply(args) => apply::run(args, &config),
                Commands::Completions { shell } => {
                    let mut cmd = Cli::command();
                    clap_complete::generate(shell, &mut cmd, "tagspan", &mut io::stdout());
                    Ok(())
                }
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
