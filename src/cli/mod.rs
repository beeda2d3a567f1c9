//! CLI module for the tagspan binary
//!
//! Argument parsing, command routing helpers and terminal output. Individual
//! command implementations are in the `commands` submodule.

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

pub use output::*;
pub use parser::*;
pub use utils::*;
