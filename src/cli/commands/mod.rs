//! Command implementations for the tagspan CLI
//!
//! Each command has its own module.

pub mod apply;
pub mod show;
pub mod tokenize;
pub mod validate;

pub use apply::ApplyArgs;
pub use show::ShowArgs;
pub use tokenize::TokenizeArgs;
pub use validate::ValidateArgs;
