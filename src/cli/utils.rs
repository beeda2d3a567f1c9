//! Utility functions for CLI commands

use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::config::SessionConfig;
use crate::persist::JsonFileStore;

/// Get input text from various sources (text arg, file, or stdin)
pub fn get_input_text(text: &Option<String>, file: Option<&str>) -> Result<String, String> {
    if let Some(t) = text {
        return Ok(t.clone());
    }

    if let Some(f) = file {
        return read_input_file(f);
    }

    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format_error("read stdin", &e.to_string()))?;
        return Ok(buf);
    }

    Err("No input text provided. Use -t 'text' or a file path, or pipe via stdin".to_string())
}

/// Read a file with consistent error handling
pub fn read_input_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format_error("read file", &format!("{}: {}", path, e)))
}

/// Load the session config, or defaults when no path is given
pub fn load_config(path: Option<&str>) -> Result<SessionConfig, String> {
    match path {
        Some(p) => SessionConfig::load(p).map_err(|e| format_error("load config", &e.to_string())),
        None => Ok(SessionConfig::default()),
    }
}

/// Split a document path into a store over its directory and the document id.
///
/// `store/d1.json` becomes (`store/`, `d1`).
pub fn open_document_path(
    path: &str,
    user: &str,
    config: &SessionConfig,
) -> Result<(JsonFileStore, String), String> {
    let path = Path::new(path);
    let id = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(".json"))
        .filter(|id| !id.ends_with(".annotations"))
        .ok_or_else(|| format!("{} is not a document file (<id>.json)", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let store = JsonFileStore::new(dir, user).with_defaults(config.clone());
    Ok((store, id.to_string()))
}

/// Format error message consistently
pub fn format_error(operation: &str, details: &str) -> String {
    format!("Failed to {}: {}", operation, details)
}

/// Log success message with color (respects quiet flag)
pub fn log_success(msg: &str, quiet: bool) {
    if !quiet {
        use super::output::color;
        eprintln!("{} {}", color("32", "✓"), msg);
    }
}
