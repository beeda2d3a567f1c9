//! Session configuration, read from TOML.
//!
//! ```toml
//! overlap = "forbid"
//! color_fallback = "#dddddd"
//!
//! [[labels]]
//! name = "PERSON"
//! color = "#ffb3ba"
//!
//! [[labels]]
//! name = "ORG"
//! color = "#bae1ff"
//! ```
//!
//! Every field is optional. Values supplied by a
//! [`DocumentSource`](crate::persist::DocumentSource) for a particular
//! collection take precedence over the file.

use crate::error::{Error, Result};
use crate::labels::{Label, LabelSet, DEFAULT_FALLBACK_COLOR};
use crate::selection::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Annotation session defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Whether annotations may share tokens.
    pub overlap: OverlapPolicy,
    /// Color for labels missing from the set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_fallback: Option<String>,
    /// Labels offered when the document source does not define any.
    pub labels: Vec<Label>,
}

impl SessionConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(format!("cannot serialize config: {}", e)))
    }

    /// Label set described by this configuration.
    #[must_use]
    pub fn label_set(&self) -> LabelSet {
        LabelSet::new(self.labels.iter().cloned()).with_fallback(
            self.color_fallback
                .as_deref()
                .unwrap_or(DEFAULT_FALLBACK_COLOR),
        )
    }

    fn validate(&self) -> Result<()> {
        for (i, label) in self.labels.iter().enumerate() {
            if label.name.trim().is_empty() {
                return Err(Error::config(format!("label #{} has an empty name", i + 1)));
            }
            if self.labels[..i].iter().any(|l| l.name == label.name) {
                return Err(Error::config(format!(
                    "label {:?} is defined twice",
                    label.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.overlap, OverlapPolicy::Allow);
        assert_eq!(config.label_set().fallback(), DEFAULT_FALLBACK_COLOR);
    }

    #[test]
    fn test_full_config() {
        let text = r##"
            overlap = "forbid"
            color_fallback = "#ddd"

            [[labels]]
            name = "PERSON"
            color = "#f00"

            [[labels]]
            name = "ORG"
            color = "#00f"
        "##;
        let config = SessionConfig::from_toml_str(text).unwrap();
        assert_eq!(config.overlap, OverlapPolicy::Forbid);
        let set = config.label_set();
        assert_eq!(set.names().collect::<Vec<_>>(), ["PERSON", "ORG"]);
        assert_eq!(set.color_for("ORG"), "#00f");
        assert_eq!(set.color_for("LOC"), "#ddd");
    }

    #[test]
    fn test_rejects_bad_overlap() {
        assert!(matches!(
            SessionConfig::from_toml_str("overlap = \"sometimes\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(SessionConfig::from_toml_str("overlaps = \"allow\"").is_err());
    }

    #[test]
    fn test_rejects_duplicate_label() {
        let text = r#"
            [[labels]]
            name = "A"
            color = "red"
            [[labels]]
            name = "A"
            color = "blue"
        "#;
        assert!(SessionConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_toml_roundtrip_and_load() {
        let config = SessionConfig {
            overlap: OverlapPolicy::Forbid,
            color_fallback: None,
            labels: vec![Label::new("PERSON", "#f00")],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagspan.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SessionConfig::load("/nonexistent/tagspan.toml"),
            Err(Error::Config(_))
        ));
    }
}
