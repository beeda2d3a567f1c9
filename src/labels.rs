//! Annotation labels and their display colors.
//!
//! A collection defines a closed set of label names. Each label carries a CSS
//! color used to paint annotated tokens. When a collection only lists names,
//! colors come from [`Palette`], a deterministic HSL walk over the sorted
//! names, so the same label set always gets the same colors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color used for tokens whose label is not in the set.
pub const DEFAULT_FALLBACK_COLOR: &str = "lightgray";

/// One label: a name and a CSS color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    /// Label name as stored in annotations (e.g. `"PERSON"`).
    pub name: String,
    /// CSS color (`"hsl(0,120%,75%)"`, `"#ffcc00"`, ...).
    pub color: String,
}

impl Label {
    /// Create a label.
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Deterministic color generator for label sets without explicit colors.
///
/// Hue starts at 0. Whenever it lands on a multiple of 360 (the first color
/// included) the hue step widens by 10 and the saturation drops by 40,
/// wrapping back to 160 at zero.
#[derive(Debug, Clone)]
pub struct Palette {
    hue: i32,
    hue_step: i32,
    saturation: i32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            hue: -20,
            hue_step: 20,
            saturation: 160,
        }
    }
}

impl Iterator for Palette {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.hue += self.hue_step;
        if self.hue % 360 == 0 {
            self.hue_step += 10;
            self.saturation -= 40;
        }
        if self.saturation == 0 {
            self.saturation = 160;
        }
        Some(format!("hsl({},{}%,75%)", self.hue, self.saturation))
    }
}

/// The closed set of labels available in a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelSet {
    labels: Vec<Label>,
    #[serde(default)]
    fallback: String,
}

impl LabelSet {
    /// Build from explicit labels. Later duplicates of a name are dropped.
    #[must_use]
    pub fn new(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut out: Vec<Label> = Vec::new();
        for label in labels {
            if !out.iter().any(|l| l.name == label.name) {
                out.push(label);
            }
        }
        Self {
            labels: out,
            fallback: DEFAULT_FALLBACK_COLOR.to_string(),
        }
    }

    /// Build from bare names: sorted, deduplicated, colored by [`Palette`].
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self::new(
            names
                .into_iter()
                .zip(Palette::default())
                .map(|(name, color)| Label { name, color }),
        )
    }

    /// Replace the fallback color.
    #[must_use]
    pub fn with_fallback(mut self, color: impl Into<String>) -> Self {
        self.fallback = color.into();
        self
    }

    /// Look up a label by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// True if `name` is in the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Color for `name`, or the fallback color.
    #[must_use]
    pub fn color_for(&self, name: &str) -> &str {
        self.get(name).map_or(self.fallback(), |l| l.color.as_str())
    }

    /// Fallback color for unknown labels.
    #[must_use]
    pub fn fallback(&self) -> &str {
        if self.fallback.is_empty() {
            DEFAULT_FALLBACK_COLOR
        } else {
            &self.fallback
        }
    }

    /// Labels in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    /// Label names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.name.as_str())
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the set has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}
