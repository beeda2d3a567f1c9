//! Pull-based rendering state.
//!
//! Nothing in the engine stores presentation state. A renderer asks for a
//! [`TokenView`] per token and draws it; the view is derived from the
//! selection, the store and the label set on every call.
//!
//! ```text
//!   tokens      Bob  ␠  met  ␠  Alice
//!   annotation  [PERSON]           [PERSON]
//!   selection             [----]
//!
//!   view(0)  annotated, annotation_left, annotation_right, Solid(PERSON color)
//!   view(2)  selected, select_left, select_right, Fill::None
//! ```

use crate::labels::LabelSet;
use crate::selection::Selection;
use crate::store::AnnotationStore;
use serde::Serialize;
use tagspan_core::TokenKind;

/// Background paint for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "colors", rename_all = "snake_case")]
pub enum Fill {
    /// Not annotated.
    None,
    /// Exactly one annotation.
    Solid(String),
    /// Several annotations, one color each, in insertion order.
    Gradient(Vec<String>),
}

impl Fill {
    /// Build from the colors of the annotations touching a token.
    #[must_use]
    pub fn from_colors(mut colors: Vec<String>) -> Self {
        match colors.len() {
            0 => Fill::None,
            1 => Fill::Solid(colors.remove(0)),
            _ => Fill::Gradient(colors),
        }
    }

    /// CSS `background` value.
    #[must_use]
    pub fn css(&self) -> String {
        match self {
            Fill::None => "white".to_string(),
            Fill::Solid(color) => color.clone(),
            Fill::Gradient(colors) => format!("linear-gradient({})", colors.join(", ")),
        }
    }
}

/// How to draw a token's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayHint {
    /// Draw the text as is.
    Text,
    /// A tab, drawn as a fixed-width gap.
    Tab,
    /// A line ending, drawn as a line break.
    LineBreak,
}

impl DisplayHint {
    /// Hint for a token kind.
    #[must_use]
    pub const fn for_kind(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Tab => DisplayHint::Tab,
            TokenKind::LineBreak => DisplayHint::LineBreak,
            _ => DisplayHint::Text,
        }
    }
}

/// Everything a renderer needs to draw one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenView {
    /// Token index.
    pub index: usize,
    /// Token text.
    pub text: String,
    /// Stable element id (`word_<start>_<end>`).
    pub element_id: String,
    /// Part of the in-progress selection.
    pub selected: bool,
    /// First token of the selection.
    pub select_left: bool,
    /// Last token of the selection.
    pub select_right: bool,
    /// Covered by at least one annotation.
    pub annotated: bool,
    /// Some annotation starts at this token.
    pub annotation_left: bool,
    /// Some annotation ends at this token.
    pub annotation_right: bool,
    /// Labels of the annotations touching this token, in insertion order.
    pub labels: Vec<String>,
    /// Hover text: the labels joined by `", "`.
    pub tooltip: String,
    /// Background paint.
    pub background: Fill,
    /// The label popover is anchored here.
    pub popover: bool,
    /// Drawing hint for tabs and line breaks.
    pub display: DisplayHint,
}

/// Derive the view of token `index`. `None` if the index is out of range.
#[must_use]
pub fn token_view(
    store: &AnnotationStore,
    selection: &Selection,
    labels: &LabelSet,
    index: usize,
) -> Option<TokenView> {
    let token = store.token(index)?;
    let touching = store.annotations_touching(index);

    let selected = selection.contains_index(index);
    let select_left = selection.first().is_some_and(|t| t.index() == index);
    let select_right = selection.last().is_some_and(|t| t.index() == index);

    let names: Vec<String> = touching.iter().map(|a| a.label.clone()).collect();
    let colors = names
        .iter()
        .map(|name| labels.color_for(name).to_string())
        .collect();

    Some(TokenView {
        index,
        text: token.text().to_string(),
        element_id: token.element_id(),
        selected,
        select_left,
        select_right,
        annotated: !touching.is_empty(),
        annotation_left: touching.iter().any(|a| a.start() == token.start()),
        annotation_right: touching.iter().any(|a| a.end() == token.end()),
        tooltip: names.join(", "),
        labels: names,
        background: Fill::from_colors(colors),
        popover: selection.popover_anchors().contains(&index),
        display: DisplayHint::for_kind(token.kind()),
    })
}

/// Views for every token, in order.
#[must_use]
pub fn token_views(
    store: &AnnotationStore,
    selection: &Selection,
    labels: &LabelSet,
) -> Vec<TokenView> {
    (0..store.tokens().len())
        .filter_map(|i| token_view(store, selection, labels, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;
    use crate::tokenizer::tokenize;
    use tagspan_core::Span;

    fn fixture() -> (AnnotationStore, LabelSet) {
        let mut store = AnnotationStore::with_tokens(tokenize("Bob met Alice"));
        store.add_or_update(Span::new(0, 3), "PERSON").unwrap();
        let labels = LabelSet::new([Label::new("PERSON", "#f00"), Label::new("ORG", "#00f")]);
        (store, labels)
    }

    #[test]
    fn test_annotated_token() {
        let (store, labels) = fixture();
        let view = token_view(&store, &Selection::default(), &labels, 0).unwrap();
        assert!(view.annotated && view.annotation_left && view.annotation_right);
        assert_eq!(view.tooltip, "PERSON");
        assert_eq!(view.background, Fill::Solid("#f00".into()));
        assert_eq!(view.element_id, "word_0_3");
        assert!(!view.selected);
    }

    #[test]
    fn test_plain_token() {
        let (store, labels) = fixture();
        let view = token_view(&store, &Selection::default(), &labels, 2).unwrap();
        assert!(!view.annotated);
        assert_eq!(view.background, Fill::None);
        assert_eq!(view.background.css(), "white");
        assert!(view.tooltip.is_empty());
    }

    #[test]
    fn test_gradient_for_overlap() {
        let (mut store, labels) = fixture();
        store.add_or_update(Span::new(0, 7), "ORG").unwrap();
        let view = token_view(&store, &Selection::default(), &labels, 0).unwrap();
        assert_eq!(view.tooltip, "PERSON, ORG");
        assert_eq!(view.background.css(), "linear-gradient(#f00, #00f)");
        // "met" is inside ORG only, and ORG ends there
        let met = token_view(&store, &Selection::default(), &labels, 2).unwrap();
        assert!(!met.annotation_left && met.annotation_right);
    }

    #[test]
    fn test_selection_edges() {
        let (store, labels) = fixture();
        let mut sel = Selection::default();
        sel.start(&store.tokens()[2]);
        sel.add(&store, &store.tokens()[4]);
        let views = token_views(&store, &sel, &labels);
        assert!(views[2].select_left && !views[2].select_right);
        assert!(views[3].selected && !views[3].select_left && !views[3].select_right);
        assert!(views[4].select_right);
        assert!(!views[1].selected);
    }

    #[test]
    fn test_display_hints() {
        let store = AnnotationStore::with_tokens(tokenize("a\tb\r\nc"));
        let views = token_views(&store, &Selection::default(), &LabelSet::default());
        let hints: Vec<DisplayHint> = views.iter().map(|v| v.display).collect();
        assert_eq!(
            hints,
            [
                DisplayHint::Text,
                DisplayHint::Tab,
                DisplayHint::Text,
                DisplayHint::LineBreak,
                DisplayHint::Text
            ]
        );
    }

    #[test]
    fn test_out_of_range() {
        let (store, labels) = fixture();
        assert!(token_view(&store, &Selection::default(), &labels, 99).is_none());
    }
}
