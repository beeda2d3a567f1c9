//! The in-progress selection: a contiguous run of tokens grown one gesture at
//! a time before it is committed as an annotation.
//!
//! # States
//!
//! ```text
//!            start(t)            add(t) / add(t) / ...
//!   EMPTY ───────────▶ GROWING ─────────────────────────┐
//!     ▲                   │  ◀──────────────────────────┘
//!     └──── clear() ──────┘
//! ```
//!
//! There is no committed state. Committing means the caller reads the run
//! (via [`Selection::clear`]), builds an annotation from it, and is done.
//!
//! # Growth rule
//!
//! A token may join the run only if every token strictly between the run's
//! boundary and the target is pure whitespace. The run can "jump" a gap of
//! spaces or tabs (absorbing them), but never a word, a punctuation mark or
//! a line break:
//!
//! ```text
//!   Alpha ␠ Beta      {Alpha} + Beta  ->  {Alpha, ␠, Beta}
//!   Alpha X Beta      {Alpha} + Beta  ->  refused ("X" is in the way)
//! ```
//!
//! With [`OverlapPolicy::Forbid`], neither the target nor any absorbed
//! whitespace may already be covered by an annotation.

use crate::store::{span_of, AnnotationStore};
use serde::{Deserialize, Serialize};
use tagspan_core::{Span, Token};

/// Whether two annotations may share tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Annotations may overlap (collection default).
    #[default]
    Allow,
    /// A token may belong to at most one annotation.
    Forbid,
}

impl OverlapPolicy {
    /// Build from an "overlap allowed" flag.
    #[must_use]
    pub const fn from_allowed(allowed: bool) -> Self {
        if allowed {
            OverlapPolicy::Allow
        } else {
            OverlapPolicy::Forbid
        }
    }

    /// True when overlap is allowed.
    #[must_use]
    pub const fn allows_overlap(&self) -> bool {
        matches!(self, OverlapPolicy::Allow)
    }
}

/// Direction of growth relative to the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward lower token indices.
    Left,
    /// Toward higher token indices.
    Right,
}

/// The single in-progress selection of a subject.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    policy: OverlapPolicy,
    run: Vec<Token>,
    /// Token indices carrying an open label popover.
    popover: Vec<usize>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Overlap policy in force.
    #[must_use]
    pub const fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Change the overlap policy.
    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.policy = policy;
    }

    /// True when no token is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.run.is_empty()
    }

    /// Number of selected tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.run.len()
    }

    /// Selected tokens in document order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.run
    }

    /// First selected token.
    #[must_use]
    pub fn first(&self) -> Option<&Token> {
        self.run.first()
    }

    /// Last selected token.
    #[must_use]
    pub fn last(&self) -> Option<&Token> {
        self.run.last()
    }

    /// Character span covered by the run.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        span_of(&self.run)
    }

    /// True if `token` is within the current run.
    #[must_use]
    pub fn contains(&self, token: &Token) -> bool {
        self.contains_index(token.index())
    }

    /// True if token index `index` is within the current run.
    #[must_use]
    pub fn contains_index(&self, index: usize) -> bool {
        match (self.run.first(), self.run.last()) {
            (Some(first), Some(last)) => first.index() <= index && index <= last.index(),
            _ => false,
        }
    }

    /// Begin a selection at `token`.
    ///
    /// # Panics
    /// If the selection is not empty. Starting over an existing run is a
    /// caller bug; clear first.
    pub fn start(&mut self, token: &Token) {
        assert!(
            self.is_empty(),
            "selection already holds {} token(s); clear it before starting a new one",
            self.run.len()
        );
        self.run.push(token.clone());
    }

    /// Decide whether `token` may extend the run.
    ///
    /// Rules, in order:
    /// 1. the run is non-empty and does not contain `token`
    /// 2. `token` belongs to `store`'s token sequence
    /// 3. under [`OverlapPolicy::Forbid`], `token` is not covered
    /// 4. every token between the run boundary and `token` is pure
    ///    whitespace (and, under `Forbid`, uncovered); scanning goes outward
    ///    from the boundary and stops at the first offender
    #[must_use]
    pub fn can_add(&self, store: &AnnotationStore, token: &Token) -> bool {
        let (Some(first), Some(last)) = (self.run.first(), self.run.last()) else {
            return false;
        };
        if self.contains(token) || store.token(token.index()) != Some(token) {
            return false;
        }
        let forbid = !self.policy.allows_overlap();
        if forbid && store.is_covered(token.index()) {
            return false;
        }

        let passable = |i: usize| {
            store
                .token(i)
                .is_some_and(|t| t.is_whitespace() && !(forbid && store.is_covered(i)))
        };
        match self.direction_to(token) {
            Direction::Left => (token.index() + 1..first.index()).rev().all(passable),
            Direction::Right => (last.index() + 1..token.index()).all(passable),
        }
    }

    /// Extend the run up to and including `token`, absorbing the whitespace
    /// tokens in between.
    ///
    /// # Panics
    /// If [`can_add`](Self::can_add) is false for `token`.
    pub fn add(&mut self, store: &AnnotationStore, token: &Token) {
        assert!(
            self.can_add(store, token),
            "token {} ({:?}) cannot extend the selection",
            token.index(),
            token.text()
        );
        let tokens = store.tokens();
        let target = token.index();
        match self.direction_to(token) {
            Direction::Left => {
                let first = self.run[0].index();
                let mut grown = tokens[target..first].to_vec();
                grown.append(&mut self.run);
                self.run = grown;
            }
            Direction::Right => {
                let last = self.run[self.run.len() - 1].index();
                self.run.extend_from_slice(&tokens[last + 1..=target]);
            }
        }
    }

    /// Empty the run and return the tokens it held.
    ///
    /// With `release_popover`, any popover anchored on the selection is
    /// released too; otherwise it stays open for the caller to release.
    pub fn clear(&mut self, release_popover: bool) -> Vec<Token> {
        if release_popover {
            self.popover.clear();
        }
        std::mem::take(&mut self.run)
    }

    /// Anchor the label popover on every selected token.
    pub fn attach_popover(&mut self) {
        self.popover = self.run.iter().map(Token::index).collect();
    }

    /// Token indices carrying the popover.
    #[must_use]
    pub fn popover_anchors(&self) -> &[usize] {
        &self.popover
    }

    /// Release the popover.
    pub fn release_popover(&mut self) {
        self.popover.clear();
    }

    fn direction_to(&self, token: &Token) -> Direction {
        match self.run.first() {
            Some(first) if token.index() < first.index() => Direction::Left,
            _ => Direction::Right,
        }
    }
}
