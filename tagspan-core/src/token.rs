//! Offset-addressable tokens.
//!
//! A [`Token`] is the smallest unit a user can select: a run of word
//! characters, a single punctuation mark, a single whitespace character, or a
//! single line ending.
//!
//! ```text
//! Text:    "Bob met\r\nAlice"
//!
//! index    0      1     2      3       4
//! text     "Bob"  " "   "met"  "\r\n"  "Alice"
//! start    0      3     4      7       9
//! end      3      4     7      9       14
//! kind     Word   Ws    Word   Break   Word
//! ```
//!
//! Offsets are character offsets (Unicode scalar values). The byte offset is
//! carried alongside so the source text can be sliced without a re-scan.

use serde::Serialize;

/// Returns true if `c` belongs to a word run.
///
/// Word characters are alphanumerics (in any script) and the underscore.
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Classification of a token, used for selection growth and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A maximal run of word characters.
    Word,
    /// A single non-word, non-whitespace character.
    Punctuation,
    /// A single whitespace character other than a tab or line ending.
    Whitespace,
    /// A tab character.
    Tab,
    /// A line ending: `\n`, `\r\n`, `\n\r` or a bare `\r`.
    LineBreak,
}

impl TokenKind {
    /// Classify token text.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        match text {
            "\n" | "\r" | "\r\n" | "\n\r" => TokenKind::LineBreak,
            "\t" => TokenKind::Tab,
            _ if !text.is_empty() && text.chars().all(char::is_whitespace) => {
                TokenKind::Whitespace
            }
            _ if text.chars().next().is_some_and(is_word_char) => TokenKind::Word,
            _ => TokenKind::Punctuation,
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::Punctuation => "punct",
            TokenKind::Whitespace => "space",
            TokenKind::Tab => "tab",
            TokenKind::LineBreak => "break",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token of a tokenized document.
///
/// Tokens are immutable once produced. `end` is always derived from `start`
/// and the text length, so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    start: usize,
    byte_start: usize,
    text: String,
    index: usize,
}

impl Token {
    /// Create a token.
    ///
    /// # Arguments
    /// * `start` - Character offset of the first character
    /// * `byte_start` - Byte offset of the first character
    /// * `text` - Token text
    /// * `index` - 0-based position in document order
    #[must_use]
    pub fn new(start: usize, byte_start: usize, text: impl Into<String>, index: usize) -> Self {
        Self {
            start,
            byte_start,
            text: text.into(),
            index,
        }
    }

    /// Character offset (start, inclusive).
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Character offset (end, exclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.char_len()
    }

    /// Byte offset (start, inclusive).
    #[must_use]
    pub const fn byte_start(&self) -> usize {
        self.byte_start
    }

    /// Byte offset (end, exclusive).
    #[must_use]
    pub fn byte_end(&self) -> usize {
        self.byte_start + self.text.len()
    }

    /// Token text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position in document order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Token classification.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        TokenKind::classify(&self.text)
    }

    /// True for tokens made only of whitespace that is not a line ending.
    ///
    /// A selection may grow across these tokens.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind(), TokenKind::Whitespace | TokenKind::Tab)
    }

    /// True for line ending tokens.
    #[must_use]
    pub fn is_line_break(&self) -> bool {
        self.kind() == TokenKind::LineBreak
    }

    /// Stable element id for rendering (`word_<start>_<end>`).
    #[must_use]
    pub fn element_id(&self) -> String {
        format!("word_{}_{}", self.start, self.end())
    }
}
