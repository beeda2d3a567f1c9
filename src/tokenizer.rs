//! Document tokenization.
//!
//! Splits text into stable, offset-addressable [`Token`]s:
//!
//! - a maximal run of word characters (alphanumerics and `_`) is one token
//! - every other character is its own one-character token, so `"a  b"` gives
//!   `["a", " ", " ", "b"]` and `"?!"` gives `["?", "!"]`
//! - a line ending (`\r\n`, `\n\r`, `\n`, or a bare `\r`) is one token,
//!   matched greedily left to right
//!
//! The split is total and gapless: concatenating the token texts reproduces
//! the input exactly, and no token is empty.
//!
//! ```
//! use tagspan::tokenizer::tokenize;
//!
//! let tokens = tokenize("Bob met Alice");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text()).collect();
//! assert_eq!(texts, ["Bob", " ", "met", " ", "Alice"]);
//! assert_eq!((tokens[4].start(), tokens[4].end()), (8, 13));
//! ```

use crate::error::{Error, Result};
use tagspan_core::{is_word_char, Token};

/// Anything that turns document text into a token sequence.
///
/// Implementations must be total, gapless and ascending (see
/// [`check_sequence`]); the store and the selection rely on it.
pub trait Tokenizer {
    /// Tokenize `text`.
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// The default word/punctuation/line-break tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text)
    }
}

/// Tokenize `text` with the default rules.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut char_pos = 0;

    while let Some((byte_start, ch)) = chars.next() {
        let mut byte_end = byte_start + ch.len_utf8();
        let mut char_len = 1;

        if is_word_char(ch) {
            while let Some(&(b, c)) = chars.peek() {
                if !is_word_char(c) {
                    break;
                }
                byte_end = b + c.len_utf8();
                char_len += 1;
                chars.next();
            }
        } else if ch == '\n' || ch == '\r' {
            // \r\n and \n\r pair up; \r\r and \n\n do not
            let partner = if ch == '\n' { '\r' } else { '\n' };
            if let Some(&(b, c)) = chars.peek() {
                if c == partner {
                    byte_end = b + 1;
                    char_len += 1;
                    chars.next();
                }
            }
        }

        let index = tokens.len();
        tokens.push(Token::new(
            char_pos,
            byte_start,
            &text[byte_start..byte_end],
            index,
        ));
        char_pos += char_len;
    }

    tokens
}

/// Verify that `tokens` is a well-formed token sequence for `text`.
///
/// Checks that indices are consecutive from 0, offsets are gapless and
/// ascending, no token is empty, and the texts concatenate to `text`.
pub fn check_sequence(text: &str, tokens: &[Token]) -> Result<()> {
    let mut char_pos = 0;
    let mut byte_pos = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.text().is_empty() {
            return Err(Error::invalid_input(format!("token {} is empty", i)));
        }
        if token.index() != i {
            return Err(Error::invalid_input(format!(
                "token at position {} has index {}",
                i,
                token.index()
            )));
        }
        if token.start() != char_pos || token.byte_start() != byte_pos {
            return Err(Error::invalid_input(format!(
                "token {} starts at {} but previous token ended at {}",
                i,
                token.start(),
                char_pos
            )));
        }
        if text.get(token.byte_start()..token.byte_end()) != Some(token.text()) {
            return Err(Error::invalid_input(format!(
                "token {} text does not match the document",
                i
            )));
        }
        char_pos = token.end();
        byte_pos = token.byte_end();
    }
    if byte_pos != text.len() {
        return Err(Error::invalid_input(format!(
            "tokens cover {} of {} bytes",
            byte_pos,
            text.len()
        )));
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Concatenating token texts reproduces the input.
        #[test]
        fn concat_reproduces_input(text in "\\PC{0,80}|[a-z \\r\\n\\t.,]{0,80}") {
            let joined: String = tokenize(&text).iter().map(|t| t.text()).collect();
            prop_assert_eq!(joined, text);
        }

        /// The produced sequence always passes the structural check.
        #[test]
        fn sequence_is_well_formed(text in "\\PC{0,80}|[A-Za-z \\r\\n\\t!?]{0,80}") {
            let tokens = tokenize(&text);
            prop_assert!(check_sequence(&text, &tokens).is_ok());
        }

        /// Tokenizing is deterministic and prefix-stable up to the last token.
        #[test]
        fn prefix_tokens_agree(a in "[a-z ,.\n\r\t]{0,40}", b in "[a-z ,.\n\r\t]{0,40}") {
            let whole = tokenize(&format!("{a}{b}"));
            let head = tokenize(&a);
            if let Some((_, settled)) = head.split_last() {
                prop_assert_eq!(&whole[..settled.len()], settled);
            }
        }

        /// Only word tokens are ever longer than one char, besides paired line endings.
        #[test]
        fn multi_char_tokens_are_words_or_breaks(text in "[a-z0-9_ ,\\r\\n]{0,80}") {
            for token in tokenize(&text) {
                if token.char_len() > 1 {
                    prop_assert!(
                        token.text().chars().all(is_word_char)
                            || token.text() == "\r\n"
                            || token.text() == "\n\r"
                    );
                }
            }
        }
    }
}
