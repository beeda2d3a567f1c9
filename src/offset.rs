//! Character, byte and UTF-16 offset conversion.
//!
//! # Three ways to count
//!
//! ```text
//! Text: "Zoë met Bob"
//!
//!   char    Z  o  ë  ␠  m  e  t  ␠  B  o  b
//!           0  1  2  3  4  5  6  7  8  9  10
//!
//!   byte    Z  o  [ë ]  ␠  m  e  t  ␠  B  o  b
//!           0  1  2-3   4  5  6  7  8  9  10 11
//!
//!   utf16   same as char here; differs for astral characters (emoji)
//! ```
//!
//! Tokens and annotations use **character** offsets. Rust strings are sliced
//! by **byte**. Annotation records written by browser-based tools count
//! **UTF-16** code units. [`SpanConverter`] precomputes the tables for one
//! text so each conversion is O(1).

use tagspan_core::Span;

/// Convert byte offsets to character offsets.
///
/// A byte offset in the middle of a multi-byte character maps to that
/// character. Offsets past the end clamp to the character count.
#[must_use]
pub fn bytes_to_chars(text: &str, byte_start: usize, byte_end: usize) -> (usize, usize) {
    let mut char_start = None;
    for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
        let next = byte_idx + ch.len_utf8();
        if char_start.is_none() && byte_start < next {
            char_start = Some(char_idx);
        }
        if byte_end <= byte_idx {
            return (char_start.unwrap_or(char_idx), char_idx);
        }
    }
    let count = text.chars().count();
    (char_start.unwrap_or(count), count)
}

/// Convert character offsets to byte offsets.
///
/// Offsets past the end clamp to the byte length.
#[must_use]
pub fn chars_to_bytes(text: &str, char_start: usize, char_end: usize) -> (usize, usize) {
    let mut byte_start = text.len();
    for (char_idx, (byte_idx, _ch)) in text.char_indices().enumerate() {
        if char_idx == char_start {
            byte_start = byte_idx;
        }
        if char_idx == char_end {
            return (byte_start, byte_idx);
        }
    }
    (byte_start, text.len())
}

/// Converter for many spans over the same text.
#[derive(Debug, Clone)]
pub struct SpanConverter {
    /// `char_to_byte[c]` is the byte offset of character `c`; one extra entry
    /// for the end of text.
    char_to_byte: Vec<usize>,
    /// Same layout for UTF-16 code units.
    char_to_utf16: Vec<usize>,
    /// Character count, used to bound the ASCII fast paths.
    len: usize,
    is_ascii: bool,
}

impl SpanConverter {
    /// Create a converter for the given text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                char_to_byte: Vec::new(),
                char_to_utf16: Vec::new(),
                len: text.len(),
                is_ascii: true,
            };
        }
        let mut char_to_byte = Vec::with_capacity(text.len() + 1);
        let mut char_to_utf16 = Vec::with_capacity(text.len() + 1);
        let mut utf16 = 0;
        for (byte_idx, ch) in text.char_indices() {
            char_to_byte.push(byte_idx);
            char_to_utf16.push(utf16);
            utf16 += ch.len_utf16();
        }
        char_to_byte.push(text.len());
        char_to_utf16.push(utf16);
        Self {
            len: char_to_byte.len() - 1,
            char_to_byte,
            char_to_utf16,
            is_ascii: false,
        }
    }

    /// Check if the text is ASCII (all three offset systems coincide).
    #[must_use]
    pub const fn is_ascii(&self) -> bool {
        self.is_ascii
    }

    /// Number of characters in the text.
    #[must_use]
    pub fn char_len(&self, text: &str) -> usize {
        if self.is_ascii {
            text.len()
        } else {
            self.char_to_byte.len() - 1
        }
    }

    /// Convert a char offset to a byte offset, clamping to the end of text.
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            return char_idx.min(self.len);
        }
        let last = self.char_to_byte.len() - 1;
        self.char_to_byte[char_idx.min(last)]
    }

    /// Convert a char offset to a UTF-16 offset, clamping to the end of text.
    #[must_use]
    pub fn char_to_utf16(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            return char_idx.min(self.len);
        }
        let last = self.char_to_utf16.len() - 1;
        self.char_to_utf16[char_idx.min(last)]
    }

    /// Convert a UTF-16 offset to a char offset.
    ///
    /// Returns `None` if the offset falls inside a surrogate pair or past the
    /// end of the text.
    #[must_use]
    pub fn utf16_to_char(&self, utf16_idx: usize) -> Option<usize> {
        if self.is_ascii {
            return (utf16_idx <= self.len).then_some(utf16_idx);
        }
        self.char_to_utf16.binary_search(&utf16_idx).ok()
    }

    /// Convert a span expressed in UTF-16 code units to a char span.
    #[must_use]
    pub fn span_from_utf16(&self, span: Span) -> Option<Span> {
        Some(Span::new(
            self.utf16_to_char(span.start)?,
            self.utf16_to_char(span.end)?,
        ))
    }

    /// Convert a char span to UTF-16 code units.
    #[must_use]
    pub fn span_to_utf16(&self, span: Span) -> Span {
        Span::new(self.char_to_utf16(span.start), self.char_to_utf16(span.end))
    }

    /// Slice the text covered by a char span.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str, span: Span) -> &'a str {
        let start = self.char_to_byte(span.start);
        let end = self.char_to_byte(span.end);
        text.get(start..end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_chars_ascii() {
        assert_eq!(bytes_to_chars("Hello World", 6, 11), (6, 11));
    }

    #[test]
    fn test_bytes_to_chars_euro() {
        // "Price " = 6 bytes, € = 3 bytes, "50" = 2 bytes
        assert_eq!(bytes_to_chars("Price €50", 6, 11), (6, 9));
    }

    #[test]
    fn test_bytes_to_chars_mid_char() {
        // é occupies bytes 3-4
        assert_eq!(bytes_to_chars("café", 4, 5), (3, 4));
    }

    #[test]
    fn test_bytes_to_chars_out_of_bounds() {
        assert_eq!(bytes_to_chars("Hello", 10, 15), (5, 5));
    }

    #[test]
    fn test_chars_to_bytes() {
        assert_eq!(chars_to_bytes("Price €50", 6, 9), (6, 11));
        assert_eq!(chars_to_bytes("日本語 test", 4, 8), (10, 14));
        assert_eq!(chars_to_bytes("abc", 5, 9), (3, 3));
    }

    #[test]
    fn test_converter_slice() {
        let text = "Zoë met Bob";
        let conv = SpanConverter::new(text);
        assert!(!conv.is_ascii());
        assert_eq!(conv.slice(text, Span::new(0, 3)), "Zoë");
        assert_eq!(conv.slice(text, Span::new(8, 11)), "Bob");
        assert_eq!(conv.char_len(text), 11);
    }

    #[test]
    fn test_utf16_astral() {
        // 👋 is one char, two UTF-16 units, four bytes
        let text = "Hi 👋 Bob";
        let conv = SpanConverter::new(text);
        assert_eq!(conv.char_to_utf16(4), 5);
        assert_eq!(conv.utf16_to_char(6), Some(5));
        assert_eq!(conv.utf16_to_char(4), None);
        let bob = Span::new(5, 8);
        assert_eq!(conv.span_to_utf16(bob), Span::new(6, 9));
        assert_eq!(conv.span_from_utf16(Span::new(6, 9)), Some(bob));
        assert_eq!(conv.slice(text, bob), "Bob");
    }

    #[test]
    fn test_ascii_fast_path() {
        let conv = SpanConverter::new("Bob met Alice");
        assert!(conv.is_ascii());
        assert_eq!(conv.char_to_byte(8), 8);
        assert_eq!(conv.utf16_to_char(8), Some(8));
    }

    #[test]
    fn test_past_end_offsets() {
        let ascii = SpanConverter::new("Bob");
        assert_eq!(ascii.utf16_to_char(3), Some(3));
        assert_eq!(ascii.utf16_to_char(4), None);
        assert_eq!(ascii.span_from_utf16(Span::new(0, 9)), None);
        assert_eq!(ascii.char_to_byte(9), 3);
        assert_eq!(ascii.char_to_utf16(9), 3);

        let wide = SpanConverter::new("👋 Bob");
        assert_eq!(wide.utf16_to_char(6), Some(5));
        assert_eq!(wide.utf16_to_char(7), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Round-trip: chars -> bytes -> chars preserves char offsets.
        #[test]
        fn roundtrip_chars_bytes_chars(text in ".{1,60}") {
            let n = text.chars().count();
            let (b0, b1) = chars_to_bytes(&text, 0, n);
            prop_assert_eq!(bytes_to_chars(&text, b0, b1), (0, n));
        }

        /// Converter agrees with the direct conversion.
        #[test]
        fn converter_matches_direct(text in ".{1,60}", a in 0usize..60, b in 0usize..60) {
            let n = text.chars().count();
            let (s, e) = (a.min(b).min(n), a.max(b).min(n));
            let conv = SpanConverter::new(&text);
            prop_assert_eq!(
                (conv.char_to_byte(s), conv.char_to_byte(e)),
                chars_to_bytes(&text, s, e)
            );
        }

        /// UTF-16 round trip on character boundaries.
        #[test]
        fn utf16_roundtrip(text in ".{1,60}", i in 0usize..60) {
            let conv = SpanConverter::new(&text);
            let i = i.min(text.chars().count());
            prop_assert_eq!(conv.utf16_to_char(conv.char_to_utf16(i)), Some(i));
        }
    }
}
