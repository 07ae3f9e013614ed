//! Emoji token scanner.
//!
//! Grammar: optional escape marker `\`, then `:`, one or more of
//! `[A-Za-z0-9_]`, then `:`. Matches are found left to right and never
//! overlap; scanning resumes right after a match whether or not the caller
//! uses it. At any position an escaped match wins over a plain one because
//! the marker sits one char earlier.
//!
//! Offsets are reported both as byte ranges into the source and as char
//! indices (Unicode scalar values), the unit the processor uses for its
//! offset index. Every byte of a match is ASCII, so both lengths agree.

use std::ops::Range;

pub const ESCAPE_MARKER: u8 = b'\\';
pub const TOKEN_DELIMITER: u8 = b':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'a> {
    /// Char index of the first char of the match (the marker when escaped).
    pub start: usize,
    /// Byte range of the whole match in the source.
    pub bytes: Range<usize>,
    /// Captured name, without delimiters.
    pub name: &'a str,
    pub escaped: bool,
}

impl TokenMatch<'_> {
    /// Match length in chars (== bytes).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn end(&self) -> usize {
        self.start + self.len()
    }
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn starts_char(b: u8) -> bool {
    // UTF-8 continuation bytes are 0b10xx_xxxx.
    b & 0xC0 != 0x80
}

pub struct TokenScanner<'a> {
    src: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> TokenScanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            byte: 0,
            chars: 0,
        }
    }

    /// If a `:name:` token opens at byte `colon`, return its exclusive end byte.
    fn token_at(&self, colon: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        if bytes.get(colon) != Some(&TOKEN_DELIMITER) {
            return None;
        }
        let name_start = colon + 1;
        let name_end = bytes[name_start..]
            .iter()
            .position(|&b| !is_name_byte(b))
            .map_or(bytes.len(), |off| name_start + off);
        if name_end == name_start || bytes.get(name_end) != Some(&TOKEN_DELIMITER) {
            return None;
        }
        Some(name_end + 1)
    }
}

impl<'a> Iterator for TokenScanner<'a> {
    type Item = TokenMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.src.as_bytes();
        while self.byte < bytes.len() {
            let b = bytes[self.byte];
            let found = match b {
                ESCAPE_MARKER => self.token_at(self.byte + 1).map(|end| (true, end)),
                TOKEN_DELIMITER => self.token_at(self.byte).map(|end| (false, end)),
                _ => None,
            };
            if let Some((escaped, end)) = found {
                let start_byte = self.byte;
                let start_char = self.chars;
                let name_start = start_byte + usize::from(escaped) + 1;
                self.byte = end;
                self.chars += end - start_byte;
                return Some(TokenMatch {
                    start: start_char,
                    bytes: start_byte..end,
                    name: &self.src[name_start..end - 1],
                    escaped,
                });
            }
            if starts_char(b) {
                self.chars += 1;
            }
            self.byte += 1;
        }
        None
    }
}
