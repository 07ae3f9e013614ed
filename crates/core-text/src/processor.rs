//! Text processor: resolves emoji tokens in a source string into a processed
//! string plus an offset index for the renderer.
//!
//! Substitution rules per resolved token:
//! - Plain `:name:` → one [`PLACEHOLDER`] char; the index entry sits on it with
//!   `escaped == false` and the renderer draws the icon there.
//! - Escaped `\:name:` → the literal code `:name:` (marker dropped); the index
//!   entry sits where the marker was with `escaped == true` and the renderer
//!   draws the code as plain glyphs.
//! - Unknown names are left untouched and get no index entry.
//!
//! Positions are char indices into the processed text. Each one is the match
//! offset in the source minus the running `length_difference` (source chars
//! removed so far). The output is built in a single pass.

use crate::scan::TokenScanner;
use core_registry::{Emoji, EmojiRegistry};
use indexmap::IndexMap;
use std::sync::{Arc, LazyLock};

/// Stand-in char for an unescaped emoji in processed text.
pub const PLACEHOLDER: char = '\u{2603}';

static EMPTY: LazyLock<Arc<TextProcessor>> = LazyLock::new(|| Arc::new(TextProcessor::blank()));

/// Renderer handle stored at one offset of a processed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiLiteral {
    emoji: Arc<Emoji>,
    escaped: bool,
}

impl EmojiLiteral {
    pub fn new(emoji: Arc<Emoji>, escaped: bool) -> Self {
        Self { emoji, escaped }
    }

    pub fn emoji(&self) -> &Arc<Emoji> {
        &self.emoji
    }

    /// True when the renderer must draw the code text instead of the icon.
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }
}

#[derive(Debug)]
pub struct TextProcessor {
    source: String,
    processed: String,
    index: IndexMap<usize, EmojiLiteral>,
    length_difference: isize,
}

impl TextProcessor {
    fn blank() -> Self {
        Self {
            source: String::new(),
            processed: String::new(),
            index: IndexMap::new(),
            length_difference: 0,
        }
    }

    /// Shared instance for empty or absent input.
    pub fn empty() -> Arc<Self> {
        Arc::clone(&EMPTY)
    }

    /// Sentinel for `None` / `""`, a fresh processor otherwise.
    pub fn shared(source: Option<&str>, registry: &EmojiRegistry) -> Arc<Self> {
        match source {
            Some(text) if !text.is_empty() => Arc::new(Self::new(text, registry)),
            _ => Self::empty(),
        }
    }

    pub fn new(source: &str, registry: &EmojiRegistry) -> Self {
        let mut processed = String::with_capacity(source.len());
        let mut index = IndexMap::new();
        let mut length_difference: isize = 0;
        let mut copied = 0usize; // source bytes already flushed to `processed`

        for token in TokenScanner::new(source) {
            let Some(emoji) = registry.lookup(token.name) else {
                continue;
            };
            processed.push_str(&source[copied..token.bytes.start]);
            copied = token.bytes.end;

            let position = (token.start as isize - length_difference) as usize;
            let before = token.len() as isize;
            let after = if token.escaped {
                processed.push_str(emoji.code());
                emoji.code().len() as isize
            } else {
                processed.push(PLACEHOLDER);
                1
            };
            length_difference += before - after;
            index.insert(position, EmojiLiteral::new(emoji, token.escaped));
        }
        processed.push_str(&source[copied..]);

        Self {
            source: source.to_string(),
            processed,
            index,
            length_difference,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source
    }

    pub fn processed_text(&self) -> &str {
        &self.processed
    }

    /// Cumulative (source chars − processed chars) after the last substitution.
    pub fn length_difference(&self) -> isize {
        self.length_difference
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    pub fn emoji_at(&self, position: usize) -> Option<&EmojiLiteral> {
        self.index.get(&position)
    }

    pub fn has_emoji_at(&self, position: usize) -> bool {
        self.index.contains_key(&position)
    }

    /// Index entries in left-to-right scan order.
    pub fn literals(&self) -> impl Iterator<Item = (usize, &EmojiLiteral)> {
        self.index.iter().map(|(pos, lit)| (*pos, lit))
    }

    pub fn literal_count(&self) -> usize {
        self.index.len()
    }
}
