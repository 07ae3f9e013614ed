//! Emoji-aware text processing for the renderer.
//!
//! - [`scan`]: hand-written scanner for `\:name:` / `:name:` tokens.
//! - [`processor`]: [`TextProcessor`], the immutable processed form of one string.
//! - [`cache`]: [`ProcessorCache`], idle-expiring reuse across render passes.

pub mod cache;
pub mod processor;
pub mod scan;

pub use cache::{DEFAULT_IDLE, ProcessorCache};
pub use processor::{EmojiLiteral, PLACEHOLDER, TextProcessor};
pub use scan::{TokenMatch, TokenScanner};
