//! Terminal presentation of processed text.

use core_text::{PLACEHOLDER, TextProcessor};
use std::fmt::Write;

/// Processed text with every icon placeholder shown as `[name]`. Escaped
/// codes are already plain text and pass through unchanged.
pub fn display_line(processor: &TextProcessor) -> String {
    let mut out = String::with_capacity(processor.processed_text().len());
    for (pos, c) in processor.processed_text().chars().enumerate() {
        match processor.emoji_at(pos) {
            Some(lit) if !lit.is_escaped() && c == PLACEHOLDER => {
                let _ = write!(out, "[{}]", lit.emoji().name());
            }
            _ => out.push(c),
        }
    }
    out
}

/// One line per offset index entry, in scan order.
pub fn describe_index(processor: &TextProcessor) -> Vec<String> {
    processor
        .literals()
        .map(|(pos, lit)| {
            let emoji = lit.emoji();
            format!(
                "  @{pos:<4} {:<20} {:<5} {:<8} {}",
                emoji.code(),
                if lit.is_escaped() { "text" } else { "icon" },
                if emoji.is_animated() { "animated" } else { "static" },
                emoji.asset()
            )
        })
        .collect()
}
