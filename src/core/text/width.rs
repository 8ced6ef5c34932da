//! Grapheme and display width helpers.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }

    if emoji_get(grapheme).is_some() {
        return 2;
    }

    grapheme
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

/// Terminal columns occupied by plain (escape-free) text.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Replaces tabs with the spaces they occupy on screen.
pub fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Pads `text` with spaces up to `width` columns. Text already wider is returned unchanged.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let current = display_width(text);
    let mut out = text.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(current)));
    out
}
