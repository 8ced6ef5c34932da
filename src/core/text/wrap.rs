//! Word wrapping over styled runs.
//!
//! Wrapping happens on plain text before any styling is applied, so widths are exact and a
//! style never bleeds across a wrap point.

use unicode_segmentation::UnicodeSegmentation;

use super::width::{display_width, grapheme_width};
use crate::core::block::{RunStyle, StyledRun};

#[derive(Debug)]
enum Token<'a> {
    Word(&'a str, RunStyle),
    Space(&'a str, RunStyle),
    Break,
}

fn tokenize(runs: &[StyledRun]) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for run in runs {
        let style = run.style;
        for (line_idx, line) in run.text.split('\n').enumerate() {
            if line_idx > 0 {
                tokens.push(Token::Break);
            }
            let mut start = 0;
            let mut in_space: Option<bool> = None;
            for (idx, ch) in line.char_indices() {
                let is_space = ch == ' ' || ch == '\t';
                match in_space {
                    Some(prev) if prev != is_space => {
                        let piece = &line[start..idx];
                        tokens.push(if prev {
                            Token::Space(piece, style)
                        } else {
                            Token::Word(piece, style)
                        });
                        start = idx;
                    }
                    _ => {}
                }
                in_space = Some(is_space);
            }
            if let Some(prev) = in_space {
                let piece = &line[start..];
                tokens.push(if prev {
                    Token::Space(piece, style)
                } else {
                    Token::Word(piece, style)
                });
            }
        }
    }
    tokens
}

struct LineBuilder {
    lines: Vec<Vec<StyledRun>>,
    current: Vec<StyledRun>,
    current_width: usize,
}

impl LineBuilder {
    fn push_piece(&mut self, text: &str, style: RunStyle) {
        self.current_width += display_width(text);
        if let Some(last) = self.current.last_mut() {
            if last.style == style {
                last.text.push_str(text);
                return;
            }
        }
        self.current.push(StyledRun::new(text, style));
    }

    fn finish_line(&mut self) {
        while let Some(last) = self.current.last_mut() {
            let trimmed_len = last.text.trim_end_matches([' ', '\t']).len();
            last.text.truncate(trimmed_len);
            if last.text.is_empty() {
                self.current.pop();
            } else {
                break;
            }
        }
        self.lines.push(std::mem::take(&mut self.current));
        self.current_width = 0;
    }
}

/// Wraps runs to `width` columns. Always returns at least one (possibly empty) line.
///
/// Words longer than the width are split at grapheme boundaries.
pub fn wrap_runs(runs: &[StyledRun], width: usize) -> Vec<Vec<StyledRun>> {
    let width = width.max(1);
    let mut builder = LineBuilder {
        lines: Vec::new(),
        current: Vec::new(),
        current_width: 0,
    };

    for token in tokenize(runs) {
        match token {
            Token::Break => builder.finish_line(),
            Token::Space(text, style) => {
                if builder.current.is_empty() {
                    continue;
                }
                if builder.current_width + display_width(text) <= width {
                    builder.push_piece(text, style);
                } else {
                    builder.finish_line();
                }
            }
            Token::Word(text, style) => {
                let word_width = display_width(text);
                if builder.current_width + word_width <= width {
                    builder.push_piece(text, style);
                    continue;
                }
                if word_width <= width {
                    builder.finish_line();
                    builder.push_piece(text, style);
                    continue;
                }
                for grapheme in text.graphemes(true) {
                    if builder.current_width + grapheme_width(grapheme) > width
                        && !builder.current.is_empty()
                    {
                        builder.finish_line();
                    }
                    builder.push_piece(grapheme, style);
                }
            }
        }
    }

    if !builder.current.is_empty() || builder.lines.is_empty() {
        builder.finish_line();
    }
    builder.lines
}

/// Wraps plain text to `width` columns.
pub fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    wrap_runs(&[StyledRun::plain(text)], width)
        .into_iter()
        .map(|line| line.into_iter().map(|run| run.text).collect())
        .collect()
}
