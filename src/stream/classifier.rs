//! Reasoning/content line classification.
//!
//! Textual heuristic only: a line that opens with a reasoning phrase starts a reasoning run,
//! a line that opens a fence, a heading or a deliverable forces final content, and every
//! other line keeps the classification of the line before it. Final-content lines that
//! happen to start with a reasoning phrase are misclassified; that is accepted.

use std::collections::VecDeque;

use tracing::trace;

pub const DEFAULT_REASONING_WINDOW: usize = 4;

/// Phrases that start a reasoning run, checked in order.
const REASONING_PREFIXES: &[&str] = &[
    "Let me",
    "I'll",
    "I will",
    "Now I",
    "Now let me",
    "Analyzing",
    "Checking",
    "Looking at",
    "I need to",
    "I'm going to",
];

/// Deliverable introductions that force final content.
const DELIVERABLE_PREFIXES: &[&str] = &["Here's", "Here is"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Reasoning,
    Content,
}

fn is_heading_line(line: &str) -> bool {
    let hashes = line.bytes().take_while(|byte| *byte == b'#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with([' ', '\t'])
}

fn is_content_start(line: &str) -> bool {
    line.starts_with("```")
        || is_heading_line(line)
        || DELIVERABLE_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix))
}

fn is_reasoning_start(line: &str) -> bool {
    REASONING_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Classifies one complete line given the class of the previous line.
pub fn classify_line(line: &str, previous: LineClass) -> LineClass {
    let trimmed = line.trim_start();
    if is_content_start(trimmed) {
        LineClass::Content
    } else if is_reasoning_start(trimmed) {
        LineClass::Reasoning
    } else {
        previous
    }
}

/// Append-only reasoning lines for one turn, displayed as a rolling window.
#[derive(Debug, Clone)]
pub struct ReasoningWindow {
    lines: Vec<String>,
    visible: usize,
}

impl ReasoningWindow {
    pub fn new(visible: usize) -> Self {
        Self {
            lines: Vec::new(),
            visible: visible.max(1),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// The last `visible` lines, oldest first.
    pub fn visible_lines(&self) -> &[String] {
        let start = self.lines.len().saturating_sub(self.visible);
        &self.lines[start..]
    }

    pub fn all_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for ReasoningWindow {
    fn default() -> Self {
        Self::new(DEFAULT_REASONING_WINDOW)
    }
}

/// Output of one classification step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// Reasoning lines without their newline.
    pub reasoning: Vec<String>,
    /// Final-content text, newlines preserved, ready to append to the message.
    pub content: String,
}

impl Classified {
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_empty() && self.content.is_empty()
    }
}

/// Splits committed chunks into complete lines and routes them by class.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    partial: String,
    last: LineClass,
    pending_lines: VecDeque<String>,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self {
            partial: String::new(),
            last: LineClass::Content,
            pending_lines: VecDeque::new(),
        }
    }
}

impl ContentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a committed chunk. Complete lines are classified; a trailing partial line is
    /// held until its newline arrives or [`ContentClassifier::finish`] is called.
    pub fn feed(&mut self, chunk: &str) -> Classified {
        self.partial.push_str(chunk);
        while let Some(idx) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=idx).collect();
            self.pending_lines.push_back(line);
        }
        self.drain_pending()
    }

    /// Classifies any held partial line. Called when the stream ends.
    pub fn finish(&mut self) -> Classified {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.pending_lines.push_back(line);
        }
        self.drain_pending()
    }

    /// Restores the message-start state.
    pub fn reset(&mut self) {
        self.partial.clear();
        self.pending_lines.clear();
        self.last = LineClass::Content;
    }

    /// The held partial line, if it would currently classify as content.
    pub fn preview_tail(&self) -> Option<&str> {
        if self.partial.is_empty() {
            return None;
        }
        match classify_line(&self.partial, self.last) {
            LineClass::Content => Some(self.partial.as_str()),
            LineClass::Reasoning => None,
        }
    }

    pub fn current_class(&self) -> LineClass {
        self.last
    }

    fn drain_pending(&mut self) -> Classified {
        let mut out = Classified::default();
        while let Some(line) = self.pending_lines.pop_front() {
            let class = classify_line(&line, self.last);
            if class != self.last {
                trace!(?class, "classification switched");
            }
            self.last = class;
            match class {
                LineClass::Content => out.content.push_str(&line),
                LineClass::Reasoning => {
                    let text = line.trim_end_matches(['\n', '\r']);
                    out.reasoning.push(text.to_string());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_line, ContentClassifier, LineClass, ReasoningWindow};

    #[test]
    fn reasoning_prefix_starts_reasoning_run() {
        assert_eq!(
            classify_line("Let me check the file", LineClass::Content),
            LineClass::Reasoning
        );
        assert_eq!(
            classify_line("  Checking imports", LineClass::Content),
            LineClass::Reasoning
        );
    }

    #[test]
    fn content_start_overrides_reasoning_run() {
        assert_eq!(classify_line("```rust", LineClass::Reasoning), LineClass::Content);
        assert_eq!(classify_line("## Plan", LineClass::Reasoning), LineClass::Content);
        assert_eq!(
            classify_line("Here's the fix:", LineClass::Reasoning),
            LineClass::Content
        );
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        assert_eq!(classify_line("#hashtag", LineClass::Reasoning), LineClass::Reasoning);
    }

    #[test]
    fn plain_lines_inherit_previous_class() {
        assert_eq!(classify_line("more words", LineClass::Reasoning), LineClass::Reasoning);
        assert_eq!(classify_line("more words", LineClass::Content), LineClass::Content);
    }

    #[test]
    fn feed_routes_complete_lines_and_holds_partial() {
        let mut classifier = ContentClassifier::new();

        let out = classifier.feed("Intro line\nLet me look\nstill thinking\n## Answer\nDo");
        assert_eq!(out.content, "Intro line\n## Answer\n");
        assert_eq!(out.reasoning, vec!["Let me look", "still thinking"]);
        assert_eq!(classifier.preview_tail(), Some("Do"));

        let out = classifier.feed(" this\n");
        assert_eq!(out.content, "Do this\n");
        assert!(out.reasoning.is_empty());
    }

    #[test]
    fn finish_classifies_held_tail() {
        let mut classifier = ContentClassifier::new();
        assert!(classifier.feed("I'll check").is_empty());
        assert_eq!(classifier.preview_tail(), None);

        let out = classifier.finish();
        assert_eq!(out.reasoning, vec!["I'll check"]);
        assert!(out.content.is_empty());
    }

    #[test]
    fn reset_restores_content_default() {
        let mut classifier = ContentClassifier::new();
        classifier.feed("Analyzing\n");
        assert_eq!(classifier.current_class(), LineClass::Reasoning);

        classifier.reset();
        assert_eq!(classifier.current_class(), LineClass::Content);
        assert_eq!(classifier.feed("plain\n").content, "plain\n");
    }

    #[test]
    fn reasoning_window_shows_last_lines_only() {
        let mut window = ReasoningWindow::new(3);
        for idx in 0..5 {
            window.push(format!("line {idx}"));
        }
        assert_eq!(window.len(), 5);
        assert_eq!(window.visible_lines(), ["line 2", "line 3", "line 4"]);
    }
}
