//! Single-pass splitter for assistant content.
//!
//! Finds fenced code blocks (fence at the start of a line) and inline `[AGENT: Name]`
//! markers without regular expressions. Everything else is prose.

const AGENT_MARKER: &str = "[AGENT:";
const MAX_FENCE_INDENT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    Code {
        tag: Option<&'a str>,
        body: &'a str,
        /// False when the stream has not yet produced the closing fence.
        closed: bool,
    },
    AgentTag(&'a str),
}

struct Fence<'a> {
    segment: Segment<'a>,
    end: usize,
}

fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |idx| from + idx)
}

fn strip_line_ending(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

/// Backtick run length of a fence line, after at most three spaces of indent.
fn fence_run(line: &str) -> Option<(usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > MAX_FENCE_INDENT {
        return None;
    }
    let rest = &line[indent..];
    let ticks = rest.len() - rest.trim_start_matches('`').len();
    if ticks < 3 {
        return None;
    }
    Some((ticks, &rest[ticks..]))
}

fn open_fence(text: &str, start: usize) -> Option<Fence<'_>> {
    let opener_end = line_end(text, start);
    let opener = strip_line_ending(&text[start..opener_end]);
    let (ticks, info) = fence_run(opener)?;
    if info.contains('`') {
        return None;
    }
    let info = info.trim();
    let tag = info.split_whitespace().next().filter(|tag| !tag.is_empty());

    if opener_end >= text.len() {
        return Some(Fence {
            segment: Segment::Code {
                tag,
                body: "",
                closed: false,
            },
            end: text.len(),
        });
    }

    let body_start = opener_end + 1;
    let mut cursor = body_start;
    while cursor < text.len() {
        let end = line_end(text, cursor);
        let line = strip_line_ending(&text[cursor..end]);
        let is_close = fence_run(line)
            .map(|(run, trailing)| run >= ticks && trailing.trim().is_empty())
            .unwrap_or(false);
        if is_close {
            let body = strip_line_ending(&text[body_start..cursor]);
            return Some(Fence {
                segment: Segment::Code {
                    tag,
                    body,
                    closed: true,
                },
                end: (end + 1).min(text.len()),
            });
        }
        cursor = end + 1;
    }

    Some(Fence {
        segment: Segment::Code {
            tag,
            body: strip_line_ending(&text[body_start..]),
            closed: false,
        },
        end: text.len(),
    })
}

fn agent_tag(text: &str, start: usize) -> Option<(&str, usize)> {
    let name_start = start + AGENT_MARKER.len();
    let line_stop = line_end(text, name_start);
    let close = text[name_start..line_stop].find(']')? + name_start;
    let name = text[name_start..close].trim();
    if name.is_empty() {
        return None;
    }
    Some((name, close + 1))
}

fn push_prose<'a>(segments: &mut Vec<Segment<'a>>, prose: &'a str) {
    if !prose.is_empty() {
        segments.push(Segment::Prose(prose));
    }
}

/// Splits assistant content into prose, code and agent-tag segments, in order.
pub fn tokenize(content: &str) -> Vec<Segment<'_>> {
    let bytes = content.as_bytes();
    let mut segments = Vec::new();
    let mut prose_start = 0;
    let mut pos = 0;

    while pos < content.len() {
        let at_line_start = pos == 0 || bytes[pos - 1] == b'\n';
        if at_line_start {
            if let Some(fence) = open_fence(content, pos) {
                push_prose(&mut segments, &content[prose_start..pos]);
                segments.push(fence.segment);
                pos = fence.end;
                prose_start = pos;
                continue;
            }
        }

        if bytes[pos] == b'[' && content[pos..].starts_with(AGENT_MARKER) {
            if let Some((name, end)) = agent_tag(content, pos) {
                push_prose(&mut segments, &content[prose_start..pos]);
                segments.push(Segment::AgentTag(name));
                pos = end;
                prose_start = pos;
                continue;
            }
        }

        pos += 1;
    }

    push_prose(&mut segments, &content[prose_start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::{tokenize, Segment};

    #[test]
    fn prose_only() {
        assert_eq!(tokenize("just words"), vec![Segment::Prose("just words")]);
    }

    #[test]
    fn fence_between_prose() {
        let segments = tokenize("before\n```js\ncode\n```\nafter");
        assert_eq!(
            segments,
            vec![
                Segment::Prose("before\n"),
                Segment::Code {
                    tag: Some("js"),
                    body: "code",
                    closed: true
                },
                Segment::Prose("after"),
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let segments = tokenize("intro\n```rust\nfn main() {\n");
        assert_eq!(
            segments[1],
            Segment::Code {
                tag: Some("rust"),
                body: "fn main() {",
                closed: false
            }
        );
    }

    #[test]
    fn bare_opening_fence_yields_empty_code() {
        let segments = tokenize("```py");
        assert_eq!(
            segments,
            vec![Segment::Code {
                tag: Some("py"),
                body: "",
                closed: false
            }]
        );
    }

    #[test]
    fn longer_fences_need_matching_close() {
        let segments = tokenize("````\n```\ninner\n```\n````");
        assert_eq!(
            segments,
            vec![Segment::Code {
                tag: None,
                body: "```\ninner\n```",
                closed: true
            }]
        );
    }

    #[test]
    fn agent_markers_split_inline() {
        let segments = tokenize("Hi [AGENT: Reviewer] there");
        assert_eq!(
            segments,
            vec![
                Segment::Prose("Hi "),
                Segment::AgentTag("Reviewer"),
                Segment::Prose(" there"),
            ]
        );
    }

    #[test]
    fn unclosed_agent_marker_is_prose() {
        let segments = tokenize("[AGENT: Nobody\nnext");
        assert_eq!(segments, vec![Segment::Prose("[AGENT: Nobody\nnext")]);
    }

    #[test]
    fn inline_backticks_are_not_fences() {
        let segments = tokenize("use ``` inline");
        assert_eq!(segments, vec![Segment::Prose("use ``` inline")]);
    }

    #[test]
    fn multibyte_prose_is_sliced_safely() {
        let segments = tokenize("héllo → [AGENT: Ünï] ✓");
        assert_eq!(segments[1], Segment::AgentTag("Ünï"));
        assert_eq!(segments[2], Segment::Prose(" ✓"));
    }
}
