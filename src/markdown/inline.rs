//! Inline mdast nodes to flat styled runs.

use markdown::mdast;

use crate::core::block::{RunStyle, StyledRun};

pub(crate) fn inline_runs(nodes: &[mdast::Node]) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    collect(nodes, RunStyle::plain(), &mut runs);
    merge_adjacent(runs)
}

fn push(runs: &mut Vec<StyledRun>, text: &str, style: RunStyle) {
    if !text.is_empty() {
        runs.push(StyledRun::new(text, style));
    }
}

fn collect(nodes: &[mdast::Node], style: RunStyle, runs: &mut Vec<StyledRun>) {
    for node in nodes {
        match node {
            mdast::Node::Text(text) => push(runs, &text.value, style),
            mdast::Node::Strong(strong) => collect(
                &strong.children,
                RunStyle {
                    bold: true,
                    ..style
                },
                runs,
            ),
            mdast::Node::Emphasis(emphasis) => collect(
                &emphasis.children,
                RunStyle {
                    italic: true,
                    ..style
                },
                runs,
            ),
            mdast::Node::Delete(delete) => collect(
                &delete.children,
                RunStyle {
                    strikethrough: true,
                    ..style
                },
                runs,
            ),
            mdast::Node::InlineCode(code) => push(
                runs,
                &code.value,
                RunStyle {
                    code: true,
                    ..style
                },
            ),
            mdast::Node::Link(link) => {
                let link_style = RunStyle { link: true, ..style };
                collect(&link.children, link_style, runs);
                let label = plain_text(&link.children);
                let href = link.url.as_str();
                let href_cmp = href.strip_prefix("mailto:").unwrap_or(href);
                if label != href && label != href_cmp && !href.is_empty() {
                    push(
                        runs,
                        &format!(" ({href})"),
                        RunStyle {
                            link_url: true,
                            ..style
                        },
                    );
                }
            }
            mdast::Node::Break(_) => runs.push(StyledRun::plain("\n")),
            // Raw HTML is never rendered.
            mdast::Node::Html(_) => {}
            mdast::Node::Image(image) => {
                let alt = if image.alt.is_empty() {
                    image.url.as_str()
                } else {
                    image.alt.as_str()
                };
                push(runs, alt, style);
            }
            mdast::Node::InlineMath(math) => push(runs, &math.value, style),
            mdast::Node::Paragraph(paragraph) => collect(&paragraph.children, style, runs),
            other => {
                if let Some(children) = other.children() {
                    collect(children, style, runs);
                }
            }
        }
    }
}

fn merge_adjacent(runs: Vec<StyledRun>) -> Vec<StyledRun> {
    let mut merged: Vec<StyledRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.style == run.style && !last.is_break() && !run.is_break() => {
                last.text.push_str(&run.text);
            }
            _ => merged.push(run),
        }
    }
    merged
}

/// Concatenated text of inline nodes, without styling.
pub(crate) fn plain_text(nodes: &[mdast::Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::InlineCode(code) => out.push_str(&code.value),
            mdast::Node::InlineMath(math) => out.push_str(&math.value),
            mdast::Node::Image(image) => out.push_str(&image.alt),
            mdast::Node::Break(_) => out.push('\n'),
            mdast::Node::Html(_) => {}
            other => {
                if let Some(children) = other.children() {
                    out.push_str(&plain_text(children));
                }
            }
        }
    }
    out
}

pub(crate) fn runs_to_string(runs: &[StyledRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use markdown::{mdast, to_mdast, ParseOptions};

    use super::inline_runs;
    use crate::core::block::{RunStyle, StyledRun};

    fn paragraph_runs(input: &str) -> Vec<StyledRun> {
        let root = to_mdast(input, &ParseOptions::gfm()).expect("parse");
        let mdast::Node::Root(root) = root else {
            panic!("expected root");
        };
        let Some(mdast::Node::Paragraph(paragraph)) = root.children.first() else {
            panic!("expected paragraph");
        };
        inline_runs(&paragraph.children)
    }

    #[test]
    fn emphasis_and_code_become_styled_runs() {
        let runs = paragraph_runs("plain **bold** `code`");
        assert_eq!(
            runs,
            vec![
                StyledRun::plain("plain "),
                StyledRun::new(
                    "bold",
                    RunStyle {
                        bold: true,
                        ..RunStyle::default()
                    }
                ),
                StyledRun::plain(" "),
                StyledRun::new(
                    "code",
                    RunStyle {
                        code: true,
                        ..RunStyle::default()
                    }
                ),
            ]
        );
    }

    #[test]
    fn links_render_text_then_url() {
        let runs = paragraph_runs("see [docs](https://example.com)");
        let text: String = runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(text, "see docs (https://example.com)");
        assert!(runs.iter().any(|run| run.style.link_url));
    }

    #[test]
    fn autolinks_do_not_repeat_the_url() {
        let runs = paragraph_runs("<https://example.com>");
        let text: String = runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(text, "https://example.com");
    }

    #[test]
    fn inline_html_is_dropped() {
        let runs = paragraph_runs("a <span>b</span> c");
        let text: String = runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(text, "a b c");
    }
}
