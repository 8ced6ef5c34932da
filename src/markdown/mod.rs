//! Markdown to typed blocks.
//!
//! [`parse`] accepts complete or partial (still streaming) markdown and never fails: when
//! the mdast cannot be built the whole input comes back as one [`BlockKind::Text`] block.
//! Raw HTML is dropped; node types without a block mapping are reduced to their text.

mod inline;
pub mod language;

use std::panic::{self, AssertUnwindSafe};

use markdown::{mdast, to_mdast, ParseOptions};
use tracing::debug;

use crate::core::block::{mark_edges, Block, BlockKind, ListItem};

pub use language::resolve_language;

/// Width of a thematic break rule, independent of the terminal width.
pub const THEMATIC_BREAK_WIDTH: usize = 40;

/// Palette slot for a heading depth. Depths past the palette clamp to the last slot.
pub fn heading_palette_index(depth: u8, palette_len: usize) -> usize {
    let slot = usize::from(depth.max(1)) - 1;
    slot.min(palette_len.saturating_sub(1))
}

/// Parses markdown into an ordered list of blocks.
pub fn parse(text: &str) -> Vec<Block> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
        to_mdast(text, &ParseOptions::gfm()).map(blocks_from_root)
    }));

    let mut blocks = match parsed {
        Ok(Ok(blocks)) => blocks,
        Ok(Err(err)) => {
            debug!(?err, "markdown parse failed; falling back to raw text");
            vec![Block::text(text)]
        }
        Err(_) => {
            debug!("markdown parser panicked; falling back to raw text");
            vec![Block::text(text)]
        }
    };
    mark_edges(&mut blocks);
    blocks
}

fn blocks_from_root(root: mdast::Node) -> Vec<Block> {
    let nodes = match root {
        mdast::Node::Root(root) => root.children,
        other => vec![other],
    };
    convert_nodes(&nodes)
}

fn convert_nodes(nodes: &[mdast::Node]) -> Vec<Block> {
    nodes.iter().filter_map(convert_node).collect()
}

fn convert_node(node: &mdast::Node) -> Option<Block> {
    match node {
        mdast::Node::Heading(heading) => {
            let runs = inline::inline_runs(&heading.children);
            let content = inline::runs_to_string(&runs);
            Some(
                Block::new(
                    BlockKind::Heading {
                        depth: heading.depth.clamp(1, 6),
                    },
                    content,
                )
                .with_runs(runs),
            )
        }
        mdast::Node::Paragraph(paragraph) => {
            let runs = inline::inline_runs(&paragraph.children);
            let content = inline::runs_to_string(&runs);
            if content.trim().is_empty() {
                return None;
            }
            Some(Block::new(BlockKind::Paragraph, content).with_runs(runs))
        }
        mdast::Node::Code(code) => Some(Block::new(
            BlockKind::Code {
                language: resolve_language(code.lang.as_deref()),
            },
            code.value.clone(),
        )),
        mdast::Node::List(list) => {
            let items: Vec<ListItem> = list
                .children
                .iter()
                .filter_map(|child| match child {
                    mdast::Node::ListItem(item) => Some(ListItem {
                        blocks: convert_nodes(&item.children),
                        checked: item.checked,
                    }),
                    _ => None,
                })
                .collect();
            let content = items
                .iter()
                .map(|item| blocks_plain_text(&item.blocks))
                .collect::<Vec<_>>()
                .join("\n");
            Some(Block::new(
                BlockKind::List {
                    ordered: list.ordered,
                    start: list.start.unwrap_or(1),
                    items,
                },
                content,
            ))
        }
        mdast::Node::Blockquote(blockquote) => {
            let children = convert_nodes(&blockquote.children);
            let content = blocks_plain_text(&children);
            Some(Block::new(BlockKind::Blockquote { children }, content))
        }
        mdast::Node::ThematicBreak(_) => Some(Block::new(BlockKind::ThematicBreak, "")),
        mdast::Node::Html(_) => None,
        other => {
            let text = extract_text(other);
            let text = text.trim_end_matches('\n');
            if text.trim().is_empty() {
                None
            } else {
                Some(Block::text(text))
            }
        }
    }
}

/// Best-effort text for nodes without a block mapping.
fn extract_text(node: &mdast::Node) -> String {
    match node {
        mdast::Node::Text(text) => text.value.clone(),
        mdast::Node::InlineCode(code) => code.value.clone(),
        mdast::Node::Code(code) => code.value.clone(),
        mdast::Node::Math(math) => math.value.clone(),
        mdast::Node::InlineMath(math) => math.value.clone(),
        mdast::Node::Toml(toml) => toml.value.clone(),
        mdast::Node::Yaml(yaml) => yaml.value.clone(),
        mdast::Node::Html(_) => String::new(),
        mdast::Node::Break(_) => "\n".to_string(),
        mdast::Node::TableRow(row) => row
            .children
            .iter()
            .map(extract_text)
            .collect::<Vec<_>>()
            .join(" | "),
        mdast::Node::Table(table) => table
            .children
            .iter()
            .map(extract_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other
            .children()
            .map(|children| children.iter().map(extract_text).collect())
            .unwrap_or_default(),
    }
}

fn blocks_plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| block.content.as_str())
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{heading_palette_index, parse};
    use crate::core::block::{Block, BlockKind};

    fn kinds(blocks: &[Block]) -> Vec<&'static str> {
        blocks.iter().map(|block| block.kind.label()).collect()
    }

    #[test]
    fn heading_then_paragraph() {
        let blocks = parse("# Title\n\nSome text");
        assert_eq!(kinds(&blocks), vec!["heading", "paragraph"]);
        assert_eq!(blocks[0].kind, BlockKind::Heading { depth: 1 });
        assert_eq!(blocks[0].content, "Title");
        assert_eq!(blocks[1].content, "Some text");
        assert!(blocks[0].is_first && blocks[1].is_last);
    }

    #[test]
    fn fenced_code_content_has_no_fence_artifacts() {
        let blocks = parse("```js\ncode\n```");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "code");
        let BlockKind::Code { language } = &blocks[0].kind else {
            panic!("expected code block");
        };
        assert_eq!(language.tag.as_deref(), Some("js"));
        assert!(!language.is_plaintext());
    }

    #[test]
    fn tabs_inside_code_are_preserved() {
        let blocks = parse("```go\n\tfmt.Println()\n```");
        assert_eq!(blocks[0].content, "\tfmt.Println()");

        let blocks = parse("intro\n\n\tindented();\n");
        assert_eq!(kinds(&blocks), vec!["paragraph", "code"]);
        assert_eq!(blocks[1].content, "indented();");
    }

    #[test]
    fn unterminated_fence_still_parses_as_code() {
        let blocks = parse("intro\n\n```python\nprint(1)\n");
        assert_eq!(kinds(&blocks), vec!["paragraph", "code"]);
        assert_eq!(blocks[1].content.trim_end(), "print(1)");
    }

    #[test]
    fn unknown_language_falls_back_to_plaintext() {
        let blocks = parse("```mystery\nx\n```");
        let BlockKind::Code { language } = &blocks[0].kind else {
            panic!("expected code block");
        };
        assert!(language.is_plaintext());
    }

    #[test]
    fn lists_keep_order_and_items() {
        let blocks = parse("3. three\n4. four");
        let BlockKind::List {
            ordered,
            start,
            items,
        } = &blocks[0].kind
        else {
            panic!("expected list");
        };
        assert!(*ordered);
        assert_eq!(*start, 3);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].blocks[0].content, "four");
        assert_eq!(blocks[0].content, "three\nfour");
    }

    #[test]
    fn nested_lists_live_inside_items() {
        let blocks = parse("- outer\n  - inner");
        let BlockKind::List { items, .. } = &blocks[0].kind else {
            panic!("expected list");
        };
        assert_eq!(kinds(&items[0].blocks), vec!["paragraph", "list"]);
    }

    #[test]
    fn blockquote_children_keep_their_types() {
        let blocks = parse("> # Quoted\n> body");
        let BlockKind::Blockquote { children } = &blocks[0].kind else {
            panic!("expected blockquote");
        };
        assert_eq!(kinds(children), vec!["heading", "paragraph"]);
    }

    #[test]
    fn html_blocks_are_dropped() {
        let blocks = parse("<div>\nhidden\n</div>\n\nvisible");
        assert_eq!(kinds(&blocks), vec!["paragraph"]);
        assert_eq!(blocks[0].content, "visible");
    }

    #[test]
    fn tables_degrade_to_text() {
        let blocks = parse("| a | b |\n| - | - |\n| c | d |");
        assert_eq!(kinds(&blocks), vec!["text"]);
        assert_eq!(blocks[0].content, "a | b\nc | d");
    }

    #[test]
    fn thematic_break_and_empty_input() {
        assert_eq!(kinds(&parse("---")), vec!["thematicBreak"]);
        assert!(parse("").is_empty());
        assert!(parse("  \n\n ").is_empty());
    }

    #[test]
    fn palette_index_clamps_to_last_slot() {
        assert_eq!(heading_palette_index(1, 4), 0);
        assert_eq!(heading_palette_index(4, 4), 3);
        assert_eq!(heading_palette_index(6, 4), 3);
        assert_eq!(heading_palette_index(2, 0), 0);
    }
}
