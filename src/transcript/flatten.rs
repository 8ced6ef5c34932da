//! Transcript to atomic render units.

use std::sync::Arc;

use super::tokenizer::{tokenize, Segment};
use crate::core::block::{mark_edges, Block, BlockKind, BlockOrigin};
use crate::core::message::{Message, Role};
use crate::markdown::resolve_language;

/// Flattens messages into scrollable blocks. Pure: the same input always yields equal output.
///
/// Non-assistant messages stay whole. Assistant messages split into code blocks, agent tags
/// and blank-line separated paragraphs.
pub fn flatten(messages: &[Message]) -> Vec<Block> {
    let mut blocks = Vec::new();
    for (message_index, message) in messages.iter().enumerate() {
        let origin = BlockOrigin {
            message_index,
            role: message.role,
        };
        let mut unit = match message.role {
            Role::Assistant => assistant_blocks(&message.content),
            Role::User | Role::System | Role::Error => vec![Block::text(message.content.clone())],
        };
        if unit.is_empty() {
            unit.push(Block::new(BlockKind::Paragraph, ""));
        }
        mark_edges(&mut unit);
        blocks.extend(unit.into_iter().map(|block| block.with_origin(origin)));
    }
    blocks
}

fn assistant_blocks(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for segment in tokenize(content) {
        match segment {
            Segment::Prose(prose) => blocks.extend(
                split_paragraphs(prose)
                    .into_iter()
                    .map(|paragraph| Block::new(BlockKind::Paragraph, paragraph)),
            ),
            Segment::Code { tag, body, .. } => blocks.push(Block::new(
                BlockKind::Code {
                    language: resolve_language(tag),
                },
                body,
            )),
            Segment::AgentTag(name) => blocks.push(Block::new(
                BlockKind::AgentTag {
                    name: name.to_string(),
                },
                name,
            )),
        }
    }
    blocks
}

/// Splits prose on blank lines. Whitespace-only groups are dropped.
fn split_paragraphs(prose: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in prose.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

/// Memoized [`flatten`] keyed on the identity of the message list.
///
/// Message lists are replaced wholesale on every change, so pointer equality is a complete
/// change signal.
#[derive(Debug, Default)]
pub struct FlattenCache {
    source: Option<Arc<Vec<Message>>>,
    blocks: Arc<Vec<Block>>,
}

impl FlattenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the flattened blocks for `messages`, recomputing only when the list changed.
    pub fn get(&mut self, messages: &Arc<Vec<Message>>) -> Arc<Vec<Block>> {
        let fresh = self
            .source
            .as_ref()
            .is_some_and(|source| Arc::ptr_eq(source, messages));
        if !fresh {
            self.blocks = Arc::new(flatten(messages));
            self.source = Some(Arc::clone(messages));
        }
        Arc::clone(&self.blocks)
    }

    pub fn invalidate(&mut self) {
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::{flatten, FlattenCache};
    use crate::core::block::BlockKind;
    use crate::core::message::{Message, Role};

    #[test]
    fn non_assistant_messages_are_single_blocks() {
        for message in [
            Message::user("one\n\ntwo\n```\nx\n```"),
            Message::system("sys"),
            Message::error("boom"),
        ] {
            let blocks = flatten(std::slice::from_ref(&message));
            assert_eq!(blocks.len(), 1);
            assert!(blocks[0].is_first && blocks[0].is_last);
            assert_eq!(blocks[0].content, message.content);
            assert_eq!(blocks[0].role(), Some(message.role));
        }
    }

    #[test]
    fn empty_assistant_message_is_one_placeholder() {
        let blocks = flatten(&[Message::assistant("")]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "");
        assert!(blocks[0].is_first && blocks[0].is_last);
    }

    #[test]
    fn assistant_content_splits_into_units() {
        let content = "First para\nline two\n\nSecond para\n```rust\nfn main() {}\n```\n[AGENT: Critic]\nTail";
        let blocks = flatten(&[Message::assistant(content)]);
        let labels: Vec<_> = blocks.iter().map(|block| block.kind.label()).collect();
        assert_eq!(
            labels,
            vec!["paragraph", "paragraph", "code", "agentTag", "paragraph"]
        );
        assert_eq!(blocks[0].content, "First para\nline two");
        assert_eq!(blocks[2].content, "fn main() {}");
        assert_eq!(
            blocks[3].kind,
            BlockKind::AgentTag {
                name: "Critic".to_string()
            }
        );
        assert!(blocks[0].is_first && !blocks[0].is_last);
        assert!(blocks[1..4].iter().all(|block| !block.is_first && !block.is_last));
        assert!(blocks[4].is_last);
    }

    #[test]
    fn edges_are_per_message() {
        let blocks = flatten(&[
            Message::user("q"),
            Message::assistant("a\n\nb"),
            Message::user("r"),
        ]);
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks.iter().map(|b| b.origin.unwrap().message_index).collect::<Vec<_>>(),
            vec![0, 1, 1, 2]
        );
        assert!(blocks[1].is_first && !blocks[1].is_last);
        assert!(!blocks[2].is_first && blocks[2].is_last);
        assert_eq!(blocks[1].role(), Some(Role::Assistant));
    }

    #[test]
    fn flatten_is_idempotent() {
        let messages = vec![
            Message::user("hi"),
            Message::assistant("x\n\n```\ny\n```\n\nz"),
        ];
        assert_eq!(flatten(&messages), flatten(&messages));
    }

    #[test]
    fn cache_recomputes_only_on_new_list() {
        let mut cache = FlattenCache::new();
        let first = Arc::new(vec![Message::assistant("a")]);
        let blocks = cache.get(&first);
        assert!(Arc::ptr_eq(&blocks, &cache.get(&first)));

        let second = Arc::new(vec![Message::assistant("a"), Message::user("b")]);
        let rebuilt = cache.get(&second);
        assert_eq!(rebuilt.len(), 2);
        assert!(Arc::ptr_eq(&rebuilt, &cache.get(&second)));

        cache.invalidate();
        assert!(!Arc::ptr_eq(&rebuilt, &cache.get(&second)));
    }
}
