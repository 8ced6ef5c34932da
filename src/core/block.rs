//! Block model shared by the markdown parser, the flattener and renderers.
//!
//! Blocks are derived data: they can always be recomputed from a message, so
//! nothing in this module owns authoritative state.

use crate::core::message::Role;

/// Language tag used when a fence carries no tag or an unknown one.
pub const PLAINTEXT_LANGUAGE: &str = "plaintext";

/// Inline styling flags attached to a [`StyledRun`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: bool,
    pub link_url: bool,
}

impl RunStyle {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// A run of text sharing one inline style.
///
/// A run whose text is `"\n"` is a hard line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::plain())
    }

    pub fn is_break(&self) -> bool {
        self.text == "\n"
    }
}

/// Resolved fence language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLanguage {
    /// Canonical grammar token, or [`PLAINTEXT_LANGUAGE`].
    pub name: String,
    /// The tag exactly as written after the fence, if any.
    pub tag: Option<String>,
}

impl CodeLanguage {
    pub fn plaintext(tag: Option<String>) -> Self {
        Self {
            name: PLAINTEXT_LANGUAGE.to_string(),
            tag,
        }
    }

    pub fn is_plaintext(&self) -> bool {
        self.name == PLAINTEXT_LANGUAGE
    }
}

/// One item of a list block. Items own nested blocks (paragraphs, nested lists, code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub blocks: Vec<Block>,
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading { depth: u8 },
    Paragraph,
    Code { language: CodeLanguage },
    List {
        ordered: bool,
        start: u32,
        items: Vec<ListItem>,
    },
    Blockquote { children: Vec<Block> },
    ThematicBreak,
    AgentTag { name: String },
    /// Raw text: non-assistant messages, parse fallbacks and best-effort extractions.
    Text,
}

impl BlockKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Paragraph => "paragraph",
            Self::Code { .. } => "code",
            Self::List { .. } => "list",
            Self::Blockquote { .. } => "blockquote",
            Self::ThematicBreak => "thematicBreak",
            Self::AgentTag { .. } => "agentTag",
            Self::Text => "text",
        }
    }
}

/// Where a flattened block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOrigin {
    pub message_index: usize,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Plain or raw text of the block. For code blocks this is exactly the code.
    pub content: String,
    /// Inline runs for headings and paragraphs produced by the markdown parser.
    pub runs: Vec<StyledRun>,
    pub is_first: bool,
    pub is_last: bool,
    pub origin: Option<BlockOrigin>,
}

impl Block {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            runs: Vec::new(),
            is_first: false,
            is_last: false,
            origin: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Text, content)
    }

    pub fn with_runs(mut self, runs: Vec<StyledRun>) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_origin(mut self, origin: BlockOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn role(&self) -> Option<Role> {
        self.origin.map(|origin| origin.role)
    }
}

/// Sets `is_first` on the first block and `is_last` on the last one, clearing both elsewhere.
pub fn mark_edges(blocks: &mut [Block]) {
    let len = blocks.len();
    for (idx, block) in blocks.iter_mut().enumerate() {
        block.is_first = idx == 0;
        block.is_last = idx + 1 == len;
    }
}
