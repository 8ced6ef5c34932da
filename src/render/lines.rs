//! Reference [`BlockRenderer`] that turns blocks into styled text lines.
//!
//! Styling goes through caller-supplied string functions, so the same renderer serves ANSI
//! terminals, plain logs and tag-annotated test output.

use super::{BlockRenderer, RenderContext};
use crate::core::block::{Block, BlockKind, CodeLanguage, ListItem, StyledRun};
use crate::core::message::Role;
use crate::core::text::{expand_tabs, pad_to_width, wrap_plain, wrap_runs};
use crate::markdown::{self, heading_palette_index, THEMATIC_BREAK_WIDTH};

pub type StyleFn = Box<dyn Fn(&str) -> String>;

const QUOTE_BORDER: &str = "│ ";
const QUOTE_BORDER_WIDTH: usize = 2;
const CODE_INDENT: &str = "  ";
const UNORDERED_MARKER_WIDTH: usize = 3;
const MIN_ORDERED_MARKER_WIDTH: usize = 4;
const CHECKBOX_WIDTH: usize = 4;

fn identity() -> StyleFn {
    Box::new(|text| text.to_string())
}

pub struct LineTheme {
    /// Heading styles by depth; deeper headings reuse the last entry.
    pub headings: Vec<StyleFn>,
    pub bold: StyleFn,
    pub italic: StyleFn,
    pub strikethrough: StyleFn,
    pub code: StyleFn,
    pub link: StyleFn,
    pub link_url: StyleFn,
    pub code_block: StyleFn,
    pub code_block_border: StyleFn,
    pub quote_border: StyleFn,
    pub hr: StyleFn,
    pub list_bullet: StyleFn,
    pub agent_tag: StyleFn,
    pub role_label: StyleFn,
    pub reasoning: StyleFn,
    pub error: StyleFn,
}

impl LineTheme {
    /// A theme that leaves every string untouched.
    pub fn plain() -> Self {
        Self {
            headings: vec![identity()],
            bold: identity(),
            italic: identity(),
            strikethrough: identity(),
            code: identity(),
            link: identity(),
            link_url: identity(),
            code_block: identity(),
            code_block_border: identity(),
            quote_border: identity(),
            hr: identity(),
            list_bullet: identity(),
            agent_tag: identity(),
            role_label: identity(),
            reasoning: identity(),
            error: identity(),
        }
    }
}

impl Default for LineTheme {
    fn default() -> Self {
        Self::plain()
    }
}

/// Collects the lines of one frame.
pub struct LineRenderer {
    theme: LineTheme,
    lines: Vec<String>,
}

impl LineRenderer {
    pub fn new(theme: LineTheme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Renders one block, prefixed by a role header when it opens a message.
    pub fn render_block(&self, block: &Block, width: usize, ctx: &RenderContext) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::new();
        if block.is_first {
            if let Some(role) = block.role() {
                let label = match role {
                    Role::Assistant => ctx.assistant_label(),
                    other => other.label().to_string(),
                };
                lines.push((self.theme.role_label)(&label));
            }
        }
        lines.extend(self.render_kind(block, width));
        lines
    }

    fn render_kind(&self, block: &Block, width: usize) -> Vec<String> {
        match &block.kind {
            BlockKind::Heading { depth } => {
                let style = self
                    .theme
                    .headings
                    .get(heading_palette_index(*depth, self.theme.headings.len()));
                self.render_runs(&runs_or_plain(block), width)
                    .into_iter()
                    .map(|line| style.map_or_else(|| line.clone(), |style| style(&line)))
                    .collect()
            }
            BlockKind::Paragraph if block.runs.is_empty() => {
                // Flattened paragraphs carry raw markdown.
                if block.content.trim().is_empty() {
                    vec![String::new()]
                } else {
                    self.render_markdown(&block.content, width)
                }
            }
            BlockKind::Paragraph => self.render_runs(&block.runs, width),
            BlockKind::Code { language } => self.render_code(language, &block.content),
            BlockKind::List {
                ordered,
                start,
                items,
            } => self.render_list(*ordered, *start, items, width),
            BlockKind::Blockquote { children } => {
                let inner = width.saturating_sub(QUOTE_BORDER_WIDTH).max(1);
                let border = (self.theme.quote_border)(QUOTE_BORDER);
                children
                    .iter()
                    .flat_map(|child| self.render_kind(child, inner))
                    .map(|line| format!("{border}{line}"))
                    .collect()
            }
            BlockKind::ThematicBreak => {
                vec![(self.theme.hr)(&"─".repeat(THEMATIC_BREAK_WIDTH.min(width)))]
            }
            BlockKind::AgentTag { name } => vec![(self.theme.agent_tag)(&format!("[{name}]"))],
            BlockKind::Text => {
                let lines = wrap_plain(&block.content, width);
                if block.role() == Some(Role::Error) {
                    lines.iter().map(|line| (self.theme.error)(line)).collect()
                } else {
                    lines
                }
            }
        }
    }

    fn render_markdown(&self, text: &str, width: usize) -> Vec<String> {
        let blocks = markdown::parse(text);
        if blocks.is_empty() {
            return vec![String::new()];
        }
        blocks
            .iter()
            .flat_map(|block| self.render_kind(block, width))
            .collect()
    }

    fn render_runs(&self, runs: &[StyledRun], width: usize) -> Vec<String> {
        wrap_runs(runs, width)
            .iter()
            .map(|line| line.iter().map(|run| self.style_run(run)).collect())
            .collect()
    }

    fn style_run(&self, run: &StyledRun) -> String {
        let style = run.style;
        if style.is_plain() {
            return run.text.clone();
        }
        let mut text = run.text.clone();
        if style.code {
            text = (self.theme.code)(&text);
        }
        if style.bold {
            text = (self.theme.bold)(&text);
        }
        if style.italic {
            text = (self.theme.italic)(&text);
        }
        if style.strikethrough {
            text = (self.theme.strikethrough)(&text);
        }
        if style.link {
            text = (self.theme.link)(&text);
        }
        if style.link_url {
            text = (self.theme.link_url)(&text);
        }
        text
    }

    fn render_code(&self, language: &CodeLanguage, content: &str) -> Vec<String> {
        let tag = language.tag.as_deref().unwrap_or_default();
        let mut lines = vec![(self.theme.code_block_border)(&format!("```{tag}"))];
        lines.extend(content.split('\n').map(|line| {
            format!("{CODE_INDENT}{}", (self.theme.code_block)(&expand_tabs(line)))
        }));
        lines.push((self.theme.code_block_border)("```"));
        lines
    }

    fn render_list(&self, ordered: bool, start: u32, items: &[ListItem], width: usize) -> Vec<String> {
        let first = start as usize;
        let marker_width = if ordered {
            let last = first + items.len().saturating_sub(1);
            (last.to_string().len() + 2).max(MIN_ORDERED_MARKER_WIDTH)
        } else {
            UNORDERED_MARKER_WIDTH
        };
        let inner = width.saturating_sub(marker_width).max(1);
        let continuation = " ".repeat(marker_width);

        let mut lines = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{:>digits$}.", first + idx, digits = marker_width - 2)
            } else {
                " -".to_string()
            };
            let marker = (self.theme.list_bullet)(&pad_to_width(&marker, marker_width));

            let checkbox = item.checked.map(|checked| if checked { "[x] " } else { "[ ] " });
            let body_width = if checkbox.is_some() {
                inner.saturating_sub(CHECKBOX_WIDTH).max(1)
            } else {
                inner
            };
            let mut body: Vec<String> = item
                .blocks
                .iter()
                .flat_map(|block| self.render_kind(block, body_width))
                .collect();
            if body.is_empty() {
                body.push(String::new());
            }

            for (line_idx, line) in body.into_iter().enumerate() {
                if line_idx == 0 {
                    lines.push(format!("{marker}{}{line}", checkbox.unwrap_or_default()));
                } else {
                    lines.push(format!("{continuation}{line}"));
                }
            }
        }
        lines
    }
}

fn runs_or_plain(block: &Block) -> Vec<StyledRun> {
    if block.runs.is_empty() {
        vec![StyledRun::plain(block.content.clone())]
    } else {
        block.runs.clone()
    }
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self::new(LineTheme::plain())
    }
}

impl BlockRenderer for LineRenderer {
    fn begin_frame(&mut self, _width: usize, _ctx: &RenderContext) {
        self.lines.clear();
    }

    fn draw_reasoning(&mut self, lines: &[String], width: usize, _ctx: &RenderContext) {
        for line in lines {
            for wrapped in wrap_plain(line, width.max(1)) {
                let styled = (self.theme.reasoning)(&wrapped);
                self.lines.push(styled);
            }
        }
    }

    fn draw(&mut self, block: &Block, width: usize, ctx: &RenderContext) {
        let rendered = self.render_block(block, width, ctx);
        self.lines.extend(rendered);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{LineRenderer, LineTheme};
    use crate::core::block::{Block, BlockKind, BlockOrigin};
    use crate::core::message::{Message, Role};
    use crate::markdown::parse;
    use crate::render::{BlockRenderer, RenderContext};
    use crate::transcript::flatten;

    fn theme() -> LineTheme {
        LineTheme {
            headings: vec![
                Box::new(|text| format!("<h1>{text}</h1>")),
                Box::new(|text| format!("<h2>{text}</h2>")),
            ],
            bold: Box::new(|text| format!("<b>{text}</b>")),
            italic: Box::new(|text| format!("<i>{text}</i>")),
            code: Box::new(|text| format!("`{text}`")),
            link_url: Box::new(|text| format!("<u>{text}</u>")),
            code_block_border: Box::new(|text| format!("<cb>{text}</cb>")),
            role_label: Box::new(|text| format!("<role>{text}</role>")),
            error: Box::new(|text| format!("<err>{text}</err>")),
            ..LineTheme::plain()
        }
    }

    fn render(renderer: &LineRenderer, block: &Block, width: usize) -> Vec<String> {
        renderer.render_block(block, width, &RenderContext::default())
    }

    #[test]
    fn flattened_paragraph_renders_its_markdown() {
        let renderer = LineRenderer::new(theme());
        let blocks = flatten(&[Message::assistant("**bold** and `code`")]);
        assert_eq!(
            render(&renderer, &blocks[0], 40),
            vec!["<role>assistant</role>", "<b>bold</b> and `code`"]
        );
    }

    #[test]
    fn headings_use_palette_and_clamp_depth() {
        let renderer = LineRenderer::new(theme());
        let blocks = parse("# One\n\n### Three");
        assert_eq!(render(&renderer, &blocks[0], 40), vec!["<h1>One</h1>"]);
        assert_eq!(render(&renderer, &blocks[1], 40), vec!["<h2>Three</h2>"]);
    }

    #[test]
    fn code_blocks_keep_lines_and_tag() {
        let renderer = LineRenderer::new(theme());
        let blocks = parse("```rust\nlet a = 1;\nlet b = 2;\n```");
        assert_eq!(
            render(&renderer, &blocks[0], 40),
            vec![
                "<cb>```rust</cb>",
                "  let a = 1;",
                "  let b = 2;",
                "<cb>```</cb>"
            ]
        );
    }

    #[test]
    fn code_tabs_expand_only_when_rendered() {
        let renderer = LineRenderer::default();
        let blocks = parse("```go\nfunc main() {\n\tfmt.Println()\n}\n```");
        assert_eq!(blocks[0].content, "func main() {\n\tfmt.Println()\n}");
        assert_eq!(
            render(&renderer, &blocks[0], 40),
            vec![
                "```go",
                "  func main() {",
                "     fmt.Println()",
                "  }",
                "```"
            ]
        );
    }

    #[test]
    fn list_markers_reserve_columns() {
        let renderer = LineRenderer::default();
        let ordered = parse("1. one\n2. two");
        assert_eq!(render(&renderer, &ordered[0], 40), vec![" 1. one", " 2. two"]);

        let unordered = parse("- alpha beta");
        assert_eq!(render(&renderer, &unordered[0], 8), vec![" - alpha", "   beta"]);

        let tasks = parse("- [x] done");
        assert_eq!(render(&renderer, &tasks[0], 40), vec![" - [x] done"]);
    }

    #[test]
    fn blockquote_wraps_inside_border() {
        let renderer = LineRenderer::default();
        let blocks = parse("> one two three");
        assert_eq!(
            render(&renderer, &blocks[0], 9),
            vec!["│ one two", "│ three"]
        );
    }

    #[test]
    fn thematic_break_clamps_to_width() {
        let renderer = LineRenderer::default();
        let blocks = parse("---");
        assert_eq!(render(&renderer, &blocks[0], 10), vec!["─".repeat(10)]);
        assert_eq!(render(&renderer, &blocks[0], 100), vec!["─".repeat(40)]);
    }

    #[test]
    fn error_messages_use_error_style() {
        let renderer = LineRenderer::new(theme());
        let mut block = Block::text("boom").with_origin(BlockOrigin {
            message_index: 0,
            role: Role::Error,
        });
        block.is_first = true;
        assert_eq!(
            render(&renderer, &block, 20),
            vec!["<role>error</role>", "<err>boom</err>"]
        );
    }

    #[test]
    fn frame_hooks_reset_collected_lines() {
        let mut renderer = LineRenderer::default();
        let ctx = RenderContext::default();
        let block = Block::new(BlockKind::AgentTag { name: "Critic".into() }, "Critic");

        renderer.begin_frame(20, &ctx);
        renderer.draw_reasoning(&["Let me look".to_string()], 20, &ctx);
        renderer.draw(&block, 20, &ctx);
        renderer.end_frame(&ctx);
        assert_eq!(renderer.lines(), ["Let me look", "[Critic]"]);

        renderer.begin_frame(20, &ctx);
        assert!(renderer.lines().is_empty());
    }
}
