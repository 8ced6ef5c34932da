//! Renderer boundary.
//!
//! The engine never writes to a terminal. For each frame it calls a [`BlockRenderer`] once per
//! visible block; the renderer owns styling, clipping and diffing against what is on screen.

pub mod lines;

use crate::core::block::Block;

pub use lines::{LineRenderer, LineTheme, StyleFn};

/// Display context threaded through every draw call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub model: Option<String>,
    pub agent: Option<String>,
    /// True while an assistant turn is streaming.
    pub streaming: bool,
}

impl RenderContext {
    pub fn new(model: Option<String>, agent: Option<String>) -> Self {
        Self {
            model,
            agent,
            streaming: false,
        }
    }

    /// Header label for an assistant message, e.g. `reviewer (large)`.
    pub fn assistant_label(&self) -> String {
        let name = self.agent.as_deref().unwrap_or("assistant");
        match self.model.as_deref() {
            Some(model) => format!("{name} ({model})"),
            None => name.to_string(),
        }
    }
}

/// Draw capability implemented by hosts.
pub trait BlockRenderer {
    fn begin_frame(&mut self, _width: usize, _ctx: &RenderContext) {}

    /// Draws the rolling reasoning window above the transcript tail.
    fn draw_reasoning(&mut self, _lines: &[String], _width: usize, _ctx: &RenderContext) {}

    fn draw(&mut self, block: &Block, width: usize, ctx: &RenderContext);

    fn end_frame(&mut self, _ctx: &RenderContext) {}
}

#[cfg(test)]
mod tests {
    use super::RenderContext;

    #[test]
    fn assistant_label_combines_agent_and_model() {
        assert_eq!(RenderContext::default().assistant_label(), "assistant");
        let ctx = RenderContext::new(Some("large".into()), Some("critic".into()));
        assert_eq!(ctx.assistant_label(), "critic (large)");
    }
}
