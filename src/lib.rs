//! Streaming transcript view for terminal chat front-ends.
//!
//! Turns a token-at-a-time assistant stream into a stable, scrollable block list without
//! per-token reflow. Text flows through four stages:
//!
//! - [`StreamBuffer`] coalesces fragments and commits on newline or after a short idle interval.
//! - [`ContentClassifier`] routes committed lines to the rolling reasoning window or the
//!   in-flight message.
//! - [`flatten`] splits the transcript into atomic blocks; [`parse`] turns markdown into typed
//!   blocks for rendering.
//! - [`Engine`] owns the layout, the virtualized viewport and the event queue, and hands each
//!   visible block to a [`BlockRenderer`].
//!
//! Nothing here writes to a terminal. Timers are deadlines polled by the host loop via
//! [`Engine::next_timeout_ms`] and [`Engine::tick`].

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod markdown;
pub mod render;
pub mod runtime;
pub mod stream;
pub mod transcript;

/// Configuration and ambient errors.
pub use crate::config::EngineConfig;
pub use crate::error::{ConfigError, LoggingError};

/// Block and message model.
pub use crate::core::block::{
    mark_edges, Block, BlockKind, BlockOrigin, CodeLanguage, ListItem, RunStyle, StyledRun,
    PLAINTEXT_LANGUAGE,
};
pub use crate::core::message::{Message, MessageMeta, Role};

/// Markdown parsing.
pub use crate::markdown::{heading_palette_index, parse, resolve_language, THEMATIC_BREAK_WIDTH};

/// Renderer boundary and the reference line renderer.
pub use crate::render::{BlockRenderer, LineRenderer, LineTheme, RenderContext, StyleFn};

/// Layout, viewport and engine.
pub use crate::runtime::{
    compute_layout_mode, compute_visible, main_width, max_visible, viewport_rows, CoreEvent,
    Engine, Frame, LayoutKind, LayoutMode, ResizeDebouncer, ScrollIntent, ScrollMode, TurnEvent,
    ViewportState,
};

/// Stream intake.
pub use crate::stream::{
    classify_line, Classified, ContentClassifier, LineClass, ReasoningWindow, StreamBuffer,
    StreamBufferOptions,
};

/// Transcript and flattening.
pub use crate::transcript::{flatten, FlattenCache, Transcript};

/// Width and wrapping helpers.
pub use crate::core::text::{display_width, pad_to_width, wrap_plain, wrap_runs};
