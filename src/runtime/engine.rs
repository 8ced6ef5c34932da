//! Event loop glue between the stream, the transcript and the viewport.
//!
//! The engine is single-threaded and cooperative. Hosts enqueue [`CoreEvent`]s from any
//! source (backend turns, keyboard scroll intents, terminal resizes) and call
//! [`Engine::process`]; each event is handled to completion in FIFO order. The stream flush
//! and the resize debounce are deadlines, not threads: between events the host sleeps at most
//! [`Engine::next_timeout_ms`] and then calls [`Engine::tick`].

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use super::layout::{compute_layout_mode, viewport_rows, LayoutMode};
use super::resize::ResizeDebouncer;
use super::viewport::{compute_visible, max_visible, ScrollIntent, ViewportState};
use crate::config::EngineConfig;
use crate::core::block::Block;
use crate::core::message::{Message, MessageMeta, Role};
use crate::render::{BlockRenderer, RenderContext};
use crate::stream::buffer::StreamBuffer;
use crate::stream::classifier::{Classified, ContentClassifier, ReasoningWindow};
use crate::transcript::{FlattenCache, Transcript};

/// Signals from the backend collaborator for one assistant turn, in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    Started {
        agent: Option<String>,
        model: Option<String>,
    },
    Chunk(String),
    Finished,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    Submit(String),
    Turn(TurnEvent),
    Scroll(ScrollIntent),
    Resize { columns: u16, rows: u16 },
    Clear,
    ToggleSidebar,
}

/// The next visible state, derived on demand.
#[derive(Debug, Clone)]
pub struct Frame {
    pub layout: LayoutMode,
    pub width: usize,
    pub blocks: Arc<Vec<Block>>,
    /// Bounds of the visible slice within `blocks`.
    pub range: Range<usize>,
    pub reasoning: Vec<String>,
    /// Reasoning lines seen this turn, including those scrolled out of the window.
    pub reasoning_total: usize,
    pub viewport: ViewportState,
    pub revision: u64,
}

impl Frame {
    pub fn visible(&self) -> &[Block] {
        &self.blocks[self.range.clone()]
    }

    fn key(&self) -> FrameKey {
        FrameKey {
            revision: self.revision,
            offset: self.viewport.scroll_offset,
            width: self.width,
            start: self.range.start,
            end: self.range.end,
            reasoning_total: self.reasoning_total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameKey {
    revision: u64,
    offset: usize,
    width: usize,
    start: usize,
    end: usize,
    reasoning_total: usize,
}

#[derive(Debug)]
struct ActiveTurn {
    /// Transcript index of the in-flight assistant message.
    message: usize,
    /// Text classified as final content so far.
    content: String,
}

#[derive(Debug)]
enum TurnOutcome {
    Finished,
    Failed(String),
    Cancelled,
}

pub struct Engine {
    config: EngineConfig,
    queue: VecDeque<CoreEvent>,
    transcript: Transcript,
    flatten_cache: FlattenCache,
    buffer: StreamBuffer,
    classifier: ContentClassifier,
    reasoning: ReasoningWindow,
    resize: ResizeDebouncer,
    layout: LayoutMode,
    sidebar_expanded: bool,
    viewport: ViewportState,
    turn: Option<ActiveTurn>,
    context: RenderContext,
    last_drawn: Option<FrameKey>,
}

impl Engine {
    pub fn new(config: EngineConfig, columns: u16, rows: u16) -> Self {
        let layout = compute_layout_mode(columns, rows);
        debug!(
            kind = layout.kind.label(),
            columns = layout.columns,
            rows = layout.rows,
            "initial layout"
        );
        Self {
            buffer: StreamBuffer::new(config.flush_interval),
            reasoning: ReasoningWindow::new(config.reasoning_lines),
            resize: ResizeDebouncer::new(config.resize_debounce),
            config,
            queue: VecDeque::new(),
            transcript: Transcript::new(),
            flatten_cache: FlattenCache::new(),
            classifier: ContentClassifier::new(),
            layout,
            sidebar_expanded: false,
            viewport: ViewportState::default(),
            turn: None,
            context: RenderContext::default(),
            last_drawn: None,
        }
    }

    pub fn enqueue(&mut self, event: CoreEvent) {
        self.queue.push_back(event);
    }

    /// Handles every queued event in order, then runs due timers.
    pub fn process(&mut self, now: Instant) {
        while let Some(event) = self.queue.pop_front() {
            self.handle(event, now);
        }
        self.run_timers(now);
    }

    /// Runs due timers only.
    pub fn tick(&mut self, now: Instant) {
        self.run_timers(now);
    }

    /// Milliseconds until the nearest deadline, capped at `default_ms`.
    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        let timeout = self.buffer.next_timeout_ms(now, default_ms);
        match self.resize.deadline() {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now).as_millis();
                timeout.min(remaining.min(i32::MAX as u128) as i32).max(0)
            }
            None => timeout,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn layout(&self) -> &LayoutMode {
        &self.layout
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn reasoning(&self) -> &ReasoningWindow {
        &self.reasoning
    }

    pub fn is_streaming(&self) -> bool {
        self.turn.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Labels for the current turn, to pass back into [`Engine::draw`].
    pub fn render_context(&self) -> RenderContext {
        self.context.clone()
    }

    pub fn max_visible(&self) -> usize {
        max_visible(viewport_rows(&self.layout))
    }

    pub fn frame(&mut self) -> Frame {
        let blocks = self.flatten_cache.get(self.transcript.messages());
        let (slice, viewport) = compute_visible(
            &blocks,
            self.viewport,
            self.max_visible(),
            self.config.overscan,
        );
        let range = viewport.scroll_offset..viewport.scroll_offset + slice.len();
        self.viewport = viewport;
        let (reasoning, reasoning_total) = if self.turn.is_some() {
            (self.reasoning.visible_lines().to_vec(), self.reasoning.len())
        } else {
            (Vec::new(), 0)
        };
        Frame {
            layout: self.layout,
            width: self.layout.content_width(),
            blocks,
            range,
            reasoning,
            reasoning_total,
            viewport,
            revision: self.transcript.revision(),
        }
    }

    /// Draws the current frame. Returns false when nothing changed since the last draw.
    pub fn draw<R: BlockRenderer + ?Sized>(
        &mut self,
        ctx: &RenderContext,
        renderer: &mut R,
    ) -> bool {
        let frame = self.frame();
        let key = frame.key();
        if self.last_drawn == Some(key) {
            trace!(revision = key.revision, "frame unchanged; skipping draw");
            return false;
        }

        renderer.begin_frame(frame.width, ctx);
        for block in frame.visible() {
            renderer.draw(block, frame.width, ctx);
        }
        if !frame.reasoning.is_empty() {
            renderer.draw_reasoning(&frame.reasoning, frame.width, ctx);
        }
        renderer.end_frame(ctx);
        self.last_drawn = Some(key);
        true
    }

    /// Forgets the last drawn frame so the next [`Engine::draw`] always emits.
    pub fn invalidate_frame(&mut self) {
        self.last_drawn = None;
    }

    fn handle(&mut self, event: CoreEvent, now: Instant) {
        trace!(?event, "handling event");
        match event {
            CoreEvent::Submit(text) => self.submit(text),
            CoreEvent::Turn(turn) => self.handle_turn(turn, now),
            CoreEvent::Scroll(intent) => {
                let total = self.block_count();
                self.viewport = self.viewport.apply(intent, total, self.max_visible());
            }
            CoreEvent::Resize { columns, rows } => self.resize.signal(columns, rows, now),
            CoreEvent::Clear => self.clear(),
            CoreEvent::ToggleSidebar => {
                self.sidebar_expanded = !self.sidebar_expanded;
                self.layout = self.layout.with_sidebar_expanded(self.sidebar_expanded);
                debug!(expanded = self.sidebar_expanded, "sidebar toggled");
            }
        }
    }

    fn handle_turn(&mut self, event: TurnEvent, now: Instant) {
        match event {
            TurnEvent::Started { agent, model } => self.start_turn(agent, model),
            TurnEvent::Chunk(fragment) => {
                if self.turn.is_none() {
                    warn!(len = fragment.len(), "chunk outside of a turn; dropping");
                    return;
                }
                if let Some(commit) = self.buffer.push(&fragment, now) {
                    self.route_commit(&commit);
                }
            }
            TurnEvent::Finished => self.complete_turn(TurnOutcome::Finished),
            TurnEvent::Failed(message) => self.complete_turn(TurnOutcome::Failed(message)),
            TurnEvent::Cancelled => self.complete_turn(TurnOutcome::Cancelled),
        }
    }

    fn submit(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        self.transcript.push(Message::user(text));
        let total = self.block_count();
        self.viewport = self.viewport.jump_bottom(total, self.max_visible());
    }

    fn start_turn(&mut self, agent: Option<String>, model: Option<String>) {
        if self.turn.is_some() {
            warn!("turn started while another was streaming; finishing the previous one");
            self.complete_turn(TurnOutcome::Finished);
        }

        self.buffer.reset();
        self.classifier.reset();
        self.reasoning.clear();
        if agent.is_some() {
            self.context.agent = agent.clone();
        }
        if model.is_some() {
            self.context.model = model.clone();
        }
        self.context.streaming = true;

        info!(agent = ?agent, model = ?model, "turn started");
        let message = self.transcript.len();
        self.transcript.push(Message::assistant("").with_meta(MessageMeta {
            agent,
            model,
            streaming: true,
        }));
        self.turn = Some(ActiveTurn {
            message,
            content: String::new(),
        });
        self.on_transcript_changed();
    }

    fn route_commit(&mut self, commit: &str) {
        debug!(len = commit.len(), "stream commit");
        let classified = self.classifier.feed(commit);
        self.apply_classified(classified);
    }

    fn apply_classified(&mut self, classified: Classified) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        for line in classified.reasoning {
            self.reasoning.push(line);
        }
        turn.content.push_str(&classified.content);

        let mut display = turn.content.clone();
        if let Some(tail) = self.classifier.preview_tail() {
            display.push_str(tail);
        }
        let index = turn.message;
        let unchanged = self
            .transcript
            .get(index)
            .is_some_and(|message| message.content == display);
        if !unchanged {
            self.transcript
                .update_at(index, |message| message.content = display);
            self.on_transcript_changed();
        }
    }

    fn complete_turn(&mut self, outcome: TurnOutcome) {
        let Some(index) = self.turn.as_ref().map(|turn| turn.message) else {
            debug!(?outcome, "turn end without an active turn");
            if let TurnOutcome::Failed(message) = outcome {
                self.transcript.push(Message::error(message));
                self.on_transcript_changed();
            }
            return;
        };

        match outcome {
            TurnOutcome::Cancelled => self.buffer.reset(),
            TurnOutcome::Finished | TurnOutcome::Failed(_) => {
                if let Some(commit) = self.buffer.flush_now() {
                    self.route_commit(&commit);
                }
            }
        }
        let tail = self.classifier.finish();
        self.apply_classified(tail);

        self.turn = None;
        self.buffer.reset();
        self.context.streaming = false;

        let placeholder_removed = self.transcript.remove_at_if(index, |message| {
            message.role == Role::Assistant && message.content.trim().is_empty()
        });
        if !placeholder_removed {
            self.transcript
                .update_at(index, |message| message.meta.streaming = false);
        }
        if let TurnOutcome::Failed(message) = &outcome {
            self.transcript.push(Message::error(message.clone()));
        }
        info!(?outcome, placeholder_removed, "turn ended");
        self.on_transcript_changed();
    }

    fn clear(&mut self) {
        self.buffer.reset();
        self.classifier.reset();
        self.reasoning.clear();
        self.turn = None;
        self.context.streaming = false;
        self.transcript.clear();
        self.flatten_cache.invalidate();
        self.viewport = ViewportState::default();
        self.on_transcript_changed();
        info!("transcript cleared");
    }

    fn run_timers(&mut self, now: Instant) {
        if let Some(commit) = self.buffer.flush_due(now) {
            self.route_commit(&commit);
        }
        if let Some((columns, rows)) = self.resize.take_due(now) {
            self.apply_resize(columns, rows);
        }
    }

    fn apply_resize(&mut self, columns: u16, rows: u16) {
        self.layout =
            compute_layout_mode(columns, rows).with_sidebar_expanded(self.sidebar_expanded);
        let total = self.block_count();
        self.viewport = self.viewport.on_blocks_changed(total, self.max_visible());
        debug!(
            kind = self.layout.kind.label(),
            columns = self.layout.columns,
            rows = self.layout.rows,
            width = self.layout.content_width(),
            "resize applied"
        );
    }

    fn block_count(&mut self) -> usize {
        self.flatten_cache.get(self.transcript.messages()).len()
    }

    fn on_transcript_changed(&mut self) {
        let total = self.block_count();
        self.viewport = self.viewport.on_blocks_changed(total, self.max_visible());
    }
}
