//! Virtualized viewport over the flattened block list.
//!
//! Keeps tail-following and scroll-offset clamping deterministic. Every transition returns a
//! fresh [`ViewportState`]; the offset is clamped to `0..=max(0, total - max_visible)` after
//! each one.

use tracing::debug;

use crate::core::block::Block;

/// Terminal rows assumed per block when budgeting the visible slice.
pub const ROWS_PER_BLOCK: usize = 4;
pub const MIN_VISIBLE_BLOCKS: usize = 3;
pub const DEFAULT_OVERSCAN: usize = 3;

/// Visible block budget for a viewport of `view_rows` terminal rows.
pub fn max_visible(view_rows: usize) -> usize {
    (view_rows / ROWS_PER_BLOCK).max(MIN_VISIBLE_BLOCKS)
}

fn max_offset(total: usize, max_visible: usize) -> usize {
    total.saturating_sub(max_visible)
}

/// Discrete scroll requests decoded by the keyboard layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollIntent {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    AutoScrolling,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    pub scroll_offset: usize,
    pub auto_scroll: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            auto_scroll: true,
        }
    }
}

impl ViewportState {
    pub fn mode(&self) -> ScrollMode {
        if self.auto_scroll {
            ScrollMode::AutoScrolling
        } else {
            ScrollMode::Paused
        }
    }

    /// Snaps to the tail while auto-scrolling; otherwise only clamps.
    #[must_use]
    pub fn on_blocks_changed(self, total: usize, max_visible: usize) -> Self {
        let bound = max_offset(total, max_visible);
        if self.auto_scroll {
            Self {
                scroll_offset: bound,
                auto_scroll: true,
            }
        } else {
            Self {
                scroll_offset: self.scroll_offset.min(bound),
                auto_scroll: false,
            }
        }
    }

    /// Pauses following and moves one block up, floored at zero.
    #[must_use]
    pub fn scroll_up(self, total: usize, max_visible: usize) -> Self {
        self.move_up(1, total, max_visible)
    }

    /// Moves one block down; reaching the last page resumes following.
    #[must_use]
    pub fn scroll_down(self, total: usize, max_visible: usize) -> Self {
        self.move_down(1, total, max_visible)
    }

    #[must_use]
    pub fn page_up(self, total: usize, max_visible: usize) -> Self {
        self.move_up(max_visible.max(1), total, max_visible)
    }

    #[must_use]
    pub fn page_down(self, total: usize, max_visible: usize) -> Self {
        self.move_down(max_visible.max(1), total, max_visible)
    }

    #[must_use]
    pub fn jump_top(self) -> Self {
        Self {
            scroll_offset: 0,
            auto_scroll: false,
        }
    }

    #[must_use]
    pub fn jump_bottom(self, total: usize, max_visible: usize) -> Self {
        Self {
            scroll_offset: max_offset(total, max_visible),
            auto_scroll: true,
        }
    }

    #[must_use]
    pub fn apply(self, intent: ScrollIntent, total: usize, max_visible: usize) -> Self {
        let next = match intent {
            ScrollIntent::Up => self.scroll_up(total, max_visible),
            ScrollIntent::Down => self.scroll_down(total, max_visible),
            ScrollIntent::PageUp => self.page_up(total, max_visible),
            ScrollIntent::PageDown => self.page_down(total, max_visible),
            ScrollIntent::Top => self.jump_top(),
            ScrollIntent::Bottom => self.jump_bottom(total, max_visible),
        };
        if next.auto_scroll != self.auto_scroll {
            debug!(
                ?intent,
                mode = ?next.mode(),
                offset = next.scroll_offset,
                "viewport mode changed"
            );
        }
        next
    }

    fn move_up(self, step: usize, total: usize, max_visible: usize) -> Self {
        let bound = max_offset(total, max_visible);
        Self {
            scroll_offset: self.scroll_offset.min(bound).saturating_sub(step),
            auto_scroll: false,
        }
    }

    fn move_down(self, step: usize, total: usize, max_visible: usize) -> Self {
        let bound = max_offset(total, max_visible);
        let next = self.scroll_offset.saturating_add(step);
        if next >= bound {
            Self {
                scroll_offset: bound,
                auto_scroll: true,
            }
        } else {
            Self {
                scroll_offset: next,
                auto_scroll: self.auto_scroll,
            }
        }
    }

    fn clamped(self, total: usize, max_visible: usize) -> Self {
        Self {
            scroll_offset: self.scroll_offset.min(max_offset(total, max_visible)),
            ..self
        }
    }
}

/// Clamps `state` against `blocks` and returns the slice to draw plus the clamped state.
///
/// The slice holds up to `max_visible + overscan` blocks starting at the scroll offset.
pub fn compute_visible(
    blocks: &[Block],
    state: ViewportState,
    max_visible: usize,
    overscan: usize,
) -> (&[Block], ViewportState) {
    let state = state.clamped(blocks.len(), max_visible);
    let start = state.scroll_offset;
    let end = blocks
        .len()
        .min(start.saturating_add(max_visible).saturating_add(overscan));
    (&blocks[start..end], state)
}
