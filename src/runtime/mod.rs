//! Layout, viewport and the event loop that drives them.

pub mod engine;
pub mod layout;
pub mod resize;
pub mod viewport;

pub use engine::{CoreEvent, Engine, Frame, TurnEvent};
pub use layout::{compute_layout_mode, main_width, viewport_rows, LayoutKind, LayoutMode};
pub use resize::ResizeDebouncer;
pub use viewport::{compute_visible, max_visible, ScrollIntent, ScrollMode, ViewportState};
