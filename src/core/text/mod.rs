//! Text helpers (display width, wrapping).
//!
//! These helpers are pure and live under `core` so renderers can depend on them without
//! importing anything from the runtime layer.

pub mod width;
pub mod wrap;

pub use width::{display_width, expand_tabs, pad_to_width};
pub use wrap::{wrap_plain, wrap_runs};
