//! Streamed text intake: fragment coalescing and reasoning/content routing.

pub mod buffer;
pub mod classifier;

pub use buffer::{StreamBuffer, StreamBufferOptions};
pub use classifier::{classify_line, Classified, ContentClassifier, LineClass, ReasoningWindow};
