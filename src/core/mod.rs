//! Core data types shared by every layer.

pub mod block;
pub mod message;
pub mod text;
