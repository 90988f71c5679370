//! # Video Frame Module
//!
//! Frame representation and frame-file discovery for the effect pipeline.

pub mod loader;
pub mod types;

pub use loader::FrameLoader;
pub use types::Frame;
