//! # Retrofilm
//!
//! Give video frames the look of a vintage compact camera: film-stock color
//! grades, grain, chromatic aberration, frame jitter, random light leaks, and
//! a burned-in timestamp overlay.
//!
//! Every randomized pass draws from one explicit seed, so a run is exactly
//! reproducible frame for frame.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retrofilm::{
//!     config::EffectConfig,
//!     grade::FilmStock,
//!     overlay::{find_system_font, Overlay},
//!     pipeline::FramePipeline,
//!     video::Frame,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = EffectConfig {
//!     stock: FilmStock::Portra800,
//!     timestamp_text: "05-17-'24".to_string(),
//!     seed: Some(42),
//!     ..EffectConfig::default()
//! };
//!
//! let frame = Frame::open("frames/0001.png")?;
//! let (width, height) = frame.dimensions();
//!
//! let font = find_system_font(None)?;
//! let overlay = Overlay::build(width, height, &config.timestamp_text, &config.message_text, &font)?;
//!
//! let mut pipeline = FramePipeline::new(&config, overlay, width, height)?;
//! let processed = pipeline.process(&frame)?;
//! processed.save_png("out/0001.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`grade`] - The five film-stock color grades
//! - [`effects`] - Noise, chromatic aberration, and jitter primitives
//! - [`overlay`] - The static timestamp/caption compositor
//! - [`leaks`] - The probabilistic light-leak state machine
//! - [`pipeline`] - Per-video orchestration of all passes
//! - [`video`] - Frame buffers and frame-sequence loading
//! - [`config`] - Configuration management

pub mod config;
pub mod effects;
pub mod error;
pub mod grade;
pub mod leaks;
pub mod overlay;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::EffectConfig,
    error::{Result, RetrofilmError},
    grade::FilmStock,
    leaks::LightLeakManager,
    overlay::Overlay,
    pipeline::FramePipeline,
    video::Frame,
};
