//! # Frame Pipeline
//!
//! Ties the passes together in their fixed order: grade, overlay composite,
//! chromatic aberration, jitter, light leaks. One pipeline instance owns all
//! per-video state (the random source and the leak state machine), so frames
//! must be fed in playback order.
//!
//! [`FramePipeline::process_batch`] pre-computes the leak timeline and the
//! per-frame noise seeds sequentially, then fans the pixel work out across
//! worker threads without changing the output.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::EffectConfig;
use crate::effects::{chromatic_aberration, jitter};
use crate::error::{PipelineError, Result};
use crate::grade::FilmStock;
use crate::leaks::LightLeakManager;
use crate::overlay::Overlay;
use crate::video::Frame;

/// Horizontal channel displacement for the aberration pass, in pixels
const ABERRATION_SHIFT: i32 = 2;
/// Maximum per-axis displacement for the jitter pass, in pixels
const JITTER_MAX_SHIFT: i32 = 1;

/// Per-video effect pipeline
pub struct FramePipeline {
    stock: FilmStock,
    overlay: Overlay,
    leaks: Option<LightLeakManager>,
    enable_aberration: bool,
    enable_jitter: bool,
    dimensions: (u32, u32),
    rng: SmallRng,
    frames_processed: u64,
}

impl FramePipeline {
    /// Build a pipeline for a video of the given dimensions
    ///
    /// The overlay must already be rendered at the same dimensions. The leak
    /// manager is created only when leaks are enabled and a directory is
    /// configured; its random stream is derived from the run seed so leak
    /// timing and noise stay independently reproducible.
    pub fn new(config: &EffectConfig, overlay: Overlay, width: u32, height: u32) -> Result<Self> {
        if overlay.dimensions() != (width, height) {
            return Err(crate::error::OverlayError::DimensionMismatch {
                overlay: overlay.dimensions(),
                frame: (width, height),
            }
            .into());
        }

        let seed = config.resolve_seed();
        info!("Pipeline seed: {}", seed);

        let leaks = match (&config.leaks_dir, config.enable_leaks) {
            (Some(dir), true) => Some(LightLeakManager::from_dir(
                dir,
                width,
                height,
                SmallRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            )),
            _ => None,
        };

        Ok(Self {
            stock: config.stock,
            overlay,
            leaks,
            enable_aberration: config.enable_aberration,
            enable_jitter: config.enable_jitter,
            dimensions: (width, height),
            rng: SmallRng::seed_from_u64(seed),
            frames_processed: 0,
        })
    }

    /// Swap in a pre-built leak manager, replacing any directory-loaded one
    pub fn with_leaks(mut self, leaks: LightLeakManager) -> Self {
        self.leaks = Some(leaks);
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Process one frame through every enabled pass
    pub fn process(&mut self, frame: &Frame) -> Result<Frame> {
        self.check_dimensions(frame)?;

        let mut rng = SmallRng::seed_from_u64(self.rng.gen());
        let out = apply_passes(
            self.stock,
            &self.overlay,
            self.enable_aberration,
            self.enable_jitter,
            frame,
            &mut rng,
        )?;

        let out = match &mut self.leaks {
            Some(leaks) => leaks.apply(&out),
            None => out,
        };

        self.frames_processed += 1;
        debug!("Processed frame {}", self.frames_processed);
        Ok(out)
    }

    /// Process a batch of consecutive frames across worker threads
    ///
    /// Output order matches input order, and the result is identical for a
    /// given seed no matter how many threads run.
    pub fn process_batch(&mut self, frames: &[Frame]) -> Result<Vec<Frame>> {
        for frame in frames {
            self.check_dimensions(frame)?;
        }

        // All sequential state advances up front: one noise seed per frame,
        // one leak sample per frame.
        let seeds: Vec<u64> = (0..frames.len()).map(|_| self.rng.gen()).collect();
        let leak_timeline: Vec<Option<(usize, f32)>> = match &mut self.leaks {
            Some(leaks) => leaks.schedule(frames.len()),
            None => vec![None; frames.len()],
        };

        let stock = self.stock;
        let overlay = &self.overlay;
        let leaks = self.leaks.as_ref();
        let enable_aberration = self.enable_aberration;
        let enable_jitter = self.enable_jitter;

        let out: Result<Vec<Frame>> = frames
            .par_iter()
            .zip(seeds.into_par_iter())
            .zip(leak_timeline.into_par_iter())
            .map(|((frame, seed), leak_sample)| {
                let mut rng = SmallRng::seed_from_u64(seed);
                let processed =
                    apply_passes(stock, overlay, enable_aberration, enable_jitter, frame, &mut rng)?;
                Ok(match (leaks, leak_sample) {
                    (Some(leaks), Some(sample)) => leaks.blend(&processed, sample),
                    _ => processed,
                })
            })
            .collect();

        let out = out?;
        self.frames_processed += out.len() as u64;
        info!("Processed batch of {} frames", out.len());
        Ok(out)
    }

    fn check_dimensions(&self, frame: &Frame) -> Result<()> {
        if frame.dimensions() != self.dimensions {
            return Err(PipelineError::FrameSizeChanged {
                expected: self.dimensions,
                actual: frame.dimensions(),
            }
            .into());
        }
        Ok(())
    }
}

fn apply_passes<R: Rng>(
    stock: FilmStock,
    overlay: &Overlay,
    enable_aberration: bool,
    enable_jitter: bool,
    frame: &Frame,
    rng: &mut R,
) -> Result<Frame> {
    let mut out = stock.apply(frame, rng);
    out = overlay.composite_onto(&out)?;
    if enable_aberration {
        out = chromatic_aberration(&out, ABERRATION_SHIFT);
    }
    if enable_jitter {
        out = jitter(&out, JITTER_MAX_SHIFT, rng);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::grade::stocks::modern_fuji;

    fn transparent_overlay(width: u32, height: u32) -> Overlay {
        Overlay::from_canvas(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])))
    }

    fn config(seed: u64) -> EffectConfig {
        EffectConfig {
            stock: FilmStock::ModernFuji,
            seed: Some(seed),
            leaks_dir: None,
            ..EffectConfig::default()
        }
    }

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_black(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [(x * 30) as u8, (y * 30) as u8, 120]);
            }
        }
        frame
    }

    #[test]
    fn test_same_seed_same_output() {
        let frame = gradient_frame(6, 6);

        let mut a = FramePipeline::new(&config(42), transparent_overlay(6, 6), 6, 6).unwrap();
        let mut b = FramePipeline::new(&config(42), transparent_overlay(6, 6), 6, 6).unwrap();

        for _ in 0..5 {
            assert_eq!(a.process(&frame).unwrap(), b.process(&frame).unwrap());
        }
    }

    #[test]
    fn test_size_change_is_rejected() {
        let mut pipeline =
            FramePipeline::new(&config(1), transparent_overlay(6, 6), 6, 6).unwrap();

        assert!(pipeline.process(&gradient_frame(6, 6)).is_ok());
        assert!(pipeline.process(&gradient_frame(4, 4)).is_err());
    }

    #[test]
    fn test_overlay_dimension_mismatch_is_rejected() {
        assert!(FramePipeline::new(&config(1), transparent_overlay(4, 4), 6, 6).is_err());
    }

    #[test]
    fn test_disabled_passes_reduce_to_grade() {
        let cfg = EffectConfig {
            stock: FilmStock::ModernFuji,
            enable_aberration: false,
            enable_jitter: false,
            enable_leaks: false,
            seed: Some(3),
            ..EffectConfig::default()
        };
        let mut pipeline = FramePipeline::new(&cfg, transparent_overlay(6, 6), 6, 6).unwrap();

        let frame = gradient_frame(6, 6);
        // Fuji has zero grain, the overlay is transparent, and leaks are off,
        // so the pipeline collapses to the pure grade transform.
        assert_eq!(pipeline.process(&frame).unwrap(), modern_fuji(&frame));
    }

    #[test]
    fn test_batch_is_deterministic_and_ordered() {
        let frames: Vec<Frame> = (0..8).map(|_| gradient_frame(6, 6)).collect();

        let mut a = FramePipeline::new(&config(9), transparent_overlay(6, 6), 6, 6).unwrap();
        let mut b = FramePipeline::new(&config(9), transparent_overlay(6, 6), 6, 6).unwrap();

        let out_a = a.process_batch(&frames).unwrap();
        let out_b = b.process_batch(&frames).unwrap();
        assert_eq!(out_a.len(), frames.len());
        assert_eq!(out_a, out_b);
        assert_eq!(a.frames_processed(), 8);
    }

    #[test]
    fn test_batch_with_leaks_is_deterministic() {
        use crate::leaks::LightLeakManager;

        let frames: Vec<Frame> = (0..64).map(|_| gradient_frame(6, 6)).collect();
        let leak = vec![80.0f32; 6 * 6 * 3];

        let build = || {
            FramePipeline::new(&config(5), transparent_overlay(6, 6), 6, 6)
                .unwrap()
                .with_leaks(LightLeakManager::from_images(
                    vec![leak.clone()],
                    6,
                    6,
                    SmallRng::seed_from_u64(77),
                ))
        };

        let out_a = build().process_batch(&frames).unwrap();
        let out_b = build().process_batch(&frames).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_batch_size_mismatch_rejected_before_processing() {
        let mut pipeline =
            FramePipeline::new(&config(2), transparent_overlay(6, 6), 6, 6).unwrap();

        let frames = vec![gradient_frame(6, 6), gradient_frame(5, 5)];
        assert!(pipeline.process_batch(&frames).is_err());
        assert_eq!(pipeline.frames_processed(), 0);
    }
}
