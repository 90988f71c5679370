//! # Light Leak State Machine
//!
//! A per-video stateful manager that occasionally fades a pre-captured light
//! leak image over the frames, simulating analog light leakage. The state
//! machine cycles idle -> fade-in -> active -> fade-out, advanced exactly
//! once per frame in arrival order.
//!
//! The manager owns its own seeded random source so a whole run (and every
//! test) is reproducible from one seed.

use std::path::Path;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::error::{LeakError, Result};
use crate::video::Frame;

/// Chance per idle frame of starting a leak
const TRIGGER_PROBABILITY: f64 = 0.02;
/// Opacity gained per fade-in frame
const FADE_IN_STEP: f32 = 0.05;
/// Opacity at which fade-in hands over to the hold phase
const MAX_OPACITY: f32 = 0.8;
/// Opacity lost per fade-out frame
const FADE_OUT_STEP: f32 = 0.03;
/// Hold duration range, in frames
const HOLD_FRAMES: std::ops::RangeInclusive<i32> = 10..=30;
/// At most this many leak images are kept in memory per run
const MAX_LEAKS: usize = 5;
/// Below this opacity the blend is skipped entirely
const VISIBLE_THRESHOLD: f32 = 0.01;

const LEAK_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Phase of the light-leak cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeakPhase {
    Idle,
    FadeIn,
    Active,
    FadeOut,
}

/// Stateful light-leak blender for one video
///
/// Leak images are preloaded once, resized to the frame dimensions, and kept
/// as f32 RGB buffers so the per-frame additive blend never re-converts.
pub struct LightLeakManager {
    leaks: Vec<Vec<f32>>,
    width: u32,
    height: u32,
    phase: LeakPhase,
    active_idx: usize,
    opacity: f32,
    hold_counter: i32,
    rng: SmallRng,
}

impl LightLeakManager {
    /// Load up to five leak images at random from a directory
    ///
    /// Files that fail to load are logged and skipped; an empty or unreadable
    /// directory yields an inert manager that passes frames through unchanged.
    pub fn from_dir<P: AsRef<Path>>(dir: P, width: u32, height: u32, mut rng: SmallRng) -> Self {
        let dir = dir.as_ref();
        let mut candidates: Vec<_> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.extension()
                        .and_then(|ext| ext.to_str())
                        .map(|ext| LEAK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                        .unwrap_or(false)
                })
                .collect(),
            Err(e) => {
                warn!(
                    "{}",
                    LeakError::DirectoryUnreadable {
                        path: format!("{}: {}", dir.display(), e),
                    }
                );
                Vec::new()
            }
        };

        if candidates.is_empty() {
            warn!("No light leaks found in {}", dir.display());
            return Self::from_images(Vec::new(), width, height, rng);
        }

        // Stable candidate order before sampling keeps the selection a pure
        // function of the seed.
        candidates.sort();
        candidates.shuffle(&mut rng);
        candidates.truncate(MAX_LEAKS);

        info!("Loading {} light leaks into memory...", candidates.len());

        let mut leaks = Vec::new();
        for path in &candidates {
            match load_leak_image(path, width, height) {
                Ok(buffer) => leaks.push(buffer),
                Err(e) => warn!("Failed to load leak {}: {}", path.display(), e),
            }
        }

        Self::from_images(leaks, width, height, rng)
    }

    /// Build a manager from already-loaded f32 RGB leak buffers
    ///
    /// Each buffer must hold `width * height * 3` samples.
    pub fn from_images(leaks: Vec<Vec<f32>>, width: u32, height: u32, rng: SmallRng) -> Self {
        debug_assert!(leaks
            .iter()
            .all(|leak| leak.len() == (width * height * 3) as usize));

        Self {
            leaks,
            width,
            height,
            phase: LeakPhase::Idle,
            active_idx: 0,
            opacity: 0.0,
            hold_counter: 0,
            rng,
        }
    }

    /// Whether the manager has no leak images and passes frames through
    pub fn is_inert(&self) -> bool {
        self.leaks.is_empty()
    }

    pub fn phase(&self) -> LeakPhase {
        self.phase
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Advance the state machine by one frame, returning the new state
    ///
    /// Must be called exactly once per frame, in arrival order.
    pub fn tick(&mut self) -> (LeakPhase, f32) {
        if self.is_inert() {
            return (self.phase, self.opacity);
        }

        match self.phase {
            LeakPhase::Idle => {
                if self.rng.gen::<f64>() < TRIGGER_PROBABILITY {
                    self.phase = LeakPhase::FadeIn;
                    self.active_idx = self.rng.gen_range(0..self.leaks.len());
                    self.opacity = 0.0;
                }
            }
            LeakPhase::FadeIn => {
                self.opacity += FADE_IN_STEP;
                if self.opacity >= MAX_OPACITY {
                    self.phase = LeakPhase::Active;
                    self.hold_counter = self.rng.gen_range(HOLD_FRAMES);
                }
            }
            LeakPhase::Active => {
                self.hold_counter -= 1;
                if self.hold_counter <= 0 {
                    self.phase = LeakPhase::FadeOut;
                }
            }
            LeakPhase::FadeOut => {
                self.opacity -= FADE_OUT_STEP;
                if self.opacity <= 0.0 {
                    self.opacity = 0.0;
                    self.phase = LeakPhase::Idle;
                }
            }
        }

        (self.phase, self.opacity)
    }

    /// Advance the machine and blend the current leak onto the frame
    pub fn apply(&mut self, frame: &Frame) -> Frame {
        self.tick();
        match self.current_sample() {
            Some(sample) => self.blend(frame, sample),
            None => frame.clone(),
        }
    }

    /// The (leak index, opacity) pair for the current frame, if visible
    pub fn current_sample(&self) -> Option<(usize, f32)> {
        (!self.is_inert() && self.opacity > VISIBLE_THRESHOLD)
            .then_some((self.active_idx, self.opacity))
    }

    /// Pre-compute the leak timeline for `frames` upcoming frames
    ///
    /// Runs the sequential state machine once up front so callers can fan the
    /// per-frame blends out to worker threads afterwards.
    pub fn schedule(&mut self, frames: usize) -> Vec<Option<(usize, f32)>> {
        (0..frames)
            .map(|_| {
                self.tick();
                self.current_sample()
            })
            .collect()
    }

    /// Additively blend a scheduled leak sample onto a frame
    ///
    /// `result = clip(frame + leak * opacity)`, computed in f32.
    pub fn blend(&self, frame: &Frame, (leak_idx, opacity): (usize, f32)) -> Frame {
        debug_assert_eq!(frame.dimensions(), (self.width, self.height));

        let leak = &self.leaks[leak_idx];
        let mut out = frame.clone();
        for (sample, leak_sample) in out.as_raw_mut().iter_mut().zip(leak) {
            let blended = *sample as f32 + leak_sample * opacity;
            *sample = blended.clamp(0.0, 255.0) as u8;
        }
        out
    }
}

fn load_leak_image(path: &Path, width: u32, height: u32) -> Result<Vec<f32>> {
    let img = image::open(path)
        .map_err(|e| LeakError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .into_rgb8();

    let resized = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
    Ok(resized.as_raw().iter().map(|&s| s as f32).collect())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn uniform_leak(width: u32, height: u32, value: f32) -> Vec<f32> {
        vec![value; (width * height * 3) as usize]
    }

    fn manager_with_leak(seed: u64) -> LightLeakManager {
        LightLeakManager::from_images(
            vec![uniform_leak(4, 4, 100.0)],
            4,
            4,
            SmallRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_inert_manager_passes_frames_through() {
        let mut manager =
            LightLeakManager::from_images(Vec::new(), 4, 4, SmallRng::seed_from_u64(0));
        let frame = Frame::new_filled(4, 4, [50, 60, 70]);

        for _ in 0..100 {
            assert_eq!(manager.apply(&frame), frame);
            assert_eq!(manager.phase(), LeakPhase::Idle);
        }
    }

    #[test]
    fn test_opacity_zero_while_idle() {
        let mut manager = manager_with_leak(11);
        while manager.phase() == LeakPhase::Idle {
            let (_, opacity) = manager.tick();
            if manager.phase() == LeakPhase::Idle {
                assert_eq!(opacity, 0.0);
            }
        }
    }

    #[test]
    fn test_full_cycle_opacity_curve() {
        let mut manager = manager_with_leak(7);

        // Run until the trigger fires.
        let mut guard = 0;
        while manager.phase() == LeakPhase::Idle {
            manager.tick();
            guard += 1;
            assert!(guard < 10_000, "trigger never fired");
        }

        // Fade-in: strictly +0.05 per frame until >= 0.8.
        let mut prev = manager.opacity();
        while manager.phase() == LeakPhase::FadeIn {
            let (_, opacity) = manager.tick();
            if manager.phase() == LeakPhase::FadeIn || manager.phase() == LeakPhase::Active {
                assert!((opacity - (prev + FADE_IN_STEP)).abs() < 1e-6);
                prev = opacity;
            }
        }
        assert!(manager.opacity() >= MAX_OPACITY);

        // Active: opacity constant for the drawn hold duration.
        let peak = manager.opacity();
        let mut held = 0;
        while manager.phase() == LeakPhase::Active {
            let (_, opacity) = manager.tick();
            assert_eq!(opacity, peak);
            held += 1;
        }
        assert!((10..=30).contains(&held), "hold {} out of range", held);

        // Fade-out: strictly -0.03 per frame down to exactly zero.
        let mut prev = manager.opacity();
        while manager.phase() == LeakPhase::FadeOut {
            let (_, opacity) = manager.tick();
            if manager.phase() == LeakPhase::FadeOut {
                assert!((opacity - (prev - FADE_OUT_STEP)).abs() < 1e-6);
                prev = opacity;
            }
        }
        assert_eq!(manager.opacity(), 0.0);
        assert_eq!(manager.phase(), LeakPhase::Idle);
    }

    #[test]
    fn test_blend_is_additive_and_clipped() {
        let manager = manager_with_leak(3);
        let frame = Frame::new_filled(4, 4, [100, 200, 250]);

        let blended = manager.blend(&frame, (0, 0.5));
        // 100 + 100*0.5 = 150; 200 + 50 = 250; 250 + 50 clips at 255.
        assert_eq!(blended.get_pixel(0, 0), [150, 250, 255]);
    }

    #[test]
    fn test_schedule_matches_sequential_ticks() {
        let mut scheduled = manager_with_leak(21);
        let mut stepped = manager_with_leak(21);

        let timeline = scheduled.schedule(500);
        for sample in &timeline {
            stepped.tick();
            assert_eq!(*sample, stepped.current_sample());
        }
    }

    #[test]
    fn test_missing_directory_yields_inert_manager() {
        let manager = LightLeakManager::from_dir(
            "/nonexistent/leaks",
            4,
            4,
            SmallRng::seed_from_u64(1),
        );
        assert!(manager.is_inert());
    }

    #[test]
    fn test_empty_directory_yields_inert_manager() {
        let dir = tempfile::tempdir().unwrap();
        let manager = LightLeakManager::from_dir(dir.path(), 4, 4, SmallRng::seed_from_u64(1));
        assert!(manager.is_inert());
    }
}
