//! # Timestamp Overlay Compositor
//!
//! Builds one static RGBA overlay per video (timestamp bottom-left, optional
//! caption top-right, both with an orange glow behind warm-yellow core text)
//! and alpha-composites it onto every frame.
//!
//! The overlay is rendered exactly once; per-frame work is a single
//! alpha-blend pass.

use std::path::Path;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::error::{OverlayError, Result};
use crate::video::Frame;

/// Warm yellow used for the crisp text layer
const CORE_COLOR: [u8; 4] = [250, 189, 90, 255];
/// Translucent orange used for the glow copies
const HALO_COLOR: [u8; 4] = [255, 120, 0, 180];
/// Font size as a fraction of frame height
const FONT_SIZE_MULTIPLIER: f32 = 0.025;
/// Text padding as a fraction of frame width/height
const PADDING_MULTIPLIER: f32 = 0.03;
/// Gaussian radius applied to the glow layer
const GLOW_BLUR_RADIUS: f32 = 1.5;

/// Common locations for a bold sans font, tried in order by the CLI
pub const FALLBACK_FONT_PATHS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Parse a font from raw TTF/OTF bytes
pub fn load_font(bytes: Vec<u8>) -> Result<Font> {
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|e| OverlayError::FontParseFailed { reason: e.to_string() }.into())
}

/// Walk the fallback chain and load the first font that parses
pub fn find_system_font(explicit: Option<&Path>) -> Result<Font> {
    let mut searched = Vec::new();

    if let Some(path) = explicit {
        searched.push(path.display().to_string());
        if let Ok(bytes) = std::fs::read(path) {
            return load_font(bytes);
        }
    }

    for candidate in FALLBACK_FONT_PATHS {
        searched.push(candidate.to_string());
        if let Ok(bytes) = std::fs::read(candidate) {
            debug!("Using font {}", candidate);
            if let Ok(font) = load_font(bytes) {
                return Ok(font);
            }
        }
    }

    Err(OverlayError::FontNotFound {
        searched: searched.join(", "),
    }
    .into())
}

/// The pre-rendered overlay canvas
///
/// Immutable after construction; shared read-only across all frames of a video.
pub struct Overlay {
    canvas: RgbaImage,
}

impl Overlay {
    /// Render the overlay for a video of the given dimensions
    ///
    /// The caption is skipped when it is empty after trimming whitespace.
    pub fn build(
        width: u32,
        height: u32,
        timestamp_text: &str,
        message_text: &str,
        font: &Font,
    ) -> Result<Self> {
        let font_size = height as f32 * FONT_SIZE_MULTIPLIER;
        let padding_x = (width as f32 * PADDING_MULTIPLIER) as i32;
        let padding_y = (height as f32 * PADDING_MULTIPLIER) as i32;

        let mut texts: Vec<(String, i32, i32)> = Vec::new();

        // Timestamp anchors bottom-left.
        let (_, date_h) = measure_text(font, timestamp_text, font_size);
        texts.push((
            timestamp_text.to_string(),
            padding_x,
            height as i32 - date_h - padding_y,
        ));

        // Caption anchors top-right, only when non-blank.
        let message = message_text.trim();
        if !message.is_empty() {
            let (msg_w, _) = measure_text(font, message, font_size);
            texts.push((message.to_string(), width as i32 - padding_x - msg_w, padding_y));
        }

        // Glow pass: four offset copies per radius on a separate layer,
        // blurred before the crisp text goes on top.
        let mut glow = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        for (text, x, y) in &texts {
            for i in (1..=3).rev() {
                draw_text(&mut glow, font, text, font_size, x + i, y + i, HALO_COLOR);
                draw_text(&mut glow, font, text, font_size, x - i, y - i, HALO_COLOR);
                draw_text(&mut glow, font, text, font_size, *x, y + i, HALO_COLOR);
                draw_text(&mut glow, font, text, font_size, *x, y - i, HALO_COLOR);
            }
        }
        let mut canvas = image::imageops::blur(&glow, GLOW_BLUR_RADIUS);

        for (text, x, y) in &texts {
            draw_text(&mut canvas, font, text, font_size, *x, *y, CORE_COLOR);
        }

        Ok(Self { canvas })
    }

    /// Wrap an already-rendered RGBA canvas as an overlay
    pub fn from_canvas(canvas: RgbaImage) -> Self {
        Self { canvas }
    }

    /// Overlay dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    /// Alpha-composite the overlay onto a frame, producing a new frame
    pub fn composite_onto(&self, frame: &Frame) -> Result<Frame> {
        if self.canvas.dimensions() != frame.dimensions() {
            return Err(OverlayError::DimensionMismatch {
                overlay: self.canvas.dimensions(),
                frame: frame.dimensions(),
            }
            .into());
        }

        let mut out = frame.clone();
        for (x, y, src) in self.canvas.enumerate_pixels() {
            let alpha = src[3] as u16;
            if alpha == 0 {
                continue;
            }
            let inv = 255 - alpha;
            let dst = out.get_pixel_mut(x, y);
            for c in 0..3 {
                dst[c] = ((src[c] as u16 * alpha + dst[c] as u16 * inv + 127) / 255) as u8;
            }
        }
        Ok(out)
    }
}

/// Ink extents of a text run at the given size, as (width, height)
fn measure_text(font: &Font, text: &str, font_size: f32) -> (i32, i32) {
    let (min_x, min_y, max_x, max_y) = ink_box(font, text, font_size);
    ((max_x - min_x).max(0), (max_y - min_y).max(0))
}

fn ink_box(font: &Font, text: &str, font_size: f32) -> (i32, i32, i32, i32) {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, font_size, 0));

    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;

    for glyph in layout.glyphs() {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let gx = glyph.x.round() as i32;
        let gy = glyph.y.round() as i32;
        min_x = min_x.min(gx);
        min_y = min_y.min(gy);
        max_x = max_x.max(gx + glyph.width as i32);
        max_y = max_y.max(gy + glyph.height as i32);
    }

    if min_x == i32::MAX {
        return (0, 0, 0, 0);
    }
    (min_x, min_y, max_x, max_y)
}

/// Rasterize `text` with its ink box's top-left corner at (x, y)
fn draw_text(canvas: &mut RgbaImage, font: &Font, text: &str, font_size: f32, x: i32, y: i32, color: [u8; 4]) {
    let (min_x, min_y, _, _) = ink_box(font, text, font_size);

    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, font_size, 0));

    let (width, height) = canvas.dimensions();

    for glyph in layout.glyphs() {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let (_, bitmap) = font.rasterize_config(glyph.key);
        let origin_x = x - min_x + glyph.x.round() as i32;
        let origin_y = y - min_y + glyph.y.round() as i32;

        for row in 0..glyph.height {
            let py = origin_y + row as i32;
            if py < 0 || py >= height as i32 {
                continue;
            }
            for col in 0..glyph.width {
                let px = origin_x + col as i32;
                if px < 0 || px >= width as i32 {
                    continue;
                }
                let coverage = bitmap[row * glyph.width + col];
                if coverage == 0 {
                    continue;
                }
                let alpha = ((coverage as u16 * color[3] as u16) / 255) as u8;
                blend_over(
                    canvas.get_pixel_mut(px as u32, py as u32),
                    [color[0], color[1], color[2], alpha],
                );
            }
        }
    }
}

/// Non-premultiplied source-over blend for RGBA canvases
fn blend_over(dst: &mut Rgba<u8>, src: [u8; 4]) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }

    for c in 0..3 {
        let sc = src[c] as f32;
        let dc = dst[c] as f32;
        dst[c] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}
