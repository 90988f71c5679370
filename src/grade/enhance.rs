//! Midpoint-anchored enhancement operators used by the grade recipes.
//!
//! The formulas follow Pillow's `ImageEnhance` semantics so the stock recipes
//! reproduce the reference looks:
//! - brightness interpolates from black: `px * factor`
//! - contrast interpolates from a solid gray at the image's mean luma:
//!   `mean + (px - mean) * factor`
//! - saturation interpolates from the per-pixel luma:
//!   `luma + (px - luma) * factor`
//!
//! All arithmetic is f32 with round-to-nearest and a final clamp to [0, 255].

use crate::video::Frame;

pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// ITU-R 601 luma of one RGB pixel
pub fn luma(pixel: [u8; 3]) -> f32 {
    LUMA_WEIGHTS[0] * pixel[0] as f32
        + LUMA_WEIGHTS[1] * pixel[1] as f32
        + LUMA_WEIGHTS[2] * pixel[2] as f32
}

fn clip(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn map_pixels<F: Fn([u8; 3]) -> [f32; 3]>(frame: &Frame, f: F) -> Frame {
    let mut out = frame.clone();
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let mapped = f(frame.get_pixel(x, y));
            out.set_pixel(x, y, [clip(mapped[0]), clip(mapped[1]), clip(mapped[2])]);
        }
    }
    out
}

/// Scale brightness multiplicatively (factor 1.0 = unchanged)
pub fn brightness(frame: &Frame, factor: f32) -> Frame {
    map_pixels(frame, |px| {
        [
            px[0] as f32 * factor,
            px[1] as f32 * factor,
            px[2] as f32 * factor,
        ]
    })
}

/// Scale contrast around the image's mean luma (factor 1.0 = unchanged)
pub fn contrast(frame: &Frame, factor: f32) -> Frame {
    let mean = mean_luma(frame);
    map_pixels(frame, |px| {
        [
            mean + (px[0] as f32 - mean) * factor,
            mean + (px[1] as f32 - mean) * factor,
            mean + (px[2] as f32 - mean) * factor,
        ]
    })
}

/// Scale saturation around each pixel's own luma (factor 1.0 = unchanged)
pub fn saturation(frame: &Frame, factor: f32) -> Frame {
    map_pixels(frame, |px| {
        let l = luma(px).round();
        [
            l + (px[0] as f32 - l) * factor,
            l + (px[1] as f32 - l) * factor,
            l + (px[2] as f32 - l) * factor,
        ]
    })
}

/// Soften the frame with a Gaussian blur to simulate lens halation
///
/// `radius <= 0` is an explicit no-op.
pub fn soften(frame: &Frame, radius: f32) -> Frame {
    if radius <= 0.0 {
        return frame.clone();
    }
    Frame::new(image::imageops::blur(frame.as_image(), radius))
}

/// Mean of the rounded per-pixel lumas, anchored the way a grayscale
/// conversion pass would round them
fn mean_luma(frame: &Frame) -> f32 {
    let (width, height) = frame.dimensions();
    let mut sum = 0.0f64;
    for y in 0..height {
        for x in 0..width {
            sum += luma(frame.get_pixel(x, y)).round() as f64;
        }
    }
    let count = (width as f64) * (height as f64);
    ((sum / count) + 0.5).floor() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_scales_from_black() {
        let frame = Frame::new_filled(2, 2, [100, 100, 100]);
        let brighter = brightness(&frame, 1.5);
        assert_eq!(brighter.get_pixel(0, 0), [150, 150, 150]);
    }

    #[test]
    fn test_brightness_clips_at_white() {
        let frame = Frame::new_filled(2, 2, [250, 250, 250]);
        let brighter = brightness(&frame, 1.2);
        assert_eq!(brighter.get_pixel(0, 0), [255, 255, 255]);
    }

    #[test]
    fn test_contrast_leaves_uniform_frame_unchanged() {
        // A uniform frame's mean luma equals every pixel's luma, so contrast
        // scaling has nothing to pull toward or away from.
        let frame = Frame::new_filled(3, 3, [128, 128, 128]);
        assert_eq!(contrast(&frame, 0.5), frame);
        assert_eq!(contrast(&frame, 2.0), frame);
    }

    #[test]
    fn test_contrast_compresses_toward_mean() {
        let mut frame = Frame::new_filled(2, 1, [0, 0, 0]);
        frame.set_pixel(1, 0, [200, 200, 200]);
        // mean luma = (0 + 200) / 2 = 100
        let flattened = contrast(&frame, 0.5);
        assert_eq!(flattened.get_pixel(0, 0), [50, 50, 50]);
        assert_eq!(flattened.get_pixel(1, 0), [150, 150, 150]);
    }

    #[test]
    fn test_saturation_leaves_gray_unchanged() {
        let frame = Frame::new_filled(2, 2, [90, 90, 90]);
        assert_eq!(saturation(&frame, 1.5), frame);
    }

    #[test]
    fn test_saturation_zero_desaturates_to_luma() {
        let frame = Frame::new_filled(1, 1, [255, 0, 0]);
        let gray = saturation(&frame, 0.0);
        let l = luma([255, 0, 0]).round() as u8;
        assert_eq!(gray.get_pixel(0, 0), [l, l, l]);
    }

    #[test]
    fn test_soften_zero_radius_is_identity() {
        let mut frame = Frame::new_filled(4, 4, [10, 20, 30]);
        frame.set_pixel(2, 2, [200, 200, 200]);
        assert_eq!(soften(&frame, 0.0), frame);
    }

    #[test]
    fn test_soften_preserves_uniform_frame() {
        let frame = Frame::new_filled(4, 4, [77, 88, 99]);
        assert_eq!(soften(&frame, 1.6), frame);
    }
}
