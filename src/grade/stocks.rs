//! The five film-stock recipes.
//!
//! Each recipe is enhancement passes first (contrast/brightness/saturation),
//! softening second, then the per-pixel shift/mask math, with grain noise
//! applied last. Intermediate math runs in f32 or i16 and clips to [0, 255]
//! only at the end of each array pass.
//!
//! Every recipe takes its grain amount as a parameter so callers (and tests)
//! can disable noise; the dispatch in [`super::FilmStock`] supplies each
//! stock's default amount.

use rand::Rng;

use crate::effects::add_noise;
use crate::grade::enhance::{brightness, contrast, luma, saturation, soften, LUMA_WEIGHTS};
use crate::video::Frame;

fn clip(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

fn shift_clipped(frame: &Frame, shift: [f32; 3]) -> Frame {
    let mut out = frame.clone();
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let px = frame.get_pixel(x, y);
            out.set_pixel(
                x,
                y,
                [
                    clip(px[0] as f32 + shift[0]),
                    clip(px[1] as f32 + shift[1]),
                    clip(px[2] as f32 + shift[2]),
                ],
            );
        }
    }
    out
}

/// Contemporary Fuji look: gentle contrast pullback, warm shift, and a 5%
/// luma blend that bleaches the saturation slightly
pub fn modern_fuji(frame: &Frame) -> Frame {
    let img = contrast(frame, 0.95);
    let img = brightness(&img, 1.05);

    const BLEND: f32 = 0.05;
    const SHIFT: [f32; 3] = [15.0, 5.0, -10.0];

    let mut out = img.clone();
    for y in 0..img.height() {
        for x in 0..img.width() {
            let px = img.get_pixel(x, y);
            let l = luma(px);
            let mut mapped = [0u8; 3];
            for c in 0..3 {
                let shifted = px[c] as f32 + SHIFT[c];
                mapped[c] = clip(shifted * (1.0 - BLEND) + l * BLEND);
            }
            out.set_pixel(x, y, mapped);
        }
    }
    out
}

/// Sun-baked terracotta look: heavy warm push with a blue-cast detector so
/// skies drop toward teal instead of turning muddy
pub fn terracotta_sun<R: Rng>(frame: &Frame, noise_amount: i16, rng: &mut R) -> Frame {
    let img = contrast(frame, 0.85);
    let img = saturation(&img, 1.35);
    let img = soften(&img, 1.6);

    let mut out = img.clone();
    for y in 0..img.height() {
        for x in 0..img.width() {
            let px = img.get_pixel(x, y);
            let (r, g, b) = (px[0] as i16, px[1] as i16, px[2] as i16);

            let avg_rg = (r + g) / 2;
            let is_blue = b > avg_rg + 30;
            let (rs, gs, bs) = if is_blue { (15, -10, -70) } else { (40, -5, -35) };

            out.set_pixel(
                x,
                y,
                [
                    (r + rs).clamp(0, 255) as u8,
                    (g + gs).clamp(0, 255) as u8,
                    (b + bs).clamp(0, 255) as u8,
                ],
            );
        }
    }

    add_noise(&out, noise_amount, rng)
}

/// Portra 800 look: lifted brightness, softened contrast, strong warm shift
/// with crushed blues, coarse grain
pub fn portra_800<R: Rng>(frame: &Frame, noise_amount: i16, rng: &mut R) -> Frame {
    let img = brightness(frame, 1.08);
    let img = contrast(&img, 0.85);
    let img = saturation(&img, 1.3);
    let img = soften(&img, 0.6);

    let shifted = shift_clipped(&img, [19.0, 10.0, -33.0]);
    add_noise(&shifted, noise_amount, rng)
}

/// Reala Ace look: muted contrast with a green/cyan cast and fine grain
pub fn reala_ace<R: Rng>(frame: &Frame, noise_amount: i16, rng: &mut R) -> Frame {
    let img = contrast(frame, 0.8);
    let img = saturation(&img, 1.2);
    let img = soften(&img, 0.8);

    let shifted = shift_clipped(&img, [-11.0, 10.0, 11.0]);
    add_noise(&shifted, noise_amount, rng)
}

/// Dreamy negative look: boosted saturation and a warm white-balance shift,
/// with luma-driven shadow lift and highlight compression
pub fn dreamy_negative<R: Rng>(frame: &Frame, noise_amount: i16, rng: &mut R) -> Frame {
    let img = contrast(frame, 0.90);
    let img = saturation(&img, 1.5);

    let mut out = img.clone();
    for y in 0..img.height() {
        for x in 0..img.width() {
            let px = img.get_pixel(x, y);
            let mut ch = [px[0] as f32 + 20.0, px[1] as f32, px[2] as f32 - 20.0];

            // Luma is measured after the white-balance shift on purpose: the
            // shaping should respond to the warmed image.
            let l = LUMA_WEIGHTS[0] * ch[0] + LUMA_WEIGHTS[1] * ch[1] + LUMA_WEIGHTS[2] * ch[2];

            if l < 60.0 {
                let lift = (60.0 - l) * 0.2;
                for c in ch.iter_mut() {
                    *c += lift;
                }
            } else if l > 200.0 {
                let darken = (l - 200.0) * 0.15;
                for c in ch.iter_mut() {
                    *c -= darken;
                }
            }

            out.set_pixel(x, y, [clip(ch[0]), clip(ch[1]), clip(ch[2])]);
        }
    }

    add_noise(&out, noise_amount, rng)
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(99)
    }

    #[test]
    fn test_all_stocks_handle_extreme_frames() {
        // All-white and all-black frames sit right on the clipping boundary;
        // every recipe must come back with the same dimensions and without
        // arithmetic panics.
        let white = Frame::new_filled(4, 4, [255, 255, 255]);
        let black = Frame::new_filled(4, 4, [0, 0, 0]);
        let mut r = rng();

        for frame in [&white, &black] {
            for graded in [
                modern_fuji(frame),
                terracotta_sun(frame, 5, &mut r),
                portra_800(frame, 15, &mut r),
                reala_ace(frame, 5, &mut r),
                dreamy_negative(frame, 8, &mut r),
            ] {
                assert_eq!(graded.dimensions(), frame.dimensions());
            }
        }
    }

    #[test]
    fn test_portra_white_frame_scenario() {
        // Pure white is invariant under brightness/contrast/saturation and
        // Gaussian softening, so the recipe reduces to the channel shift:
        // (255+19, 255+10, 255-33) clipped = (255, 255, 222).
        let white = Frame::new_filled(2, 2, [255, 255, 255]);
        let mut r = rng();
        let graded = portra_800(&white, 0, &mut r);

        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(graded.get_pixel(x, y), [255, 255, 222]);
            }
        }
    }

    #[test]
    fn test_modern_fuji_mid_gray_scenario() {
        // Gray 128: contrast is anchored at the frame's mean luma (128) and
        // leaves it untouched; brightness scales from black, 128*1.05 -> 134.
        // Shift gives (149, 139, 124), luma of the *enhanced* pixel is 134,
        // and the 95/5 blend pulls each channel 5% toward that luma:
        //   r = 149*0.95 + 134*0.05 = 148.25 -> 148
        //   g = 139*0.95 + 134*0.05 = 138.75 -> 138 (truncated clip)
        //   b = 124*0.95 + 134*0.05 = 124.5  -> 124
        let gray = Frame::new_filled(2, 2, [128, 128, 128]);
        let graded = modern_fuji(&gray);
        assert_eq!(graded.get_pixel(0, 0), [148, 138, 124]);
    }

    #[test]
    fn test_terracotta_blue_cast_detection() {
        let mut r = rng();

        // Strongly blue pixel: gets the sky treatment (B-70).
        let sky = Frame::new_filled(1, 1, [50, 50, 200]);
        let graded = terracotta_sun(&sky, 0, &mut r);
        let px = graded.get_pixel(0, 0);
        assert!(px[2] < 200, "blue channel should be pulled down hard");

        // Neutral pixel: warm push (R+40).
        let neutral = Frame::new_filled(1, 1, [128, 128, 128]);
        let graded = terracotta_sun(&neutral, 0, &mut r);
        let px = graded.get_pixel(0, 0);
        assert!(px[0] > 128, "red channel should be pushed up");
    }

    #[test]
    fn test_dreamy_negative_lifts_shadows() {
        let mut r = rng();
        let dark = Frame::new_filled(2, 2, [10, 10, 10]);
        let graded = dreamy_negative(&dark, 0, &mut r);

        // Deep shadows gain the luma lift on the green channel, which has no
        // white-balance shift of its own.
        assert!(graded.get_pixel(0, 0)[1] > 10);
    }

    #[test]
    fn test_dreamy_negative_compresses_highlights() {
        let mut r = rng();
        let bright = Frame::new_filled(2, 2, [250, 250, 250]);
        let graded = dreamy_negative(&bright, 0, &mut r);

        // Highlight compression must pull the unshifted green channel below
        // its input value.
        assert!(graded.get_pixel(0, 0)[1] < 250);
    }
}
