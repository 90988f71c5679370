//! # Degradation Primitives
//!
//! Stateless pixel-array transforms shared by the grade recipes and the
//! pipeline: uniform grain noise, chromatic aberration, and gate-weave jitter.
//! Shifts are cyclic (wrap-around), matching the analog artifacts they emulate.

use rand::Rng;

use crate::video::Frame;

/// Add uniform random noise to every channel of every pixel
///
/// Each sample gets an independent draw from `[-amount, amount]`, then the
/// result is clipped to `[0, 255]`. `amount <= 0` is an explicit no-op.
pub fn add_noise<R: Rng>(frame: &Frame, amount: i16, rng: &mut R) -> Frame {
    if amount <= 0 {
        return frame.clone();
    }

    let mut out = frame.clone();
    for sample in out.as_raw_mut() {
        let noise = rng.gen_range(-amount..=amount);
        *sample = (*sample as i16 + noise).clamp(0, 255) as u8;
    }
    out
}

/// Simulate lens chromatic aberration by mis-registering the color channels
///
/// The red channel rolls left by `shift` columns and the blue channel rolls
/// right by `shift` columns, both with wrap-around; green is untouched.
/// `shift == 0` is an explicit no-op.
pub fn chromatic_aberration(frame: &Frame, shift: i32) -> Frame {
    if shift == 0 {
        return frame.clone();
    }

    let (width, height) = frame.dimensions();
    let mut out = frame.clone();

    for y in 0..height {
        for x in 0..width {
            let red_src = wrap(x as i32 + shift, width);
            let blue_src = wrap(x as i32 - shift, width);

            let pixel = out.get_pixel_mut(x, y);
            pixel[0] = frame.get_pixel(red_src, y)[0];
            pixel[2] = frame.get_pixel(blue_src, y)[2];
        }
    }

    out
}

/// Simulate film gate weave by rolling the whole frame a random amount
///
/// A fresh `(dx, dy)` is drawn uniformly from `[-max_shift, max_shift]` on
/// every call; the frame is cyclically shifted by that offset.
/// `max_shift == 0` is an explicit no-op.
pub fn jitter<R: Rng>(frame: &Frame, max_shift: i32, rng: &mut R) -> Frame {
    if max_shift == 0 {
        return frame.clone();
    }

    let dx = rng.gen_range(-max_shift..=max_shift);
    let dy = rng.gen_range(-max_shift..=max_shift);
    roll(frame, dx, dy)
}

/// Cyclically shift the frame by (dx, dy); positive dx moves content right,
/// positive dy moves content down
pub fn roll(frame: &Frame, dx: i32, dy: i32) -> Frame {
    if dx == 0 && dy == 0 {
        return frame.clone();
    }

    let (width, height) = frame.dimensions();
    let mut out = frame.clone();

    for y in 0..height {
        let src_y = wrap(y as i32 - dy, height);
        for x in 0..width {
            let src_x = wrap(x as i32 - dx, width);
            out.set_pixel(x, y, frame.get_pixel(src_x, src_y));
        }
    }

    out
}

fn wrap(value: i32, extent: u32) -> u32 {
    value.rem_euclid(extent as i32) as u32
}
