use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

/// Represents a single video frame
///
/// This is a simple wrapper around an RGB image buffer that provides
/// convenient methods for pixel manipulation used by the effect stages.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        let buffer = ImageBuffer::new(width, height);
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get the frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let pixel = self.buffer.get_pixel(x, y);
        [pixel[0], pixel[1], pixel[2]]
    }

    /// Get a mutable reference to a pixel at the given coordinates
    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let pixel = self.buffer.get_pixel_mut(x, y);
        &mut pixel.0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Get a mutable reference to the underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    /// Get the raw interleaved RGB samples
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Get the raw interleaved RGB samples mutably
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        // into_raw/from_raw round-trips are avoided; ImageBuffer derefs to the sample slice
        &mut self.buffer
    }

    /// Convert the frame to raw RGB bytes
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.buffer.as_raw().clone()
    }

    /// Create a frame from raw RGB bytes
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Load a frame from an image file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.into_rgb8();
        Ok(Self { buffer: img })
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}
