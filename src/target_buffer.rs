use std::sync::atomic::{AtomicU32, Ordering};

use image::RgbaImage;

use crate::geometry::{Color, ScreenSize};

/// Destination of rendered pixels.
/// Pixels are addressed by a linear offset, `row * row_stride() + column`;
/// row 0 is the bottom of the image.
pub trait PixelSink: Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Distance between starts of two consecutive rows, in pixels.
    fn row_stride(&self) -> usize;

    /// Stores a pixel. Different threads may write different offsets concurrently.
    fn put_pixel(&self, offset: usize, color: Color);
}

/// RGBA8 pixel buffer that can be filled from many threads at once.
#[derive(Debug)]
pub struct TargetBuffer {
    size: ScreenSize,
    pixels: Vec<AtomicU32>,
}

impl TargetBuffer {
    pub fn new(size: ScreenSize) -> TargetBuffer {
        let count = size.x as usize * size.y as usize;
        TargetBuffer {
            size,
            pixels: (0..count).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn size(&self) -> ScreenSize {
        self.size
    }

    /// Reads a pixel, `y` counted from the bottom.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = y as usize * self.row_stride() + x as usize;
        self.pixels[offset].load(Ordering::Relaxed).to_le_bytes()
    }

    /// Resets all pixels to transparent black.
    pub fn clear(&self) {
        for pixel in &self.pixels {
            pixel.store(0, Ordering::Relaxed);
        }
    }

    /// Copies the buffer into an image with the usual top-down row order.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.size.x, self.size.y, |x, y| {
            image::Rgba(self.pixel(x, self.size.y - 1 - y))
        })
    }
}

impl PixelSink for TargetBuffer {
    fn width(&self) -> u32 {
        self.size.x
    }

    fn height(&self) -> u32 {
        self.size.y
    }

    fn row_stride(&self) -> usize {
        self.size.x as usize
    }

    fn put_pixel(&self, offset: usize, color: Color) {
        self.pixels[offset].store(u32::from_le_bytes(color_to_pixel(color)), Ordering::Relaxed);
    }
}

/// Maps a 0-1 colour to RGBA8, out of range channels are clamped.
pub fn color_to_pixel(color: Color) -> [u8; 4] {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        channel(color.r),
        channel(color.g),
        channel(color.b),
        channel(color.a),
    ]
}
