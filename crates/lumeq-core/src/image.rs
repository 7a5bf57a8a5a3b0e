//! Single-channel floating-point image used throughout the equalization pipeline.

use image::{ImageBuffer, Luma};

use crate::error::{EqualizeError, Result};
use crate::processor::ImageProcessor;

/// Intensity image stored as row-major `f32` values.
///
/// Pixel `(x, y)` lives at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel intensities in row-major order.
    pub pixels: Vec<f32>,
}

impl FloatImage {
    /// Zero-filled image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Image with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// Fails with [`EqualizeError::PixelCount`] when `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(EqualizeError::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Copy a `Luma<f32>` buffer from the `image` crate.
    pub fn from_luma32f(buffer: &ImageBuffer<Luma<f32>, Vec<f32>>) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            width,
            height,
            pixels: buffer.as_raw().clone(),
        }
    }

    /// Hand the pixels back as an `image` crate buffer.
    pub fn to_luma32f(&self) -> Result<ImageBuffer<Luma<f32>, Vec<f32>>> {
        ImageBuffer::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            EqualizeError::PixelCount {
                expected: self.width as usize * self.height as usize,
                actual: self.pixels.len(),
            },
        )
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel value at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.pixels[self.index(x, y)]
    }

    /// Overwrite the pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let i = self.index(x, y);
        self.pixels[i] = value;
    }

    /// Native-endian byte view of the pixel buffer, for storage or GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Run `processor` over this image in place and return `self` for chaining.
    pub fn process_inline<P: ImageProcessor + ?Sized>(
        &mut self,
        processor: &P,
    ) -> Result<&mut Self> {
        processor.process(self)?;
        Ok(self)
    }
}
