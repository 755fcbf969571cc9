//! CPU RGBA surface used for the working canvas, the base reference and undo snapshots

use crate::types::{PixelRect, Rgba, TRANSPARENT};
use crate::validation::{ValidationError, validate_buffer_len, validate_dimensions};

/// A float RGBA CPU surface
/// Stores pixels as [f32; 4] in row-major order, row 0 at v = 0
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    pixels: Vec<Rgba>,
}

impl CpuSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Create a surface filled with one color
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![color; pixel_count],
        }
    }

    /// Wrap an existing row-major pixel buffer
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, ValidationError> {
        validate_dimensions(width, height)?;
        validate_buffer_len(width, height, pixels.len())?;
        Ok(Self { width, height, pixels })
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn same_size(&self, other: &CpuSurface) -> bool {
        self.width == other.width && self.height == other.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Copy a rectangle out in row-major order.
    /// The rectangle is clipped to the surface first.
    pub fn read_region(&self, rect: PixelRect) -> Vec<Rgba> {
        let rect = rect.clamp_to(self.width, self.height);
        let mut data = Vec::with_capacity(rect.area());
        for row in rect.y..rect.y + rect.height {
            let start = self.index(rect.x, row);
            data.extend_from_slice(&self.pixels[start..start + rect.width as usize]);
        }
        data
    }

    /// Write a row-major rectangle back. Returns false (and writes nothing)
    /// when the rectangle leaves the surface or the buffer length is wrong.
    pub fn write_region(&mut self, rect: PixelRect, data: &[Rgba]) -> bool {
        if rect.clamp_to(self.width, self.height) != rect || data.len() != rect.area() {
            return false;
        }
        let row_len = rect.width as usize;
        for (row, src) in data.chunks_exact(row_len.max(1)).enumerate() {
            let start = self.index(rect.x, rect.y + row as u32);
            self.pixels[start..start + row_len].copy_from_slice(src);
        }
        true
    }

    /// Overwrite every pixel from a surface of the same size.
    /// Returns false on a size mismatch.
    pub fn copy_from(&mut self, other: &CpuSurface) -> bool {
        if !self.same_size(other) {
            return false;
        }
        self.pixels.copy_from_slice(&other.pixels);
        true
    }

    /// Get raw pixel data for GPU upload
    /// Returns the pixel data as a byte slice suitable for an Rgba32Float texture
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Count pixels that differ from `other` (None on a size mismatch)
    pub fn count_differences(&self, other: &CpuSurface) -> Option<usize> {
        if !self.same_size(other) {
            return None;
        }
        Some(
            self.pixels
                .iter()
                .zip(&other.pixels)
                .filter(|(a, b)| a != b)
                .count(),
        )
    }
}
