use glam::Vec2;
use thiserror::Error;

use crate::constants::MAX_CANVAS_SIZE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid canvas size {width}x{height} (each edge must be 1..={})", MAX_CANVAS_SIZE)]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("Base image is {base_width}x{base_height} but canvas is {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        base_width: u32,
        base_height: u32,
    },
}

/// Check that a canvas size is usable
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), ValidationError> {
    if width == 0 || height == 0 || width > MAX_CANVAS_SIZE || height > MAX_CANVAS_SIZE {
        return Err(ValidationError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Check that a flat pixel buffer matches a canvas size
pub fn validate_buffer_len(width: u32, height: u32, len: usize) -> Result<(), ValidationError> {
    let expected = width as usize * height as usize;
    if len != expected {
        return Err(ValidationError::BufferLength { expected, actual: len });
    }
    Ok(())
}

/// Whether a UV point is finite and inside [0,1] x [0,1]
#[inline]
pub fn uv_in_unit_square(uv: Vec2) -> bool {
    uv.is_finite() && (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
}

/// Convert UV to continuous pixel space, `(u * (W-1), v * (H-1))`
#[inline]
pub fn uv_to_pixel_space(uv: Vec2, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        uv.x * width.saturating_sub(1) as f32,
        uv.y * height.saturating_sub(1) as f32,
    )
}

/// Convert UV to the nearest pixel center (may lie outside the canvas)
#[inline]
pub fn uv_to_pixel(uv: Vec2, width: u32, height: u32) -> (i32, i32) {
    let p = uv_to_pixel_space(uv, width, height);
    (p.x.round() as i32, p.y.round() as i32)
}

/// Convert UV to a pixel clamped onto the canvas
#[inline]
pub fn uv_to_clamped_pixel(uv: Vec2, width: u32, height: u32) -> (u32, u32) {
    let (x, y) = uv_to_pixel(uv, width, height);
    (
        x.clamp(0, width.saturating_sub(1) as i32) as u32,
        y.clamp(0, height.saturating_sub(1) as i32) as u32,
    )
}
