use serde::{Deserialize, Serialize};

/// Linear RGBA pixel, each channel in 0..1
pub type Rgba = [f32; 4];

/// Fully transparent black
pub const TRANSPARENT: Rgba = [0.0, 0.0, 0.0, 0.0];

/// Tool the pointer gestures drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaintMode {
    #[default]
    Brush,
    Erase,
    /// Single click fills the island under the pointer
    Fill,
    /// Single click restores the island under the pointer
    IslandErase,
}

impl PaintMode {
    /// Whether this mode acts on whole islands with one click
    pub fn is_island_mode(self) -> bool {
        matches!(self, PaintMode::Fill | PaintMode::IslandErase)
    }

    /// Blend applied by the brush modes
    pub fn blend_mode(self) -> BlendMode {
        match self {
            PaintMode::Brush | PaintMode::Fill => BlendMode::Paint,
            PaintMode::Erase | PaintMode::IslandErase => BlendMode::Erase,
        }
    }

    /// Fill applied by the island modes
    pub fn fill_mode(self) -> FillMode {
        match self.blend_mode() {
            BlendMode::Paint => FillMode::Fill,
            BlendMode::Erase => FillMode::Erase,
        }
    }
}

/// How a dab combines with the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BlendMode {
    /// Interpolate toward the opaque brush color
    #[default]
    Paint = 0,
    /// Interpolate toward the base reference, or fade alpha without one
    Erase = 1,
}

/// What an island fill does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FillMode {
    #[default]
    Fill,
    Erase,
}

impl FillMode {
    pub fn blend_mode(self) -> BlendMode {
        match self {
            FillMode::Fill => BlendMode::Paint,
            FillMode::Erase => BlendMode::Erase,
        }
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole `width` x `height` canvas
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// `[cx - r, cx + r] x [cy - r, cy + r]` clamped to the canvas.
    ///
    /// Returns None for an empty canvas.
    pub fn around(cx: i32, cy: i32, radius: u32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let r = radius as i64;
        let max_x = width as i64 - 1;
        let max_y = height as i64 - 1;
        let x0 = (cx as i64 - r).clamp(0, max_x);
        let x1 = (cx as i64 + r).clamp(0, max_x);
        let y0 = (cy as i64 - r).clamp(0, max_y);
        let y1 = (cy as i64 + r).clamp(0, max_y);
        Some(Self::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0 + 1) as u32,
            (y1 - y0 + 1) as u32,
        ))
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip against a `width` x `height` canvas
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let x_end = self.x.saturating_add(self.width).min(width);
        let y_end = self.y.saturating_add(self.height).min(height);
        Self::new(x, y, x_end - x, y_end - y)
    }
}
