//! Brush parameters and drag resampling
//!
//! A drag between two pointer samples is turned into evenly spaced dab
//! centers. Spacing is measured in canvas pixels and shrinks as the brush
//! gets harder, so hard edges stay continuous while soft brushes need fewer
//! dabs.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uvpaint_config::{BrushDefaults, MAX_BRUSH_RADIUS, MIN_BRUSH_RADIUS};

use crate::constants::{MIN_SAMPLE_SPACING, SPACING_BASE, SPACING_HARDNESS_SCALE};
use crate::types::Rgba;
use crate::validation::uv_to_pixel_space;

/// Current brush configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Radius in texture pixels
    pub radius: u32,
    /// 0.0 = linear falloff from the center, 1.0 = hard disc
    pub hardness: f32,
    pub opacity: f32,
    /// Painted RGB; alpha is forced to 1.0 when compositing
    pub color: Rgba,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::from(BrushDefaults::default())
    }
}

impl From<BrushDefaults> for BrushSettings {
    fn from(defaults: BrushDefaults) -> Self {
        Self {
            radius: defaults.radius,
            hardness: defaults.hardness,
            opacity: defaults.opacity,
            color: defaults.color,
        }
        .clamped()
    }
}

impl BrushSettings {
    /// Pull every field into its valid range
    pub fn clamped(mut self) -> Self {
        self.radius = self.radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS);
        self.hardness = unit(self.hardness);
        self.opacity = unit(self.opacity);
        for channel in &mut self.color {
            *channel = unit(*channel);
        }
        self
    }

    /// Distance in pixels between resampled dabs along a drag
    pub fn sample_spacing(&self) -> f32 {
        let spacing = self.radius as f32 * (SPACING_BASE - SPACING_HARDNESS_SCALE * self.hardness);
        spacing.max(MIN_SAMPLE_SPACING)
    }

    /// Step the radius up by one pixel, returns the new radius
    pub fn grow(&mut self) -> u32 {
        self.radius = (self.radius + 1).min(MAX_BRUSH_RADIUS);
        self.radius
    }

    /// Step the radius down by one pixel, returns the new radius
    pub fn shrink(&mut self) -> u32 {
        self.radius = self.radius.saturating_sub(1).max(MIN_BRUSH_RADIUS);
        self.radius
    }

    /// UV dab centers for a drag from `from` to `to` on a `width` x `height` canvas.
    ///
    /// Always includes both endpoints; consecutive centers are at most one
    /// spacing apart in pixel space.
    pub fn resample(&self, from: Vec2, to: Vec2, width: u32, height: u32) -> Vec<Vec2> {
        let distance = uv_to_pixel_space(from, width, height)
            .distance(uv_to_pixel_space(to, width, height));
        let steps = if distance.is_finite() {
            ((distance / self.sample_spacing()).ceil() as usize).max(1)
        } else {
            1
        };
        (0..=steps)
            .map(|i| from.lerp(to, i as f32 / steps as f32))
            .collect()
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
