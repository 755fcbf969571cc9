//! Shared configuration for the UV painter
//!
//! This crate is the single source of truth for the defaults a painting
//! session starts from: brush parameters, undo history depth, masking
//! toggles, UI language and compositor backend selection.

use serde::{Deserialize, Serialize};

/// Default brush radius in texture pixels
pub const DEFAULT_BRUSH_RADIUS: u32 = 32;

/// Smallest brush radius the hotkeys can reach
pub const MIN_BRUSH_RADIUS: u32 = 1;

/// Largest brush radius the hotkeys can reach
pub const MAX_BRUSH_RADIUS: u32 = 256;

/// Default number of undo snapshots kept per session
pub const DEFAULT_UNDO_LIMIT: usize = 50;

/// Default brush color (opaque yellow)
pub const DEFAULT_BRUSH_COLOR: [f32; 4] = [1.0, 0.92, 0.016, 1.0];

/// Pixel count above which the `Auto` backend switches to the parallel compositor
pub const DEFAULT_PARALLEL_PIXEL_THRESHOLD: usize = 64 * 64;

/// UI language for user-visible notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    Chinese,
    Japanese,
    English,
}

impl Language {
    /// All supported languages, in menu order
    pub const ALL: [Language; 3] = [Language::Chinese, Language::Japanese, Language::English];
}

/// Which compositor implementation a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CompositorBackend {
    /// Scalar per-pixel loops (the reference path)
    Cpu,
    /// Row-parallel loops over the same per-pixel math
    Parallel,
    /// Parallel for large regions, scalar otherwise
    #[default]
    Auto,
}

/// Brush parameters a session starts with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushDefaults {
    /// Radius in texture pixels
    pub radius: u32,
    /// 0.0 = linear falloff from the center, 1.0 = hard disc
    pub hardness: f32,
    /// 0.0..1.0
    pub opacity: f32,
    /// RGBA; alpha is ignored when painting
    pub color: [f32; 4],
}

impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BRUSH_RADIUS,
            hardness: 1.0,
            opacity: 1.0,
            color: DEFAULT_BRUSH_COLOR,
        }
    }
}

/// Settings for one painting session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterSettings {
    pub brush: BrushDefaults,
    /// Maximum number of undo snapshots
    pub undo_limit: usize,
    /// Reject brush pixels outside the UV coverage mask
    pub boundary_limit: bool,
    /// Keep a stroke inside the island it started on
    pub island_isolation: bool,
    /// Label UV islands when masks are built. When off, island fills fall
    /// back to a flood fill over the coverage mask and isolation is inactive.
    pub precompute_islands: bool,
    pub language: Language,
    pub backend: CompositorBackend,
    /// Region size (in pixels) at which `Auto` goes parallel
    pub parallel_pixel_threshold: usize,
}

impl Default for PainterSettings {
    fn default() -> Self {
        Self {
            brush: BrushDefaults::default(),
            undo_limit: DEFAULT_UNDO_LIMIT,
            boundary_limit: true,
            island_isolation: true,
            precompute_islands: true,
            language: Language::default(),
            backend: CompositorBackend::default(),
            parallel_pixel_threshold: DEFAULT_PARALLEL_PIXEL_THRESHOLD,
        }
    }
}

impl PainterSettings {
    /// Return a copy with every field pulled into its valid range
    pub fn sanitized(&self) -> Self {
        let mut settings = self.clone();
        settings.brush.radius = settings.brush.radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS);
        settings.brush.hardness = clamp_unit(settings.brush.hardness);
        settings.brush.opacity = clamp_unit(settings.brush.opacity);
        for channel in &mut settings.brush.color {
            *channel = clamp_unit(*channel);
        }
        settings.undo_limit = settings.undo_limit.max(1);
        settings
    }
}

/// NaN collapses to 0.0
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
