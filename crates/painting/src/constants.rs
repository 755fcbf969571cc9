/// Largest canvas edge accepted at the API boundary.
pub const MAX_CANVAS_SIZE: u32 = 8192;

/// Default tile size for dirty-region tracking.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Island ID stored for pixels outside every UV triangle.
pub const NO_ISLAND: i32 = -1;

/// Triangles whose doubled pixel-space area is below this are skipped.
pub const DEGENERATE_TRIANGLE_AREA: f32 = 1e-6;

/// Symmetry axes shorter than this (squared, UV units) mirror to the input point.
pub const DEGENERATE_AXIS_LENGTH_SQ: f32 = 1e-8;

/// Hardness at or above this produces a hard-edged disc.
pub const HARD_BRUSH_THRESHOLD: f32 = 0.999;

/// Drag resampling spacing is `radius * (SPACING_BASE - SPACING_HARDNESS_SCALE * hardness)`.
pub const SPACING_BASE: f32 = 0.7;

/// See [`SPACING_BASE`].
pub const SPACING_HARDNESS_SCALE: f32 = 0.4;

/// Lower bound for drag resampling spacing, in pixels.
pub const MIN_SAMPLE_SPACING: f32 = 1.0;

/// Channel delta at or below which a pixel counts as unpainted in layer export.
pub const LAYER_DIFF_THRESHOLD: f32 = 1.0 / 255.0;

/// Distance (UV units) within which a pointer grabs a symmetry axis handle.
pub const AXIS_PICK_RADIUS: f32 = 0.02;
