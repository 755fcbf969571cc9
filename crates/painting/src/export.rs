//! Paint-layer extraction
//!
//! Produces an image holding only what was painted in this session, so the
//! host can save it as a separate overlay layer.

use tracing::debug;

use crate::constants::LAYER_DIFF_THRESHOLD;
use crate::surface::CpuSurface;
use crate::types::{Rgba, TRANSPARENT};

/// Extract the painted layer from the working canvas.
///
/// With a same-sized base, unchanged pixels become transparent and changed
/// ones keep their painted RGB with alpha equal to the largest RGB change.
/// Without one, nearly transparent pixels are dropped and the rest pass
/// through.
pub fn export_paint_layer(working: &CpuSurface, base: Option<&CpuSurface>) -> CpuSurface {
    let base = base.filter(|b| b.same_size(working));
    let pixels: Vec<Rgba> = match base {
        Some(base) => working
            .pixels()
            .iter()
            .zip(base.pixels())
            .map(|(w, b)| layer_pixel(*w, *b))
            .collect(),
        None => working
            .pixels()
            .iter()
            .map(|p| if p[3] <= LAYER_DIFF_THRESHOLD { TRANSPARENT } else { *p })
            .collect(),
    };

    let mut layer = CpuSurface::new(working.width, working.height);
    layer.pixels_mut().copy_from_slice(&pixels);
    debug!(
        "export_paint_layer: {}x{}, base={}, {} painted pixels",
        working.width,
        working.height,
        base.is_some(),
        layer.pixels().iter().filter(|p| p[3] > 0.0).count()
    );
    layer
}

fn layer_pixel(working: Rgba, base: Rgba) -> Rgba {
    // alpha changes alone do not count as paint
    let rgb_delta = (0..3)
        .map(|i| (working[i] - base[i]).abs())
        .fold(0.0f32, f32::max);
    if rgb_delta <= LAYER_DIFF_THRESHOLD {
        return TRANSPARENT;
    }
    [working[0], working[1], working[2], rgb_delta.clamp(0.0, 1.0)]
}
