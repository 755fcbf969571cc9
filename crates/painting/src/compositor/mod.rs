//! Dab and fill compositing
//!
//! Every operation works the same way: read the affected rectangle from the
//! canvas store in one call, blend it in memory, write it back in one call.
//! Backends differ only in how they walk the rows of that rectangle; the
//! per-pixel math lives here and is shared, so all backends produce
//! identical canvases.

mod cpu;
mod parallel;

pub use cpu::CpuCompositor;
pub use parallel::ParallelCompositor;

use glam::Vec2;
use tracing::debug;
use uvpaint_config::CompositorBackend;

use crate::brush::BrushSettings;
use crate::canvas::CanvasStore;
use crate::fill::{FillParams, FillRegion};
use crate::kernel::BrushKernel;
use crate::masks::PixelGate;
use crate::surface::CpuSurface;
use crate::types::{BlendMode, PixelRect, Rgba};
use crate::validation::uv_to_pixel;

/// One brush stamp in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dab {
    pub x: i32,
    pub y: i32,
    pub opacity: f32,
    pub color: Rgba,
    pub mode: BlendMode,
}

impl Dab {
    /// Dab centered on the pixel nearest to `uv`
    pub fn at_uv(uv: Vec2, width: u32, height: u32, brush: &BrushSettings, mode: BlendMode) -> Self {
        let (x, y) = uv_to_pixel(uv, width, height);
        Self {
            x,
            y,
            opacity: brush.opacity,
            color: brush.color,
            mode,
        }
    }
}

/// The canvas being painted plus the reference that erase restores toward
pub struct PaintTarget<'a> {
    canvas: &'a mut dyn CanvasStore,
    base: Option<&'a CpuSurface>,
}

impl<'a> PaintTarget<'a> {
    /// A base whose size differs from the canvas is ignored; erase then
    /// fades alpha instead.
    pub fn new(canvas: &'a mut dyn CanvasStore, base: Option<&'a CpuSurface>) -> Self {
        let dims = canvas.dimensions();
        let base = base.filter(|b| b.dimensions() == dims);
        Self { canvas, base }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn has_base(&self) -> bool {
        self.base.is_some()
    }

    fn base_region(&self, rect: PixelRect) -> Option<Vec<Rgba>> {
        self.base.map(|b| b.read_region(rect))
    }
}

/// Exact at both ends: t = 1 yields `b` bit for bit
#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Blend one pixel with effective strength `amount` (clamped to 0..1)
#[inline]
pub fn blend_pixel(dst: Rgba, mode: BlendMode, color: Rgba, base: Option<Rgba>, amount: f32) -> Rgba {
    let t = amount.clamp(0.0, 1.0);
    match (mode, base) {
        (BlendMode::Paint, _) => [
            lerp(dst[0], color[0], t),
            lerp(dst[1], color[1], t),
            lerp(dst[2], color[2], t),
            lerp(dst[3], 1.0, t),
        ],
        (BlendMode::Erase, Some(base)) => [
            lerp(dst[0], base[0], t),
            lerp(dst[1], base[1], t),
            lerp(dst[2], base[2], t),
            lerp(dst[3], base[3], t),
        ],
        (BlendMode::Erase, None) => [dst[0], dst[1], dst[2], (dst[3] - t).max(0.0)],
    }
}

/// Blend one row of a dab rectangle. `y` is the canvas row, `x0` the
/// canvas column of `row[0]`. Returns the number of pixels blended.
pub(crate) fn blend_dab_row(
    row: &mut [Rgba],
    base_row: Option<&[Rgba]>,
    x0: u32,
    y: u32,
    dab: &Dab,
    kernel: &BrushKernel,
    gate: &PixelGate<'_>,
) -> usize {
    let dy = y as i32 - dab.y;
    let mut touched = 0;
    for (i, dst) in row.iter_mut().enumerate() {
        let x = x0 + i as u32;
        let w = kernel.weight(x as i32 - dab.x, dy);
        if w <= 0.0 || !gate.allows(x, y) {
            continue;
        }
        let base = base_row.map(|b| b[i]);
        *dst = blend_pixel(*dst, dab.mode, dab.color, base, dab.opacity * w);
        touched += 1;
    }
    touched
}

/// Blend the selected pixels of one fill row
pub(crate) fn blend_fill_row(
    row: &mut [Rgba],
    base_row: Option<&[Rgba]>,
    members: &[bool],
    x0: u32,
    y: u32,
    params: &FillParams,
    gate: &PixelGate<'_>,
) -> usize {
    let mode = params.mode.blend_mode();
    let mut touched = 0;
    for (i, dst) in row.iter_mut().enumerate() {
        let x = x0 + i as u32;
        if !members[i] || !gate.allows(x, y) {
            continue;
        }
        let base = base_row.map(|b| b[i]);
        *dst = blend_pixel(*dst, mode, params.color, base, params.opacity);
        touched += 1;
    }
    touched
}

/// Pixel compositing backend.
///
/// Implementors provide the in-memory blend loops; the bulk read/write
/// against the canvas store is shared.
pub trait Compositor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Blend a dab into `pixels`, the row-major contents of `rect`
    fn blend_dab(
        &self,
        pixels: &mut [Rgba],
        base: Option<&[Rgba]>,
        rect: PixelRect,
        dab: &Dab,
        kernel: &BrushKernel,
        gate: &PixelGate<'_>,
    ) -> usize;

    /// Blend a fill into `pixels`, the row-major contents of `region.rect`
    fn blend_fill(
        &self,
        pixels: &mut [Rgba],
        base: Option<&[Rgba]>,
        region: &FillRegion,
        params: &FillParams,
        gate: &PixelGate<'_>,
    ) -> usize;

    /// Stamp one dab. Returns the rectangle written, None if no pixel was
    /// blended.
    fn apply_dab(
        &self,
        target: &mut PaintTarget<'_>,
        dab: &Dab,
        kernel: &BrushKernel,
        gate: &PixelGate<'_>,
    ) -> Option<PixelRect> {
        let (width, height) = target.dimensions();
        let rect = PixelRect::around(dab.x, dab.y, kernel.radius(), width, height)?;

        let mut pixels = target.canvas.read_region(rect);
        let base = target.base_region(rect);
        let touched = self.blend_dab(&mut pixels, base.as_deref(), rect, dab, kernel, gate);
        if touched == 0 {
            return None;
        }

        debug!(
            "{}: dab at ({}, {}) r={} mode={:?} -> {} pixels in {:?}",
            self.name(),
            dab.x,
            dab.y,
            kernel.radius(),
            dab.mode,
            touched,
            rect
        );
        target.canvas.write_region(rect, &pixels).then_some(rect)
    }

    /// Blend every selected pixel of a fill region. Returns the pixel count.
    fn apply_fill(
        &self,
        target: &mut PaintTarget<'_>,
        region: &FillRegion,
        params: &FillParams,
        gate: &PixelGate<'_>,
    ) -> usize {
        let (width, height) = target.dimensions();
        if region.rect.clamp_to(width, height) != region.rect || region.rect.is_empty() {
            debug!("{}: fill region {:?} outside canvas", self.name(), region.rect);
            return 0;
        }

        let mut pixels = target.canvas.read_region(region.rect);
        let base = target.base_region(region.rect);
        let touched = self.blend_fill(&mut pixels, base.as_deref(), region, params, gate);
        if touched == 0 || !target.canvas.write_region(region.rect, &pixels) {
            return 0;
        }

        debug!(
            "{}: fill {:?} -> {} pixels in {:?}",
            self.name(),
            params.mode,
            touched,
            region.rect
        );
        touched
    }
}

/// Picks the parallel backend for large regions, the scalar one otherwise
#[derive(Debug, Clone, Copy)]
pub struct AutoCompositor {
    threshold: usize,
}

impl AutoCompositor {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl Compositor for AutoCompositor {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn blend_dab(
        &self,
        pixels: &mut [Rgba],
        base: Option<&[Rgba]>,
        rect: PixelRect,
        dab: &Dab,
        kernel: &BrushKernel,
        gate: &PixelGate<'_>,
    ) -> usize {
        if rect.area() >= self.threshold {
            ParallelCompositor.blend_dab(pixels, base, rect, dab, kernel, gate)
        } else {
            CpuCompositor.blend_dab(pixels, base, rect, dab, kernel, gate)
        }
    }

    fn blend_fill(
        &self,
        pixels: &mut [Rgba],
        base: Option<&[Rgba]>,
        region: &FillRegion,
        params: &FillParams,
        gate: &PixelGate<'_>,
    ) -> usize {
        if region.rect.area() >= self.threshold {
            ParallelCompositor.blend_fill(pixels, base, region, params, gate)
        } else {
            CpuCompositor.blend_fill(pixels, base, region, params, gate)
        }
    }
}

/// Build the compositor a session was configured with
pub fn create_compositor(backend: CompositorBackend, parallel_threshold: usize) -> Box<dyn Compositor> {
    match backend {
        CompositorBackend::Cpu => Box::new(CpuCompositor),
        CompositorBackend::Parallel => Box::new(ParallelCompositor),
        CompositorBackend::Auto => Box::new(AutoCompositor::new(parallel_threshold)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NO_ISLAND;
    use crate::coverage::CoverageMask;
    use crate::fill::flood_region;
    use crate::types::{FillMode, TRANSPARENT};

    const RED: Rgba = [1.0, 0.0, 0.0, 1.0];

    fn dab(x: i32, y: i32, mode: BlendMode) -> Dab {
        Dab {
            x,
            y,
            opacity: 1.0,
            color: RED,
            mode,
        }
    }

    #[test]
    fn test_blend_paint_forces_opaque() {
        let out = blend_pixel(TRANSPARENT, BlendMode::Paint, [0.2, 0.4, 0.6, 0.0], None, 1.0);
        assert_eq!(out, [0.2, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn test_blend_partial_paint() {
        let out = blend_pixel([0.0, 0.0, 0.0, 1.0], BlendMode::Paint, RED, None, 0.25);
        assert!((out[0] - 0.25).abs() < 1e-6);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_blend_erase_toward_base() {
        let base = [0.5, 0.5, 0.5, 1.0];
        let out = blend_pixel(RED, BlendMode::Erase, RED, Some(base), 1.0);
        assert_eq!(out, base);
    }

    #[test]
    fn test_blend_erase_without_base_fades_alpha() {
        let out = blend_pixel(RED, BlendMode::Erase, RED, None, 0.3);
        assert_eq!(&out[..3], &RED[..3]);
        assert!((out[3] - 0.7).abs() < 1e-6);
        let out = blend_pixel(out, BlendMode::Erase, RED, None, 5.0);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn test_dab_at_uv_rounds_to_nearest_pixel() {
        let brush = BrushSettings::default();
        let d = Dab::at_uv(Vec2::new(0.5, 0.25), 101, 101, &brush, BlendMode::Paint);
        assert_eq!((d.x, d.y), (50, 25));
    }

    #[test]
    fn test_gate_blocks_uncovered_pixel() {
        let mut canvas = CpuSurface::new(9, 9);
        let mut coverage = CoverageMask::from_bits(9, 9, vec![1; 81]).unwrap();
        coverage.set(5, 4, false);
        let gate = PixelGate::from_parts(Some(&coverage), None, true, NO_ISLAND);
        let kernel = BrushKernel::new(2, 1.0);

        let mut target = PaintTarget::new(&mut canvas, None);
        let rect = CpuCompositor.apply_dab(&mut target, &dab(4, 4, BlendMode::Paint), &kernel, &gate);

        assert_eq!(rect, Some(PixelRect::new(2, 2, 5, 5)));
        assert_eq!(canvas.get_pixel(4, 4), Some(RED));
        assert_eq!(canvas.get_pixel(5, 4), Some(TRANSPARENT));
        assert_eq!(canvas.get_pixel(3, 4), Some(RED));
    }

    #[test]
    fn test_dab_outside_canvas_writes_nothing() {
        let mut canvas = CpuSurface::new(16, 16);
        let kernel = BrushKernel::new(3, 1.0);
        let mut target = PaintTarget::new(&mut canvas, None);
        let rect = CpuCompositor.apply_dab(&mut target, &dab(-50, 8, BlendMode::Paint), &kernel, &PixelGate::open());
        assert_eq!(rect, None);
        assert!(canvas.pixels().iter().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_mismatched_base_is_ignored() {
        let mut canvas = CpuSurface::filled(8, 8, RED);
        let base = CpuSurface::new(4, 4);
        let target = PaintTarget::new(&mut canvas, Some(&base));
        assert!(!target.has_base());
    }

    #[test]
    fn test_backends_agree() {
        let mut coverage = CoverageMask::from_bits(96, 96, vec![1; 96 * 96]).unwrap();
        for x in 0..96 {
            coverage.set(x, 40, false);
        }
        let gate = PixelGate::from_parts(Some(&coverage), None, true, NO_ISLAND);
        let base = CpuSurface::filled(96, 96, [0.1, 0.2, 0.3, 1.0]);
        let kernel = BrushKernel::new(20, 0.4);
        let region = flood_region(&coverage, 10, 10).unwrap();
        let params = FillParams {
            color: [0.0, 1.0, 0.0, 1.0],
            opacity: 0.6,
            mode: FillMode::Fill,
        };

        let backends: [Box<dyn Compositor>; 3] = [
            Box::new(CpuCompositor),
            Box::new(ParallelCompositor),
            Box::new(AutoCompositor::new(64)),
        ];
        let results: Vec<CpuSurface> = backends
            .iter()
            .map(|compositor| {
                let mut canvas = base.clone();
                let mut target = PaintTarget::new(&mut canvas, Some(&base));
                compositor.apply_fill(&mut target, &region, &params, &gate);
                compositor.apply_dab(&mut target, &dab(30, 35, BlendMode::Paint), &kernel, &gate);
                compositor.apply_dab(&mut target, &dab(40, 30, BlendMode::Erase), &kernel, &gate);
                canvas
            })
            .collect();

        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], results[2]);
        assert_ne!(results[0], base);
    }

    #[test]
    fn test_create_compositor_names() {
        assert_eq!(create_compositor(CompositorBackend::Cpu, 0).name(), "cpu");
        assert_eq!(create_compositor(CompositorBackend::Parallel, 0).name(), "parallel");
        assert_eq!(create_compositor(CompositorBackend::Auto, 0).name(), "auto");
    }
}
