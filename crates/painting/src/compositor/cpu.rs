//! Scalar compositor, the reference backend

use super::{Compositor, Dab, blend_dab_row, blend_fill_row};
use crate::fill::{FillParams, FillRegion};
use crate::kernel::BrushKernel;
use crate::masks::PixelGate;
use crate::types::{PixelRect, Rgba};

/// Walks rows one after another on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuCompositor;

impl Compositor for CpuCompositor {
    fn name(&self) -> &'static str {
        "cpu"
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
        let stride = rect.width as usize;
        if stride == 0 {
            return 0;
        }
        pixels
            .chunks_mut(stride)
            .enumerate()
            .map(|(row, out)| {
                let base_row = base.map(|b| &b[row * stride..(row + 1) * stride]);
                blend_dab_row(out, base_row, rect.x, rect.y + row as u32, dab, kernel, gate)
            })
            .sum()
    }

    fn blend_fill(
        &self,
        pixels: &mut [Rgba],
        base: Option<&[Rgba]>,
        region: &FillRegion,
        params: &FillParams,
        gate: &PixelGate<'_>,
    ) -> usize {
        let rect = region.rect;
        let stride = rect.width as usize;
        if stride == 0 {
            return 0;
        }
        pixels
            .chunks_mut(stride)
            .enumerate()
            .map(|(row, out)| {
                let base_row = base.map(|b| &b[row * stride..(row + 1) * stride]);
                blend_fill_row(
                    out,
                    base_row,
                    region.row(row),
                    rect.x,
                    rect.y + row as u32,
                    params,
                    gate,
                )
            })
            .sum()
    }
}
