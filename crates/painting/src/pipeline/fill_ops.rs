//! Island fill and island erase for the paint session

use glam::Vec2;
use tracing::{debug, warn};

use crate::canvas::CanvasStore;
use crate::compositor::PaintTarget;
use crate::constants::NO_ISLAND;
use crate::fill::{FillOutcome, FillParams, FillRegion, flood_region, island_region};
use crate::masks::{PixelGate, UvMasks};
use crate::messages::{Notice, NoticeKey};
use crate::types::FillMode;
use crate::validation::uv_to_pixel;

use super::UvPaintSession;

/// Island under `uv` as (island ID or `NO_ISLAND` when unlabeled, region)
fn resolve_island(masks: &UvMasks, uv: Vec2) -> Option<(i32, FillRegion)> {
    match &masks.islands {
        Some(islands) => {
            let id = masks.island_at_uv(uv);
            island_region(islands, id).map(|region| (id, region))
        }
        None => {
            let coverage = &masks.coverage;
            let (x, y) = uv_to_pixel(uv, coverage.width, coverage.height);
            if x < 0 || y < 0 {
                return None;
            }
            flood_region(coverage, x as u32, y as u32).map(|region| (NO_ISLAND, region))
        }
    }
}

impl UvPaintSession {
    /// Fill (or restore) the whole island under `uv`, plus the mirrored
    /// island when symmetry is locked.
    ///
    /// Outside a stroke this is one undoable operation; the snapshot is only
    /// taken once the seed resolves to an island.
    pub fn fill_at(&mut self, uv: Vec2, mode: FillMode) -> FillOutcome {
        if self.canvas.is_none() {
            self.raise(Notice::new(NoticeKey::NoCanvas));
            return FillOutcome::Blocked;
        }
        if self.symmetry.blocks_painting() {
            self.raise(Notice::new(NoticeKey::SymmetryEditingBlocksPaint));
            return FillOutcome::Blocked;
        }

        self.ensure_masks();
        let Some(masks) = self.masks() else {
            self.raise(Notice::new(NoticeKey::NoIslandData));
            return FillOutcome::NoMaskData;
        };

        let Some((primary_id, primary)) = uv.is_finite().then(|| resolve_island(masks, uv)).flatten() else {
            warn!("fill_at: {:?} is outside UV coverage", uv);
            self.raise(Notice::new(NoticeKey::FillOutsideUv));
            return FillOutcome::NoIsland;
        };

        // the mirrored fill is skipped when it lands on the same island
        let mirrored = self
            .mirror_of(uv)
            .and_then(|m| resolve_island(masks, m))
            .filter(|(id, region)| {
                if *id != NO_ISLAND {
                    *id != primary_id
                } else {
                    *region != primary
                }
            })
            .map(|(_, region)| region);

        let atomic = self.begin_stroke();
        let params = FillParams {
            color: self.brush.color,
            opacity: self.brush.opacity,
            mode,
        };
        let mut total = self.apply_fill_region(&primary, &params);
        if let Some(region) = &mirrored {
            total += self.apply_fill_region(region, &params);
        }
        if atomic {
            self.end_stroke();
        }

        debug!("fill_at: {:?} {:?} -> {} pixels", uv, mode, total);
        self.raise(Notice::with_count(NoticeKey::IslandFilled, total));
        FillOutcome::Filled(total)
    }

    fn apply_fill_region(&mut self, region: &FillRegion, params: &FillParams) -> usize {
        let Some(canvas) = self.canvas.as_mut() else {
            return 0;
        };
        let (width, height) = canvas.dimensions();
        let gate = PixelGate::new(
            self.masks.get_for(width, height),
            self.boundary_limit,
            NO_ISLAND,
        );
        let mut target = PaintTarget::new(canvas, self.base.as_ref());
        self.compositor.apply_fill(&mut target, region, params, &gate)
    }
}
