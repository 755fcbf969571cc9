//! Surface operations for the paint session

use tracing::info;

use crate::canvas::TileCoord;
use crate::export::export_paint_layer;
use crate::messages::{Notice, NoticeKey};
use crate::surface::CpuSurface;
use crate::types::{PixelRect, Rgba, TRANSPARENT};

use super::UvPaintSession;

impl UvPaintSession {
    /// The working canvas, None after shutdown
    pub fn surface(&self) -> Option<&CpuSurface> {
        self.canvas.as_ref().map(|c| c.surface())
    }

    /// The base reference, if one was bound
    pub fn base(&self) -> Option<&CpuSurface> {
        self.base.as_ref()
    }

    /// Take dirty tiles for display upload
    ///
    /// Returns the tiles modified since the last call and clears the set.
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.canvas
            .as_mut()
            .map(|c| c.take_dirty_tiles())
            .unwrap_or_default()
    }

    /// Check if there are any dirty tiles
    pub fn has_dirty_tiles(&self) -> bool {
        self.canvas.as_ref().is_some_and(|c| c.has_dirty_tiles())
    }

    /// Pixel rectangle covered by a tile
    pub fn tile_bounds(&self, coord: TileCoord) -> Option<PixelRect> {
        self.canvas.as_ref().map(|c| c.tile_bounds(coord))
    }

    /// Bounding rectangle of the given tiles
    pub fn tiles_bounding_rect(&self, tiles: &[TileCoord]) -> Option<PixelRect> {
        self.canvas.as_ref()?.tiles_bounding_rect(tiles)
    }

    /// Pixel data for a rectangle, clamped to the canvas
    pub fn region_data(&self, rect: PixelRect) -> Vec<Rgba> {
        self.surface()
            .map(|s| s.read_region(rect))
            .unwrap_or_default()
    }

    /// Get raw canvas data as bytes (for full texture upload)
    pub fn as_bytes(&self) -> &[u8] {
        self.surface().map(CpuSurface::as_bytes).unwrap_or_default()
    }

    /// Get a single pixel's color
    ///
    /// Returns None if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.surface()?.get_pixel(x, y)
    }

    /// Discard this session's edits: restore the base (or a transparent
    /// canvas without one) as a single undoable operation.
    pub fn clear_edits(&mut self) -> bool {
        self.end_stroke();
        if !self.begin_stroke() {
            return false;
        }
        let restored = match (self.canvas.as_mut(), self.base.as_ref()) {
            (Some(canvas), Some(base)) => canvas.restore_from(base),
            (Some(canvas), None) => {
                canvas.clear(TRANSPARENT);
                true
            }
            (None, _) => false,
        };
        self.end_stroke();

        if restored {
            info!("clear_edits: session edits discarded");
            self.raise(Notice::new(NoticeKey::EditsCleared));
        }
        restored
    }

    /// Only what was painted this session, for saving as a separate layer
    pub fn export_paint_layer(&self) -> Option<CpuSurface> {
        Some(export_paint_layer(self.surface()?, self.base.as_ref()))
    }
}
