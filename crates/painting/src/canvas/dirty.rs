//! Dirty tile tracking for incremental display upload

use tracing::debug;

use super::{TileCoord, TiledCanvas};
use crate::types::PixelRect;

impl TiledCanvas {
    /// Mark the tiles overlapping a rectangle as modified
    pub fn mark_region_dirty(&mut self, rect: PixelRect) {
        let rect = rect.clamp_to(self.surface.width, self.surface.height);
        if rect.is_empty() {
            return;
        }

        let tile_x_start = rect.x / self.tile_size;
        let tile_y_start = rect.y / self.tile_size;
        let tile_x_end = (rect.x + rect.width - 1) / self.tile_size;
        let tile_y_end = (rect.y + rect.height - 1) / self.tile_size;

        let tiles_before = self.dirty_tiles.len();
        for ty in tile_y_start..=tile_y_end {
            for tx in tile_x_start..=tile_x_end {
                self.dirty_tiles.insert(TileCoord { x: tx, y: ty });
            }
        }

        debug!(
            "mark_region_dirty: {:?} -> {} new tiles (total {})",
            rect,
            self.dirty_tiles.len() - tiles_before,
            self.dirty_tiles.len()
        );
    }

    /// Mark every tile as modified
    pub fn mark_all_dirty(&mut self) {
        let (width, height) = (self.surface.width, self.surface.height);
        self.mark_region_dirty(PixelRect::full(width, height));
    }

    /// Get all dirty tiles and clear the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.dirty_tiles.drain().collect()
    }

    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }
}
