//! Canvas storage: bulk rectangular access plus dirty-tile tracking for display upload

mod dirty;

use std::collections::HashSet;

use tracing::warn;

use crate::constants::DEFAULT_TILE_SIZE;
use crate::surface::CpuSurface;
use crate::types::{PixelRect, Rgba};

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Pixel storage the compositor paints into.
///
/// Compositing fetches a whole sub-rectangle, edits it in memory and writes
/// it back with one call, so implementations backed by a host texture API
/// only pay one round trip per dab.
pub trait CanvasStore {
    /// (width, height) in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Row-major copy of `rect` (clipped to the canvas)
    fn read_region(&self, rect: PixelRect) -> Vec<Rgba>;

    /// Replace `rect` with row-major `pixels`; false if nothing was written
    fn write_region(&mut self, rect: PixelRect, pixels: &[Rgba]) -> bool;
}

impl CanvasStore for CpuSurface {
    fn dimensions(&self) -> (u32, u32) {
        CpuSurface::dimensions(self)
    }

    fn read_region(&self, rect: PixelRect) -> Vec<Rgba> {
        CpuSurface::read_region(self, rect)
    }

    fn write_region(&mut self, rect: PixelRect, pixels: &[Rgba]) -> bool {
        CpuSurface::write_region(self, rect, pixels)
    }
}

/// The working canvas: a surface whose writes are tracked per tile
pub struct TiledCanvas {
    pub(crate) surface: CpuSurface,
    pub(crate) tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl TiledCanvas {
    /// Wrap a surface with the given tile size
    pub fn new(surface: CpuSurface, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let tiles_x = surface.width.div_ceil(tile_size);
        let tiles_y = surface.height.div_ceil(tile_size);

        Self {
            surface,
            tile_size,
            tiles_x,
            tiles_y,
            dirty_tiles: HashSet::new(),
        }
    }

    /// Wrap a surface with the default tile size
    pub fn with_default_tile_size(surface: CpuSurface) -> Self {
        Self::new(surface, DEFAULT_TILE_SIZE)
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    #[inline]
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Replace every pixel from a same-sized surface and mark everything dirty.
    /// Returns false on a size mismatch.
    pub fn restore_from(&mut self, source: &CpuSurface) -> bool {
        if !self.surface.copy_from(source) {
            warn!(
                "restore_from: size mismatch ({}x{} vs {}x{})",
                source.width, source.height, self.surface.width, self.surface.height
            );
            return false;
        }
        self.mark_all_dirty();
        true
    }

    /// Clear to a solid color and mark everything dirty
    pub fn clear(&mut self, color: Rgba) {
        self.surface.clear(color);
        self.mark_all_dirty();
    }

    /// Get tile bounds (x, y, width, height) in pixel coordinates
    pub fn tile_bounds(&self, coord: TileCoord) -> PixelRect {
        PixelRect::new(
            coord.x * self.tile_size,
            coord.y * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
        .clamp_to(self.surface.width, self.surface.height)
    }

    /// Bounding rectangle of the given tiles, None if empty
    pub fn tiles_bounding_rect(&self, tiles: &[TileCoord]) -> Option<PixelRect> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;

        for tile in tiles {
            let bounds = self.tile_bounds(*tile);
            min_x = min_x.min(bounds.x);
            min_y = min_y.min(bounds.y);
            max_x = max_x.max(bounds.x + bounds.width);
            max_y = max_y.max(bounds.y + bounds.height);
        }

        if max_x > min_x && max_y > min_y {
            Some(PixelRect::new(min_x, min_y, max_x - min_x, max_y - min_y))
        } else {
            None
        }
    }
}

impl CanvasStore for TiledCanvas {
    fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    fn read_region(&self, rect: PixelRect) -> Vec<Rgba> {
        self.surface.read_region(rect)
    }

    fn write_region(&mut self, rect: PixelRect, pixels: &[Rgba]) -> bool {
        if !self.surface.write_region(rect, pixels) {
            warn!(
                "write_region rejected: rect {:?}, {} pixels, canvas {}x{}",
                rect,
                pixels.len(),
                self.surface.width,
                self.surface.height
            );
            return false;
        }
        self.mark_region_dirty(rect);
        true
    }
}
