//! Island selection for fill and island erase
//!
//! A fill first resolves which pixels belong to the clicked island, either
//! straight from the labeled island map or, when islands were not
//! precomputed, by flood filling the coverage mask from the seed. The
//! compositor then blends the selected pixels.

use tracing::debug;

use crate::constants::NO_ISLAND;
use crate::coverage::CoverageMask;
use crate::islands::IslandMap;
use crate::types::{FillMode, PixelRect, Rgba};

/// Parameters for one island fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillParams {
    pub color: Rgba,
    pub opacity: f32,
    pub mode: FillMode,
}

/// Result of a fill request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Number of pixels blended
    Filled(usize),
    /// The seed is not on any island (uncovered or outside the canvas)
    NoIsland,
    /// No mask data to resolve an island from
    NoMaskData,
    /// Input was rejected before touching the canvas (no canvas, symmetry editing)
    Blocked,
}

impl FillOutcome {
    pub fn pixels(&self) -> usize {
        match self {
            FillOutcome::Filled(count) => *count,
            _ => 0,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, FillOutcome::Filled(_))
    }
}

/// Pixels selected for a fill: a bounding rectangle plus row-major membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillRegion {
    pub rect: PixelRect,
    members: Vec<bool>,
}

impl FillRegion {
    /// Whether the pixel at (x, y), in canvas coordinates, is selected
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        if x < self.rect.x || y < self.rect.y {
            return false;
        }
        let (lx, ly) = (x - self.rect.x, y - self.rect.y);
        if lx >= self.rect.width || ly >= self.rect.height {
            return false;
        }
        self.members[ly as usize * self.rect.width as usize + lx as usize]
    }

    /// Membership of one row of the rectangle, `row` relative to `rect.y`
    #[inline]
    pub fn row(&self, row: usize) -> &[bool] {
        let w = self.rect.width as usize;
        &self.members[row * w..(row + 1) * w]
    }

    pub fn len(&self) -> usize {
        self.members.iter().filter(|m| **m).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.members.iter().any(|m| *m)
    }

    /// Crop a full-canvas membership buffer to its bounding rectangle
    fn from_canvas_members(width: u32, height: u32, members: &[bool]) -> Option<Self> {
        let w = width as usize;
        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        for (i, _) in members.iter().enumerate().filter(|(_, m)| **m) {
            let (x, y) = (i % w, i / w);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if min_x == usize::MAX {
            return None;
        }

        let rect = PixelRect::new(
            min_x as u32,
            min_y as u32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        )
        .clamp_to(width, height);
        let mut cropped = Vec::with_capacity(rect.area());
        for y in min_y..=max_y {
            cropped.extend_from_slice(&members[y * w + min_x..=y * w + max_x]);
        }
        Some(Self {
            rect,
            members: cropped,
        })
    }
}

/// Every pixel carrying island `id`
pub fn island_region(islands: &IslandMap, id: i32) -> Option<FillRegion> {
    if id == NO_ISLAND {
        return None;
    }
    let members: Vec<bool> = islands.ids().iter().map(|v| *v == id).collect();
    let region = FillRegion::from_canvas_members(islands.width, islands.height, &members);
    if let Some(region) = &region {
        debug!("island_region: id {} spans {:?}", id, region.rect);
    }
    region
}

/// 4-connected flood fill over covered pixels from a seed.
///
/// Uses an explicit stack; returns None when the seed is uncovered.
pub fn flood_region(coverage: &CoverageMask, seed_x: u32, seed_y: u32) -> Option<FillRegion> {
    if !coverage.is_covered(seed_x, seed_y) {
        return None;
    }

    let (width, height) = (coverage.width, coverage.height);
    let w = width as usize;
    let mut members = vec![false; w * height as usize];
    let mut stack = vec![(seed_x, seed_y)];
    members[seed_y as usize * w + seed_x as usize] = true;

    while let Some((x, y)) = stack.pop() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            // wrapped coordinates fail the bounds check inside is_covered
            if !coverage.is_covered(nx, ny) {
                continue;
            }
            let index = ny as usize * w + nx as usize;
            if !members[index] {
                members[index] = true;
                stack.push((nx, ny));
            }
        }
    }

    let region = FillRegion::from_canvas_members(width, height, &members);
    if let Some(region) = &region {
        debug!(
            "flood_region: seed ({}, {}) -> {} pixels in {:?}",
            seed_x,
            seed_y,
            region.len(),
            region.rect
        );
    }
    region
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::rasterize_coverage;
    use crate::islands::label_islands;
    use crate::mesh::UvMesh;
    use glam::Vec2;

    fn two_squares() -> CoverageMask {
        let mut mesh = UvMesh::quad(Vec2::ZERO, Vec2::splat(0.4));
        mesh.push_quad(Vec2::splat(0.6), Vec2::ONE);
        rasterize_coverage(&mesh, 100, 100)
    }

    #[test]
    fn test_island_region_matches_island_area() {
        let islands = label_islands(&two_squares());
        let region = island_region(&islands, 1).unwrap();
        assert_eq!(region.len(), 1600);
        assert_eq!(region.rect, PixelRect::new(59, 59, 40, 40));
        assert!(region.contains(70, 70));
        assert!(!region.contains(10, 10));
        assert!(island_region(&islands, NO_ISLAND).is_none());
        assert!(island_region(&islands, 7).is_none());
    }

    #[test]
    fn test_flood_matches_labeled_island() {
        let coverage = two_squares();
        let islands = label_islands(&coverage);
        let flooded = flood_region(&coverage, 10, 10).unwrap();
        assert_eq!(Some(flooded), island_region(&islands, 0));
    }

    #[test]
    fn test_flood_from_uncovered_seed() {
        assert!(flood_region(&two_squares(), 50, 50).is_none());
        assert!(flood_region(&two_squares(), 500, 0).is_none());
    }

    #[test]
    fn test_flood_full_canvas() {
        let coverage = CoverageMask::from_bits(512, 512, vec![1; 512 * 512]).unwrap();
        let region = flood_region(&coverage, 0, 0).unwrap();
        assert_eq!(region.len(), 512 * 512);
        assert_eq!(region.row(3).len(), 512);
    }

    #[test]
    fn test_outcome_pixels() {
        assert_eq!(FillOutcome::Filled(12).pixels(), 12);
        assert_eq!(FillOutcome::NoIsland.pixels(), 0);
        assert!(!FillOutcome::Blocked.is_filled());
    }
}
