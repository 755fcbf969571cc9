//! Cached coverage/island masks and the per-pixel gate built from them

use glam::Vec2;
use tracing::{debug, info};

use crate::constants::NO_ISLAND;
use crate::coverage::{CoverageMask, rasterize_coverage};
use crate::islands::{IslandMap, label_islands};
use crate::mesh::UvMesh;
use crate::validation::uv_to_pixel;

/// Coverage mask plus (optionally) island labels for one canvas size
#[derive(Debug, Clone)]
pub struct UvMasks {
    pub coverage: CoverageMask,
    pub islands: Option<IslandMap>,
}

impl UvMasks {
    pub fn build(mesh: &UvMesh, width: u32, height: u32, label: bool) -> Self {
        let coverage = rasterize_coverage(mesh, width, height);
        let islands = label.then(|| label_islands(&coverage));
        Self { coverage, islands }
    }

    #[inline]
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.coverage.matches(width, height)
    }

    /// Island ID under a UV point, `NO_ISLAND` when uncovered or unlabeled
    pub fn island_at_uv(&self, uv: Vec2) -> i32 {
        let Some(islands) = &self.islands else {
            return NO_ISLAND;
        };
        let (x, y) = uv_to_pixel(uv, islands.width, islands.height);
        if x < 0 || y < 0 {
            return NO_ISLAND;
        }
        islands.id_at(x as u32, y as u32)
    }

    /// Whether the pixel under a UV point is covered
    pub fn covered_at_uv(&self, uv: Vec2) -> bool {
        let (x, y) = uv_to_pixel(uv, self.coverage.width, self.coverage.height);
        x >= 0 && y >= 0 && self.coverage.is_covered(x as u32, y as u32)
    }

    pub fn island_count(&self) -> usize {
        self.islands.as_ref().map_or(0, IslandMap::count)
    }
}

/// Inputs the masks were built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MaskKey {
    mesh: u64,
    width: u32,
    height: u32,
    labeled: bool,
}

/// Lazily rebuilt masks for the bound mesh
#[derive(Debug)]
pub struct MaskCache {
    key: Option<MaskKey>,
    masks: Option<UvMasks>,
    dirty: bool,
}

impl MaskCache {
    pub fn new() -> Self {
        Self {
            key: None,
            masks: None,
            dirty: true,
        }
    }

    /// Force a rebuild on the next `rebuild_if_dirty`
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Drop the masks entirely (no mesh bound)
    pub fn clear(&mut self) {
        self.key = None;
        self.masks = None;
        self.dirty = true;
    }

    /// Rebuild when invalidated or when the mesh content, canvas size or
    /// labeling choice differ from what the cached masks were built for.
    /// Returns true if a rebuild happened.
    pub fn rebuild_if_dirty(&mut self, mesh: &UvMesh, width: u32, height: u32, label: bool) -> bool {
        let key = MaskKey {
            mesh: mesh.fingerprint(),
            width,
            height,
            labeled: label,
        };
        if !self.dirty && self.key == Some(key) && self.masks.is_some() {
            debug!("mask cache hit for {}x{}", width, height);
            return false;
        }

        let masks = UvMasks::build(mesh, width, height, label);
        info!(
            "Rebuilt UV masks: {}x{}, {} covered pixels, {} islands",
            width,
            height,
            masks.coverage.covered_count(),
            masks.island_count()
        );
        self.masks = Some(masks);
        self.key = Some(key);
        self.dirty = false;
        true
    }

    /// Masks only if they were built for this canvas size
    pub fn get_for(&self, width: u32, height: u32) -> Option<&UvMasks> {
        self.masks.as_ref().filter(|m| m.matches(width, height))
    }

    pub fn masks(&self) -> Option<&UvMasks> {
        self.masks.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Per-pixel acceptance test combining the boundary limit and the island lock.
///
/// Each constraint is skipped when its mask is missing so painting keeps
/// working before masks exist.
#[derive(Debug, Clone, Copy)]
pub struct PixelGate<'a> {
    coverage: Option<&'a CoverageMask>,
    islands: Option<&'a IslandMap>,
    boundary_limit: bool,
    isolation_lock: i32,
}

impl<'a> PixelGate<'a> {
    /// Gate that accepts every pixel
    pub fn open() -> Self {
        Self {
            coverage: None,
            islands: None,
            boundary_limit: false,
            isolation_lock: NO_ISLAND,
        }
    }

    pub fn new(masks: Option<&'a UvMasks>, boundary_limit: bool, isolation_lock: i32) -> Self {
        Self {
            coverage: masks.map(|m| &m.coverage),
            islands: masks.and_then(|m| m.islands.as_ref()),
            boundary_limit,
            isolation_lock,
        }
    }

    /// Gate built from raw masks, for hosts that manage their own
    pub fn from_parts(
        coverage: Option<&'a CoverageMask>,
        islands: Option<&'a IslandMap>,
        boundary_limit: bool,
        isolation_lock: i32,
    ) -> Self {
        Self {
            coverage,
            islands,
            boundary_limit,
            isolation_lock,
        }
    }

    #[inline]
    pub fn allows(&self, x: u32, y: u32) -> bool {
        if self.boundary_limit {
            if let Some(coverage) = self.coverage {
                if !coverage.is_covered(x, y) {
                    return false;
                }
            }
        }
        if self.isolation_lock != NO_ISLAND {
            if let Some(islands) = self.islands {
                if islands.id_at(x, y) != self.isolation_lock {
                    return false;
                }
            }
        }
        true
    }

    pub fn isolation_lock(&self) -> i32 {
        self.isolation_lock
    }

    /// Same masks with a different island lock
    pub fn with_lock(&self, isolation_lock: i32) -> Self {
        Self {
            isolation_lock,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_half() -> UvMesh {
        UvMesh::quad(Vec2::ZERO, Vec2::new(0.45, 1.0))
    }

    #[test]
    fn test_cache_rebuilds_only_when_needed() {
        let mut cache = MaskCache::new();
        let mesh = left_half();

        assert!(cache.rebuild_if_dirty(&mesh, 64, 64, true));
        assert!(!cache.rebuild_if_dirty(&mesh, 64, 64, true));
        assert!(cache.rebuild_if_dirty(&mesh, 32, 32, true));
        assert!(cache.rebuild_if_dirty(&UvMesh::quad(Vec2::ZERO, Vec2::ONE), 32, 32, true));

        cache.invalidate();
        assert!(cache.is_dirty());
        assert!(cache.rebuild_if_dirty(&mesh, 32, 32, true));
    }

    #[test]
    fn test_get_for_rejects_stale_size() {
        let mut cache = MaskCache::new();
        cache.rebuild_if_dirty(&left_half(), 64, 64, true);
        assert!(cache.get_for(64, 64).is_some());
        assert!(cache.get_for(128, 64).is_none());
    }

    #[test]
    fn test_island_lookup_by_uv() {
        let masks = UvMasks::build(&left_half(), 64, 64, true);
        assert_eq!(masks.island_at_uv(Vec2::new(0.2, 0.5)), 0);
        assert_eq!(masks.island_at_uv(Vec2::new(0.8, 0.5)), NO_ISLAND);
        assert!(masks.covered_at_uv(Vec2::new(0.2, 0.5)));

        let unlabeled = UvMasks::build(&left_half(), 64, 64, false);
        assert_eq!(unlabeled.island_at_uv(Vec2::new(0.2, 0.5)), NO_ISLAND);
        assert!(unlabeled.covered_at_uv(Vec2::new(0.2, 0.5)));
    }

    #[test]
    fn test_gate_boundary_and_isolation() {
        let mut mesh = UvMesh::quad(Vec2::ZERO, Vec2::new(0.3, 1.0));
        mesh.push_quad(Vec2::new(0.6, 0.0), Vec2::ONE);
        let masks = UvMasks::build(&mesh, 100, 100, true);

        let boundary = PixelGate::new(Some(&masks), true, NO_ISLAND);
        assert!(boundary.allows(10, 10));
        assert!(!boundary.allows(45, 10));
        assert!(boundary.allows(80, 10));

        let isolated = PixelGate::new(Some(&masks), false, 0);
        assert!(isolated.allows(10, 10));
        assert!(!isolated.allows(45, 10));
        assert!(!isolated.allows(80, 10));
        assert!(isolated.with_lock(1).allows(80, 10));
    }

    #[test]
    fn test_gate_degrades_without_masks() {
        let gate = PixelGate::new(None, true, 3);
        assert!(gate.allows(0, 0));
        assert!(PixelGate::open().allows(5, 5));
    }
}
