//! UV island labeling
//!
//! Assigns every covered pixel the ID of its 4-connected component. IDs are
//! handed out in raster-scan order of each component's first pixel, so the
//! same mask always produces the same labels.

use std::collections::VecDeque;

use tracing::debug;

use crate::constants::NO_ISLAND;
use crate::coverage::CoverageMask;

/// Per-pixel island IDs, `NO_ISLAND` for uncovered pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IslandMap {
    pub width: u32,
    pub height: u32,
    ids: Vec<i32>,
    count: usize,
}

impl IslandMap {
    /// Island ID at a pixel, `NO_ISLAND` if uncovered or out of bounds
    #[inline]
    pub fn id_at(&self, x: u32, y: u32) -> i32 {
        if x >= self.width || y >= self.height {
            return NO_ISLAND;
        }
        self.ids[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    /// Number of islands
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of pixels carrying `id`
    pub fn island_area(&self, id: i32) -> usize {
        if id < 0 {
            return 0;
        }
        self.ids.iter().filter(|v| **v == id).count()
    }

    #[inline]
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

/// Label the 4-connected components of a coverage mask.
///
/// Uses an explicit work queue; a single island can span the whole canvas.
pub fn label_islands(mask: &CoverageMask) -> IslandMap {
    let width = mask.width as usize;
    let height = mask.height as usize;
    let mut ids = vec![NO_ISLAND; width * height];
    let mut count = 0usize;
    let mut queue = VecDeque::new();

    for start in 0..ids.len() {
        if !mask.is_covered_index(start) || ids[start] != NO_ISLAND {
            continue;
        }

        let id = count as i32;
        count += 1;
        ids[start] = id;
        queue.push_back(start);

        while let Some(index) = queue.pop_front() {
            let x = index % width;
            let y = index / width;

            let mut visit = |neighbor: usize| {
                if mask.is_covered_index(neighbor) && ids[neighbor] == NO_ISLAND {
                    ids[neighbor] = id;
                    queue.push_back(neighbor);
                }
            };

            if x > 0 {
                visit(index - 1);
            }
            if x + 1 < width {
                visit(index + 1);
            }
            if y > 0 {
                visit(index - width);
            }
            if y + 1 < height {
                visit(index + width);
            }
        }
    }

    debug!("label_islands: {}x{} -> {} islands", width, height, count);

    IslandMap {
        width: mask.width,
        height: mask.height,
        ids,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::rasterize_coverage;
    use crate::mesh::UvMesh;
    use glam::Vec2;

    fn mask_from_rows(rows: &[&str]) -> CoverageMask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let bits = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| u8::from(b == b'#')))
            .collect();
        CoverageMask::from_bits(width, height, bits).unwrap()
    }

    /// Whether two pixels are joined by a 4-connected path of covered pixels
    fn connected(mask: &CoverageMask, from: (u32, u32), to: (u32, u32)) -> bool {
        let w = mask.width as usize;
        let mut seen = vec![false; w * mask.height as usize];
        let mut stack = vec![from];
        while let Some((x, y)) = stack.pop() {
            if !mask.is_covered(x, y) {
                continue;
            }
            let i = y as usize * w + x as usize;
            if seen[i] {
                continue;
            }
            seen[i] = true;
            if (x, y) == to {
                return true;
            }
            if x > 0 {
                stack.push((x - 1, y));
            }
            if y > 0 {
                stack.push((x, y - 1));
            }
            stack.push((x + 1, y));
            stack.push((x, y + 1));
        }
        false
    }

    #[test]
    fn test_two_square_islands() {
        let mut mesh = UvMesh::quad(Vec2::ZERO, Vec2::splat(0.4));
        mesh.push_quad(Vec2::splat(0.6), Vec2::ONE);
        let mask = rasterize_coverage(&mesh, 100, 100);
        let islands = label_islands(&mask);

        assert_eq!(islands.count(), 2);
        assert_eq!(islands.id_at(10, 10), 0);
        assert_eq!(islands.id_at(80, 80), 1);
        assert_eq!(islands.id_at(50, 50), NO_ISLAND);
        assert_eq!(islands.island_area(0), 1600);
        assert_eq!(islands.island_area(1), 1600);
    }

    #[test]
    fn test_partition_matches_connectivity() {
        let mask = mask_from_rows(&[
            "##..#",
            ".#..#",
            ".###.",
            ".....",
            "#.#.#",
        ]);
        let islands = label_islands(&mask);
        let covered: Vec<(u32, u32)> = (0..mask.height)
            .flat_map(|y| (0..mask.width).map(move |x| (x, y)))
            .filter(|&(x, y)| mask.is_covered(x, y))
            .collect();

        for &p in &covered {
            assert!(islands.id_at(p.0, p.1) >= 0);
            for &q in &covered {
                let same = islands.id_at(p.0, p.1) == islands.id_at(q.0, q.1);
                assert_eq!(same, connected(&mask, p, q), "{:?} vs {:?}", p, q);
            }
        }
        assert_eq!(islands.count(), 5);
    }

    #[test]
    fn test_labels_follow_raster_order() {
        let mask = mask_from_rows(&["..#", "#..", "..."]);
        let islands = label_islands(&mask);
        assert_eq!(islands.id_at(2, 0), 0);
        assert_eq!(islands.id_at(0, 1), 1);
        assert_eq!(label_islands(&mask), islands);
    }

    #[test]
    fn test_large_single_island_does_not_overflow() {
        let mask = CoverageMask::from_bits(1024, 1024, vec![1; 1024 * 1024]).unwrap();
        let islands = label_islands(&mask);
        assert_eq!(islands.count(), 1);
        assert_eq!(islands.island_area(0), 1024 * 1024);
    }

    #[test]
    fn test_empty_mask_has_no_islands() {
        let islands = label_islands(&CoverageMask::empty(16, 16));
        assert_eq!(islands.count(), 0);
        assert!(islands.ids().iter().all(|id| *id == NO_ISLAND));
    }
}
