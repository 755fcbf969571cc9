//! UV coverage rasterization
//!
//! Converts the bound mesh's UV triangles into a binary per-pixel mask of
//! the canvas: a pixel is covered when its center lies inside (or on the
//! edge of) at least one UV triangle. The mask is not anti-aliased.

use glam::Vec2;
use tracing::debug;

use crate::constants::DEGENERATE_TRIANGLE_AREA;
use crate::mesh::UvMesh;
use crate::validation::{ValidationError, uv_to_pixel_space, validate_buffer_len};

/// Binary coverage of a W x H canvas, one byte per pixel (0 or 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMask {
    pub width: u32,
    pub height: u32,
    bits: Vec<u8>,
}

impl CoverageMask {
    /// An all-uncovered mask
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing mask bytes (any non-zero byte counts as covered)
    pub fn from_bits(width: u32, height: u32, bits: Vec<u8>) -> Result<Self, ValidationError> {
        validate_buffer_len(width, height, bits.len())?;
        let bits = bits.into_iter().map(|b| u8::from(b != 0)).collect();
        Ok(Self { width, height, bits })
    }

    #[inline]
    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)] != 0
    }

    #[inline]
    pub fn is_covered_index(&self, index: usize) -> bool {
        self.bits.get(index).is_some_and(|b| *b != 0)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn set(&mut self, x: u32, y: u32, covered: bool) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.bits[index] = u8::from(covered);
        }
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn covered_count(&self) -> usize {
        self.bits.iter().filter(|b| **b != 0).count()
    }

    /// Whether this mask was built for a canvas of this size
    #[inline]
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

/// Rasterize every valid triangle of `mesh` into a `width` x `height` mask.
///
/// Empty UV or triangle data yields an empty mask. Triangles with invalid
/// indices or (near) zero area are skipped.
pub fn rasterize_coverage(mesh: &UvMesh, width: u32, height: u32) -> CoverageMask {
    let mut mask = CoverageMask::empty(width, height);
    if width == 0 || height == 0 || mesh.is_empty() {
        return mask;
    }

    let mut rasterized = 0usize;
    for [a, b, c] in mesh.valid_triangles() {
        if rasterize_triangle(&mut mask, a, b, c) {
            rasterized += 1;
        }
    }

    debug!(
        "rasterize_coverage: {}x{}, {}/{} triangles rasterized, {} pixels covered",
        width,
        height,
        rasterized,
        mesh.triangle_count(),
        mask.covered_count()
    );
    mask
}

/// Twice the signed area of (p1, p2, p3)
#[inline]
fn signed_area(p1: Vec2, p2: Vec2, p3: Vec2) -> f32 {
    p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y)
}

/// Mark the pixels whose centers fall inside one UV triangle.
/// Returns false for degenerate or non-finite triangles.
fn rasterize_triangle(mask: &mut CoverageMask, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let (width, height) = (mask.width, mask.height);
    let a = uv_to_pixel_space(a, width, height);
    let b = uv_to_pixel_space(b, width, height);
    let c = uv_to_pixel_space(c, width, height);
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return false;
    }

    let area = signed_area(a, b, c);
    if area.abs() < DEGENERATE_TRIANGLE_AREA {
        return false;
    }

    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let min = a.min(b).min(c);
    let max = a.max(b).max(c);
    let x0 = (min.x.floor() as i64).clamp(0, max_x) as u32;
    let x1 = (max.x.ceil() as i64).clamp(0, max_x) as u32;
    let y0 = (min.y.floor() as i64).clamp(0, max_y) as u32;
    let y1 = (max.y.ceil() as i64).clamp(0, max_y) as u32;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let a1 = signed_area(p, b, c);
            let a2 = signed_area(a, p, c);
            let a3 = signed_area(a, b, p);
            let has_neg = a1 < 0.0 || a2 < 0.0 || a3 < 0.0;
            let has_pos = a1 > 0.0 || a2 > 0.0 || a3 > 0.0;
            if has_neg && has_pos {
                continue;
            }
            mask.set(x, y, true);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_squares() -> UvMesh {
        let mut mesh = UvMesh::quad(Vec2::ZERO, Vec2::splat(0.4));
        mesh.push_quad(Vec2::splat(0.6), Vec2::ONE);
        mesh
    }

    #[test]
    fn test_empty_mesh_gives_empty_mask() {
        let mask = rasterize_coverage(&UvMesh::default(), 32, 32);
        assert_eq!(mask.covered_count(), 0);
        assert!(mask.matches(32, 32));
    }

    #[test]
    fn test_coverage_is_deterministic() {
        let mesh = two_squares();
        let first = rasterize_coverage(&mesh, 100, 100);
        let second = rasterize_coverage(&mesh, 100, 100);
        assert_eq!(first, second);
    }

    #[test]
    fn test_square_coverage_area() {
        // u * 99 spans 0..39.6 and 59.4..99, i.e. pixel columns 0..=39 and 59..=98
        let mask = rasterize_coverage(&two_squares(), 100, 100);
        assert_eq!(mask.covered_count(), 2 * 40 * 40);
        assert!(mask.is_covered(0, 0));
        assert!(mask.is_covered(39, 39));
        assert!(!mask.is_covered(40, 40));
        assert!(!mask.is_covered(50, 50));
        assert!(mask.is_covered(59, 59));
        assert!(mask.is_covered(98, 98));
        assert!(!mask.is_covered(99, 99));
    }

    #[test]
    fn test_winding_does_not_matter() {
        let uvs = vec![Vec2::new(0.1, 0.1), Vec2::new(0.9, 0.1), Vec2::new(0.5, 0.9)];
        let ccw = UvMesh::new(uvs.clone(), vec![[0, 1, 2]]);
        let cw = UvMesh::new(uvs, vec![[0, 2, 1]]);
        assert_eq!(rasterize_coverage(&ccw, 64, 64), rasterize_coverage(&cw, 64, 64));
    }

    #[test]
    fn test_degenerate_and_malformed_triangles_skipped() {
        let uvs = vec![Vec2::new(0.1, 0.1), Vec2::new(0.5, 0.5), Vec2::new(0.9, 0.9)];
        let mesh = UvMesh::new(uvs, vec![[0, 1, 2], [0, 1, 7], [-2, 0, 1]]);
        assert_eq!(rasterize_coverage(&mesh, 64, 64).covered_count(), 0);
    }

    #[test]
    fn test_from_bits_normalizes() {
        let mask = CoverageMask::from_bits(2, 2, vec![0, 5, 1, 0]).unwrap();
        assert_eq!(mask.bits(), &[0, 1, 1, 0]);
        assert!(CoverageMask::from_bits(2, 2, vec![0; 3]).is_err());
    }
}
