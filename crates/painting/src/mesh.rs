//! UV mesh input supplied by the host editor

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec2;

/// UV layout of the bound mesh: one UV per vertex plus triangle index triples.
///
/// Indices are signed so that malformed host data (negative or out of range
/// indices) can be carried through and skipped during rasterization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UvMesh {
    pub uvs: Vec<Vec2>,
    pub triangles: Vec<[i32; 3]>,
}

impl UvMesh {
    pub fn new(uvs: Vec<Vec2>, triangles: Vec<[i32; 3]>) -> Self {
        Self { uvs, triangles }
    }

    /// Build from a flat index list (three per triangle, trailing indices ignored)
    pub fn from_flat_indices(uvs: Vec<Vec2>, indices: &[i32]) -> Self {
        let triangles = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        Self { uvs, triangles }
    }

    /// Axis-aligned UV rectangle as two triangles
    pub fn quad(min: Vec2, max: Vec2) -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(min, max);
        mesh
    }

    /// Append an axis-aligned UV rectangle as two triangles
    pub fn push_quad(&mut self, min: Vec2, max: Vec2) {
        let base = self.uvs.len() as i32;
        self.uvs.extend([
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
            Vec2::new(min.x, max.y),
        ]);
        self.triangles.push([base, base + 1, base + 2]);
        self.triangles.push([base, base + 2, base + 3]);
    }

    pub fn is_empty(&self) -> bool {
        self.uvs.is_empty() || self.triangles.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// UV corners of every triangle whose indices are all valid
    pub fn valid_triangles(&self) -> impl Iterator<Item = [Vec2; 3]> + '_ {
        self.triangles.iter().filter_map(|tri| {
            let a = self.uv(tri[0])?;
            let b = self.uv(tri[1])?;
            let c = self.uv(tri[2])?;
            Some([a, b, c])
        })
    }

    fn uv(&self, index: i32) -> Option<Vec2> {
        usize::try_from(index).ok().and_then(|i| self.uvs.get(i).copied())
    }

    /// Content hash used to key cached masks
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.uvs.len().hash(&mut hasher);
        for uv in &self.uvs {
            uv.x.to_bits().hash(&mut hasher);
            uv.y.to_bits().hash(&mut hasher);
        }
        self.triangles.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat_indices() {
        let mesh = UvMesh::from_flat_indices(vec![Vec2::ZERO; 4], &[0, 1, 2, 0, 2, 3, 9]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles[1], [0, 2, 3]);
    }

    #[test]
    fn test_malformed_triangles_skipped() {
        let uvs = vec![Vec2::ZERO, Vec2::X, Vec2::Y];
        let mesh = UvMesh::new(uvs, vec![[0, 1, 2], [0, 1, 3], [-1, 1, 2]]);
        assert_eq!(mesh.valid_triangles().count(), 1);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = UvMesh::quad(Vec2::ZERO, Vec2::splat(0.5));
        let b = UvMesh::quad(Vec2::ZERO, Vec2::splat(0.5));
        let c = UvMesh::quad(Vec2::ZERO, Vec2::splat(0.6));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
