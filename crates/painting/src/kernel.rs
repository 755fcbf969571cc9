//! Precomputed brush weight tables

use tracing::debug;

use crate::constants::HARD_BRUSH_THRESHOLD;

/// Weight of a pixel at `distance` pixels from the dab center.
///
/// Hard brushes give a solid disc; softer brushes stay at 1.0 out to
/// `radius * hardness` and fall off linearly to 0.0 at `radius`.
pub fn falloff_weight(distance: f32, radius: f32, hardness: f32) -> f32 {
    if hardness >= HARD_BRUSH_THRESHOLD {
        return if distance <= radius + 0.0001 { 1.0 } else { 0.0 };
    }
    if distance > radius {
        return 0.0;
    }

    let inner = radius * hardness;
    let span = radius - inner;
    if span <= f32::EPSILON {
        return 1.0;
    }
    let t = ((distance - inner) / span).clamp(0.0, 1.0);
    1.0 - t
}

/// NaN collapses to 0.0
fn normalize_hardness(hardness: f32) -> f32 {
    if hardness.is_nan() { 0.0 } else { hardness.clamp(0.0, 1.0) }
}

/// Square weight table of side `2r + 1` centered on the dab
#[derive(Debug, Clone, PartialEq)]
pub struct BrushKernel {
    radius: u32,
    hardness: f32,
    weights: Vec<f32>,
}

impl BrushKernel {
    pub fn new(radius: u32, hardness: f32) -> Self {
        let hardness = normalize_hardness(hardness);
        let side = 2 * radius as usize + 1;
        let r = radius as i32;
        let mut weights = Vec::with_capacity(side * side);

        for dy in -r..=r {
            for dx in -r..=r {
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                weights.push(falloff_weight(distance, radius as f32, hardness));
            }
        }

        Self {
            radius,
            hardness,
            weights,
        }
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    #[inline]
    pub fn hardness(&self) -> f32 {
        self.hardness
    }

    #[inline]
    pub fn side(&self) -> usize {
        2 * self.radius as usize + 1
    }

    /// Weight at offset (dx, dy) from the center, 0.0 outside the table
    #[inline]
    pub fn weight(&self, dx: i32, dy: i32) -> f32 {
        let r = self.radius as i32;
        if dx.abs() > r || dy.abs() > r {
            return 0.0;
        }
        let side = self.side();
        self.weights[(dy + r) as usize * side + (dx + r) as usize]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// The kernel for the current brush; rebuilt only when radius or hardness
/// changes, so at most one table is held at a time
#[derive(Debug, Default)]
pub struct KernelCache {
    current: Option<((u32, u32), BrushKernel)>,
}

impl KernelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kernel for these parameters, replacing the cached one if they differ
    pub fn get(&mut self, radius: u32, hardness: f32) -> &BrushKernel {
        let hardness = normalize_hardness(hardness);
        let key = (radius, hardness.to_bits());
        if self.current.as_ref().is_some_and(|(cached, _)| *cached != key) {
            self.current = None;
        }
        let (_, kernel) = self.current.get_or_insert_with(|| {
            debug!("KernelCache: built kernel r={} hardness={:.3}", radius, hardness);
            (key, BrushKernel::new(radius, hardness))
        });
        kernel
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_kernel_is_a_disc() {
        let kernel = BrushKernel::new(10, 1.0);
        assert_eq!(kernel.weight(0, 0), 1.0);
        assert_eq!(kernel.weight(10, 0), 1.0);
        assert_eq!(kernel.weight(6, 8), 1.0);
        assert_eq!(kernel.weight(8, 8), 0.0);
        assert_eq!(kernel.weight(11, 0), 0.0);
    }

    #[test]
    fn test_soft_kernel_falls_off_linearly() {
        let kernel = BrushKernel::new(10, 0.0);
        assert_eq!(kernel.weight(0, 0), 1.0);
        assert!((kernel.weight(5, 0) - 0.5).abs() < 1e-6);
        assert_eq!(kernel.weight(10, 0), 0.0);
    }

    #[test]
    fn test_half_hard_kernel_has_flat_core() {
        let kernel = BrushKernel::new(10, 0.5);
        assert_eq!(kernel.weight(5, 0), 1.0);
        assert!((kernel.weight(8, 0) - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_weight_monotonic_in_distance() {
        for hardness in [0.0, 0.3, 0.7, 0.99, 1.0] {
            let mut previous = f32::INFINITY;
            for step in 0..=120 {
                let w = falloff_weight(step as f32 * 0.1, 10.0, hardness);
                assert!((0.0..=1.0).contains(&w));
                assert!(w <= previous, "hardness {} step {}", hardness, step);
                previous = w;
            }
        }
    }

    #[test]
    fn test_zero_radius_kernel() {
        let kernel = BrushKernel::new(0, 0.5);
        assert_eq!(kernel.side(), 1);
        assert_eq!(kernel.weight(0, 0), 1.0);
    }

    #[test]
    fn test_cache_reuses_kernel_until_params_change() {
        let mut cache = KernelCache::new();
        assert!(cache.is_empty());
        let first: *const BrushKernel = cache.get(8, 0.5);
        let second: *const BrushKernel = cache.get(8, 0.5);
        assert_eq!(first, second);

        let kernel = cache.get(9, 0.6);
        assert_eq!(kernel.radius(), 9);
        assert!((kernel.hardness() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_cache_holds_only_current_kernel() {
        let mut cache = KernelCache::new();
        for step in 0..=100 {
            let hardness = step as f32 / 100.0;
            assert_eq!(cache.get(64, hardness).hardness(), hardness);
        }
        let kernel = cache.get(64, 1.0);
        assert_eq!(kernel.weights().len(), 129 * 129);
        cache.clear();
        assert!(cache.is_empty());
    }
}
