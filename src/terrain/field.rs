//! Height field interface consumed by mesh synthesis

use glam::Vec3;

/// Procedural terrain surface.
///
/// Both queries must be pure and deterministic for a given seed; meshes are
/// synthesized on worker threads and neighbouring chunks sample the same
/// points independently.
pub trait HeightField: Send + Sync {
    /// Terrain height at world position (x, z)
    fn height_at(&self, x: f32, z: f32) -> f32;

    /// Surface color at (x, z). `slope` is the steepness `1 - normal.y`.
    fn color_at(&self, x: f32, z: f32, height: f32, slope: f32) -> Vec3;
}
