//! Streaming configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::coords::CoordinateSpace;
use super::lod::{
    DEFAULT_LOD0_TRIANGLE_SIZE, DEFAULT_LOD_COUNT, DEFAULT_LOD_GAP_DIVISOR, DEFAULT_MESH_SIZE,
    DEFAULT_RENDER_RADIUS, DistanceMetric, LodPolicy, MAX_LOD_COUNT, min_gap_radius,
};
use crate::core::{Error, Result};
use crate::terrain::TerrainParams;

/// Configuration for a terrain streamer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Number of LOD tiers (LOD 0 is the finest)
    pub lod_count: usize,
    /// Triangle cells along one chunk edge; must be even
    pub mesh_size: u32,
    /// Triangle cell width at LOD 0 (world units)
    pub lod0_triangle_size: f32,
    /// Render radius per LOD in chunks; the last entry repeats for the
    /// remaining LODs
    pub render_radii: Vec<u32>,
    /// LOD gap radius = render radius / divisor
    pub lod_gap_divisor: u32,
    /// How the render-distance test measures distance
    pub distance_metric: DistanceMetric,
    /// Flag seam transitions on chunks bordering a coarser tier
    pub stitch_lod_seams: bool,
    /// Background mesh workers; 0 synthesizes inline during `tick()`
    pub mesh_workers: usize,
    /// Terrain generation parameters (seed included)
    pub terrain: TerrainParams,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            lod_count: DEFAULT_LOD_COUNT,
            mesh_size: DEFAULT_MESH_SIZE,
            lod0_triangle_size: DEFAULT_LOD0_TRIANGLE_SIZE,
            render_radii: vec![DEFAULT_RENDER_RADIUS],
            lod_gap_divisor: DEFAULT_LOD_GAP_DIVISOR,
            distance_metric: DistanceMetric::Raw,
            stitch_lod_seams: false,
            mesh_workers: 0,
            terrain: TerrainParams::default(),
        }
    }
}

impl StreamingConfig {
    /// Replace the terrain seed
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.terrain.seed = seed;
        self
    }

    /// Check every setting. Called by the streamer constructor.
    pub fn validate(&self) -> Result<()> {
        if self.lod_count == 0 {
            return Err(Error::Config("at least one LOD is required".into()));
        }
        if self.lod_count > MAX_LOD_COUNT {
            return Err(Error::Config(format!(
                "lod_count {} exceeds the maximum of {}",
                self.lod_count, MAX_LOD_COUNT
            )));
        }
        if self.mesh_size == 0 || self.mesh_size % 2 != 0 {
            return Err(Error::InvalidMeshSize { size: self.mesh_size });
        }
        if !(self.lod0_triangle_size.is_finite() && self.lod0_triangle_size > 0.0) {
            return Err(Error::Config(format!(
                "lod0_triangle_size must be positive, got {}",
                self.lod0_triangle_size
            )));
        }
        if self.render_radii.is_empty() {
            return Err(Error::Config("render_radii must not be empty".into()));
        }
        if self.render_radii.len() > self.lod_count {
            return Err(Error::Config(format!(
                "{} render radii given for {} LODs",
                self.render_radii.len(),
                self.lod_count
            )));
        }
        if let Some(lod) = self.render_radii.iter().position(|&r| r == 0) {
            return Err(Error::Config(format!("render radius for LOD {} must be at least 1", lod)));
        }
        if self.lod_gap_divisor == 0 {
            return Err(Error::Config("lod_gap_divisor must be at least 1".into()));
        }
        for lod in 0..self.lod_count - 1 {
            let gap = self.render_radius(lod + 1) / self.lod_gap_divisor;
            let needed = min_gap_radius(self.render_radius(lod));
            if gap < needed {
                return Err(Error::Config(format!(
                    "LOD {} gap radius {} is below {}, so it overlaps LOD {} chunks in range {}",
                    lod + 1,
                    gap,
                    needed,
                    lod,
                    self.render_radius(lod)
                )));
            }
        }

        let coarsest = self.coordinate_space().chunk_world_size(self.lod_count - 1);
        if !coarsest.is_finite() {
            return Err(Error::Config(format!(
                "chunk size at LOD {} overflows",
                self.lod_count - 1
            )));
        }

        self.terrain.validate()
    }

    /// Render radius for `lod`
    pub fn render_radius(&self, lod: usize) -> u32 {
        self.render_radii
            .get(lod)
            .or(self.render_radii.last())
            .copied()
            .unwrap_or(DEFAULT_RENDER_RADIUS)
    }

    /// Distance policy for every tier, finest first
    pub fn lod_policies(&self) -> Vec<LodPolicy> {
        (0..self.lod_count)
            .map(|lod| {
                LodPolicy::new(
                    lod,
                    self.lod_count,
                    self.render_radius(lod),
                    self.lod_gap_divisor,
                    self.distance_metric,
                )
            })
            .collect()
    }

    /// Grid geometry described by this configuration
    pub fn coordinate_space(&self) -> CoordinateSpace {
        CoordinateSpace::new(self.lod_count, self.mesh_size, self.lod0_triangle_size)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON file and validate it. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = StreamingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lod_count, 13);
        assert_eq!(config.mesh_size, 32);
        assert_eq!(config.render_radius(0), 7);
    }

    #[test]
    fn test_rejects_bad_mesh_size() {
        let config = StreamingConfig { mesh_size: 31, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidMeshSize { size: 31 })));

        let config = StreamingConfig { mesh_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidMeshSize { size: 0 })));
    }

    #[test]
    fn test_rejects_bad_lod_lists() {
        let config = StreamingConfig { lod_count: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = StreamingConfig { lod_count: MAX_LOD_COUNT + 1, ..Default::default() };
        assert!(config.validate().is_err());

        let config = StreamingConfig { render_radii: vec![], ..Default::default() };
        assert!(config.validate().is_err());

        let config = StreamingConfig { lod_count: 2, render_radii: vec![4, 4, 4], ..Default::default() };
        assert!(config.validate().is_err());

        let config = StreamingConfig { render_radii: vec![4, 0], ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_scalars() {
        let config = StreamingConfig { lod0_triangle_size: 0.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = StreamingConfig { lod0_triangle_size: f32::INFINITY, ..Default::default() };
        assert!(config.validate().is_err());

        let config = StreamingConfig { lod_gap_divisor: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let mut config = StreamingConfig::default();
        config.terrain.octaves = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_gap_narrower_than_finer_range() {
        // Coarse gap 0 cannot hide parents of LOD 0 chunks in range 4
        let config = StreamingConfig { lod_count: 2, render_radii: vec![4, 1], ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        // 7 / 3 = 2 leaves the parent ring at distance 3 exposed
        let config = StreamingConfig { lod_count: 2, render_radii: vec![7], lod_gap_divisor: 3, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        // Only the pair that violates the bound is rejected
        let config = StreamingConfig { lod_count: 4, render_radii: vec![2, 2, 6, 5], ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(msg)) if msg.starts_with("LOD 3")));
    }

    #[test]
    fn test_accepts_growing_radii_and_wide_gaps() {
        let accepted = [
            StreamingConfig { lod_count: 3, render_radii: vec![2, 4], ..Default::default() },
            StreamingConfig { lod_count: 3, render_radii: vec![1, 3, 5], lod_gap_divisor: 3, ..Default::default() },
            StreamingConfig { lod_count: 3, render_radii: vec![3], lod_gap_divisor: 1, ..Default::default() },
            StreamingConfig { lod_count: 5, render_radii: vec![1], lod_gap_divisor: 9, ..Default::default() },
        ];
        for config in accepted {
            assert!(config.validate().is_ok(), "{:?}", config.render_radii);
        }
    }

    #[test]
    fn test_last_radius_repeats() {
        let config = StreamingConfig {
            lod_count: 4,
            render_radii: vec![8, 5],
            ..Default::default()
        };
        assert_eq!(config.render_radius(0), 8);
        assert_eq!(config.render_radius(1), 5);
        assert_eq!(config.render_radius(3), 5);

        let policies = config.lod_policies();
        assert_eq!(policies.len(), 4);
        assert_eq!(policies[0].render_radius, 8);
        assert_eq!(policies[0].gap_radius, None);
        assert_eq!(policies[2].gap_radius, Some(2));
        assert!(policies[3].is_coarsest);
    }

    #[test]
    fn test_with_seed() {
        let config = StreamingConfig::default().with_seed(99);
        assert_eq!(config.terrain.seed, 99);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("streaming.json");

        let config = StreamingConfig {
            lod_count: 5,
            render_radii: vec![5, 6],
            distance_metric: DistanceMetric::ParentAligned,
            stitch_lod_seams: true,
            mesh_workers: 2,
            ..Default::default()
        }
        .with_seed(7);
        config.save(&path).unwrap();

        let loaded = StreamingConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"parent_aligned\""));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streaming.json");
        std::fs::write(&path, r#"{ "lod_count": 3, "terrain": { "seed": 5 } }"#).unwrap();

        let loaded = StreamingConfig::load(&path).unwrap();
        assert_eq!(loaded.lod_count, 3);
        assert_eq!(loaded.mesh_size, DEFAULT_MESH_SIZE);
        assert_eq!(loaded.terrain.seed, 5);
        assert_eq!(loaded.terrain.octaves, 25);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = StreamingConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::Io(_))));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(StreamingConfig::load(&path), Err(Error::Json(_))));

        let path = dir.path().join("odd.json");
        std::fs::write(&path, r#"{ "mesh_size": 7 }"#).unwrap();
        assert!(matches!(StreamingConfig::load(&path), Err(Error::InvalidMeshSize { size: 7 })));
    }
}
