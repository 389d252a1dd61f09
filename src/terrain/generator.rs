//! Noise-based procedural height field

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex};
use serde::{Deserialize, Serialize};

use super::field::HeightField;
use super::palette::Surface;
use crate::core::{Error, Result};

/// Octave ceiling of the noise crate's fractal generators
pub const MAX_OCTAVES: u32 = 32;

/// Parameters controlling terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    pub frequency: f32,             // Base noise frequency (world units⁻¹)
    pub octaves: u32,               // FBM octaves (detail levels)
    pub persistence: f32,           // FBM amplitude falloff per octave
    pub lacunarity: f32,            // FBM frequency growth per octave
    pub relief: f32,                // Exponent scale applied to the FBM value
    pub base_height: f32,           // Height where the FBM value is zero
    pub z_offset: f32,              // Shift of the noise origin along z
    pub grass_steepness_limit: f32, // Steepness above which grass gives way to stone
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 0.015,
            octaves: 25,
            persistence: 0.5,
            lacunarity: 1.7,
            relief: 6.0,
            base_height: 0.7,
            z_offset: 20.0,
            grass_steepness_limit: 0.2,
        }
    }
}

impl TerrainParams {
    /// Reject parameters the noise stack cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_OCTAVES).contains(&self.octaves) {
            return Err(Error::Config(format!(
                "terrain octaves must be in 1..={}, got {}",
                MAX_OCTAVES, self.octaves
            )));
        }
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(Error::Config(format!(
                "terrain frequency must be positive, got {}",
                self.frequency
            )));
        }
        if !(self.base_height.is_finite() && self.relief.is_finite()) {
            return Err(Error::Config("terrain base height and relief must be finite".into()));
        }
        Ok(())
    }
}

/// Procedural terrain using exp-shaped fractal Brownian motion (FBM).
///
/// `height = base_height * exp(relief * fbm(x * f, (z - z_offset) * f))`,
/// which keeps valleys shallow and lets peaks grow sharply.
pub struct TerrainGenerator {
    params: TerrainParams,
    noise: Fbm<OpenSimplex>,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<OpenSimplex>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_frequency(params.frequency as f64)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Surface type for a given steepness
    pub fn surface_at(&self, steepness: f32) -> Surface {
        Surface::from_steepness(steepness, self.params.grass_steepness_limit)
    }
}

impl HeightField for TerrainGenerator {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = x as f64;
        let nz = (z - self.params.z_offset) as f64;

        // Roughly [-1, 1]
        let value = self.noise.get([nx, nz]);

        (self.params.base_height as f64 * (self.params.relief as f64 * value).exp()) as f32
    }

    fn color_at(&self, _x: f32, _z: f32, _height: f32, slope: f32) -> Vec3 {
        self.surface_at(slope).color()
    }
}
