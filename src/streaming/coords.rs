//! Chunk grid coordinates and the per-LOD coordinate space

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::lod::{chunk_size_at_lod, triangle_size_at_lod};

/// Integer coordinate identifying a chunk on one LOD's grid.
///
/// Coordinates are implicitly scoped to a single LOD; compare across tiers
/// only after converting with [`ChunkCoords::parent`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoords {
    pub x: i64,
    pub z: i64,
}

impl ChunkCoords {
    /// Create a new chunk coordinate
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// Coordinate of the containing chunk one LOD coarser.
    ///
    /// Arithmetic shift floors toward negative infinity, so `-1` maps to `-1`
    /// and `-2` maps to `-1`.
    pub const fn parent(self) -> Self {
        Self::new(self.x >> 1, self.z >> 1)
    }

    /// Coordinate of the containing chunk `levels` LODs coarser
    pub const fn ancestor(self, levels: u32) -> Self {
        let shift = if levels > 63 { 63 } else { levels };
        Self::new(self.x >> shift, self.z >> shift)
    }

    /// The four chunks one LOD finer that this chunk covers
    pub const fn children(self) -> [ChunkCoords; 4] {
        let x = self.x * 2;
        let z = self.z * 2;
        [
            Self::new(x, z),
            Self::new(x + 1, z),
            Self::new(x, z + 1),
            Self::new(x + 1, z + 1),
        ]
    }

    /// Coordinate rounded down to an even value on both axes
    pub const fn parent_aligned(self) -> Self {
        Self::new(self.x & !1, self.z & !1)
    }

    /// Offset by a whole number of chunks
    pub const fn offset(self, dx: i64, dz: i64) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Chebyshev distance (max of the axis distances) to another coordinate
    pub fn chebyshev_distance(self, other: ChunkCoords) -> i64 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Converts between world space and each LOD's chunk grid.
///
/// Sizes are computed once at construction from the LOD-0 triangle size and
/// the mesh subdivision count.
#[derive(Clone, Debug)]
pub struct CoordinateSpace {
    mesh_size: u32,
    triangle_sizes: Vec<f32>,
    chunk_sizes: Vec<f32>,
}

impl CoordinateSpace {
    /// Create a coordinate space for `lod_count` tiers
    pub fn new(lod_count: usize, mesh_size: u32, lod0_triangle_size: f32) -> Self {
        let triangle_sizes = (0..lod_count)
            .map(|lod| triangle_size_at_lod(lod0_triangle_size, lod))
            .collect();
        let chunk_sizes = (0..lod_count)
            .map(|lod| chunk_size_at_lod(lod0_triangle_size, mesh_size, lod))
            .collect();

        Self {
            mesh_size,
            triangle_sizes,
            chunk_sizes,
        }
    }

    /// Number of LOD tiers
    pub fn lod_count(&self) -> usize {
        self.chunk_sizes.len()
    }

    /// Triangle cells along one chunk edge
    pub fn mesh_size(&self) -> u32 {
        self.mesh_size
    }

    /// Width of one triangle cell at `lod`
    pub fn triangle_size(&self, lod: usize) -> f32 {
        self.triangle_sizes[lod]
    }

    /// World width of one chunk at `lod`
    pub fn chunk_world_size(&self, lod: usize) -> f32 {
        self.chunk_sizes[lod]
    }

    /// Chunk containing world position (x, z) at `lod`.
    ///
    /// Floors toward negative infinity, so x = -0.1 at chunk size 1.0 is
    /// chunk -1, not 0.
    pub fn world_to_chunk(&self, x: f32, z: f32, lod: usize) -> ChunkCoords {
        let size = self.chunk_sizes[lod] as f64;
        ChunkCoords::new(
            (x as f64 / size).floor() as i64,
            (z as f64 / size).floor() as i64,
        )
    }

    /// Chunk containing an observer position, where `pos.y` holds world z
    pub fn world_pos_to_chunk(&self, pos: Vec2, lod: usize) -> ChunkCoords {
        self.world_to_chunk(pos.x, pos.y, lod)
    }

    /// World position of the chunk's minimum corner (x in `.x`, z in `.y`)
    pub fn chunk_to_world(&self, coords: ChunkCoords, lod: usize) -> Vec2 {
        let size = self.chunk_sizes[lod] as f64;
        Vec2::new(
            (coords.x as f64 * size) as f32,
            (coords.z as f64 * size) as f32,
        )
    }

    /// Parent coordinate at the next coarser LOD
    pub fn parent_of(&self, coords: ChunkCoords) -> ChunkCoords {
        coords.parent()
    }
}
