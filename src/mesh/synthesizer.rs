//! Heightfield chunk meshing.
//!
//! A chunk mesh is a regular `(size+1)²` vertex grid. Sampling runs over a grid
//! padded by one ring (plus one extra row/column so the far edge sits on an
//! even index), so border normals take the neighbouring chunk's slope into
//! account and adjacent chunks agree on their shared edge.

use glam::{Vec2, Vec3};

use super::transitions::LodTransitions;
use super::vertex::TerrainVertex;
use crate::core::{Error, Result};
use crate::streaming::coords::ChunkCoords;
use crate::terrain::HeightField;

/// Everything needed to synthesize one chunk's geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshRequest {
    pub lod: usize,
    pub coords: ChunkCoords,
    /// Triangle cells along one edge
    pub size: u32,
    /// Triangle cell width at this LOD (world units)
    pub scale: f32,
    pub transitions: LodTransitions,
}

impl MeshRequest {
    /// Chunk offset along x, in chunks of this LOD
    pub fn offset_x(&self) -> i64 {
        self.coords.x
    }

    /// Chunk offset along z, in chunks of this LOD
    pub fn offset_z(&self) -> i64 {
        self.coords.z
    }
}

/// Turns a height field and a [`MeshRequest`] into renderable geometry.
///
/// Implementations must be deterministic and may run on worker threads.
pub trait MeshSynthesizer: Send + Sync + 'static {
    type Mesh: Send + 'static;

    fn synthesize(&self, field: &dyn HeightField, request: &MeshRequest) -> Result<Self::Mesh>;
}

/// CPU-side chunk geometry
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    pub size: u32,
    /// Column-major: vertex `(c, r)` lives at `c * (size + 1) + r`
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Vertices along one edge
    pub fn side(&self) -> usize {
        self.size as usize + 1
    }

    /// Vertex at column `c` (x) and row `r` (z)
    pub fn vertex(&self, c: usize, r: usize) -> &TerrainVertex {
        &self.vertices[c * self.side() + r]
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Lowest and highest vertex height
    pub fn height_range(&self) -> (f32, f32) {
        self.vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[1]), hi.max(v.position[1]))
        })
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Regular-grid heightfield mesher producing [`TerrainMesh`]
#[derive(Clone, Copy, Debug, Default)]
pub struct GridMeshSynthesizer;

impl GridMeshSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl MeshSynthesizer for GridMeshSynthesizer {
    type Mesh = TerrainMesh;

    fn synthesize(&self, field: &dyn HeightField, request: &MeshRequest) -> Result<TerrainMesh> {
        let n = validate_size(request.size)?;
        let padded_side = n + 3;

        let positions = sample_padded(field, request, n);
        let normals = accumulate_normals(&positions, padded_side);

        let side = n + 1;
        let mut vertices = Vec::with_capacity(side * side);
        for c in 0..side {
            for r in 0..side {
                let i = (c + 1) * padded_side + (r + 1);
                let position = positions[i];
                let normal = normals[i];
                let uv = Vec2::new(
                    (c as f32 + 0.5) / side as f32,
                    (r as f32 + 0.5) / side as f32,
                );
                let steepness = 1.0 - normal.y;
                let color = field.color_at(position.x, position.z, position.y, steepness);
                vertices.push(TerrainVertex::new(position, normal, uv, color));
            }
        }

        Ok(TerrainMesh {
            size: request.size,
            vertices,
            indices: grid_indices(n),
        })
    }
}

fn validate_size(size: u32) -> Result<usize> {
    if size == 0 || size % 2 != 0 {
        return Err(Error::InvalidMeshSize { size });
    }
    Ok(size as usize)
}

/// Sample the `(n+3)²` grid around the chunk, applying edge transitions
fn sample_padded(field: &dyn HeightField, request: &MeshRequest, n: usize) -> Vec<Vec3> {
    let side = n + 3;
    let scale = request.scale as f64;
    let base_x = request.offset_x() as f64 * n as f64;
    let base_z = request.offset_z() as f64 * n as f64;
    let world = |index: f64, base: f64| (scale * (index - 1.0 + base)) as f32;

    let flags = request.transitions;
    let along_z = |c: usize| {
        (flags.contains(LodTransitions::LEFT) && c < 2) || (flags.contains(LodTransitions::RIGHT) && c > n)
    };
    let along_x = |r: usize| {
        (flags.contains(LodTransitions::BOTTOM) && r < 2) || (flags.contains(LodTransitions::TOP) && r > n)
    };

    let mut positions = Vec::with_capacity(side * side);
    for c in 0..side {
        let x = world(c as f64, base_x);
        for r in 0..side {
            let z = world(r as f64, base_z);

            // Where two flagged edges meet, both axes shift and the average
            // runs along the diagonal
            let shift_z = if along_z(c) && r % 2 == 0 { 1.0 } else { 0.0 };
            let shift_x = if along_x(r) && c % 2 == 0 { 1.0 } else { 0.0 };

            let height = if shift_x == 0.0 && shift_z == 0.0 {
                field.height_at(x, z)
            } else {
                let first = field.height_at(
                    world(c as f64 - shift_x, base_x),
                    world(r as f64 - shift_z, base_z),
                );
                let second = field.height_at(
                    world(c as f64 + shift_x, base_x),
                    world(r as f64 + shift_z, base_z),
                );
                (first + second) * 0.5
            };

            positions.push(Vec3::new(x, height, z));
        }
    }
    positions
}

/// Area-weighted vertex normals over a square grid of `side²` positions
fn accumulate_normals(positions: &[Vec3], side: usize) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for c in 0..side - 1 {
        for r in 0..side - 1 {
            let tl = c * side + r;
            let tr = (c + 1) * side + r;
            let bl = c * side + r + 1;
            let br = (c + 1) * side + r + 1;

            let upper = (positions[bl] - positions[tl]).cross(positions[tr] - positions[tl]);
            normals[tl] += upper;
            normals[tr] += upper;
            normals[bl] += upper;

            let lower = (positions[tr] - positions[br]).cross(positions[bl] - positions[br]);
            normals[tr] += lower;
            normals[bl] += lower;
            normals[br] += lower;
        }
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// Two triangles per cell over an `(n+1)²` vertex grid
fn grid_indices(n: usize) -> Vec<u32> {
    let side = n + 1;
    let mut indices = Vec::with_capacity(6 * n * n);
    for c in 0..n {
        for r in 0..n {
            let tl = (c * side + r) as u32;
            let tr = ((c + 1) * side + r) as u32;
            let bl = (c * side + r + 1) as u32;
            let br = ((c + 1) * side + r + 1) as u32;
            indices.extend_from_slice(&[tl, bl, tr, br, tr, bl]);
        }
    }
    indices
}
