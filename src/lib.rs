//! Lodscape - LOD terrain chunk streaming

pub mod core;
pub mod mesh;
pub mod streaming;
pub mod terrain;

pub use crate::core::{Error, Result};
pub use crate::mesh::{GridMeshSynthesizer, MeshRequest, MeshSynthesizer, TerrainMesh};
pub use crate::streaming::{ChunkCoords, RenderSink, StreamingConfig, TerrainStreamer};
pub use crate::terrain::{HeightField, TerrainGenerator, TerrainParams};
