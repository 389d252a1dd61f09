//! Chunk mesh synthesis

pub mod synthesizer;
pub mod transitions;
pub mod vertex;

pub use synthesizer::{GridMeshSynthesizer, MeshRequest, MeshSynthesizer, TerrainMesh};
pub use transitions::LodTransitions;
pub use vertex::TerrainVertex;
