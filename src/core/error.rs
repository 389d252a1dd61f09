//! Error types for the terrain streamer

use thiserror::Error;

use crate::streaming::coords::ChunkCoords;

/// Main error type for the streamer
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid mesh size {size}: must be a non-zero even number")]
    InvalidMeshSize { size: u32 },

    #[error("Mesh synthesis failed for chunk {coords:?} at LOD {lod}: {source}")]
    MeshSynthesis {
        lod: usize,
        coords: ChunkCoords,
        #[source]
        source: Box<Error>,
    },

    #[error("Mesh worker pool error: {0}")]
    WorkerPool(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
