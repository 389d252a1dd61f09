//! Chunk LOD streaming around a moving observer

pub mod chunk;
pub mod config;
pub mod coords;
pub mod discovery;
pub mod live_queue;
pub mod lod;
pub mod mesh_queue;
pub mod registry;
pub mod sink;
pub mod stats;
pub mod streamer;
pub mod worker;

mod tier;

#[cfg(test)]
pub(crate) mod testing;

pub use chunk::{CHILD_COUNT, Chunk};
pub use config::StreamingConfig;
pub use coords::{ChunkCoords, CoordinateSpace};
pub use discovery::{DiscoveryWalker, Spiral, WalkStep};
pub use live_queue::{Coverage, LiveQueue, LiveTurn};
pub use lod::{
    DEFAULT_LOD0_TRIANGLE_SIZE, DEFAULT_LOD_COUNT, DEFAULT_MESH_SIZE, DEFAULT_RENDER_RADIUS,
    DistanceBands, DistanceMetric, LodPolicy, chunk_size_at_lod, reasonable_radius, triangle_size_at_lod,
};
pub use mesh_queue::MeshGenQueue;
pub use registry::{ChunkId, ChunkRegistry};
pub use sink::{FixedObserver, ObserverSource, RenderSink};
pub use stats::StreamingStats;
pub use streamer::TerrainStreamer;
pub use worker::{MeshCompletion, MeshWorkerPool};
