//! Counters describing what the scheduler has done so far

use serde::{Deserialize, Serialize};

/// Cumulative statistics from streaming operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingStats {
    /// Ticks driven so far
    pub ticks: u64,
    /// Spiral cells visited across all LODs
    pub spiral_cells_visited: u64,
    /// Spirals abandoned because the observer changed chunk mid-walk
    pub spiral_restarts: u64,
    /// Chunks enqueued into a live queue by discovery
    pub chunks_enqueued: u64,
    /// Chunks dropped from a live queue
    pub chunks_retired: u64,
    /// Mesh requests issued by the live queues
    pub mesh_requests: u64,
    /// Meshes synthesized and stored
    pub meshes_built: u64,
    /// Mesh synthesis failures reported to the caller
    pub mesh_failures: u64,
    /// Chunks switched visible
    pub activations: u64,
    /// Chunks switched hidden
    pub deactivations: u64,
    /// Logic errors detected and tolerated
    pub invariant_violations: u64,
}

impl StreamingStats {
    /// Record a tolerated logic error
    pub(crate) fn violation(&mut self, message: std::fmt::Arguments<'_>) {
        self.invariant_violations += 1;
        log::warn!("{}", message);
    }
}
