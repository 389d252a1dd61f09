//! Everything one LOD owns: its registry, its three pipelines, and its
//! distance policy.

use super::discovery::DiscoveryWalker;
use super::lod::LodPolicy;
use super::live_queue::LiveQueue;
use super::mesh_queue::MeshGenQueue;
use super::registry::ChunkRegistry;

/// State for one LOD tier.
///
/// Only the tier's own pipelines and the parent propagation from the next
/// finer tier touch it.
pub(crate) struct LodTier<H, M> {
    pub(crate) policy: LodPolicy,
    pub(crate) registry: ChunkRegistry<H, M>,
    pub(crate) discovery: DiscoveryWalker,
    pub(crate) live_queue: LiveQueue,
    pub(crate) mesh_queue: MeshGenQueue,
}

impl<H, M> LodTier<H, M> {
    pub(crate) fn new(policy: LodPolicy) -> Self {
        Self {
            policy,
            registry: ChunkRegistry::new(),
            discovery: DiscoveryWalker::new(),
            live_queue: LiveQueue::new(),
            mesh_queue: MeshGenQueue::new(),
        }
    }

    pub(crate) fn lod(&self) -> usize {
        self.policy.lod
    }
}
