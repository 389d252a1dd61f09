//! Per-LOD mesh-generation queue.
//!
//! Strict FIFO of chunks awaiting geometry. A chunk's `in_mesh_gen_queue`
//! flag is set when it is requested and cleared only when a mesh is stored,
//! so there is never more than one outstanding request per chunk. Failed
//! chunks keep the flag and are parked until the host asks for a retry.

use std::collections::VecDeque;

use super::coords::{ChunkCoords, CoordinateSpace};
use super::registry::ChunkId;
use super::sink::RenderSink;
use super::stats::StreamingStats;
use super::tier::LodTier;
use crate::core::{Error, Result};
use crate::mesh::{LodTransitions, MeshRequest};

/// FIFO of chunks awaiting geometry for one LOD
#[derive(Debug, Default)]
pub struct MeshGenQueue {
    entries: VecDeque<(ChunkCoords, ChunkId)>,
    failed: Vec<(ChunkCoords, ChunkId)>,
}

impl MeshGenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, coords: ChunkCoords, id: ChunkId) {
        self.entries.push_back((coords, id));
    }

    pub fn pop(&mut self) -> Option<(ChunkCoords, ChunkId)> {
        self.entries.pop_front()
    }

    /// Requests waiting to be synthesized
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chunks whose synthesis failed and await a retry
    pub fn failed_len(&self) -> usize {
        self.failed.len()
    }
}

impl<H, M> LodTier<H, M> {
    /// Queue a mesh request unless the chunk is meshed or already requested.
    /// Returns whether a request was issued.
    pub(crate) fn request_mesh(&mut self, coords: ChunkCoords, id: ChunkId) -> bool {
        let chunk = self.registry.get_mut(id);
        if chunk.has_mesh() || chunk.in_mesh_gen_queue {
            return false;
        }
        chunk.in_mesh_gen_queue = true;
        self.mesh_queue.push(coords, id);
        true
    }

    /// Pop the next request and describe the geometry to build.
    ///
    /// Stale entries (chunk already meshed, or no outstanding request) are
    /// reported and consume the turn without producing a job.
    pub(crate) fn next_mesh_job(
        &mut self,
        space: &CoordinateSpace,
        observer: ChunkCoords,
        stitch_seams: bool,
        stats: &mut StreamingStats,
    ) -> Option<(ChunkId, MeshRequest)> {
        let (coords, id) = self.mesh_queue.pop()?;
        let chunk = self.registry.get(id);
        if chunk.has_mesh() || !chunk.in_mesh_gen_queue {
            stats.violation(format_args!(
                "LOD {}: chunk {:?} dequeued for meshing without an outstanding request",
                self.lod(),
                coords
            ));
            return None;
        }

        let transitions = if stitch_seams {
            self.seam_transitions(coords, observer)
        } else {
            LodTransitions::NONE
        };

        let lod = self.lod();
        Some((
            id,
            MeshRequest {
                lod,
                coords,
                size: space.mesh_size(),
                scale: space.triangle_size(lod),
                transitions,
            },
        ))
    }

    /// Edges whose same-LOD neighbour lies outside this tier's render band,
    /// where a coarser tier draws the terrain.
    pub(crate) fn seam_transitions(&self, coords: ChunkCoords, observer: ChunkCoords) -> LodTransitions {
        if self.policy.is_coarsest {
            return LodTransitions::NONE;
        }
        let outside = |dx, dz| !self.policy.within_render_dist(coords.offset(dx, dz), observer);

        LodTransitions::NONE
            .with(LodTransitions::LEFT, outside(-1, 0))
            .with(LodTransitions::RIGHT, outside(1, 0))
            .with(LodTransitions::BOTTOM, outside(0, -1))
            .with(LodTransitions::TOP, outside(0, 1))
    }

    /// Apply a synthesis outcome.
    ///
    /// On success the mesh is stored, handed to the sink, and the request is
    /// closed. On failure the chunk stays flagged, is parked for
    /// [`retry_failed_meshes`](Self::retry_failed_meshes), and the error is
    /// returned wrapped with the chunk's identity.
    pub(crate) fn complete_mesh<S>(
        &mut self,
        id: ChunkId,
        request: &MeshRequest,
        outcome: Result<M>,
        sink: &mut S,
        stats: &mut StreamingStats,
    ) -> Result<()>
    where
        S: RenderSink<M, Handle = H>,
    {
        let mesh = match outcome {
            Ok(mesh) => mesh,
            Err(source) => {
                stats.mesh_failures += 1;
                self.mesh_queue.failed.push((request.coords, id));
                log::warn!(
                    "LOD {}: mesh synthesis failed for chunk {:?}: {}",
                    request.lod,
                    request.coords,
                    source
                );
                return Err(Error::MeshSynthesis {
                    lod: request.lod,
                    coords: request.coords,
                    source: Box::new(source),
                });
            }
        };

        let chunk = self.registry.get_mut(id);
        chunk.in_mesh_gen_queue = false;
        if chunk.store_mesh(mesh).is_err() {
            stats.violation(format_args!(
                "LOD {}: chunk {:?} already has a mesh, keeping the original",
                request.lod, request.coords
            ));
            return Ok(());
        }

        let chunk = self.registry.get(id);
        if let Some(mesh) = chunk.mesh() {
            sink.attach_mesh(&chunk.render_handle, mesh);
        }
        stats.meshes_built += 1;
        log::trace!("LOD {}: meshed chunk {:?}", request.lod, request.coords);
        Ok(())
    }

    /// Re-enqueue every parked failure that still lacks a mesh.
    /// Returns how many requests were re-issued.
    pub(crate) fn retry_failed_meshes(&mut self) -> usize {
        let failed = std::mem::take(&mut self.mesh_queue.failed);
        let mut retried = 0;
        for (coords, id) in failed {
            let chunk = self.registry.get(id);
            if chunk.has_mesh() || !chunk.in_mesh_gen_queue {
                continue;
            }
            self.mesh_queue.push(coords, id);
            retried += 1;
        }
        retried
    }
}
