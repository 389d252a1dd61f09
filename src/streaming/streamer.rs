//! Terrain streamer: drives every LOD's pipelines once per tick.
//!
//! Per tick and per LOD, finest first:
//! 1. discovery visits one spiral cell around the observer
//! 2. the live queue processes one chunk
//! 3. the mesh queue synthesizes (or dispatches) one mesh
//!
//! Background results, if workers are enabled, are applied at the start of
//! the tick on the calling thread.

use std::sync::Arc;
use std::time::Duration;

use super::chunk::Chunk;
use super::config::StreamingConfig;
use super::coords::{ChunkCoords, CoordinateSpace};
use super::live_queue;
use super::sink::{ObserverSource, RenderSink};
use super::stats::StreamingStats;
use super::tier::LodTier;
use super::worker::{MeshCompletion, MeshWorkerPool};
use crate::core::Result;
use crate::mesh::{GridMeshSynthesizer, MeshSynthesizer, TerrainMesh};
use crate::terrain::{HeightField, TerrainGenerator};

/// Streams LOD terrain chunks around a moving observer
pub struct TerrainStreamer<S, Syn = GridMeshSynthesizer>
where
    Syn: MeshSynthesizer,
    S: RenderSink<Syn::Mesh>,
{
    config: StreamingConfig,
    space: CoordinateSpace,
    tiers: Vec<LodTier<S::Handle, Syn::Mesh>>,
    observer: Box<dyn ObserverSource>,
    sink: S,
    field: Arc<dyn HeightField>,
    synthesizer: Arc<Syn>,
    /// Background synthesis; `None` meshes inline during `tick()`
    workers: Option<MeshWorkerPool<Syn>>,
    stats: StreamingStats,
}

impl<S> TerrainStreamer<S, GridMeshSynthesizer>
where
    S: RenderSink<TerrainMesh>,
{
    /// Create a streamer over the built-in noise terrain and grid mesher
    pub fn new(config: StreamingConfig, observer: impl ObserverSource + 'static, sink: S) -> Result<Self> {
        let field = Arc::new(TerrainGenerator::new(config.terrain.clone()));
        Self::with_collaborators(config, observer, sink, field, Arc::new(GridMeshSynthesizer))
    }
}

impl<S, Syn> TerrainStreamer<S, Syn>
where
    Syn: MeshSynthesizer,
    S: RenderSink<Syn::Mesh>,
{
    /// Create a streamer with a custom height field and mesh synthesizer.
    ///
    /// Fails if the configuration is invalid or the worker pool cannot start.
    pub fn with_collaborators(
        config: StreamingConfig,
        observer: impl ObserverSource + 'static,
        sink: S,
        field: Arc<dyn HeightField>,
        synthesizer: Arc<Syn>,
    ) -> Result<Self> {
        config.validate()?;

        let space = config.coordinate_space();
        let tiers = config.lod_policies().into_iter().map(LodTier::new).collect();

        let workers = if config.mesh_workers > 0 {
            Some(MeshWorkerPool::new(
                config.mesh_workers,
                Arc::clone(&synthesizer),
                Arc::clone(&field),
            )?)
        } else {
            None
        };

        log::info!(
            "Terrain streamer: {} LODs, mesh size {}, LOD 0 chunk {:.3} units, coarsest chunk {:.1} units, {} mesh workers",
            config.lod_count,
            config.mesh_size,
            space.chunk_world_size(0),
            space.chunk_world_size(config.lod_count - 1),
            config.mesh_workers
        );

        Ok(Self {
            config,
            space,
            tiers,
            observer: Box::new(observer),
            sink,
            field,
            synthesizer,
            workers,
            stats: StreamingStats::default(),
        })
    }

    /// Advance every LOD's pipelines by one step.
    ///
    /// All LODs are stepped even if one fails; the first mesh synthesis error
    /// is returned. Failed chunks stay parked until
    /// [`retry_failed_meshes`](Self::retry_failed_meshes).
    pub fn tick(&mut self) -> Result<()> {
        self.stats.ticks += 1;
        let mut first_error = None;

        let completions = match self.workers.as_mut() {
            Some(workers) => workers.drain(),
            None => Vec::new(),
        };
        for completion in completions {
            if let Err(e) = self.apply_completion(completion) {
                first_error.get_or_insert(e);
            }
        }

        let position = self.observer.observer_position();
        for lod in 0..self.tiers.len() {
            let observer = self.space.world_pos_to_chunk(position, lod);

            let sink = &mut self.sink;
            self.tiers[lod].step_discovery(observer, || sink.create_visual_object(), &mut self.stats);

            live_queue::step(&mut self.tiers, lod, observer, &mut self.sink, &mut self.stats);

            if let Err(e) = self.step_mesh_gen(lod, observer) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn step_mesh_gen(&mut self, lod: usize, observer: ChunkCoords) -> Result<()> {
        let stitch = self.config.stitch_lod_seams;
        let Some((id, request)) = self.tiers[lod].next_mesh_job(&self.space, observer, stitch, &mut self.stats)
        else {
            return Ok(());
        };

        match self.workers.as_mut() {
            Some(workers) => {
                workers.dispatch(id, request);
                Ok(())
            }
            None => {
                let outcome = self.synthesizer.synthesize(self.field.as_ref(), &request);
                self.tiers[lod].complete_mesh(id, &request, outcome, &mut self.sink, &mut self.stats)
            }
        }
    }

    fn apply_completion(&mut self, completion: MeshCompletion<Syn::Mesh>) -> Result<()> {
        let MeshCompletion { id, request, outcome } = completion;
        self.tiers[request.lod].complete_mesh(id, &request, outcome, &mut self.sink, &mut self.stats)
    }

    /// Re-enqueue every chunk whose mesh synthesis failed.
    /// Returns the number of requests re-issued.
    pub fn retry_failed_meshes(&mut self) -> usize {
        let retried: usize = self.tiers.iter_mut().map(|tier| tier.retry_failed_meshes()).sum();
        if retried > 0 {
            log::info!("Retrying {} failed mesh requests", retried);
        }
        retried
    }

    /// Block until background meshes in flight have arrived (or `timeout`
    /// elapses) and apply them. No-op without workers.
    pub fn wait_for_meshes(&mut self, timeout: Duration) -> Result<()> {
        let completions = match self.workers.as_mut() {
            Some(workers) => workers.wait(timeout),
            None => return Ok(()),
        };

        let mut first_error = None;
        for completion in completions {
            if let Err(e) = self.apply_completion(completion) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Streaming state of one chunk, if it has been registered
    pub fn chunk(&self, lod: usize, coords: ChunkCoords) -> Option<&Chunk<S::Handle, Syn::Mesh>> {
        self.tiers.get(lod)?.registry.lookup(coords)
    }

    pub fn lod_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn stats(&self) -> &StreamingStats {
        &self.stats
    }

    pub fn coordinate_space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// Chunk the observer currently stands in at `lod`
    pub fn observer_chunk(&self, lod: usize) -> ChunkCoords {
        self.space.world_pos_to_chunk(self.observer.observer_position(), lod)
    }

    /// Coordinates of every visible chunk at `lod`
    pub fn visible_chunks(&self, lod: usize) -> Vec<ChunkCoords> {
        self.tiers
            .get(lod)
            .map(|tier| {
                tier.registry
                    .iter()
                    .filter(|(_, chunk)| chunk.is_visible())
                    .map(|(coords, _)| coords)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn live_queue_len(&self, lod: usize) -> usize {
        self.tiers.get(lod).map_or(0, |tier| tier.live_queue.len())
    }

    pub fn mesh_queue_len(&self, lod: usize) -> usize {
        self.tiers.get(lod).map_or(0, |tier| tier.mesh_queue.len())
    }

    /// Chunks at `lod` parked after a failed synthesis
    pub fn failed_mesh_count(&self, lod: usize) -> usize {
        self.tiers.get(lod).map_or(0, |tier| tier.mesh_queue.failed_len())
    }

    pub fn registry_len(&self, lod: usize) -> usize {
        self.tiers.get(lod).map_or(0, |tier| tier.registry.len())
    }

    /// Background jobs dispatched but not yet applied
    pub fn meshes_in_flight(&self) -> usize {
        self.workers.as_ref().map_or(0, MeshWorkerPool::in_flight)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
