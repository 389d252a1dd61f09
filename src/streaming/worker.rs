//! Background mesh synthesis.
//!
//! Jobs run on a dedicated rayon pool and report back over a channel. The
//! scheduler drains completed results on its own thread, so chunk state is
//! never touched off-thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::registry::ChunkId;
use crate::core::{Error, Result};
use crate::mesh::{MeshRequest, MeshSynthesizer};
use crate::terrain::HeightField;

/// Result of one background synthesis job
#[derive(Debug)]
pub struct MeshCompletion<M> {
    pub id: ChunkId,
    pub request: MeshRequest,
    pub outcome: Result<M>,
}

/// Thread pool synthesizing chunk meshes off the scheduler thread
pub struct MeshWorkerPool<Syn: MeshSynthesizer> {
    pool: rayon::ThreadPool,
    synthesizer: Arc<Syn>,
    field: Arc<dyn HeightField>,
    /// Channel for results coming back from workers
    result_tx: mpsc::Sender<MeshCompletion<Syn::Mesh>>,
    result_rx: mpsc::Receiver<MeshCompletion<Syn::Mesh>>,
    /// Jobs dispatched but not yet drained
    in_flight: usize,
}

impl<Syn: MeshSynthesizer> MeshWorkerPool<Syn> {
    /// Create a pool with `threads` workers
    pub fn new(threads: usize, synthesizer: Arc<Syn>, field: Arc<dyn HeightField>) -> Result<Self> {
        if threads == 0 {
            return Err(Error::WorkerPool("worker pool needs at least one thread".into()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mesh-worker-{}", i))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        let (result_tx, result_rx) = mpsc::channel();

        log::debug!("Mesh worker pool started with {} threads", threads);

        Ok(Self {
            pool,
            synthesizer,
            field,
            result_tx,
            result_rx,
            in_flight: 0,
        })
    }

    /// Queue a synthesis job
    pub fn dispatch(&mut self, id: ChunkId, request: MeshRequest) {
        let synthesizer = Arc::clone(&self.synthesizer);
        let field = Arc::clone(&self.field);
        let result_tx = self.result_tx.clone();

        self.in_flight += 1;
        self.pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                synthesizer.synthesize(field.as_ref(), &request)
            }))
            .unwrap_or_else(|_| {
                Err(Error::WorkerPool(format!(
                    "mesh synthesis panicked for chunk {:?} at LOD {}",
                    request.coords, request.lod
                )))
            });

            // Receiver lives as long as the pool
            let _ = result_tx.send(MeshCompletion { id, request, outcome });
        });
    }

    /// Collect every completed job without blocking
    pub fn drain(&mut self) -> Vec<MeshCompletion<Syn::Mesh>> {
        let mut results = Vec::new();
        while let Ok(completion) = self.result_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            results.push(completion);
        }
        results
    }

    /// Block until every dispatched job has reported back or `timeout`
    /// elapses, returning what arrived.
    pub fn wait(&mut self, timeout: Duration) -> Vec<MeshCompletion<Syn::Mesh>> {
        let deadline = Instant::now() + timeout;
        let mut results = Vec::new();

        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(completion) => {
                    self.in_flight -= 1;
                    results.push(completion);
                }
                Err(_) => break,
            }
        }
        results
    }

    /// Jobs dispatched but not yet collected
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}
