//! # Chunk Worker Pool
//!
//! Background chunk generation. One job is one chunk; the generator is
//! shared read-only and every job allocates its own grid.
//!
//! ## Architecture
//!
//! ```text
//!   request() ──> [bounded job queue] ──> worker 0..N ──> [result queue] ──> poll()
//!        │                                    │                               │
//!        └────────── wanted set ──────────────┴───────────────────────────────┘
//! ```
//!
//! Cancelling removes a chunk from the wanted set. A worker that has not
//! started the job skips it; a result that arrives anyway is dropped by
//! `poll`. Generation itself is never interrupted.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use grove_procedural::{ChunkCoord, GeneratedChunk, ModificationSource, TerrainGenerator};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{StreamingError, StreamingResult};

/// Configuration for the worker pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Number of generation threads.
    pub workers: usize,
    /// Jobs that may wait in the queue before `request` fails.
    pub queue_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        // Leave one core for the caller.
        let workers = thread::available_parallelism().map_or(2, |n| n.get().saturating_sub(1).max(1));
        Self {
            workers,
            queue_capacity: 256,
        }
    }
}

impl WorkerPoolConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidConfig`] for zero workers or a zero
    /// queue capacity.
    pub fn validate(&self) -> StreamingResult<()> {
        if self.workers == 0 {
            return Err(StreamingError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(StreamingError::InvalidConfig("queue_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

/// State shared between the pool handle and its workers.
struct Shared {
    /// Chunks requested and not yet delivered or cancelled.
    wanted: Mutex<HashSet<ChunkCoord>>,
    shutdown: AtomicBool,
}

/// Generates chunks on background threads.
pub struct ChunkWorkerPool {
    config: WorkerPoolConfig,
    jobs: Option<Sender<ChunkCoord>>,
    results: Receiver<GeneratedChunk>,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ChunkWorkerPool {
    /// Starts the workers.
    ///
    /// Each job replays modifications from `source` after generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a thread cannot
    /// be spawned. Workers already started are joined before returning.
    pub fn new(
        generator: Arc<TerrainGenerator>,
        source: Arc<dyn ModificationSource>,
        config: WorkerPoolConfig,
    ) -> StreamingResult<Self> {
        config.validate()?;

        let (job_tx, job_rx) = bounded::<ChunkCoord>(config.queue_capacity);
        // Unbounded so a worker never blocks on delivery during shutdown.
        let (result_tx, result_rx) = unbounded::<GeneratedChunk>();

        let mut pool = Self {
            config,
            jobs: Some(job_tx),
            results: result_rx,
            shared: Arc::new(Shared {
                wanted: Mutex::new(HashSet::new()),
                shutdown: AtomicBool::new(false),
            }),
            workers: Vec::with_capacity(config.workers),
        };

        for id in 0..config.workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let generator = Arc::clone(&generator);
            let source = Arc::clone(&source);
            let shared = Arc::clone(&pool.shared);

            let handle = thread::Builder::new()
                .name(format!("grove-gen-{id}"))
                .spawn(move || worker_loop(id, &jobs, &results, &generator, source.as_ref(), &shared))
                .map_err(StreamingError::Spawn)?;
            pool.workers.push(handle);
        }

        tracing::info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            seed = generator.seed().value(),
            "chunk worker pool started"
        );
        Ok(pool)
    }

    /// Pool configuration.
    #[must_use]
    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Queues a chunk for generation.
    ///
    /// Returns `false` if the chunk is already pending.
    ///
    /// # Errors
    ///
    /// [`StreamingError::QueueFull`] if the job queue is at capacity,
    /// [`StreamingError::ShutDown`] after [`ChunkWorkerPool::shutdown`].
    pub fn request(&self, coord: ChunkCoord) -> StreamingResult<bool> {
        let Some(jobs) = &self.jobs else {
            return Err(StreamingError::ShutDown);
        };
        if !self.shared.wanted.lock().insert(coord) {
            return Ok(false);
        }

        match jobs.try_send(coord) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                self.shared.wanted.lock().remove(&coord);
                Err(StreamingError::QueueFull {
                    capacity: self.config.queue_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => {
                self.shared.wanted.lock().remove(&coord);
                Err(StreamingError::ShutDown)
            }
        }
    }

    /// Queues every chunk within `radius` of `center`, nearest first.
    ///
    /// Stops quietly when the queue fills. Returns the number queued.
    ///
    /// # Errors
    ///
    /// [`StreamingError::ShutDown`] after [`ChunkWorkerPool::shutdown`].
    pub fn request_around(&self, center: ChunkCoord, radius: i32) -> StreamingResult<usize> {
        let mut ring = Vec::new();
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dz * dz <= radius * radius {
                    ring.push((dx * dx + dz * dz, ChunkCoord::new(center.x + dx, center.z + dz)));
                }
            }
        }
        ring.sort_unstable();

        let mut queued = 0;
        for (_, coord) in ring {
            match self.request(coord) {
                Ok(true) => queued += 1,
                Ok(false) => {}
                Err(StreamingError::QueueFull { .. }) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(queued)
    }

    /// Abandons a pending chunk. Returns `false` if it was not pending.
    pub fn cancel(&self, coord: ChunkCoord) -> bool {
        self.shared.wanted.lock().remove(&coord)
    }

    /// Abandons every pending chunk farther than `radius` from `center`.
    ///
    /// Returns the number cancelled.
    pub fn cancel_outside(&self, center: ChunkCoord, radius: i32) -> usize {
        let mut wanted = self.shared.wanted.lock();
        let before = wanted.len();
        wanted.retain(|c| {
            let (dx, dz) = (c.x - center.x, c.z - center.z);
            dx * dx + dz * dz <= radius * radius
        });
        before - wanted.len()
    }

    /// Returns true if the chunk is requested and not yet delivered.
    #[must_use]
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.shared.wanted.lock().contains(&coord)
    }

    /// Number of pending chunks.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.wanted.lock().len()
    }

    /// Collects up to `max` finished chunks without blocking.
    pub fn poll(&self, max: usize) -> Vec<GeneratedChunk> {
        let mut ready = Vec::new();
        while ready.len() < max {
            let Ok(chunk) = self.results.try_recv() else {
                break;
            };
            if let Some(chunk) = self.accept(chunk) {
                ready.push(chunk);
            }
        }
        ready
    }

    /// Waits up to `timeout` for the next wanted chunk.
    ///
    /// # Errors
    ///
    /// [`StreamingError::ShutDown`] if every worker has exited.
    pub fn recv_timeout(&self, timeout: Duration) -> StreamingResult<Option<GeneratedChunk>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(chunk) => {
                    if let Some(chunk) = self.accept(chunk) {
                        return Ok(Some(chunk));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(StreamingError::ShutDown),
            }
        }
    }

    /// Delivers a result only if its chunk is still wanted.
    fn accept(&self, chunk: GeneratedChunk) -> Option<GeneratedChunk> {
        if self.shared.wanted.lock().remove(&chunk.coord) {
            Some(chunk)
        } else {
            tracing::trace!(chunk = ?chunk.coord, "dropping cancelled chunk");
            None
        }
    }

    /// Stops accepting jobs and joins the workers.
    ///
    /// Jobs still queued are discarded; a job in progress runs to completion.
    pub fn shutdown(&mut self) {
        if self.jobs.is_none() {
            return;
        }
        self.shared.shutdown.store(true, Ordering::Release);
        self.jobs = None;

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("chunk worker panicked");
            }
        }
        self.shared.wanted.lock().clear();
        tracing::info!("chunk worker pool stopped");
    }
}

impl Drop for ChunkWorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    id: usize,
    jobs: &Receiver<ChunkCoord>,
    results: &Sender<GeneratedChunk>,
    generator: &TerrainGenerator,
    source: &dyn ModificationSource,
    shared: &Shared,
) {
    while let Ok(coord) = jobs.recv() {
        if shared.shutdown.load(Ordering::Acquire) {
            break;
        }
        if !shared.wanted.lock().contains(&coord) {
            tracing::trace!(worker = id, chunk = ?coord, "skipping cancelled job");
            continue;
        }

        let chunk = generator.generate_chunk_from(coord, source);
        if results.send(chunk).is_err() {
            break;
        }
    }
    tracing::debug!(worker = id, "chunk worker exiting");
}
