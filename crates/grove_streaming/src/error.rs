//! # Streaming Error Types

use grove_procedural::GroveError;
use thiserror::Error;

/// Errors from the worker pool and the loaded chunk cache.
#[derive(Error, Debug)]
pub enum StreamingError {
    /// The pool was shut down; no more jobs are accepted.
    #[error("worker pool is shut down")]
    ShutDown,

    /// The job queue is at capacity.
    #[error("job queue full: capacity {capacity}")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// A worker thread could not be started.
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The pool configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The chunk is not loaded.
    #[error("chunk ({cx}, {cz}) is not loaded")]
    ChunkNotLoaded {
        /// Chunk X.
        cx: i32,
        /// Chunk Z.
        cz: i32,
    },

    /// Error from the terrain core (usually the modification store).
    #[error(transparent)]
    Procedural(#[from] GroveError),
}

/// Result type for streaming operations.
pub type StreamingResult<T> = Result<T, StreamingError>;
