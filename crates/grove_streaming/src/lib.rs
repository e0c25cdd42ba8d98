//! # Grove Streaming
//!
//! Runs terrain generation off the caller's thread and keeps the loaded
//! chunks editable.
//!
//! ## Core Components
//!
//! - `ChunkWorkerPool`: background generation with cancellation
//! - `LoadedChunks`: per-chunk locking, brush edits, edit persistence
//! - `Mesher`: the hook a renderer implements to mesh a loaded chunk
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grove_procedural::{ChunkCoord, MemoryModificationStore, TerrainGenerator};
//! use grove_streaming::{ChunkWorkerPool, LoadedChunks, WorkerPoolConfig};
//!
//! let generator = Arc::new(TerrainGenerator::with_seed(1337));
//! let store = Arc::new(MemoryModificationStore::new());
//! let pool = ChunkWorkerPool::new(generator.clone(), store.clone(), WorkerPoolConfig::default())?;
//! let chunks = LoadedChunks::new(generator, store);
//!
//! pool.request_around(ChunkCoord::new(0, 0), 4)?;
//! loop {
//!     chunks.accept_ready(&pool, 16);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

pub mod error;
pub mod loaded;
pub mod pool;

pub use error::{StreamingError, StreamingResult};
pub use loaded::{LoadedChunks, Mesher, SharedChunk};
pub use pool::{ChunkWorkerPool, WorkerPoolConfig};
