//! # Loaded Chunks
//!
//! The chunks currently in memory, each behind its own lock: one writer
//! (an edit) or many readers (meshing, physics) at a time.
//!
//! A brush edit touches every loaded chunk whose padded grid overlaps it,
//! so the shared border voxels of neighbours stay identical. Each chunk's
//! changes are recorded into the modification store before its lock is
//! released, keeping the stored order equal to the applied order.

use std::collections::HashMap;
use std::sync::Arc;

use grove_procedural::edit::DIG_JITTER;
use grove_procedural::{
    ChunkCoord, EditParams, GeneratedChunk, LiquidBrush, MaterialId, ModificationStore,
    TerrainGenerator, VoxelGrid, PAD,
};
use parking_lot::RwLock;

use crate::error::{StreamingError, StreamingResult};
use crate::pool::ChunkWorkerPool;

/// Turns a chunk's voxel layers into renderable buffers.
pub trait Mesher {
    /// Mesh output.
    type Mesh;

    /// Meshes one grid. Called under the chunk's read lock.
    fn mesh(&self, grid: &VoxelGrid) -> Self::Mesh;
}

/// A loaded chunk.
pub type SharedChunk = Arc<RwLock<GeneratedChunk>>;

/// Loaded chunk cache backed by a modification store.
pub struct LoadedChunks<S: ModificationStore> {
    generator: Arc<TerrainGenerator>,
    store: Arc<S>,
    chunks: RwLock<HashMap<ChunkCoord, SharedChunk>>,
}

impl<S: ModificationStore> LoadedChunks<S> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(generator: Arc<TerrainGenerator>, store: Arc<S>) -> Self {
        Self {
            generator,
            store,
            chunks: RwLock::new(HashMap::new()),
        }
    }

    /// The generator chunks are loaded with.
    #[must_use]
    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    /// The store edits are recorded into.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Adds or replaces a chunk.
    pub fn insert(&self, chunk: GeneratedChunk) -> SharedChunk {
        let coord = chunk.coord;
        let shared = Arc::new(RwLock::new(chunk));
        self.chunks.write().insert(coord, Arc::clone(&shared));
        shared
    }

    /// Returns the chunk, generating it on this thread if it is not loaded.
    pub fn load(&self, coord: ChunkCoord) -> SharedChunk {
        if let Some(chunk) = self.get(coord) {
            return chunk;
        }
        let chunk = self.generator.generate_chunk_from(coord, self.store.as_ref());
        // Another thread may have loaded it meanwhile; keep the first.
        Arc::clone(
            self.chunks
                .write()
                .entry(coord)
                .or_insert_with(|| Arc::new(RwLock::new(chunk))),
        )
    }

    /// Moves up to `max` finished chunks from the pool into the cache.
    ///
    /// Returns the number inserted.
    pub fn accept_ready(&self, pool: &ChunkWorkerPool, max: usize) -> usize {
        let ready = pool.poll(max);
        let count = ready.len();
        for chunk in ready {
            self.insert(chunk);
        }
        count
    }

    /// The chunk, if loaded.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<SharedChunk> {
        self.chunks.read().get(&coord).cloned()
    }

    /// Removes a chunk. Its edits are already in the store.
    pub fn unload(&self, coord: ChunkCoord) -> Option<SharedChunk> {
        self.chunks.write().remove(&coord)
    }

    /// Returns true if the chunk is loaded.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.read().contains_key(&coord)
    }

    /// Number of loaded chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Returns true if nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Meshes a loaded chunk under its read lock.
    ///
    /// # Errors
    ///
    /// [`StreamingError::ChunkNotLoaded`] if the chunk is not loaded.
    pub fn mesh<M: Mesher>(&self, coord: ChunkCoord, mesher: &M) -> StreamingResult<M::Mesh> {
        let chunk = self.get(coord).ok_or(StreamingError::ChunkNotLoaded {
            cx: coord.x,
            cz: coord.z,
        })?;
        let chunk = chunk.read();
        Ok(mesher.mesh(&chunk.grid))
    }

    /// Applies a density brush centred at a world position.
    ///
    /// Returns the number of voxel records written across all chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a record. Chunks edited before
    /// the failure keep their changes.
    pub fn edit(&self, world_center: [f32; 3], radius: f32, delta: f32, material: MaterialId) -> StreamingResult<usize> {
        let mut written = 0;
        let mut touched = 0;
        for (coord, chunk) in self.overlapping(world_center, radius + DIG_JITTER) {
            let params = EditParams {
                center: coord.world_to_grid(world_center),
                radius,
                delta,
                material,
            };
            let mut chunk = chunk.write();
            let outcome = self.generator.modify_chunk(&mut chunk, &params);
            if outcome.is_empty() {
                continue;
            }
            self.store.record(coord, &outcome.modified)?;
            written += outcome.modified.len();
            touched += 1;
        }

        tracing::debug!(center = ?world_center, radius, delta, chunks = touched, voxels = written, "brush edit");
        Ok(written)
    }

    /// Paints liquid centred at a world position.
    ///
    /// Returns the number of voxel records written across all chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a record.
    pub fn paint_liquid(&self, world_center: [f32; 3], radius: f32, material: MaterialId) -> StreamingResult<usize> {
        let mut written = 0;
        for (coord, chunk) in self.overlapping(world_center, radius) {
            let brush = LiquidBrush {
                center: coord.world_to_grid(world_center),
                radius,
                material,
            };
            let mut chunk = chunk.write();
            let outcome = self.generator.paint_liquid(&mut chunk, &brush);
            if outcome.is_empty() {
                continue;
            }
            self.store.record(coord, &outcome.modified)?;
            written += outcome.modified.len();
        }
        Ok(written)
    }

    /// Loaded chunks whose padded grid may intersect a sphere.
    fn overlapping(&self, world_center: [f32; 3], reach: f32) -> Vec<(ChunkCoord, SharedChunk)> {
        let span = reach.max(0.0) + PAD as f32;
        let lo = ChunkCoord::from_world_pos(
            (world_center[0] - span).floor() as i32,
            (world_center[2] - span).floor() as i32,
        );
        let hi = ChunkCoord::from_world_pos(
            (world_center[0] + span).floor() as i32,
            (world_center[2] + span).floor() as i32,
        );

        let chunks = self.chunks.read();
        let mut found = Vec::new();
        for z in lo.z..=hi.z {
            for x in lo.x..=hi.x {
                let coord = ChunkCoord::new(x, z);
                if let Some(chunk) = chunks.get(&coord) {
                    found.push((coord, Arc::clone(chunk)));
                }
            }
        }
        found
    }
}
