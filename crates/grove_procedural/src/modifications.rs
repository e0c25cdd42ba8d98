//! # Chunk Modifications
//!
//! Replay log of edits made to generated chunks.
//!
//! ## Design
//!
//! An edit produces [`ChunkModification`] records. They are stored per chunk
//! in write order and replayed after generation, so the newest record for a
//! voxel wins.
//!
//! - [`MemoryModificationStore`]: in-process map, for tests and servers
//!   that persist elsewhere
//! - [`FileModificationStore`]: one append-only file per chunk, each frame
//!   an LZ4 block of raw records

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use parking_lot::{Mutex, RwLock};

use crate::chunk::{ChunkCoord, VoxelGrid, VOXELS_PER_CHUNK};
use crate::error::{GroveError, GroveResult};

/// One replayed voxel write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkModification {
    /// Index into the padded grid.
    pub voxel_index: u32,
    /// Density to write.
    pub density: f32,
    /// Material id to write.
    pub material: u8,
    _padding: [u8; 3],
}

impl ChunkModification {
    /// Size of one record on disk.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a record.
    #[must_use]
    pub const fn new(voxel_index: u32, density: f32, material: u8) -> Self {
        Self {
            voxel_index,
            density,
            material,
            _padding: [0; 3],
        }
    }
}

/// Where generation fetches prior modifications from.
pub trait ModificationSource: Send + Sync {
    /// Modifications for a chunk in application order.
    ///
    /// # Errors
    ///
    /// Any error; the generator logs it and skips replay.
    fn get_modifications(&self, coord: ChunkCoord) -> GroveResult<Vec<ChunkModification>>;
}

/// A source that also accepts new records.
pub trait ModificationStore: ModificationSource {
    /// Appends records for a chunk after everything already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the records could not be stored.
    fn record(&self, coord: ChunkCoord, modifications: &[ChunkModification]) -> GroveResult<()>;
}

/// Applies records to a grid in order. Out-of-range indices are skipped.
///
/// Returns the number of records applied.
pub fn apply_modifications(grid: &mut VoxelGrid, modifications: &[ChunkModification]) -> usize {
    let mut applied = 0;
    for m in modifications {
        let index = m.voxel_index as usize;
        if index >= VOXELS_PER_CHUNK {
            continue;
        }
        grid.density[index] = m.density;
        grid.material[index] = m.material;
        applied += 1;
    }
    applied
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryModificationStore {
    chunks: RwLock<HashMap<ChunkCoord, Vec<ChunkModification>>>,
}

impl MemoryModificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks with at least one record.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }
}

impl ModificationSource for MemoryModificationStore {
    fn get_modifications(&self, coord: ChunkCoord) -> GroveResult<Vec<ChunkModification>> {
        Ok(self.chunks.read().get(&coord).cloned().unwrap_or_default())
    }
}

impl ModificationStore for MemoryModificationStore {
    fn record(&self, coord: ChunkCoord, modifications: &[ChunkModification]) -> GroveResult<()> {
        if modifications.is_empty() {
            return Ok(());
        }
        self.chunks
            .write()
            .entry(coord)
            .or_default()
            .extend_from_slice(modifications);
        Ok(())
    }
}

/// File-backed store: `<root>/c.<x>.<z>.mods`, one file per chunk.
///
/// Each append writes one frame: a little-endian `u32` byte length followed
/// by an LZ4 block (size-prepended) of raw records.
pub struct FileModificationStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileModificationStore {
    /// Opens (creating if needed) a store directory.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::Io`] if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> GroveResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| GroveError::io(&root, e))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Store directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding a chunk's records.
    #[must_use]
    pub fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        self.root.join(format!("c.{}.{}.mods", coord.x, coord.z))
    }

    fn decode(coord: ChunkCoord, bytes: &[u8]) -> GroveResult<Vec<ChunkModification>> {
        let corrupt = |reason: String| GroveError::CorruptModifications {
            cx: coord.x,
            cz: coord.z,
            reason,
        };

        let mut records = Vec::new();
        let mut rest = bytes;
        while !rest.is_empty() {
            let Some((header, body)) = rest.split_first_chunk::<4>() else {
                return Err(corrupt(format!("truncated frame header ({} bytes)", rest.len())));
            };
            let frame_len = u32::from_le_bytes(*header) as usize;
            if body.len() < frame_len {
                return Err(corrupt(format!("frame of {frame_len} bytes, {} left", body.len())));
            }
            let (frame, tail) = body.split_at(frame_len);

            let raw = decompress_size_prepended(frame).map_err(|e| corrupt(e.to_string()))?;
            if raw.len() % ChunkModification::SIZE != 0 {
                return Err(corrupt(format!("payload of {} bytes is not whole records", raw.len())));
            }
            records.extend(bytemuck::pod_collect_to_vec::<u8, ChunkModification>(&raw));
            rest = tail;
        }
        Ok(records)
    }
}

impl ModificationSource for FileModificationStore {
    fn get_modifications(&self, coord: ChunkCoord) -> GroveResult<Vec<ChunkModification>> {
        let path = self.chunk_path(coord);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GroveError::io(path, e)),
        };
        Self::decode(coord, &bytes)
    }
}

impl ModificationStore for FileModificationStore {
    fn record(&self, coord: ChunkCoord, modifications: &[ChunkModification]) -> GroveResult<()> {
        if modifications.is_empty() {
            return Ok(());
        }

        let compressed = compress_prepend_size(bytemuck::cast_slice(modifications));
        let frame_len = u32::try_from(compressed.len()).map_err(|_| GroveError::CorruptModifications {
            cx: coord.x,
            cz: coord.z,
            reason: format!("frame of {} bytes does not fit the length header", compressed.len()),
        })?;

        let mut frame = Vec::with_capacity(4 + compressed.len());
        frame.extend_from_slice(&frame_len.to_le_bytes());
        frame.extend_from_slice(&compressed);

        let path = self.chunk_path(coord);
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| GroveError::io(&path, e))?;
        file.write_all(&frame).map_err(|e| GroveError::io(&path, e))?;

        tracing::trace!(chunk = ?coord, records = modifications.len(), "modifications appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{MaterialId, ISO_LEVEL};

    #[test]
    fn test_record_layout() {
        assert_eq!(ChunkModification::SIZE, 12);
    }

    #[test]
    fn test_apply_skips_out_of_range() {
        let mut grid = VoxelGrid::new();
        let mods = [
            ChunkModification::new(5, ISO_LEVEL + 1.0, MaterialId::Stone.id()),
            ChunkModification::new(VOXELS_PER_CHUNK as u32, 9.0, MaterialId::Dirt.id()),
            ChunkModification::new(5, ISO_LEVEL + 2.0, MaterialId::Sand.id()),
        ];
        assert_eq!(apply_modifications(&mut grid, &mods), 2);
        assert_eq!(grid.density[5], ISO_LEVEL + 2.0);
        assert_eq!(grid.material[5], MaterialId::Sand.id());
    }

    #[test]
    fn test_memory_store_keeps_order() {
        let store = MemoryModificationStore::new();
        let coord = ChunkCoord::new(3, -4);
        store.record(coord, &[ChunkModification::new(1, 1.0, 2)]).unwrap();
        store.record(coord, &[ChunkModification::new(1, 2.0, 3)]).unwrap();
        store.record(coord, &[]).unwrap();

        let mods = store.get_modifications(coord).unwrap();
        assert_eq!(mods.len(), 2);
        assert_eq!(mods[1].density, 2.0);
        assert!(store.get_modifications(ChunkCoord::new(0, 0)).unwrap().is_empty());
        assert_eq!(store.chunk_count(), 1);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let coord = ChunkCoord::new(0, 0);
        assert!(FileModificationStore::decode(coord, &[1, 2]).is_err());
        assert!(FileModificationStore::decode(coord, &[200, 0, 0, 0, 1]).is_err());
        assert!(FileModificationStore::decode(coord, &[]).unwrap().is_empty());
    }
}
