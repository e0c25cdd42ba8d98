//! # Grove Procedural Generation
//!
//! Deterministic voxel terrain: density, materials and placements for a
//! chunk from nothing but a seed and a chunk coordinate.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and world type always produce the same chunk
//! 2. **Seamless**: Every value is a function of world coordinates, so
//!    neighbouring chunks agree on their shared border
//! 3. **Shareable**: The generator is read-only; one instance serves every
//!    worker thread
//! 4. **Edits win**: Persisted modifications replay after generation
//!
//! ## Core Components
//!
//! - `NoiseField`: 2D/3D value noise and positional hashes
//! - `BiomeManager`: Climate, biomes and terrain shaping parameters
//! - `DensityField`: Surface, overhangs, caves and the hysteresis nudge
//! - `MaterialClassifier`: Materials, hint layers and sea water
//! - `PlacementGenerator`: Point entities scattered over the finished grid
//! - `EditEngine`: Dig, build and liquid brushes
//! - `TerrainGenerator`: The generation context tying it all together
//!
//! ## Example
//!
//! ```rust,ignore
//! use grove_procedural::{ChunkCoord, GenerationConfig, MemoryModificationStore, TerrainGenerator};
//!
//! let generator = TerrainGenerator::new(GenerationConfig::from_file("grove.toml")?);
//! let store = MemoryModificationStore::new();
//!
//! let chunk = generator.generate_chunk_from(ChunkCoord::new(0, 0), &store);
//! println!("{} trees", chunk.placements.trees.len());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_wrap)]

pub mod biome;
pub mod chunk;
pub mod config;
pub mod density;
pub mod edit;
pub mod error;
pub mod generator;
pub mod material;
pub mod modifications;
pub mod noise;
pub mod placement;

pub use biome::{Biome, BiomeManager, BiomeProfile, Climate, SpecialZone, TerrainParams, WorldType};
pub use chunk::{
    grid_index, ChunkCoord, GeneratedChunk, MaterialId, VoxelGrid, CHUNK_SIZE_XZ, CHUNK_SIZE_Y,
    ISO_LEVEL, MESH_Y_OFFSET, PAD, TOTAL_SIZE_XZ, TOTAL_SIZE_Y, VOXELS_PER_CHUNK, WATER_LEVEL,
};
pub use config::{GenerationConfig, PlacementCaps};
pub use density::{ColumnSample, DensityField};
pub use edit::{EditEngine, EditOutcome, EditParams, LiquidBrush};
pub use error::{GroveError, GroveResult};
pub use generator::TerrainGenerator;
pub use material::{fill_sea_water, MaterialClassifier};
pub use modifications::{
    apply_modifications, ChunkModification, FileModificationStore, MemoryModificationStore,
    ModificationSource, ModificationStore,
};
pub use noise::{NoiseField, WorldSeed};
pub use placement::{ChunkPlacements, PlacementGenerator, PlacementPoint, TreeInstance, TreeKind};
