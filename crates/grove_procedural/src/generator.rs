//! # Terrain Generator
//!
//! The generation context: one seed, one world type, every noise set built
//! once. Share it between worker threads behind an `Arc`; nothing in it is
//! mutable after construction.
//!
//! ## Chunk Pipeline
//!
//! 1. Density (per column, then per voxel)
//! 2. Materials and hint layers
//! 3. Sea water post-pass
//! 4. Placement passes
//! 5. Persisted modifications, last, in stored order

use crate::biome::{Biome, BiomeManager, WorldType};
use crate::chunk::{ChunkCoord, GeneratedChunk, VoxelGrid};
use crate::config::GenerationConfig;
use crate::density::DensityField;
use crate::edit::{EditEngine, EditOutcome, EditParams, LiquidBrush};
use crate::material::{fill_sea_water, MaterialClassifier};
use crate::modifications::{apply_modifications, ChunkModification, ModificationSource};
use crate::noise::WorldSeed;
use crate::placement::{PlacementContext, PlacementGenerator};

/// Deterministic chunk generator.
pub struct TerrainGenerator {
    config: GenerationConfig,
    seed: WorldSeed,
    biomes: BiomeManager,
    density: DensityField,
    materials: MaterialClassifier,
    placements: PlacementGenerator,
    edits: EditEngine,
}

impl TerrainGenerator {
    /// Builds a generation context.
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        let seed = WorldSeed::new(config.seed);
        Self {
            config,
            seed,
            biomes: BiomeManager::new(seed, config.world_type),
            density: DensityField::new(seed),
            materials: MaterialClassifier::new(seed),
            placements: PlacementGenerator::new(seed),
            edits: EditEngine::new(seed),
        }
    }

    /// Default configuration with a specific seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(GenerationConfig::with_seed(seed))
    }

    /// Configuration this generator was built from.
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// World seed.
    #[must_use]
    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// World type.
    #[must_use]
    pub fn world_type(&self) -> WorldType {
        self.config.world_type
    }

    /// Climate and biome lookups.
    #[must_use]
    pub fn biomes(&self) -> &BiomeManager {
        &self.biomes
    }

    /// Surface height at a world column.
    ///
    /// Goes through the same column sampler as chunk generation, so it
    /// always agrees with the generated grid.
    #[must_use]
    pub fn get_height_at(&self, wx: f32, wz: f32) -> f32 {
        self.density.surface_at(&self.biomes, wx, wz)
    }

    /// Biome at a world column.
    #[must_use]
    pub fn get_biome_at(&self, wx: f32, wz: f32) -> Biome {
        self.biomes.get_biome_at(wx, wz)
    }

    /// Generates a chunk and replays `modifications` on top, in order.
    #[must_use]
    pub fn generate_chunk(&self, coord: ChunkCoord, modifications: &[ChunkModification]) -> GeneratedChunk {
        let mut grid = VoxelGrid::new();

        let columns = self.density.fill(&self.biomes, coord, &mut grid);
        self.materials.apply(&self.biomes, coord, &columns, &mut grid);
        let water = fill_sea_water(&mut grid);

        let placements = self.placements.generate(&PlacementContext {
            coord,
            grid: &grid,
            columns: &columns,
            biomes: &self.biomes,
            density: &self.density,
            caps: &self.config.caps,
        });

        let replayed = apply_modifications(&mut grid, modifications);

        tracing::debug!(
            chunk = ?coord,
            water,
            trees = placements.trees.len(),
            flora = placements.flora.len(),
            rocks = placements.rocks.len(),
            placements = placements.total(),
            replayed,
            "chunk generated"
        );

        GeneratedChunk {
            coord,
            grid,
            placements,
            replayed_modifications: replayed,
        }
    }

    /// Generates a chunk, fetching its modifications from `source`.
    ///
    /// A failing source is logged and replay is skipped; the chunk is still
    /// produced.
    #[must_use]
    pub fn generate_chunk_from(&self, coord: ChunkCoord, source: &dyn ModificationSource) -> GeneratedChunk {
        let modifications = match source.get_modifications(coord) {
            Ok(modifications) => modifications,
            Err(e) => {
                tracing::warn!(chunk = ?coord, error = %e, "modification source failed, skipping replay");
                Vec::new()
            }
        };
        self.generate_chunk(coord, &modifications)
    }

    /// Applies a density brush to a generated chunk.
    pub fn modify_chunk(&self, chunk: &mut GeneratedChunk, params: &EditParams) -> EditOutcome {
        self.edits.modify_chunk(&mut chunk.grid, chunk.coord, params)
    }

    /// Paints liquid into a generated chunk.
    pub fn paint_liquid(&self, chunk: &mut GeneratedChunk, brush: &LiquidBrush) -> EditOutcome {
        self.edits.paint_liquid(&mut chunk.grid, brush)
    }
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self::new(GenerationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GroveError, GroveResult};

    struct FailingSource;

    impl ModificationSource for FailingSource {
        fn get_modifications(&self, _coord: ChunkCoord) -> GroveResult<Vec<ChunkModification>> {
            Err(GroveError::SourceUnavailable("offline".into()))
        }
    }

    #[test]
    fn test_failing_source_still_generates() {
        let generator = TerrainGenerator::with_seed(7);
        let coord = ChunkCoord::new(0, 0);
        let chunk = generator.generate_chunk_from(coord, &FailingSource);
        assert_eq!(chunk.replayed_modifications, 0);
        assert_eq!(chunk, generator.generate_chunk(coord, &[]));
    }

    #[test]
    fn test_modifications_win() {
        let generator = TerrainGenerator::with_seed(7);
        let coord = ChunkCoord::new(1, 1);
        let mods = [ChunkModification::new(100, -3.0, 0), ChunkModification::new(100, 9.0, 2)];
        let chunk = generator.generate_chunk(coord, &mods);
        assert_eq!(chunk.replayed_modifications, 2);
        assert_eq!(chunk.grid.density[100], 9.0);
        assert_eq!(chunk.grid.material[100], 2);
    }

    #[test]
    fn test_world_type_from_config() {
        let generator = TerrainGenerator::new(GenerationConfig {
            world_type: WorldType::Archipelago,
            ..GenerationConfig::default()
        });
        assert_eq!(generator.get_biome_at(500.0, -300.0), Biome::SkyIslands);
    }
}
