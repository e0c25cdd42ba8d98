//! # Terrain Quality Integration Test
//!
//! Whole-chunk properties that hold for every seed: determinism, seamless
//! borders, no degenerate densities, contained sea water.

use grove_procedural::density::OVERHANG_AMPLITUDE;
use grove_procedural::{
    grid_index, Biome, ChunkCoord, DensityField, GenerationConfig, MaterialId, TerrainGenerator, WorldType,
    CHUNK_SIZE_XZ, ISO_LEVEL, PAD, TOTAL_SIZE_XZ, TOTAL_SIZE_Y,
};

const SEEDS: [u64; 3] = [1337, 42, 0xDEAD_BEEF];

#[test]
fn test_generation_is_deterministic() {
    for seed in SEEDS {
        let a = TerrainGenerator::with_seed(seed);
        let b = TerrainGenerator::with_seed(seed);
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 7)] {
            assert_eq!(
                a.generate_chunk(coord, &[]),
                b.generate_chunk(coord, &[]),
                "Seed {seed} chunk {coord:?} differs between runs"
            );
        }
    }
}

#[test]
fn test_no_voxel_sits_on_iso_level() {
    for seed in SEEDS {
        let generator = TerrainGenerator::with_seed(seed);
        let chunk = generator.generate_chunk(ChunkCoord::new(2, -1), &[]);
        let on_iso = chunk.grid.density.iter().filter(|&&d| d == ISO_LEVEL).count();
        assert_eq!(on_iso, 0, "Seed {seed}: {on_iso} voxels exactly on ISO_LEVEL");
    }
}

#[test]
fn test_neighbour_borders_agree_along_x() {
    let generator = TerrainGenerator::with_seed(1337);
    let left = generator.generate_chunk(ChunkCoord::new(0, 0), &[]);
    let right = generator.generate_chunk(ChunkCoord::new(1, 0), &[]);

    // Left grid x 32..36 and right grid x 0..4 cover world x 30..34.
    for z in 0..TOTAL_SIZE_XZ {
        for y in 0..TOTAL_SIZE_Y {
            for offset in 0..PAD * 2 {
                let a = grid_index(CHUNK_SIZE_XZ + offset, y, z);
                let b = grid_index(offset, y, z);
                assert_eq!(left.grid.density[a], right.grid.density[b], "density at z={z} y={y} +{offset}");
                assert_eq!(left.grid.material[a], right.grid.material[b], "material at z={z} y={y} +{offset}");
            }
        }
    }
}

#[test]
fn test_neighbour_borders_agree_along_z() {
    let generator = TerrainGenerator::with_seed(1337);
    let near = generator.generate_chunk(ChunkCoord::new(-2, 3), &[]);
    let far = generator.generate_chunk(ChunkCoord::new(-2, 4), &[]);

    // Near grid z 32..36 and far grid z 0..4 cover the same world rows.
    for x in 0..TOTAL_SIZE_XZ {
        for y in 0..TOTAL_SIZE_Y {
            for offset in 0..PAD * 2 {
                let a = grid_index(x, y, CHUNK_SIZE_XZ + offset);
                let b = grid_index(x, y, offset);
                assert_eq!(near.grid.density[a], far.grid.density[b], "density at x={x} y={y} +{offset}");
                assert_eq!(near.grid.material[a], far.grid.material[b], "material at x={x} y={y} +{offset}");
            }
        }
    }
}

#[test]
fn test_height_query_matches_grid() {
    let generator = TerrainGenerator::with_seed(1337);
    let field = DensityField::new(generator.seed());

    let mut checked = 0;
    for coord in [ChunkCoord::new(1, 2), ChunkCoord::new(0, 0), ChunkCoord::new(-4, 3)] {
        let chunk = generator.generate_chunk(coord, &[]);
        for z in (PAD..PAD + CHUNK_SIZE_XZ).step_by(3) {
            for x in (PAD..PAD + CHUNK_SIZE_XZ).step_by(3) {
                let wx = coord.world_x(x) as f32;
                let wz = coord.world_z(z) as f32;
                // Breached columns can open straight into a cave.
                if field.column(generator.biomes(), wx, wz).breach {
                    continue;
                }
                let Some((_, crossing)) = chunk.grid.top_surface(x, z) else {
                    continue;
                };
                let expected = generator.get_height_at(wx, wz);
                assert!(
                    (crossing - expected).abs() <= OVERHANG_AMPLITUDE,
                    "Column ({wx}, {wz}): grid surface {crossing}, query {expected}"
                );
                checked += 1;
            }
        }
    }
    assert!(checked > 100, "Only {checked} columns checked");
}

#[test]
fn test_sea_water_is_open_to_sky() {
    for seed in SEEDS {
        let generator = TerrainGenerator::with_seed(seed);
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(5, -4), ChunkCoord::new(-9, 3)] {
            let chunk = generator.generate_chunk(coord, &[]);
            for z in 0..TOTAL_SIZE_XZ {
                for x in 0..TOTAL_SIZE_XZ {
                    for y in 0..TOTAL_SIZE_Y {
                        if chunk.grid.material_at(x, y, z) != MaterialId::Water {
                            continue;
                        }
                        assert!(!chunk.grid.is_solid(x, y, z), "Water inside solid at {x},{y},{z}");
                        let covered = (y + 1..TOTAL_SIZE_Y).any(|above| chunk.grid.is_solid(x, above, z));
                        assert!(!covered, "Seed {seed} chunk {coord:?}: water under a roof at {x},{y},{z}");
                    }
                }
            }
        }
    }
}

#[test]
fn test_at_most_one_root_hollow_per_chunk() {
    let generator = TerrainGenerator::with_seed(1337);
    for cz in -3..3 {
        for cx in -3..3 {
            let chunk = generator.generate_chunk(ChunkCoord::new(cx, cz), &[]);
            assert!(chunk.placements.root_hollows.len() <= 1);
        }
    }
}

#[test]
fn test_placements_respect_caps() {
    let generator = TerrainGenerator::with_seed(99);
    let caps = generator.config().caps;
    for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(4, 4), ChunkCoord::new(-6, 1)] {
        let p = generator.generate_chunk(coord, &[]).placements;
        assert!(p.flora.len() <= caps.max_flora);
        assert!(p.trees.len() <= caps.max_trees);
        assert!(p.sticks.len() <= caps.max_sticks);
        assert!(p.rocks.len() <= caps.max_rocks);
        assert!(p.large_rocks.len() <= caps.max_large_rocks);
        assert!(p.fireflies.len() <= caps.max_firefly_swarms * caps.max_motes_per_swarm);
    }
}

#[test]
fn test_default_seed_spawns_temperate() {
    let generator = TerrainGenerator::new(GenerationConfig::default());
    assert_eq!(generator.seed().value(), 1337);
    let biome = generator.get_biome_at(0.0, 0.0);
    assert!(biome.is_temperate(), "Origin biome was {biome:?}");
}

#[test]
fn test_archipelago_has_floor_and_islands() {
    let generator = TerrainGenerator::new(GenerationConfig {
        world_type: WorldType::Archipelago,
        ..GenerationConfig::with_seed(1337)
    });
    let chunk = generator.generate_chunk(ChunkCoord::new(0, 0), &[]);

    assert_eq!(generator.get_biome_at(0.0, 0.0), Biome::SkyIslands);
    for z in 0..TOTAL_SIZE_XZ {
        for x in 0..TOTAL_SIZE_XZ {
            assert!(chunk.grid.is_solid(x, 0, z), "Missing world floor at {x},{z}");
        }
    }
}
