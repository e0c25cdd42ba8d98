//! Integration test for modification persistence and replay.

use grove_procedural::{
    ChunkCoord, EditParams, FileModificationStore, GenerationConfig, GroveError, MaterialId,
    ModificationSource, ModificationStore, TerrainGenerator, WorldType, PAD,
};

fn temp_store_path(name: &str) -> std::path::PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("test_grove_{name}_{id}"))
}

#[test]
fn test_edits_survive_reload() {
    let path = temp_store_path("mods");
    let generator = TerrainGenerator::with_seed(1337);
    let coord = ChunkCoord::new(0, 0);

    let mut edited = generator.generate_chunk(coord, &[]);
    let (x, z) = (PAD + 16, PAD + 16);
    let (top, _) = edited.grid.top_surface(x, z).expect("origin column has ground");

    {
        let store = FileModificationStore::open(&path).unwrap();
        for (i, delta) in [-6.0, 4.0, -9.0].into_iter().enumerate() {
            let outcome = generator.modify_chunk(
                &mut edited,
                &EditParams {
                    center: [x as f32 + i as f32, top as f32, z as f32],
                    radius: 3.5,
                    delta,
                    material: MaterialId::Dirt,
                },
            );
            store.record(coord, &outcome.modified).unwrap();
        }
    }

    let store = FileModificationStore::open(&path).unwrap();
    let reloaded = generator.generate_chunk_from(coord, &store);
    assert!(reloaded.replayed_modifications > 0);
    assert_eq!(reloaded.grid, edited.grid);

    let untouched = generator.generate_chunk_from(ChunkCoord::new(9, 9), &store);
    assert_eq!(untouched.replayed_modifications, 0);

    std::fs::remove_dir_all(&path).ok();
}

#[test]
fn test_corrupt_file_is_reported() {
    let path = temp_store_path("corrupt");
    let store = FileModificationStore::open(&path).unwrap();
    let coord = ChunkCoord::new(-2, 5);
    std::fs::write(store.chunk_path(coord), [9, 0, 0, 0, 1, 2, 3]).unwrap();

    let err = store.get_modifications(coord).unwrap_err();
    assert!(matches!(err, GroveError::CorruptModifications { cx: -2, cz: 5, .. }));

    // Generation still succeeds, without replay.
    let generator = TerrainGenerator::with_seed(1);
    let chunk = generator.generate_chunk_from(coord, &store);
    assert_eq!(chunk, generator.generate_chunk(coord, &[]));

    std::fs::remove_dir_all(&path).ok();
}

#[test]
fn test_config_file_drives_generation() {
    let path = temp_store_path("config");
    std::fs::create_dir_all(&path).unwrap();
    let file = path.join("grove.toml");
    std::fs::write(
        &file,
        "seed = 99\nworld_type = \"frozen\"\n\n[caps]\nmax_trees = 3\n",
    )
    .unwrap();

    let config = GenerationConfig::from_file(&file).unwrap();
    assert_eq!(config.seed, 99);
    assert_eq!(config.world_type, WorldType::Frozen);
    assert_eq!(config.caps.max_trees, 3);

    let generator = TerrainGenerator::new(config);
    for cx in -2..2 {
        let chunk = generator.generate_chunk(ChunkCoord::new(cx, 0), &[]);
        assert!(chunk.placements.trees.len() <= 3);
    }

    std::fs::remove_dir_all(&path).ok();
}
