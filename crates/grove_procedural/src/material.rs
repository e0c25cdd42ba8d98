//! # Material Classifier
//!
//! Turns a finished density layer into per-voxel materials plus the
//! wetness and mossiness hint layers, then floods the sea.
//!
//! Classification is by depth below the column surface:
//!
//! | Band                     | Material                         |
//! |--------------------------|----------------------------------|
//! | World floor              | Bedrock                          |
//! | Deep (low Y, far down)   | Basalt, rare GlowStone           |
//! | Top `SURFACE_DEPTH`      | Biome surface (dithered)         |
//! | Down to soil depth       | Subsoil                          |
//! | Below                    | Biome primary / secondary rock   |

use crate::biome::{Biome, BiomeManager};
use crate::chunk::{
    grid_index, world_y, ChunkCoord, MaterialId, VoxelGrid, ISO_LEVEL, MESH_Y_OFFSET, PAD,
    TOTAL_SIZE_XZ, TOTAL_SIZE_Y, WATER_LEVEL, WORLD_FLOOR_Y,
};
use crate::density::{ChunkColumns, ColumnSample};
use crate::noise::{hash01, NoiseField, WorldSeed};

/// Voxels at or below `WORLD_FLOOR_Y + BEDROCK_LAYERS - 1` are bedrock.
pub const BEDROCK_LAYERS: i32 = 2;

/// World Y below which the deep band may start.
pub const DEEP_BAND_Y: i32 = -12;

/// Depth under the local surface the deep band requires.
pub const DEEP_MIN_DEPTH: f32 = 16.0;

/// Chance a deep voxel is glow stone.
pub const GLOW_CHANCE: f32 = 0.015;

/// Depth of the biome surface material.
pub const SURFACE_DEPTH: f32 = 1.5;

/// Solid voxels under open water that get marked wet.
pub const WET_DEPTH: usize = 3;

/// Wetness of a submerged voxel.
pub const WET_FULL: u8 = 255;

const SOIL_BASE_DEPTH: f32 = 3.0;
const SOIL_JITTER: f32 = 2.0;
const VEIN_SCALE: f32 = 0.08;
const VEIN_THRESHOLD: f32 = 0.35;
const MOSS_SCALE: f32 = 0.11;

/// Per-voxel material, wetness and mossiness assignment.
pub struct MaterialClassifier {
    veins: NoiseField,
    soil: NoiseField,
    moss: NoiseField,
    glow_key: u32,
}

impl MaterialClassifier {
    /// Creates the classifier for a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            veins: NoiseField::new(seed.derive(40)),
            soil: NoiseField::new(seed.derive(41)),
            moss: NoiseField::new(seed.derive(42)),
            glow_key: seed.derive(43).hash_key(),
        }
    }

    /// Material for one solid voxel.
    #[must_use]
    pub fn classify(
        &self,
        biomes: &BiomeManager,
        column: &ColumnSample,
        wx: i32,
        wy: i32,
        wz: i32,
    ) -> MaterialId {
        if wy < WORLD_FLOOR_Y + BEDROCK_LAYERS {
            return MaterialId::Bedrock;
        }

        let depth = column.surface - wy as f32;

        if wy < DEEP_BAND_Y && depth > DEEP_MIN_DEPTH {
            return if hash01(self.glow_key, wx, wy, wz) < GLOW_CHANCE {
                MaterialId::GlowStone
            } else {
                MaterialId::Basalt
            };
        }

        let (x, y, z) = (wx as f32, wy as f32, wz as f32);

        if depth < SURFACE_DEPTH {
            if column.surface < WATER_LEVEL {
                return if column.climate.humidity > 0.2 {
                    MaterialId::Clay
                } else {
                    MaterialId::Sand
                };
            }
            let biome = biomes.biome_dithered(&column.climate, wx, wy, wz);
            return BiomeManager::get_surface_material(biome);
        }

        let soil_depth = SOIL_BASE_DEPTH + self.soil.sample2(x * 0.07, z * 0.07) * SOIL_JITTER;
        if depth < soil_depth {
            return subsoil(column.biome);
        }

        let rock = BiomeManager::get_underground_materials(column.biome);
        if self.veins.sample3(x * VEIN_SCALE, y * VEIN_SCALE, z * VEIN_SCALE) > VEIN_THRESHOLD {
            rock.secondary
        } else {
            rock.primary
        }
    }

    /// Assigns materials and mossiness for a chunk whose density is filled.
    pub fn apply(&self, biomes: &BiomeManager, coord: ChunkCoord, columns: &ChunkColumns, grid: &mut VoxelGrid) {
        for z in 0..TOTAL_SIZE_XZ {
            for x in 0..TOTAL_SIZE_XZ {
                let column = columns.at(x, z);
                let wx = coord.world_x(x);
                let wz = coord.world_z(z);
                let moss_hint = column.biome.profile().moss;

                for y in 0..TOTAL_SIZE_Y {
                    let index = grid_index(x, y, z);
                    if grid.density[index] <= ISO_LEVEL {
                        grid.material[index] = MaterialId::Air.id();
                        continue;
                    }

                    let wy = world_y(y);
                    let material = self.classify(biomes, column, wx, wy, wz);
                    grid.material[index] = material.id();

                    if material != MaterialId::Bedrock && touches_air(grid, x, y, z) {
                        let n = self.moss.sample3(wx as f32 * MOSS_SCALE, wy as f32 * MOSS_SCALE, wz as f32 * MOSS_SCALE);
                        let underground = column.surface - wy as f32 > column.crust.max(SURFACE_DEPTH);
                        let base = if underground { 0.35 + column.climate.humidity.max(0.0) * 0.4 } else { moss_hint };
                        let moss = (base * (0.6 + 0.4 * n)).clamp(0.0, 1.0);
                        grid.mossiness[index] = (moss * 255.0) as u8;
                    }
                }
            }
        }
    }
}

/// Soil between the surface material and rock.
fn subsoil(biome: Biome) -> MaterialId {
    match biome {
        Biome::Desert | Biome::Beach => MaterialId::Sand,
        Biome::IcePlains => MaterialId::Ice,
        _ => MaterialId::Dirt,
    }
}

/// Returns true if any in-grid axis neighbour is on the air side.
fn touches_air(grid: &VoxelGrid, x: usize, y: usize, z: usize) -> bool {
    let neighbours = [
        (x.wrapping_sub(1), y, z),
        (x + 1, y, z),
        (x, y.wrapping_sub(1), z),
        (x, y + 1, z),
        (x, y, z.wrapping_sub(1)),
        (x, y, z + 1),
    ];
    neighbours.into_iter().any(|(nx, ny, nz)| {
        nx < TOTAL_SIZE_XZ && ny < TOTAL_SIZE_Y && nz < TOTAL_SIZE_XZ && !grid.is_solid(nx, ny, nz)
    })
}

/// Grid Y of the highest voxel at or below sea level.
#[must_use]
pub fn sea_level_grid_y() -> usize {
    let y = WATER_LEVEL.floor() as i32 - MESH_Y_OFFSET + PAD as i32;
    y.clamp(0, TOTAL_SIZE_Y as i32 - 1) as usize
}

/// Floods sea water into columns open to the sky.
///
/// A column qualifies only if every voxel from sea level to the top of the
/// grid is air, so sealed caves below sea level stay dry. Water fills down
/// to the first solid voxel, and only the top [`WET_DEPTH`] solid voxels
/// under it are marked wet. Returns the number of water voxels written.
pub fn fill_sea_water(grid: &mut VoxelGrid) -> usize {
    let sea_y = sea_level_grid_y();
    let mut filled = 0;

    for z in 0..TOTAL_SIZE_XZ {
        for x in 0..TOTAL_SIZE_XZ {
            let open_to_sky = (sea_y..TOTAL_SIZE_Y).all(|y| !grid.is_solid(x, y, z));
            if !open_to_sky {
                continue;
            }

            let mut y = sea_y;
            loop {
                let index = grid_index(x, y, z);
                if grid.density[index] > ISO_LEVEL {
                    break;
                }
                grid.material[index] = MaterialId::Water.id();
                grid.wetness[index] = WET_FULL;
                filled += 1;
                if y == 0 {
                    break;
                }
                y -= 1;
            }

            if grid.is_solid(x, y, z) {
                for (i, wet_y) in (0..=y).rev().take(WET_DEPTH).enumerate() {
                    let index = grid_index(x, wet_y, z);
                    let wetness = WET_FULL - (i as u8) * 60;
                    grid.wetness[index] = grid.wetness[index].max(wetness);
                }
            }
        }
    }

    filled
}
