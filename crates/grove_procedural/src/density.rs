//! # Density Field
//!
//! Per-voxel signed density for a chunk.
//!
//! ## Pipeline (per voxel)
//!
//! 1. Column parameters (climate, biome, terrain shaping) resolved once per
//!    `(x, z)` column
//! 2. Domain-warped surface height
//! 3. Overhang noise in a band around the surface
//! 4. Cave SDF, gated by crust thickness
//! 5. Bedrock bias at the world floor
//! 6. Hysteresis nudge away from [`ISO_LEVEL`]
//!
//! Every term is a function of world coordinates only, so two chunks that
//! share a padded border column compute the same values for it.
//!
//! [`DensityField::column`] is the one place surface height is computed.
//! Point queries ([`crate::TerrainGenerator::get_height_at`]) and the chunk
//! loop both go through it.

use crate::biome::{Biome, BiomeManager, Climate, TerrainParams, WorldType, MAX_SURFACE_Y, MIN_SURFACE_Y};
use crate::chunk::{
    grid_index, world_y, ChunkCoord, VoxelGrid, ISO_LEVEL, TOTAL_SIZE_XZ, TOTAL_SIZE_Y,
    WORLD_FLOOR_Y, WORLD_TOP_Y,
};
use crate::noise::{hash3, lerp, smoothstep, NoiseField, WorldSeed};

/// Densities closer than this to [`ISO_LEVEL`] get nudged.
pub const NUDGE_THRESHOLD: f32 = 1e-3;

/// Distance from [`ISO_LEVEL`] a nudged density lands at.
pub const NUDGE_MAGNITUDE: f32 = 2e-3;

/// Thickest crust (away from slopes and breaches).
pub const CRUST_MAX: f32 = 10.0;

/// Thinnest crust on steep slopes.
pub const CRUST_MIN: f32 = 4.0;

/// Half-height of the band around the surface that receives overhang noise.
pub const OVERHANG_BAND: f32 = 8.0;

/// Peak overhang contribution in density units.
pub const OVERHANG_AMPLITUDE: f32 = 2.0;

/// Centre height of the archipelago island layer.
pub const ISLAND_CENTER_Y: f32 = 20.0;

const WARP_SCALE: f32 = 0.004;
const DETAIL_SCALE: f32 = 0.15;
const OVERHANG_SCALE_XZ: f32 = 0.06;
const OVERHANG_SCALE_Y: f32 = 0.08;
const CAVE_SCALE_XZ: f32 = 0.025;
const CAVE_SCALE_Y: f32 = 0.035;
const CAVE_WARP_SCALE: f32 = 0.02;
const CAVE_WARP_STRENGTH: f32 = 6.0;
/// Density units per unit of tunnel field.
const CAVE_SDF_SCALE: f32 = 24.0;
/// Vertical distance over which the cave cap fades in below the crust.
const CAVE_CAP_RAMP: f32 = 3.0;
const CAVE_CAP_BIAS: f32 = 8.0;
const BREACH_SCALE: f32 = 0.012;
const SLOPE_STEP: f32 = 2.0;
const BEDROCK_BAND: f32 = 3.0;
const BEDROCK_BIAS: f32 = 40.0;
const ISLAND_HALF_HEIGHT: f32 = 14.0;
const ISLAND_SCALE: f32 = 10.0;
const SEABED_Y: f32 = -14.0;

/// Everything column-constant that generation needs for one `(x, z)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSample {
    /// Climate at the column.
    pub climate: Climate,
    /// Undithered biome.
    pub biome: Biome,
    /// Terrain shaping parameters.
    pub params: TerrainParams,
    /// Surface height (world Y).
    pub surface: f32,
    /// Minimum solid depth above a cave.
    pub crust: f32,
    /// Caves may open straight to the surface here.
    pub breach: bool,
}

/// Column samples for a whole padded chunk, indexed by grid `(x, z)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkColumns {
    columns: Vec<ColumnSample>,
}

impl ChunkColumns {
    /// Column at grid coordinates.
    #[inline]
    #[must_use]
    pub fn at(&self, x: usize, z: usize) -> &ColumnSample {
        &self.columns[x + z * TOTAL_SIZE_XZ]
    }
}

struct DensityNoise {
    warp_x: NoiseField,
    warp_z: NoiseField,
    height: NoiseField,
    detail: NoiseField,
    overhang: NoiseField,
    cave_a: NoiseField,
    cave_b: NoiseField,
    cave_warp: NoiseField,
    breach: NoiseField,
    island: NoiseField,
}

/// Density evaluator. Read-only after construction.
pub struct DensityField {
    noise: DensityNoise,
    nudge_key: u32,
}

impl DensityField {
    /// Creates the density evaluator for a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            noise: DensityNoise {
                warp_x: NoiseField::new(seed.derive(20)),
                warp_z: NoiseField::new(seed.derive(21)),
                height: NoiseField::new(seed.derive(22)),
                detail: NoiseField::new(seed.derive(23)),
                overhang: NoiseField::new(seed.derive(24)),
                cave_a: NoiseField::new(seed.derive(25)),
                cave_b: NoiseField::new(seed.derive(26)),
                cave_warp: NoiseField::new(seed.derive(27)),
                breach: NoiseField::new(seed.derive(28)),
                island: NoiseField::new(seed.derive(29)),
            },
            nudge_key: seed.derive(30).hash_key(),
        }
    }

    /// Surface height of the warped height model for given parameters.
    #[must_use]
    pub fn surface_height(&self, params: &TerrainParams, wx: f32, wz: f32) -> f32 {
        let warp_x = self.noise.warp_x.sample2(wx * WARP_SCALE, wz * WARP_SCALE) * params.warp;
        let warp_z = self.noise.warp_z.sample2(wx * WARP_SCALE, wz * WARP_SCALE) * params.warp;
        let qx = (wx + warp_x) * params.freq;
        let qz = (wz + warp_z) * params.freq;

        let height = self.noise.height.fbm2(qx, qz, 4);
        let detail = self.noise.detail.sample2(wx * DETAIL_SCALE, wz * DETAIL_SCALE);

        (params.base_height + height * params.amp + detail * params.amp * 0.1)
            .clamp(MIN_SURFACE_Y, MAX_SURFACE_Y)
    }

    /// Resolves every column-constant value at a world column.
    #[must_use]
    pub fn column(&self, biomes: &BiomeManager, wx: f32, wz: f32) -> ColumnSample {
        let climate = biomes.get_climate(wx, wz);
        let biome = biomes.get_biome_from_metrics(
            climate.temperature,
            climate.humidity,
            climate.continentalness,
            climate.erosion,
        );
        let params = biomes.get_terrain_parameters(&climate);

        if biomes.world_type() == WorldType::Archipelago {
            return ColumnSample {
                climate,
                biome,
                params,
                surface: self.archipelago_surface(wx, wz),
                crust: CRUST_MAX,
                breach: false,
            };
        }

        let surface = self.surface_height(&params, wx, wz);
        let breach_noise = (self.noise.breach.sample2(wx * BREACH_SCALE, wz * BREACH_SCALE) + 1.0) * 0.5;
        let breach = breach_noise > biome.profile().breach_threshold;

        let crust = if breach {
            0.0
        } else {
            let slope = self.slope(biomes, wx, wz);
            lerp(CRUST_MAX, CRUST_MIN, smoothstep(0.3, 1.2, slope))
        };

        ColumnSample {
            climate,
            biome,
            params,
            surface,
            crust,
            breach,
        }
    }

    /// Surface height alone, without the crust and breach work of
    /// [`DensityField::column`]. Same value as `column(..).surface`.
    #[must_use]
    pub fn surface_at(&self, biomes: &BiomeManager, wx: f32, wz: f32) -> f32 {
        if biomes.world_type() == WorldType::Archipelago {
            return self.archipelago_surface(wx, wz);
        }
        let climate = biomes.get_climate(wx, wz);
        self.surface_height(&biomes.get_terrain_parameters(&climate), wx, wz)
    }

    /// Largest surface gradient along the two axes, by central differences.
    fn slope(&self, biomes: &BiomeManager, wx: f32, wz: f32) -> f32 {
        let dx = self.surface_at(biomes, wx + SLOPE_STEP, wz) - self.surface_at(biomes, wx - SLOPE_STEP, wz);
        let dz = self.surface_at(biomes, wx, wz + SLOPE_STEP) - self.surface_at(biomes, wx, wz - SLOPE_STEP);
        dx.abs().max(dz.abs()) / (2.0 * SLOPE_STEP)
    }

    /// Density of one voxel in the warped-height model, before the nudge.
    #[must_use]
    pub fn raw_density(&self, column: &ColumnSample, wx: i32, wy: i32, wz: i32) -> f32 {
        let (x, y, z) = (wx as f32, wy as f32, wz as f32);

        let above = y - column.surface;
        let mut d = column.surface - y;

        if above.abs() < OVERHANG_BAND {
            let taper = 1.0 - above.abs() / OVERHANG_BAND;
            let n = self.noise.overhang.sample3(
                x * OVERHANG_SCALE_XZ,
                y * OVERHANG_SCALE_Y,
                z * OVERHANG_SCALE_XZ,
            );
            d += n * OVERHANG_AMPLITUDE * taper;
        }

        let cave_ceiling = column.surface - column.crust;
        if y < cave_ceiling + CAVE_CAP_RAMP {
            let cave = self.cave_sdf(column.biome, x, y, z);
            let open = smoothstep(cave_ceiling, cave_ceiling - CAVE_CAP_RAMP, y);
            d = d.min(cave + (1.0 - open) * CAVE_CAP_BIAS);
        }

        d + bedrock_bias(y)
    }

    /// Tunnel SDF: negative-of-ISO inside a cave, in density units.
    fn cave_sdf(&self, biome: Biome, x: f32, y: f32, z: f32) -> f32 {
        let warp = self.noise.cave_warp.sample3(
            x * CAVE_WARP_SCALE,
            y * CAVE_WARP_SCALE,
            z * CAVE_WARP_SCALE,
        ) * CAVE_WARP_STRENGTH;
        let qx = (x + warp) * CAVE_SCALE_XZ;
        let qy = y * CAVE_SCALE_Y;
        let qz = (z - warp) * CAVE_SCALE_XZ;

        let a = self.noise.cave_a.fbm3(qx, qy, qz, 2);
        let b = self.noise.cave_b.fbm3(qx, qy, qz, 2);
        let tunnel = (a * a + b * b).sqrt();

        (tunnel - biome.profile().cave_threshold) * CAVE_SDF_SCALE + ISO_LEVEL
    }

    /// Density of one voxel in the floating-island model, before the nudge.
    #[must_use]
    pub fn island_density(&self, wx: i32, wy: i32, wz: i32) -> f32 {
        let (x, y, z) = (wx as f32, wy as f32, wz as f32);
        let band = 1.0 - ((y - ISLAND_CENTER_Y) / ISLAND_HALF_HEIGHT).abs();
        let n = self.noise.island.fbm3(x * 0.02, y * 0.03, z * 0.02, 3);
        let island = ISO_LEVEL + (n + band * 0.8 - 0.55) * ISLAND_SCALE;
        let seabed = SEABED_Y - y + ISO_LEVEL;
        island.max(seabed) + bedrock_bias(y)
    }

    /// Topmost solid/air crossing of an archipelago column.
    fn archipelago_surface(&self, wx: f32, wz: f32) -> f32 {
        let (ix, iz) = (wx.floor() as i32, wz.floor() as i32);
        let mut above = self.island_density(ix, WORLD_TOP_Y, iz);
        for wy in (WORLD_FLOOR_Y..WORLD_TOP_Y).rev() {
            let d = self.island_density(ix, wy, iz);
            if d > ISO_LEVEL {
                let t = (d - ISO_LEVEL) / (d - above).max(f32::EPSILON);
                return wy as f32 + t.clamp(0.0, 0.999);
            }
            above = d;
        }
        WORLD_FLOOR_Y as f32
    }

    /// Final density of one voxel.
    #[must_use]
    pub fn density(&self, world_type: WorldType, column: &ColumnSample, wx: i32, wy: i32, wz: i32) -> f32 {
        let raw = if world_type == WorldType::Archipelago {
            self.island_density(wx, wy, wz)
        } else {
            self.raw_density(column, wx, wy, wz)
        };
        nudge(self.nudge_key, raw, wx, wy, wz)
    }

    /// Fills the density layer of a chunk and returns its column samples.
    pub fn fill(&self, biomes: &BiomeManager, coord: ChunkCoord, grid: &mut VoxelGrid) -> ChunkColumns {
        let world_type = biomes.world_type();
        let mut columns = Vec::with_capacity(TOTAL_SIZE_XZ * TOTAL_SIZE_XZ);

        for z in 0..TOTAL_SIZE_XZ {
            for x in 0..TOTAL_SIZE_XZ {
                let wx = coord.world_x(x);
                let wz = coord.world_z(z);
                let column = self.column(biomes, wx as f32, wz as f32);

                for y in 0..TOTAL_SIZE_Y {
                    grid.density[grid_index(x, y, z)] =
                        self.density(world_type, &column, wx, world_y(y), wz);
                }
                columns.push(column);
            }
        }

        ChunkColumns { columns }
    }
}

/// Large positive bias at and below the world floor.
fn bedrock_bias(y: f32) -> f32 {
    let above_floor = y - WORLD_FLOOR_Y as f32;
    if above_floor < BEDROCK_BAND {
        BEDROCK_BIAS * (1.0 - above_floor / BEDROCK_BAND)
    } else {
        0.0
    }
}

/// Pushes a density out of the degenerate band around [`ISO_LEVEL`].
///
/// Direction comes from a hash of the world position, never from the side
/// the value fell on, so every chunk sharing the voxel nudges it the same way.
#[inline]
#[must_use]
pub fn nudge(key: u32, density: f32, wx: i32, wy: i32, wz: i32) -> f32 {
    if (density - ISO_LEVEL).abs() >= NUDGE_THRESHOLD {
        return density;
    }
    if hash3(key, wx, wy, wz) & 1 == 0 {
        ISO_LEVEL + NUDGE_MAGNITUDE
    } else {
        ISO_LEVEL - NUDGE_MAGNITUDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(world_type: WorldType) -> (BiomeManager, DensityField) {
        let seed = WorldSeed::new(1337);
        (BiomeManager::new(seed, world_type), DensityField::new(seed))
    }

    #[test]
    fn test_nudge_never_lands_on_iso() {
        for i in -50..50 {
            let d = ISO_LEVEL + i as f32 * 1e-5;
            let n = nudge(7, d, i, i * 3, -i);
            assert_ne!(n, ISO_LEVEL);
            assert!((n - ISO_LEVEL).abs() >= NUDGE_THRESHOLD || n == d);
        }
        assert_eq!(nudge(7, 3.0, 0, 0, 0), 3.0);
    }

    #[test]
    fn test_nudge_depends_only_on_position() {
        let a = nudge(9, ISO_LEVEL + 1e-4, 10, 20, 30);
        let b = nudge(9, ISO_LEVEL - 1e-4, 10, 20, 30);
        assert_eq!(a, b);
    }

    #[test]
    fn test_surface_within_bounds() {
        let (biomes, field) = setup(WorldType::Default);
        for i in 0..200 {
            let wx = i as f32 * 53.0 - 5000.0;
            let wz = i as f32 * -29.0 + 2000.0;
            let column = field.column(&biomes, wx, wz);
            assert!(column.surface <= MAX_SURFACE_Y);
            assert!(column.surface >= MIN_SURFACE_Y);
            assert!(column.crust >= 0.0 && column.crust <= CRUST_MAX);
        }
    }

    #[test]
    fn test_bedrock_is_solid() {
        let (biomes, field) = setup(WorldType::Default);
        let column = field.column(&biomes, 100.0, 100.0);
        for wy in WORLD_FLOOR_Y..WORLD_FLOOR_Y + 2 {
            assert!(field.density(WorldType::Default, &column, 100, wy, 100) > ISO_LEVEL);
        }
        assert!(field.density(WorldType::Default, &column, 100, WORLD_TOP_Y, 100) < ISO_LEVEL);
    }

    #[test]
    fn test_column_matches_point_query() {
        let (biomes, field) = setup(WorldType::Default);
        let a = field.column(&biomes, -17.0, 88.0);
        let b = field.column(&biomes, -17.0, 88.0);
        assert_eq!(a, b);
        assert_eq!(field.surface_at(&biomes, -17.0, 88.0), a.surface);
    }

    #[test]
    fn test_archipelago_surface_is_crossing() {
        let (biomes, field) = setup(WorldType::Archipelago);
        let column = field.column(&biomes, 40.0, -12.0);
        let top = column.surface.floor() as i32;
        assert!(field.island_density(40, top, -12) > ISO_LEVEL);
        for wy in top + 1..=WORLD_TOP_Y {
            assert!(field.island_density(40, wy, -12) <= ISO_LEVEL);
        }
    }
}
