//! # Biome Model
//!
//! Climate sampling, biome classification and the continuous terrain
//! shaping parameters derived from climate.
//!
//! Climate is a pure function of world `(x, z)`:
//! - Temperature (latitude gradient mixed with low-frequency noise)
//! - Humidity
//! - Continentalness (ocean -> coast -> inland)
//! - Erosion (flat and worn vs. sharp and young terrain)
//!
//! Biomes are a lookup on climate. Terrain parameters are NOT looked up
//! per biome; they blend four climate archetypes so that neighbouring
//! columns with different biomes never produce a height seam.

use serde::{Deserialize, Serialize};

use crate::chunk::{MaterialId, WORLD_FLOOR_Y, WORLD_TOP_Y};
use crate::noise::{hash3, lerp, smoothstep, unit, NoiseField, WorldSeed};
use crate::placement::TreeKind;

/// Highest world Y a generated surface may reach. Leaves headroom below the
/// sky limit for overhang noise, so no column ever loses its surface.
pub const MAX_SURFACE_Y: f32 = WORLD_TOP_Y as f32 - 12.0;

/// Lowest world Y a generated surface may reach (above the bedrock band).
pub const MIN_SURFACE_Y: f32 = WORLD_FLOOR_Y as f32 + 10.0;

/// Process-wide world flavour, fixed before any chunk is generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldType {
    /// Latitude bands with noise-driven climate.
    #[default]
    Default,
    /// Everything cold.
    Frozen,
    /// Warm and humid everywhere.
    Lush,
    /// Floating islands over open sea.
    Archipelago,
}

/// Climate at a world column. Every axis is in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Climate {
    /// Cold (-1) to hot (1).
    pub temperature: f32,
    /// Dry (-1) to wet (1).
    pub humidity: f32,
    /// Deep ocean (-1) to far inland (1).
    pub continentalness: f32,
    /// Sharp (-1) to flat (1).
    pub erosion: f32,
}

/// Terrain shaping parameters for one column.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainParams {
    /// Mean surface height (world Y).
    pub base_height: f32,
    /// Height noise amplitude.
    pub amp: f32,
    /// Height noise frequency.
    pub freq: f32,
    /// Domain warp strength (world units).
    pub warp: f32,
}

impl TerrainParams {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            base_height: lerp(a.base_height, b.base_height, t),
            amp: lerp(a.amp, b.amp, t),
            freq: lerp(a.freq, b.freq, t),
            warp: lerp(a.warp, b.warp, t),
        }
    }
}

/// Shaping archetypes at the four climate corners.
const COLD_DRY: TerrainParams = TerrainParams { base_height: 12.0, amp: 6.0, freq: 0.010, warp: 8.0 };
const COLD_WET: TerrainParams = TerrainParams { base_height: 20.0, amp: 22.0, freq: 0.016, warp: 16.0 };
const HOT_DRY: TerrainParams = TerrainParams { base_height: 9.0, amp: 7.0, freq: 0.008, warp: 12.0 };
const HOT_WET: TerrainParams = TerrainParams { base_height: 15.0, amp: 14.0, freq: 0.020, warp: 20.0 };

/// Vegetation density at the same four corners.
const VEGETATION_ARCHETYPES: [f32; 4] = [0.10, 0.55, 0.05, 0.95];

/// Biome types in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    /// Temperate, dry.
    Plains = 0,
    /// Temperate, moderate.
    Forest = 1,
    /// Temperate, wet.
    Swamp = 2,
    /// Hot, dry.
    Desert = 3,
    /// Hot, moderate.
    Savanna = 4,
    /// Hot, wet.
    Jungle = 5,
    /// Cold, moderate.
    Tundra = 6,
    /// Cold, wet.
    Taiga = 7,
    /// Cold, dry.
    IcePlains = 8,
    /// Coastal band.
    Beach = 9,
    /// The only biome of the archipelago world.
    SkyIslands = 10,
}

impl Biome {
    /// Number of biomes.
    pub const COUNT: usize = 11;

    /// Every biome in id order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Plains,
        Self::Forest,
        Self::Swamp,
        Self::Desert,
        Self::Savanna,
        Self::Jungle,
        Self::Tundra,
        Self::Taiga,
        Self::IcePlains,
        Self::Beach,
        Self::SkyIslands,
    ];

    /// Returns true for the cold row of the climate table.
    #[must_use]
    pub const fn is_frozen(self) -> bool {
        matches!(self, Self::Tundra | Self::Taiga | Self::IcePlains)
    }

    /// Returns true for the temperate row of the climate table.
    #[must_use]
    pub const fn is_temperate(self) -> bool {
        matches!(self, Self::Plains | Self::Forest | Self::Swamp)
    }

    /// Data table entry for this biome.
    #[must_use]
    pub fn profile(self) -> &'static BiomeProfile {
        &PROFILES[self as usize]
    }
}

/// Underground material mix of a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UndergroundMaterials {
    /// Dominant rock.
    pub primary: MaterialId,
    /// Noise-selected veins.
    pub secondary: MaterialId,
}

/// Everything biome-specific generation needs, as data.
#[derive(Clone, Copy, Debug)]
pub struct BiomeProfile {
    /// Top soil material.
    pub surface: MaterialId,
    /// Rock mix below the soil.
    pub underground: UndergroundMaterials,
    /// Tunnel radius in noise units; larger carves wider caves.
    pub cave_threshold: f32,
    /// Breach noise above this opens caves straight to the surface.
    pub breach_threshold: f32,
    /// Chance a jittered tree cell holds a tree (before vegetation scaling).
    pub tree_density: f32,
    /// Clearing noise above this keeps the ground free of trees.
    pub clearing_threshold: f32,
    /// Tree species, picked by hash.
    pub trees: &'static [TreeKind],
    /// Chance per ring slot of a stick around a tree.
    pub stick_chance: f32,
    /// Open-air rocks scatter here regardless of surface material.
    pub rocky: bool,
    /// Surface mossiness hint (0-1).
    pub moss: f32,
    /// Firefly swarms may spawn.
    pub fireflies: bool,
    /// Root hollows may spawn in special zones.
    pub root_hollows: bool,
}

const fn underground(primary: MaterialId, secondary: MaterialId) -> UndergroundMaterials {
    UndergroundMaterials { primary, secondary }
}

/// Indexed by `Biome as usize`.
static PROFILES: [BiomeProfile; Biome::COUNT] = [
    // Plains
    BiomeProfile {
        surface: MaterialId::Grass,
        underground: underground(MaterialId::Stone, MaterialId::Gravel),
        cave_threshold: 0.10,
        breach_threshold: 0.82,
        tree_density: 0.12,
        clearing_threshold: 0.6,
        trees: &[TreeKind::Oak, TreeKind::Birch],
        stick_chance: 0.5,
        rocky: false,
        moss: 0.2,
        fireflies: true,
        root_hollows: true,
    },
    // Forest
    BiomeProfile {
        surface: MaterialId::Grass,
        underground: underground(MaterialId::Stone, MaterialId::MossyStone),
        cave_threshold: 0.11,
        breach_threshold: 0.85,
        tree_density: 0.55,
        clearing_threshold: 0.8,
        trees: &[TreeKind::Oak, TreeKind::Birch, TreeKind::Oak],
        stick_chance: 0.8,
        rocky: false,
        moss: 0.45,
        fireflies: true,
        root_hollows: true,
    },
    // Swamp
    BiomeProfile {
        surface: MaterialId::Grass,
        underground: underground(MaterialId::Stone, MaterialId::Clay),
        cave_threshold: 0.09,
        breach_threshold: 0.9,
        tree_density: 0.35,
        clearing_threshold: 0.75,
        trees: &[TreeKind::Willow],
        stick_chance: 0.6,
        rocky: false,
        moss: 0.9,
        fireflies: true,
        root_hollows: true,
    },
    // Desert
    BiomeProfile {
        surface: MaterialId::Sand,
        underground: underground(MaterialId::Terracotta, MaterialId::Stone),
        cave_threshold: 0.12,
        breach_threshold: 0.75,
        tree_density: 0.02,
        clearing_threshold: 0.5,
        trees: &[TreeKind::Cactus],
        stick_chance: 0.0,
        rocky: true,
        moss: 0.0,
        fireflies: false,
        root_hollows: false,
    },
    // Savanna
    BiomeProfile {
        surface: MaterialId::Grass,
        underground: underground(MaterialId::Stone, MaterialId::Terracotta),
        cave_threshold: 0.10,
        breach_threshold: 0.8,
        tree_density: 0.08,
        clearing_threshold: 0.55,
        trees: &[TreeKind::Acacia],
        stick_chance: 0.3,
        rocky: true,
        moss: 0.05,
        fireflies: false,
        root_hollows: false,
    },
    // Jungle
    BiomeProfile {
        surface: MaterialId::JungleGrass,
        underground: underground(MaterialId::Stone, MaterialId::MossyStone),
        cave_threshold: 0.12,
        breach_threshold: 0.85,
        tree_density: 0.7,
        clearing_threshold: 0.85,
        trees: &[TreeKind::Jungle, TreeKind::Jungle, TreeKind::Palm],
        stick_chance: 0.9,
        rocky: false,
        moss: 0.8,
        fireflies: true,
        root_hollows: true,
    },
    // Tundra
    BiomeProfile {
        surface: MaterialId::Snow,
        underground: underground(MaterialId::Stone, MaterialId::Ice),
        cave_threshold: 0.10,
        breach_threshold: 0.8,
        tree_density: 0.04,
        clearing_threshold: 0.55,
        trees: &[TreeKind::SnowPine],
        stick_chance: 0.2,
        rocky: true,
        moss: 0.0,
        fireflies: false,
        root_hollows: false,
    },
    // Taiga
    BiomeProfile {
        surface: MaterialId::Snow,
        underground: underground(MaterialId::Stone, MaterialId::Gravel),
        cave_threshold: 0.11,
        breach_threshold: 0.85,
        tree_density: 0.45,
        clearing_threshold: 0.75,
        trees: &[TreeKind::Pine, TreeKind::SnowPine],
        stick_chance: 0.6,
        rocky: false,
        moss: 0.15,
        fireflies: false,
        root_hollows: true,
    },
    // IcePlains
    BiomeProfile {
        surface: MaterialId::Snow,
        underground: underground(MaterialId::Ice, MaterialId::Stone),
        cave_threshold: 0.08,
        breach_threshold: 0.95,
        tree_density: 0.0,
        clearing_threshold: 0.0,
        trees: &[],
        stick_chance: 0.0,
        rocky: true,
        moss: 0.0,
        fireflies: false,
        root_hollows: false,
    },
    // Beach
    BiomeProfile {
        surface: MaterialId::Sand,
        underground: underground(MaterialId::Stone, MaterialId::Gravel),
        cave_threshold: 0.08,
        breach_threshold: 2.0,
        tree_density: 0.03,
        clearing_threshold: 0.5,
        trees: &[TreeKind::Palm],
        stick_chance: 0.2,
        rocky: true,
        moss: 0.0,
        fireflies: false,
        root_hollows: false,
    },
    // SkyIslands
    BiomeProfile {
        surface: MaterialId::Grass,
        underground: underground(MaterialId::Stone, MaterialId::MossyStone),
        cave_threshold: 0.10,
        breach_threshold: 2.0,
        tree_density: 0.3,
        clearing_threshold: 0.7,
        trees: &[TreeKind::Oak, TreeKind::Palm],
        stick_chance: 0.5,
        rocky: true,
        moss: 0.5,
        fireflies: true,
        root_hollows: false,
    },
];

/// A designated clearing where root hollows may appear and trees may not.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpecialZone {
    /// 0 outside the zone, rising towards 1 at its heart.
    pub intensity: f32,
}

impl SpecialZone {
    /// Returns true inside the zone.
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        self.intensity > 0.0
    }
}

/// One generator per climate axis plus the zone field, built once per seed.
struct ClimateNoise {
    temperature: NoiseField,
    humidity: NoiseField,
    continentalness: NoiseField,
    erosion: NoiseField,
    zones: NoiseField,
}

/// Climate sampler and biome classifier.
///
/// Read-only after construction; share one instance (by reference or
/// `Arc`) between every concurrent chunk generation.
pub struct BiomeManager {
    world_type: WorldType,
    noise: ClimateNoise,
    dither_key: u32,
}

impl BiomeManager {
    /// Scale for temperature noise.
    const TEMPERATURE_SCALE: f32 = 0.0015;
    /// Scale for humidity noise.
    const HUMIDITY_SCALE: f32 = 0.002;
    /// Scale for continentalness noise.
    const CONTINENT_SCALE: f32 = 0.0009;
    /// Scale for erosion noise.
    const EROSION_SCALE: f32 = 0.003;
    /// Scale for the special-zone field.
    const ZONE_SCALE: f32 = 0.02;
    /// World Z distance of one full latitude cycle.
    const LATITUDE_PERIOD: f32 = 8192.0;
    /// Radius around the origin pulled inland.
    const SPAWN_CONTINENT_RADIUS: f32 = 768.0;

    /// Climate band edges.
    const COLD: f32 = -0.35;
    const HOT: f32 = 0.35;
    const DRY: f32 = -0.3;
    const WET: f32 = 0.3;

    /// Coastal window on continentalness.
    const BEACH_MIN_CONTINENT: f32 = -0.3;
    const BEACH_MAX_CONTINENT: f32 = -0.08;
    const BEACH_MAX_EROSION: f32 = 0.4;

    /// Magnitude of the per-voxel climate dither.
    const DITHER: f32 = 0.05;

    /// Creates a biome manager for a seed and world type.
    #[must_use]
    pub fn new(seed: WorldSeed, world_type: WorldType) -> Self {
        Self {
            world_type,
            noise: ClimateNoise {
                temperature: NoiseField::new(seed.derive(1)),
                humidity: NoiseField::new(seed.derive(2)),
                continentalness: NoiseField::new(seed.derive(3)),
                erosion: NoiseField::new(seed.derive(4)),
                zones: NoiseField::new(seed.derive(5)),
            },
            dither_key: seed.derive(6).hash_key(),
        }
    }

    /// World type this manager was built for.
    #[inline]
    #[must_use]
    pub fn world_type(&self) -> WorldType {
        self.world_type
    }

    /// Samples the climate at a world column.
    #[must_use]
    pub fn get_climate(&self, x: f32, z: f32) -> Climate {
        let t_noise = self.noise.temperature.fbm2(x * Self::TEMPERATURE_SCALE, z * Self::TEMPERATURE_SCALE, 3);
        let h_noise = self.noise.humidity.fbm2(x * Self::HUMIDITY_SCALE, z * Self::HUMIDITY_SCALE, 3);
        let c_noise = self.noise.continentalness.fbm2(x * Self::CONTINENT_SCALE, z * Self::CONTINENT_SCALE, 4);
        let erosion = self.noise.erosion.fbm2(x * Self::EROSION_SCALE, z * Self::EROSION_SCALE, 2);

        let latitude = (z * std::f32::consts::TAU / Self::LATITUDE_PERIOD).sin();

        let (temperature, humidity) = match self.world_type {
            WorldType::Default | WorldType::Archipelago => (latitude * 0.7 + t_noise * 0.3, h_noise),
            WorldType::Frozen => (-0.6 - t_noise.abs() * 0.4 - latitude.abs() * 0.1, h_noise),
            WorldType::Lush => (0.15 + latitude * 0.25 + t_noise * 0.2, 0.45 + h_noise * 0.55),
        };

        let spawn_distance = (x * x + z * z).sqrt() / Self::SPAWN_CONTINENT_RADIUS;
        let spawn_bias = (1.0 - spawn_distance).max(0.0).powi(2);
        let continentalness = c_noise * 0.9 + spawn_bias;

        Climate {
            temperature: temperature.clamp(-1.0, 1.0),
            humidity: humidity.clamp(-1.0, 1.0),
            continentalness: continentalness.clamp(-1.0, 1.0),
            erosion: erosion.clamp(-1.0, 1.0),
        }
    }

    /// Classifies a biome from climate metrics.
    #[must_use]
    pub fn get_biome_from_metrics(&self, temp: f32, humid: f32, continent: f32, erosion: f32) -> Biome {
        if self.world_type == WorldType::Archipelago {
            return Biome::SkyIslands;
        }

        let base = if temp < Self::COLD {
            if humid < Self::DRY {
                Biome::IcePlains
            } else if humid > Self::WET {
                Biome::Taiga
            } else {
                Biome::Tundra
            }
        } else if temp > Self::HOT {
            if humid < Self::DRY {
                Biome::Desert
            } else if humid > Self::WET {
                Biome::Jungle
            } else {
                Biome::Savanna
            }
        } else if humid < Self::DRY {
            Biome::Plains
        } else if humid > Self::WET {
            Biome::Swamp
        } else {
            Biome::Forest
        };

        let coastal = (Self::BEACH_MIN_CONTINENT..=Self::BEACH_MAX_CONTINENT).contains(&continent);
        if coastal && erosion < Self::BEACH_MAX_EROSION && !base.is_frozen() {
            return Biome::Beach;
        }

        base
    }

    /// Biome of a world column.
    #[must_use]
    pub fn get_biome_at(&self, x: f32, z: f32) -> Biome {
        let c = self.get_climate(x, z);
        self.get_biome_from_metrics(c.temperature, c.humidity, c.continentalness, c.erosion)
    }

    /// Biome with a small hashed climate jitter per voxel.
    ///
    /// Only for picking surface materials: it breaks up perfectly straight
    /// biome borders down the side of a cliff. Still a pure function of
    /// world coordinates, so neighbouring chunks agree.
    #[must_use]
    pub fn biome_dithered(&self, climate: &Climate, x: i32, y: i32, z: i32) -> Biome {
        let h = hash3(self.dither_key, x, y, z);
        let jitter_t = (unit(h) - 0.5) * 2.0 * Self::DITHER;
        let jitter_h = (unit(h.rotate_left(16)) - 0.5) * 2.0 * Self::DITHER;
        self.get_biome_from_metrics(
            climate.temperature + jitter_t,
            climate.humidity + jitter_h,
            climate.continentalness,
            climate.erosion,
        )
    }

    /// Top soil material of a biome.
    #[must_use]
    pub fn get_surface_material(biome: Biome) -> MaterialId {
        biome.profile().surface
    }

    /// Rock mix of a biome.
    #[must_use]
    pub fn get_underground_materials(biome: Biome) -> UndergroundMaterials {
        biome.profile().underground
    }

    /// Terrain shaping parameters for a climate.
    ///
    /// Archetypes are blended bilinearly over smoothed temperature and
    /// humidity, then continentalness sinks and flattens coasts and
    /// oceans, and erosion flattens or sharpens. The result is clamped so
    /// `base_height + amp * 1.1` can never pass [`MAX_SURFACE_Y`].
    #[must_use]
    pub fn get_terrain_parameters_from_metrics(
        temp: f32,
        humid: f32,
        continent: f32,
        erosion: f32,
    ) -> TerrainParams {
        let t = smoothstep(-1.0, 1.0, temp);
        let h = smoothstep(-1.0, 1.0, humid);

        let cold = TerrainParams::lerp(COLD_DRY, COLD_WET, h);
        let hot = TerrainParams::lerp(HOT_DRY, HOT_WET, h);
        let mut params = TerrainParams::lerp(cold, hot, t);

        let (height_offset, amp_scale) = continental_shaping(continent);
        params.base_height += height_offset;
        params.amp *= amp_scale;

        if erosion > 0.0 {
            let flat = smoothstep(0.0, 1.0, erosion);
            params.amp *= lerp(1.0, 0.35, flat);
            params.warp *= lerp(1.0, 0.4, flat);
        } else {
            let sharp = smoothstep(0.0, 1.0, -erosion);
            params.amp *= 1.0 + 0.6 * sharp;
            params.base_height += 4.0 * sharp;
        }

        params.base_height = params.base_height.clamp(MIN_SURFACE_Y, MAX_SURFACE_Y - 2.0);
        params.amp = params.amp.clamp(0.0, (MAX_SURFACE_Y - params.base_height) / 1.1);
        params
    }

    /// Terrain shaping parameters for a world column.
    #[must_use]
    pub fn get_terrain_parameters(&self, climate: &Climate) -> TerrainParams {
        Self::get_terrain_parameters_from_metrics(
            climate.temperature,
            climate.humidity,
            climate.continentalness,
            climate.erosion,
        )
    }

    /// Vegetation density in [0, 1], blended like the terrain archetypes.
    #[must_use]
    pub fn get_vegetation_density(&self, x: f32, z: f32) -> f32 {
        let c = self.get_climate(x, z);
        Self::vegetation_from_metrics(&c)
    }

    /// Vegetation density for an already-sampled climate.
    #[must_use]
    pub fn vegetation_from_metrics(climate: &Climate) -> f32 {
        let t = smoothstep(-1.0, 1.0, climate.temperature);
        let h = smoothstep(-1.0, 1.0, climate.humidity);
        let [cold_dry, cold_wet, hot_dry, hot_wet] = VEGETATION_ARCHETYPES;
        let blended = lerp(lerp(cold_dry, cold_wet, h), lerp(hot_dry, hot_wet, h), t);
        let (_, land) = continental_shaping(climate.continentalness);
        (blended * land).clamp(0.0, 1.0)
    }

    /// Special-zone classification (barren clearings) of a world column.
    #[must_use]
    pub fn special_zone(&self, x: f32, z: f32) -> SpecialZone {
        let n = self.noise.zones.fbm2(x * Self::ZONE_SCALE, z * Self::ZONE_SCALE, 2);
        SpecialZone {
            intensity: smoothstep(0.45, 0.8, n),
        }
    }
}

/// Height offset and amplitude scale from continentalness. Both are
/// monotonic: deeper ocean means lower and calmer.
fn continental_shaping(continent: f32) -> (f32, f32) {
    const OCEAN_FLOOR_OFFSET: f32 = -24.0;
    let land = smoothstep(-0.55, -0.05, continent);
    (lerp(OCEAN_FLOOR_OFFSET, 0.0, land), lerp(0.3, 1.0, land))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biome_determinism() {
        let a = BiomeManager::new(WorldSeed::new(42), WorldType::Default);
        let b = BiomeManager::new(WorldSeed::new(42), WorldType::Default);

        for i in 0..100 {
            let x = i as f32 * 100.0;
            let z = i as f32 * -73.0;
            assert_eq!(a.get_biome_at(x, z), b.get_biome_at(x, z));
            assert_eq!(a.get_climate(x, z), b.get_climate(x, z));
        }
    }

    #[test]
    fn test_climate_range() {
        let manager = BiomeManager::new(WorldSeed::new(7), WorldType::Default);
        for i in 0..500 {
            let c = manager.get_climate(i as f32 * 37.0 - 9000.0, i as f32 * -53.0 + 4000.0);
            for v in [c.temperature, c.humidity, c.continentalness, c.erosion] {
                assert!((-1.0..=1.0).contains(&v), "Climate axis {v} out of range");
            }
        }
    }

    #[test]
    fn test_classification_table() {
        let manager = BiomeManager::new(WorldSeed::new(1), WorldType::Default);
        let inland = 0.5;
        assert_eq!(manager.get_biome_from_metrics(-0.8, -0.8, inland, 0.0), Biome::IcePlains);
        assert_eq!(manager.get_biome_from_metrics(-0.8, 0.0, inland, 0.0), Biome::Tundra);
        assert_eq!(manager.get_biome_from_metrics(-0.8, 0.8, inland, 0.0), Biome::Taiga);
        assert_eq!(manager.get_biome_from_metrics(0.0, -0.8, inland, 0.0), Biome::Plains);
        assert_eq!(manager.get_biome_from_metrics(0.0, 0.0, inland, 0.0), Biome::Forest);
        assert_eq!(manager.get_biome_from_metrics(0.0, 0.8, inland, 0.0), Biome::Swamp);
        assert_eq!(manager.get_biome_from_metrics(0.8, -0.8, inland, 0.0), Biome::Desert);
        assert_eq!(manager.get_biome_from_metrics(0.8, 0.0, inland, 0.0), Biome::Savanna);
        assert_eq!(manager.get_biome_from_metrics(0.8, 0.8, inland, 0.0), Biome::Jungle);
    }

    #[test]
    fn test_beach_intercept() {
        let manager = BiomeManager::new(WorldSeed::new(1), WorldType::Default);
        assert_eq!(manager.get_biome_from_metrics(0.0, 0.0, -0.2, 0.0), Biome::Beach);
        // Eroded coasts are cliffs, not beaches.
        assert_eq!(manager.get_biome_from_metrics(0.0, 0.0, -0.2, 0.8), Biome::Forest);
        // Frozen coasts stay frozen.
        assert_eq!(manager.get_biome_from_metrics(-0.8, 0.0, -0.2, 0.0), Biome::Tundra);
    }

    #[test]
    fn test_archipelago_short_circuit() {
        let manager = BiomeManager::new(WorldSeed::new(1), WorldType::Archipelago);
        for &(t, h) in &[(-0.9, -0.9), (0.0, 0.0), (0.9, 0.9)] {
            assert_eq!(manager.get_biome_from_metrics(t, h, -0.2, 0.0), Biome::SkyIslands);
        }
    }

    #[test]
    fn test_frozen_world_is_cold_everywhere() {
        let manager = BiomeManager::new(WorldSeed::new(99), WorldType::Frozen);
        for i in 0..200 {
            let biome = manager.get_biome_at(i as f32 * 97.0, i as f32 * 131.0 - 5000.0);
            assert!(biome.is_frozen(), "Frozen world produced {biome:?}");
        }
    }

    #[test]
    fn test_origin_is_temperate_inland() {
        for seed in [1, 42, 1337, 99_999] {
            let manager = BiomeManager::new(WorldSeed::new(seed), WorldType::Default);
            let biome = manager.get_biome_at(0.0, 0.0);
            assert!(biome.is_temperate(), "Seed {seed} origin biome {biome:?}");
            assert!(manager.get_climate(0.0, 0.0).continentalness > 0.0);
        }
    }

    #[test]
    fn test_terrain_params_respect_max_surface() {
        for ti in -10..=10 {
            for hi in -10..=10 {
                for &(c, e) in &[(1.0, -1.0), (0.5, -0.5), (-1.0, 1.0), (0.0, 0.0)] {
                    let p = BiomeManager::get_terrain_parameters_from_metrics(
                        ti as f32 / 10.0,
                        hi as f32 / 10.0,
                        c,
                        e,
                    );
                    assert!(p.base_height + p.amp * 1.1 <= MAX_SURFACE_Y + 1e-3, "{p:?}");
                    assert!(p.amp >= 0.0 && p.base_height >= MIN_SURFACE_Y);
                }
            }
        }
    }

    #[test]
    fn test_continental_shaping_is_monotonic() {
        let mut last = continental_shaping(-1.0);
        for i in -99..=100 {
            let next = continental_shaping(i as f32 / 100.0);
            assert!(next.0 >= last.0 && next.1 >= last.1);
            last = next;
        }
        let ocean = BiomeManager::get_terrain_parameters_from_metrics(0.0, 0.0, -1.0, 0.0);
        let land = BiomeManager::get_terrain_parameters_from_metrics(0.0, 0.0, 1.0, 0.0);
        assert!(ocean.base_height < land.base_height);
        assert!(ocean.amp < land.amp);
    }

    #[test]
    fn test_erosion_flattens() {
        let flat = BiomeManager::get_terrain_parameters_from_metrics(0.0, 0.0, 1.0, 1.0);
        let sharp = BiomeManager::get_terrain_parameters_from_metrics(0.0, 0.0, 1.0, -1.0);
        assert!(flat.amp < sharp.amp);
        assert!(flat.warp <= sharp.warp);
    }

    #[test]
    fn test_vegetation_range() {
        let manager = BiomeManager::new(WorldSeed::new(5), WorldType::Lush);
        for i in 0..200 {
            let v = manager.get_vegetation_density(i as f32 * 41.0, i as f32 * 17.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_profile_table_is_indexed_by_id() {
        for biome in Biome::ALL {
            let profile = biome.profile();
            assert!(profile.cave_threshold > 0.0);
            assert!(!profile.surface.is_liquid());
        }
        assert_eq!(BiomeManager::get_surface_material(Biome::Desert), MaterialId::Sand);
        assert_eq!(BiomeManager::get_surface_material(Biome::Taiga), MaterialId::Snow);
    }
}
