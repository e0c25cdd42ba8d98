//! # Placement Generator
//!
//! Independent post-passes over a finished chunk grid that emit point
//! entities: cavern flora, trees, sticks, rocks, large rocks, root hollows
//! and firefly swarms.
//!
//! Every roll is a positional hash of world coordinates, so the output is
//! a pure function of `(chunk, seed)`. Only interior columns emit points;
//! the padding belongs to the neighbour that owns it.
//!
//! Each pass has a hard cap from [`PlacementCaps`]. Hitting a cap or finding
//! nothing is normal and never an error.

use crate::biome::{BiomeManager, BiomeProfile};
use crate::chunk::{
    grid_y, ChunkCoord, MaterialId, VoxelGrid, CHUNK_SIZE_XZ, PAD, TOTAL_SIZE_Y, WATER_LEVEL,
};
use crate::config::PlacementCaps;
use crate::density::{ChunkColumns, DensityField};
use crate::noise::{hash2, hash3, unit, NoiseField, WorldSeed};

/// Tree species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// Broadleaf.
    Oak,
    /// Pale broadleaf.
    Birch,
    /// Conifer.
    Pine,
    /// Snow-laden conifer.
    SnowPine,
    /// Drooping swamp tree.
    Willow,
    /// Flat-topped savanna tree.
    Acacia,
    /// Tall rainforest tree.
    Jungle,
    /// Coastal palm.
    Palm,
    /// Desert cactus.
    Cactus,
}

/// A placed point entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPoint {
    /// World position.
    pub position: [f32; 3],
    /// Surface normal at the position.
    pub normal: [f32; 3],
    /// Visual variant index.
    pub variant: u8,
    /// Per-instance seed for downstream variation.
    pub seed: u32,
}

/// A placed tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeInstance {
    /// World position of the trunk base on the surface.
    pub position: [f32; 3],
    /// Ground normal.
    pub normal: [f32; 3],
    /// Species.
    pub kind: TreeKind,
    /// Uniform scale.
    pub scale: f32,
    /// How far the trunk sinks below `position` to anchor on slopes.
    pub sink: f32,
    /// Per-instance seed.
    pub seed: u32,
}

/// All placements of one chunk. Immutable once generated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkPlacements {
    /// Deep-cavern collectibles.
    pub flora: Vec<PlacementPoint>,
    /// Trees.
    pub trees: Vec<TreeInstance>,
    /// Sticks around trees.
    pub sticks: Vec<PlacementPoint>,
    /// Small rocks, surface and cave floor.
    pub rocks: Vec<PlacementPoint>,
    /// Rare large rocks.
    pub large_rocks: Vec<PlacementPoint>,
    /// At most one root hollow.
    pub root_hollows: Vec<PlacementPoint>,
    /// Firefly motes. `variant` is the swarm index.
    pub fireflies: Vec<PlacementPoint>,
}

impl ChunkPlacements {
    /// Total number of placed entities.
    #[must_use]
    pub fn total(&self) -> usize {
        self.flora.len()
            + self.trees.len()
            + self.sticks.len()
            + self.rocks.len()
            + self.large_rocks.len()
            + self.root_hollows.len()
            + self.fireflies.len()
    }
}

/// Read-only view of a finished chunk for the placement passes.
pub struct PlacementContext<'a> {
    /// Chunk being populated.
    pub coord: ChunkCoord,
    /// Finished grid (density, material, wetness).
    pub grid: &'a VoxelGrid,
    /// Column samples from the density pass.
    pub columns: &'a ChunkColumns,
    /// Climate and biome lookups.
    pub biomes: &'a BiomeManager,
    /// Surface heights outside the chunk (valley detection).
    pub density: &'a DensityField,
    /// Per-pass caps.
    pub caps: &'a PlacementCaps,
}

impl PlacementContext<'_> {
    fn world_x(&self, x: usize) -> i32 {
        self.coord.world_x(x)
    }

    fn world_z(&self, z: usize) -> i32 {
        self.coord.world_z(z)
    }

    fn profile(&self, x: usize, z: usize) -> &'static BiomeProfile {
        self.columns.at(x, z).biome.profile()
    }

    /// Grid column of a world position, if it is in the interior.
    fn interior_column(&self, wx: f32, wz: f32) -> Option<(usize, usize)> {
        let gx = wx.floor() as i32 - self.coord.origin_x() + PAD as i32;
        let gz = wz.floor() as i32 - self.coord.origin_z() + PAD as i32;
        let range = PAD as i32..(PAD + CHUNK_SIZE_XZ) as i32;
        (range.contains(&gx) && range.contains(&gz)).then_some((gx as usize, gz as usize))
    }

    /// Top surface of an interior column that is dry and not bedrock.
    fn dry_surface(&self, x: usize, z: usize) -> Option<(usize, f32)> {
        let (y, crossing) = self.grid.top_surface(x, z)?;
        let ground = self.grid.material_at(x, y, z);
        if ground == MaterialId::Bedrock || ground.is_liquid() {
            return None;
        }
        if self.grid.material_at(x, y + 1, z).is_liquid() || crossing < WATER_LEVEL - 0.5 {
            return None;
        }
        Some((y, crossing))
    }
}

const FLORA_STEP: usize = 4;
const FLORA_MIN_Y: f32 = -30.0;
const FLORA_MAX_Y: f32 = -6.0;
const FLORA_MIN_DEPTH: f32 = 8.0;
const FLORA_CENTER_CHANCE: f32 = 0.4;
const FLORA_CLUSTER_RADIUS: i32 = 2;
const FLORA_SNAP_RANGE: usize = 3;
const FLORA_MATERIALS: [MaterialId; 4] = [
    MaterialId::Stone,
    MaterialId::MossyStone,
    MaterialId::Basalt,
    MaterialId::Clay,
];

const TREE_CELL: usize = 4;
const MAX_TREE_SLOPE: f32 = 0.35;
const TREE_SINK_BASE: f32 = 0.3;
const TREE_SINK_PER_SLOPE: f32 = 3.0;
const CLEARING_SCALE: f32 = 0.03;

const STICK_RING_SLOTS: u32 = 6;
const STICK_RING_MIN: f32 = 1.5;
const STICK_RING_MAX: f32 = 3.5;

const ROCK_STEP: usize = 2;
const ROCK_CHANCE: f32 = 0.06;
const LARGE_ROCK_CHANCE: f32 = 0.004;
const LARGE_ROCK_FLATNESS: f32 = 1.5;
const CAVE_FLOOR_MARGIN: f32 = 6.0;

const HOLLOW_STEP: usize = 4;
const MAX_HOLLOW_SLOPE: f32 = 0.15;

const FIREFLY_TREE_CHANCE: f32 = 0.25;
const VALLEY_STRIDE: usize = 8;
const SWARM_RADIUS: f32 = 2.5;
const SWARM_MIN_MOTES: u32 = 4;

/// Placement pass driver. Read-only after construction.
pub struct PlacementGenerator {
    flora_key: u32,
    tree_key: u32,
    stick_key: u32,
    rock_key: u32,
    hollow_key: u32,
    firefly_key: u32,
    clearing: NoiseField,
}

impl PlacementGenerator {
    /// Creates the placement generator for a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            flora_key: seed.derive(60).hash_key(),
            tree_key: seed.derive(61).hash_key(),
            stick_key: seed.derive(62).hash_key(),
            rock_key: seed.derive(63).hash_key(),
            hollow_key: seed.derive(66).hash_key(),
            firefly_key: seed.derive(64).hash_key(),
            clearing: NoiseField::new(seed.derive(65)),
        }
    }

    /// Runs every pass over a finished chunk.
    #[must_use]
    pub fn generate(&self, ctx: &PlacementContext<'_>) -> ChunkPlacements {
        let flora = self.flora(ctx);
        let trees = self.trees(ctx);
        let sticks = self.sticks(ctx, &trees);
        let (rocks, large_rocks) = self.rocks(ctx);
        let root_hollows = self.root_hollows(ctx);
        let fireflies = self.fireflies(ctx, &trees);

        ChunkPlacements {
            flora,
            trees,
            sticks,
            rocks,
            large_rocks,
            root_hollows,
            fireflies,
        }
    }

    /// Cavern floor clusters in the deep band.
    pub fn flora(&self, ctx: &PlacementContext<'_>) -> Vec<PlacementPoint> {
        let mut flora = Vec::new();
        let scan_top = grid_y(FLORA_MAX_Y).max(0.0) as usize;

        for z in (PAD..PAD + CHUNK_SIZE_XZ).step_by(FLORA_STEP) {
            for x in (PAD..PAD + CHUNK_SIZE_XZ).step_by(FLORA_STEP) {
                let (wx, wz) = (ctx.world_x(x), ctx.world_z(z));
                let h = hash2(self.flora_key, wx, wz);
                if unit(h) >= FLORA_CENTER_CHANCE {
                    continue;
                }

                let surface = ctx.columns.at(x, z).surface;
                let Some((center_y, crossing)) = ctx.grid.floor_below(x, z, scan_top) else {
                    continue;
                };
                if crossing < FLORA_MIN_Y || surface - crossing < FLORA_MIN_DEPTH {
                    continue;
                }
                if !FLORA_MATERIALS.contains(&ctx.grid.material_at(x, center_y, z)) {
                    continue;
                }

                let count = 2 + (h >> 4) % 4;
                for i in 0..count {
                    if flora.len() >= ctx.caps.max_flora {
                        tracing::trace!(chunk = ?ctx.coord, "flora cap reached");
                        return flora;
                    }

                    let hi = hash3(self.flora_key, wx, i as i32, wz);
                    let span = (FLORA_CLUSTER_RADIUS * 2 + 1) as u32;
                    let dx = (hi % span) as i32 - FLORA_CLUSTER_RADIUS;
                    let dz = ((hi >> 8) % span) as i32 - FLORA_CLUSTER_RADIUS;
                    let Some((cx, cz)) = ctx.interior_column((wx + dx) as f32, (wz + dz) as f32) else {
                        continue;
                    };

                    let Some((fy, floor)) = snap_floor(ctx.grid, cx, cz, center_y) else {
                        continue;
                    };
                    if !FLORA_MATERIALS.contains(&ctx.grid.material_at(cx, fy, cz)) {
                        continue;
                    }

                    flora.push(PlacementPoint {
                        position: [(wx + dx) as f32 + 0.5, floor, (wz + dz) as f32 + 0.5],
                        normal: ctx.grid.normal(cx, fy, cz),
                        variant: (hi >> 16) as u8 % 4,
                        seed: hi,
                    });
                }
            }
        }

        flora
    }

    /// Jittered-grid tree pass.
    pub fn trees(&self, ctx: &PlacementContext<'_>) -> Vec<TreeInstance> {
        let mut trees = Vec::new();
        let cells = CHUNK_SIZE_XZ / TREE_CELL;
        let cell_origin_x = ctx.coord.origin_x() / TREE_CELL as i32;
        let cell_origin_z = ctx.coord.origin_z() / TREE_CELL as i32;

        for cz in 0..cells {
            for cx in 0..cells {
                let cell_x = cell_origin_x + cx as i32;
                let cell_z = cell_origin_z + cz as i32;
                let h = hash2(self.tree_key, cell_x, cell_z);

                let x = PAD + cx * TREE_CELL + (h % TREE_CELL as u32) as usize;
                let z = PAD + cz * TREE_CELL + ((h >> 8) % TREE_CELL as u32) as usize;
                let (wx, wz) = (ctx.world_x(x), ctx.world_z(z));

                let column = ctx.columns.at(x, z);
                let profile = column.biome.profile();
                if profile.trees.is_empty() {
                    continue;
                }

                let vegetation = BiomeManager::vegetation_from_metrics(&column.climate);
                let chance = profile.tree_density * (0.5 + vegetation);
                if unit(h.rotate_left(11)) >= chance {
                    continue;
                }

                let clearing = (self.clearing.sample2(wx as f32 * CLEARING_SCALE, wz as f32 * CLEARING_SCALE) + 1.0) * 0.5;
                if clearing > profile.clearing_threshold {
                    continue;
                }

                if ctx.biomes.special_zone(wx as f32, wz as f32).is_active() {
                    continue;
                }

                let Some((y, surface)) = ctx.dry_surface(x, z) else {
                    continue;
                };
                let normal = ctx.grid.normal(x, y, z);
                let slope = 1.0 - normal[1];
                if slope > MAX_TREE_SLOPE {
                    continue;
                }

                if trees.len() >= ctx.caps.max_trees {
                    tracing::trace!(chunk = ?ctx.coord, "tree cap reached");
                    return trees;
                }

                let hk = h.rotate_left(21);
                trees.push(TreeInstance {
                    position: [wx as f32 + 0.5, surface, wz as f32 + 0.5],
                    normal,
                    kind: profile.trees[hk as usize % profile.trees.len()],
                    scale: 0.8 + unit(hk) * 0.5,
                    sink: TREE_SINK_BASE + slope * TREE_SINK_PER_SLOPE,
                    seed: h,
                });
            }
        }

        trees
    }

    /// Sticks in rings around placed trees.
    pub fn sticks(&self, ctx: &PlacementContext<'_>, trees: &[TreeInstance]) -> Vec<PlacementPoint> {
        let mut sticks = Vec::new();

        for tree in trees {
            let Some((tx, tz)) = ctx.interior_column(tree.position[0], tree.position[2]) else {
                continue;
            };
            let chance = ctx.profile(tx, tz).stick_chance * 0.5;

            for slot in 0..STICK_RING_SLOTS {
                let h = hash3(self.stick_key, tree.seed as i32, slot as i32, 0);
                if unit(h) >= chance {
                    continue;
                }

                let angle = (slot as f32 + unit(h.rotate_left(8))) / STICK_RING_SLOTS as f32 * std::f32::consts::TAU;
                let radius = STICK_RING_MIN + unit(h.rotate_left(16)) * (STICK_RING_MAX - STICK_RING_MIN);
                let sx = tree.position[0] + angle.cos() * radius;
                let sz = tree.position[2] + angle.sin() * radius;

                let Some((x, z)) = ctx.interior_column(sx, sz) else {
                    continue;
                };
                let Some((y, surface)) = ctx.dry_surface(x, z) else {
                    continue;
                };

                if sticks.len() >= ctx.caps.max_sticks {
                    tracing::trace!(chunk = ?ctx.coord, "stick cap reached");
                    return sticks;
                }

                sticks.push(PlacementPoint {
                    position: [sx, surface, sz],
                    normal: ctx.grid.normal(x, y, z),
                    variant: (h >> 24) as u8 % 3,
                    seed: h,
                });
            }
        }

        sticks
    }

    /// Surface and cave-floor rocks, with rare large rocks.
    pub fn rocks(&self, ctx: &PlacementContext<'_>) -> (Vec<PlacementPoint>, Vec<PlacementPoint>) {
        let mut rocks = Vec::new();
        let mut large = Vec::new();

        for z in (PAD..PAD + CHUNK_SIZE_XZ).step_by(ROCK_STEP) {
            for x in (PAD..PAD + CHUNK_SIZE_XZ).step_by(ROCK_STEP) {
                let (wx, wz) = (ctx.world_x(x), ctx.world_z(z));
                let h = hash2(self.rock_key, wx, wz);
                let profile = ctx.profile(x, z);

                if unit(h.rotate_left(13)) < LARGE_ROCK_CHANCE && large.len() < ctx.caps.max_large_rocks {
                    if let Some(point) = large_rock(ctx, profile, x, z, h) {
                        large.push(point);
                        continue;
                    }
                }

                if unit(h) >= ROCK_CHANCE {
                    continue;
                }
                if rocks.len() >= ctx.caps.max_rocks {
                    tracing::trace!(chunk = ?ctx.coord, "rock cap reached");
                    continue;
                }

                // Odd hashes look underground, even ones on the open surface.
                let spot = if h & 1 == 0 {
                    ctx.dry_surface(x, z)
                        .filter(|&(y, _)| profile.rocky || ctx.grid.material_at(x, y, z).is_rocky())
                } else {
                    let surface = ctx.columns.at(x, z).surface;
                    let from = grid_y(surface - CAVE_FLOOR_MARGIN);
                    if from < 1.0 {
                        None
                    } else {
                        ctx.grid
                            .floor_below(x, z, from as usize)
                            .filter(|&(y, _)| ctx.grid.material_at(x, y, z).is_rocky())
                    }
                };

                if let Some((y, floor)) = spot {
                    rocks.push(PlacementPoint {
                        position: [wx as f32 + 0.5, floor, wz as f32 + 0.5],
                        normal: ctx.grid.normal(x, y, z),
                        variant: (h >> 20) as u8 % 6,
                        seed: h,
                    });
                }
            }
        }

        (rocks, large)
    }

    /// At most one root hollow: the highest-intensity flat clearing.
    pub fn root_hollows(&self, ctx: &PlacementContext<'_>) -> Vec<PlacementPoint> {
        let mut best: Option<(f32, PlacementPoint)> = None;

        for z in (PAD..PAD + CHUNK_SIZE_XZ).step_by(HOLLOW_STEP) {
            for x in (PAD..PAD + CHUNK_SIZE_XZ).step_by(HOLLOW_STEP) {
                if !ctx.profile(x, z).root_hollows {
                    continue;
                }
                let (wx, wz) = (ctx.world_x(x), ctx.world_z(z));
                let zone = ctx.biomes.special_zone(wx as f32, wz as f32);
                if !zone.is_active() {
                    continue;
                }
                if best.is_some_and(|(score, _)| score >= zone.intensity) {
                    continue;
                }

                let Some((y, surface)) = ctx.dry_surface(x, z) else {
                    continue;
                };
                let normal = ctx.grid.normal(x, y, z);
                if 1.0 - normal[1] > MAX_HOLLOW_SLOPE {
                    continue;
                }

                best = Some((
                    zone.intensity,
                    PlacementPoint {
                        position: [wx as f32 + 0.5, surface, wz as f32 + 0.5],
                        normal,
                        variant: 0,
                        seed: hash2(self.hollow_key, wx, wz),
                    },
                ));
            }
        }

        best.map(|(_, point)| point).into_iter().collect()
    }

    /// Firefly swarms near some trees and in valleys, expanded into motes.
    pub fn fireflies(&self, ctx: &PlacementContext<'_>, trees: &[TreeInstance]) -> Vec<PlacementPoint> {
        let mut centers: Vec<([f32; 3], u32)> = Vec::new();

        for tree in trees {
            let h = hash3(self.firefly_key, tree.seed as i32, 1, 0);
            if unit(h) >= FIREFLY_TREE_CHANCE {
                continue;
            }
            let Some((x, z)) = ctx.interior_column(tree.position[0], tree.position[2]) else {
                continue;
            };
            if ctx.profile(x, z).fireflies {
                let [px, py, pz] = tree.position;
                centers.push(([px, py + 2.5, pz], h));
            }
        }

        let stride = VALLEY_STRIDE as f32;
        for z in (PAD + VALLEY_STRIDE / 2..PAD + CHUNK_SIZE_XZ).step_by(VALLEY_STRIDE) {
            for x in (PAD + VALLEY_STRIDE / 2..PAD + CHUNK_SIZE_XZ).step_by(VALLEY_STRIDE) {
                if !ctx.profile(x, z).fireflies {
                    continue;
                }
                let (wx, wz) = (ctx.world_x(x) as f32, ctx.world_z(z) as f32);
                let h = ctx.columns.at(x, z).surface;
                if h < WATER_LEVEL {
                    continue;
                }
                let surface = |dx: f32, dz: f32| ctx.density.surface_at(ctx.biomes, wx + dx, wz + dz);
                let is_valley = h < surface(stride, 0.0)
                    && h < surface(-stride, 0.0)
                    && h < surface(0.0, stride)
                    && h < surface(0.0, -stride);
                if is_valley {
                    let seed = hash2(self.firefly_key, wx as i32, wz as i32);
                    centers.push(([wx + 0.5, h + 1.5, wz + 0.5], seed));
                }
            }
        }

        if centers.len() > ctx.caps.max_firefly_swarms {
            tracing::trace!(chunk = ?ctx.coord, swarms = centers.len(), "firefly swarm cap reached");
            centers.truncate(ctx.caps.max_firefly_swarms);
        }

        let mut motes = Vec::new();
        for (swarm, (center, seed)) in centers.into_iter().enumerate() {
            let count = (SWARM_MIN_MOTES + seed % 8).min(ctx.caps.max_motes_per_swarm as u32);
            for i in 0..count {
                let h = hash3(seed, i as i32, swarm as i32, 7);
                let angle = unit(h) * std::f32::consts::TAU;
                let radius = unit(h.rotate_left(12)) * SWARM_RADIUS;
                let lift = (unit(h.rotate_left(24)) - 0.5) * 2.0;
                motes.push(PlacementPoint {
                    position: [
                        center[0] + angle.cos() * radius,
                        center[1] + lift,
                        center[2] + angle.sin() * radius,
                    ],
                    normal: [0.0, 1.0, 0.0],
                    variant: swarm as u8,
                    seed: h,
                });
            }
        }

        motes
    }
}

/// Floor within [`FLORA_SNAP_RANGE`] of `near_y`.
fn snap_floor(grid: &VoxelGrid, x: usize, z: usize, near_y: usize) -> Option<(usize, f32)> {
    let from = (near_y + FLORA_SNAP_RANGE).min(TOTAL_SIZE_Y - 2);
    grid.floor_below(x, z, from)
        .filter(|&(y, _)| y + FLORA_SNAP_RANGE >= near_y)
}

/// Large rock on flat open ground with a wide footprint.
fn large_rock(
    ctx: &PlacementContext<'_>,
    profile: &BiomeProfile,
    x: usize,
    z: usize,
    h: u32,
) -> Option<PlacementPoint> {
    if !(PAD + 1..PAD + CHUNK_SIZE_XZ - 1).contains(&x) || !(PAD + 1..PAD + CHUNK_SIZE_XZ - 1).contains(&z) {
        return None;
    }

    let (y, surface) = ctx.dry_surface(x, z)?;
    if !profile.rocky && !ctx.grid.material_at(x, y, z).is_rocky() {
        return None;
    }

    for (nx, nz) in [(x - 1, z), (x + 1, z), (x, z - 1), (x, z + 1)] {
        let (_, neighbour) = ctx.grid.top_surface(nx, nz)?;
        if (neighbour - surface).abs() > LARGE_ROCK_FLATNESS {
            return None;
        }
    }

    Some(PlacementPoint {
        position: [ctx.world_x(x) as f32 + 0.5, surface, ctx.world_z(z) as f32 + 0.5],
        normal: ctx.grid.normal(x, y, z),
        variant: (h >> 26) as u8 % 3,
        seed: h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::WorldType;
    use crate::chunk::{grid_index, ISO_LEVEL, TOTAL_SIZE_XZ};

    struct Fixture {
        biomes: BiomeManager,
        density: DensityField,
        caps: PlacementCaps,
        grid: VoxelGrid,
        columns: ChunkColumns,
    }

    fn flat_world(coord: ChunkCoord) -> Fixture {
        let seed = WorldSeed::new(1337);
        let biomes = BiomeManager::new(seed, WorldType::Default);
        let density = DensityField::new(seed);
        let mut grid = VoxelGrid::new();
        let columns = density.fill(&biomes, coord, &mut grid);
        Fixture {
            biomes,
            density,
            caps: PlacementCaps::default(),
            grid,
            columns,
        }
    }

    #[test]
    fn test_interior_column_bounds() {
        let f = flat_world(ChunkCoord::new(2, -1));
        let ctx = PlacementContext {
            coord: ChunkCoord::new(2, -1),
            grid: &f.grid,
            columns: &f.columns,
            biomes: &f.biomes,
            density: &f.density,
            caps: &f.caps,
        };
        assert_eq!(ctx.interior_column(64.0, -32.0), Some((PAD, PAD)));
        assert_eq!(ctx.interior_column(95.9, -0.1), Some((PAD + 31, PAD + 31)));
        assert_eq!(ctx.interior_column(63.9, -32.0), None);
        assert_eq!(ctx.interior_column(96.0, -32.0), None);
    }

    #[test]
    fn test_zero_caps_produce_nothing() {
        let coord = ChunkCoord::new(0, 0);
        let f = flat_world(coord);
        let caps = PlacementCaps {
            max_flora: 0,
            max_trees: 0,
            max_sticks: 0,
            max_rocks: 0,
            max_large_rocks: 0,
            max_firefly_swarms: 0,
            max_motes_per_swarm: 0,
        };
        let ctx = PlacementContext {
            coord,
            grid: &f.grid,
            columns: &f.columns,
            biomes: &f.biomes,
            density: &f.density,
            caps: &caps,
        };
        let placements = PlacementGenerator::new(WorldSeed::new(1337)).generate(&ctx);
        assert_eq!(placements.total() - placements.root_hollows.len(), 0);
        assert!(placements.root_hollows.len() <= 1);
    }

    #[test]
    fn test_all_air_chunk_is_empty() {
        let coord = ChunkCoord::new(0, 0);
        let f = flat_world(coord);
        let mut empty = VoxelGrid::new();
        for d in &mut empty.density {
            *d = ISO_LEVEL - 5.0;
        }
        let ctx = PlacementContext {
            coord,
            grid: &empty,
            columns: &f.columns,
            biomes: &f.biomes,
            density: &f.density,
            caps: &f.caps,
        };
        let generator = PlacementGenerator::new(WorldSeed::new(1337));
        let placements = generator.generate(&ctx);
        assert!(placements.flora.is_empty());
        assert!(placements.trees.is_empty());
        assert!(placements.sticks.is_empty());
        assert!(placements.rocks.is_empty());
        assert!(placements.large_rocks.is_empty());
        assert!(placements.root_hollows.is_empty());
    }

    #[test]
    fn test_snap_floor_range() {
        let mut grid = VoxelGrid::new();
        for d in &mut grid.density {
            *d = ISO_LEVEL - 1.0;
        }
        let (x, z) = (PAD + 3, PAD + 3);
        for y in 0..=20 {
            grid.density[grid_index(x, y, z)] = ISO_LEVEL + 1.0;
        }
        assert_eq!(snap_floor(&grid, x, z, 22).map(|(y, _)| y), Some(20));
        assert_eq!(snap_floor(&grid, x, z, 30), None);
        assert!(TOTAL_SIZE_XZ > x);
    }
}
