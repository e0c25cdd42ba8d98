//! # Chunk Data
//!
//! The coordinate contract shared with every collaborator (mesher, physics,
//! persistence) and the dense voxel grid a chunk is generated into.
//!
//! ## Grid Layout
//!
//! Each chunk owns a `TOTAL_SIZE_XZ x TOTAL_SIZE_Y x TOTAL_SIZE_XZ` grid:
//! the `CHUNK_SIZE_XZ` interior plus `PAD` voxels of border on every side,
//! so neighbour reads (gradients, surface scans) never leave the array.
//! Voxels are indexed `x + y * SizeX + z * SizeX * SizeY`.
//!
//! World coordinates of grid voxel `(x, y, z)` in chunk `(cx, cz)`:
//!
//! ```text
//! wx = cx * CHUNK_SIZE_XZ + x - PAD
//! wy = y - PAD + MESH_Y_OFFSET
//! wz = cz * CHUNK_SIZE_XZ + z - PAD
//! ```

use crate::placement::ChunkPlacements;

/// Chunk width/depth in voxels (interior, without padding).
pub const CHUNK_SIZE_XZ: usize = 32;

/// Chunk height in voxels (interior, without padding).
pub const CHUNK_SIZE_Y: usize = 96;

/// Border voxels on every side of the interior.
pub const PAD: usize = 2;

/// Padded grid width/depth.
pub const TOTAL_SIZE_XZ: usize = CHUNK_SIZE_XZ + PAD * 2;

/// Padded grid height.
pub const TOTAL_SIZE_Y: usize = CHUNK_SIZE_Y + PAD * 2;

/// Voxels in one padded grid.
pub const VOXELS_PER_CHUNK: usize = TOTAL_SIZE_XZ * TOTAL_SIZE_Y * TOTAL_SIZE_XZ;

/// Density threshold between solid (`> ISO_LEVEL`) and air/liquid.
pub const ISO_LEVEL: f32 = 0.5;

/// World Y of interior grid row 0.
pub const MESH_Y_OFFSET: i32 = -35;

/// Sea level in world Y. Voxels at or below it may hold sea water.
pub const WATER_LEVEL: f32 = 4.5;

/// Lowest world Y in the grid (the world floor).
pub const WORLD_FLOOR_Y: i32 = MESH_Y_OFFSET - PAD as i32;

/// Highest world Y in the grid (the sky limit).
pub const WORLD_TOP_Y: i32 = WORLD_FLOOR_Y + TOTAL_SIZE_Y as i32 - 1;

/// Flat voxel index into a padded grid.
#[inline]
#[must_use]
pub const fn grid_index(x: usize, y: usize, z: usize) -> usize {
    x + y * TOTAL_SIZE_XZ + z * TOTAL_SIZE_XZ * TOTAL_SIZE_Y
}

/// Inverse of [`grid_index`].
#[inline]
#[must_use]
pub const fn grid_position(index: usize) -> (usize, usize, usize) {
    let x = index % TOTAL_SIZE_XZ;
    let y = (index / TOTAL_SIZE_XZ) % TOTAL_SIZE_Y;
    let z = index / (TOTAL_SIZE_XZ * TOTAL_SIZE_Y);
    (x, y, z)
}

/// World Y of a grid row.
#[inline]
#[must_use]
pub const fn world_y(grid_y: usize) -> i32 {
    grid_y as i32 - PAD as i32 + MESH_Y_OFFSET
}

/// Grid row (fractional) of a world Y.
#[inline]
#[must_use]
pub fn grid_y(world_y: f32) -> f32 {
    world_y - MESH_Y_OFFSET as f32 + PAD as f32
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not voxels).
    pub x: i32,
    /// Z coordinate (in chunks, not voxels).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given world column.
    #[inline]
    #[must_use]
    pub const fn from_world_pos(world_x: i32, world_z: i32) -> Self {
        Self {
            x: world_x.div_euclid(CHUNK_SIZE_XZ as i32),
            z: world_z.div_euclid(CHUNK_SIZE_XZ as i32),
        }
    }

    /// World X of the first interior voxel.
    #[inline]
    #[must_use]
    pub const fn origin_x(self) -> i32 {
        self.x * CHUNK_SIZE_XZ as i32
    }

    /// World Z of the first interior voxel.
    #[inline]
    #[must_use]
    pub const fn origin_z(self) -> i32 {
        self.z * CHUNK_SIZE_XZ as i32
    }

    /// World X of a padded grid column.
    #[inline]
    #[must_use]
    pub const fn world_x(self, grid_x: usize) -> i32 {
        self.origin_x() + grid_x as i32 - PAD as i32
    }

    /// World Z of a padded grid column.
    #[inline]
    #[must_use]
    pub const fn world_z(self, grid_z: usize) -> i32 {
        self.origin_z() + grid_z as i32 - PAD as i32
    }

    /// Converts a world position to (fractional) grid coordinates of this chunk.
    #[inline]
    #[must_use]
    pub fn world_to_grid(self, world: [f32; 3]) -> [f32; 3] {
        [
            world[0] - self.origin_x() as f32 + PAD as f32,
            grid_y(world[1]),
            world[2] - self.origin_z() as f32 + PAD as f32,
        ]
    }

    /// Converts (fractional) grid coordinates of this chunk to a world position.
    #[inline]
    #[must_use]
    pub fn grid_to_world(self, grid: [f32; 3]) -> [f32; 3] {
        [
            grid[0] + self.origin_x() as f32 - PAD as f32,
            grid[1] + MESH_Y_OFFSET as f32 - PAD as f32,
            grid[2] + self.origin_z() as f32 - PAD as f32,
        ]
    }
}

/// Voxel material ids. Stored in the grid as raw `u8`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MaterialId {
    /// Empty.
    #[default]
    Air = 0,
    /// Unbreakable-in-practice world floor.
    Bedrock = 1,
    /// Generic rock.
    Stone = 2,
    /// Subsoil.
    Dirt = 3,
    /// Temperate surface.
    Grass = 4,
    /// Beach/desert sand.
    Sand = 5,
    /// Frozen surface.
    Snow = 6,
    /// Wet sediment.
    Clay = 7,
    /// Liquid water.
    Water = 8,
    /// Damp rock.
    MossyStone = 9,
    /// Hot desert sand.
    RedSand = 10,
    /// Layered hot rock.
    Terracotta = 11,
    /// Frozen rock layer.
    Ice = 12,
    /// Jungle surface.
    JungleGrass = 13,
    /// Dark deep rock.
    Basalt = 14,
    /// Rare luminous ore in the deep band.
    GlowStone = 15,
    /// Loose stone.
    Gravel = 16,
    /// Liquid lava.
    Lava = 17,
}

impl MaterialId {
    /// Dig-strength multiplier floor; nothing is fully edit-proof.
    pub const MIN_HARDNESS: f32 = 0.05;

    /// Converts from the raw grid byte. Unknown ids read as air.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Bedrock,
            2 => Self::Stone,
            3 => Self::Dirt,
            4 => Self::Grass,
            5 => Self::Sand,
            6 => Self::Snow,
            7 => Self::Clay,
            8 => Self::Water,
            9 => Self::MossyStone,
            10 => Self::RedSand,
            11 => Self::Terracotta,
            12 => Self::Ice,
            13 => Self::JungleGrass,
            14 => Self::Basalt,
            15 => Self::GlowStone,
            16 => Self::Gravel,
            17 => Self::Lava,
            _ => Self::Air,
        }
    }

    /// Raw grid byte.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns true for liquids.
    #[inline]
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }

    /// Returns true for materials the rock scatter pass may sit on.
    #[inline]
    #[must_use]
    pub const fn is_rocky(self) -> bool {
        matches!(
            self,
            Self::Stone | Self::MossyStone | Self::Gravel | Self::Basalt | Self::Terracotta
        )
    }

    /// Dig resistance scale in `[MIN_HARDNESS, 1]`; lower digs slower.
    #[must_use]
    pub fn hardness(self) -> f32 {
        let raw: f32 = match self {
            Self::Air | Self::Water | Self::Lava => 1.0,
            Self::Dirt | Self::Sand | Self::RedSand | Self::Snow => 1.0,
            Self::Grass | Self::JungleGrass | Self::Gravel => 0.9,
            Self::Clay => 0.75,
            Self::Ice => 0.6,
            Self::Terracotta => 0.5,
            Self::MossyStone => 0.45,
            Self::Stone => 0.4,
            Self::GlowStone => 0.3,
            Self::Basalt => 0.25,
            Self::Bedrock => 0.0,
        };
        raw.max(Self::MIN_HARDNESS)
    }
}

/// The per-voxel layers of one chunk.
///
/// This is exactly what the mesher consumes: density, material and the two
/// cosmetic hint layers, all indexed with [`grid_index`].
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid {
    /// Signed density; `> ISO_LEVEL` is solid.
    pub density: Vec<f32>,
    /// Raw [`MaterialId`] bytes.
    pub material: Vec<u8>,
    /// Wetness hint (0-255).
    pub wetness: Vec<u8>,
    /// Mossiness hint (0-255).
    pub mossiness: Vec<u8>,
}

impl VoxelGrid {
    /// Creates an all-air grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            density: vec![ISO_LEVEL - 1.0; VOXELS_PER_CHUNK],
            material: vec![MaterialId::Air.id(); VOXELS_PER_CHUNK],
            wetness: vec![0; VOXELS_PER_CHUNK],
            mossiness: vec![0; VOXELS_PER_CHUNK],
        }
    }

    /// Density at grid coordinates.
    #[inline]
    #[must_use]
    pub fn density_at(&self, x: usize, y: usize, z: usize) -> f32 {
        self.density[grid_index(x, y, z)]
    }

    /// Material at grid coordinates.
    #[inline]
    #[must_use]
    pub fn material_at(&self, x: usize, y: usize, z: usize) -> MaterialId {
        MaterialId::from_u8(self.material[grid_index(x, y, z)])
    }

    /// Returns true if the voxel is on the solid side of the iso-surface.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.density_at(x, y, z) > ISO_LEVEL
    }

    /// Density gradient by central differences, clamped at the grid edge.
    #[must_use]
    pub fn gradient(&self, x: usize, y: usize, z: usize) -> [f32; 3] {
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(TOTAL_SIZE_XZ - 1);
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(TOTAL_SIZE_Y - 1);
        let z0 = z.saturating_sub(1);
        let z1 = (z + 1).min(TOTAL_SIZE_XZ - 1);

        [
            (self.density_at(x1, y, z) - self.density_at(x0, y, z)) / (x1 - x0).max(1) as f32,
            (self.density_at(x, y1, z) - self.density_at(x, y0, z)) / (y1 - y0).max(1) as f32,
            (self.density_at(x, y, z1) - self.density_at(x, y, z0)) / (z1 - z0).max(1) as f32,
        ]
    }

    /// Outward surface normal (pointing from solid into air).
    #[must_use]
    pub fn normal(&self, x: usize, y: usize, z: usize) -> [f32; 3] {
        let g = self.gradient(x, y, z);
        let len = (g[0] * g[0] + g[1] * g[1] + g[2] * g[2]).sqrt();
        if len < 1e-6 {
            [0.0, 1.0, 0.0]
        } else {
            [-g[0] / len, -g[1] / len, -g[2] / len]
        }
    }

    /// Topmost solid voxel of a column that has air above it, with the
    /// interpolated world Y of the crossing.
    #[must_use]
    pub fn top_surface(&self, x: usize, z: usize) -> Option<(usize, f32)> {
        let y = (0..TOTAL_SIZE_Y).rev().find(|&y| self.is_solid(x, y, z))?;
        if y + 1 >= TOTAL_SIZE_Y {
            return None;
        }
        Some((y, self.crossing(x, y, z)))
    }

    /// First floor (solid voxel under air) at or below `from_y`.
    #[must_use]
    pub fn floor_below(&self, x: usize, z: usize, from_y: usize) -> Option<(usize, f32)> {
        let start = from_y.min(TOTAL_SIZE_Y - 2);
        (0..=start)
            .rev()
            .find(|&y| self.is_solid(x, y, z) && !self.is_solid(x, y + 1, z))
            .map(|y| (y, self.crossing(x, y, z)))
    }

    /// World Y where density crosses [`ISO_LEVEL`] between `y` (solid) and
    /// `y + 1` (air).
    fn crossing(&self, x: usize, y: usize, z: usize) -> f32 {
        let below = self.density_at(x, y, z);
        let above = self.density_at(x, y + 1, z);
        let t = ((below - ISO_LEVEL) / (below - above).max(f32::EPSILON)).clamp(0.0, 1.0);
        world_y(y) as f32 + t
    }

    /// Counts voxels on the solid side.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.density.iter().filter(|&&d| d > ISO_LEVEL).count()
    }

    /// Density layer as raw bytes, for handing to a mesher across threads.
    #[must_use]
    pub fn density_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.density)
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of generating one chunk.
///
/// The grid is mutated afterwards only through the edit engine; the
/// placement lists are a generation artifact and never regenerated.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedChunk {
    /// Chunk position in the world.
    pub coord: ChunkCoord,
    /// Voxel layers.
    pub grid: VoxelGrid,
    /// Scattered point entities.
    pub placements: ChunkPlacements,
    /// Persisted modifications replayed on top of generation.
    pub replayed_modifications: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_world() {
        assert_eq!(ChunkCoord::from_world_pos(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world_pos(31, 31), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world_pos(32, 32), ChunkCoord::new(1, 1));
        assert_eq!(ChunkCoord::from_world_pos(-1, -1), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_world_pos(-32, -33), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_index_roundtrip() {
        for &(x, y, z) in &[(0, 0, 0), (5, 17, 33), (35, 99, 35), (1, 0, 2)] {
            assert_eq!(grid_position(grid_index(x, y, z)), (x, y, z));
        }
        assert_eq!(grid_index(TOTAL_SIZE_XZ - 1, TOTAL_SIZE_Y - 1, TOTAL_SIZE_XZ - 1), VOXELS_PER_CHUNK - 1);
    }

    #[test]
    fn test_world_grid_conversion() {
        let coord = ChunkCoord::new(-3, 2);
        let world = coord.grid_to_world([PAD as f32, PAD as f32, PAD as f32]);
        assert_eq!(world, [-96.0, MESH_Y_OFFSET as f32, 64.0]);
        assert_eq!(coord.world_to_grid(world), [PAD as f32, PAD as f32, PAD as f32]);
        assert_eq!(coord.world_x(PAD), coord.origin_x());
        assert_eq!(world_y(PAD), MESH_Y_OFFSET);
        assert_eq!(world_y(0), WORLD_FLOOR_Y);
        assert_eq!(world_y(TOTAL_SIZE_Y - 1), WORLD_TOP_Y);
    }

    #[test]
    fn test_hardness_ordering() {
        assert!(MaterialId::Bedrock.hardness() < MaterialId::Stone.hardness());
        assert!(MaterialId::Stone.hardness() < MaterialId::Dirt.hardness());
        assert!(MaterialId::Bedrock.hardness() >= MaterialId::MIN_HARDNESS);
    }

    #[test]
    fn test_material_roundtrip() {
        for raw in 0..=17u8 {
            assert_eq!(MaterialId::from_u8(raw).id(), raw);
        }
        assert_eq!(MaterialId::from_u8(200), MaterialId::Air);
    }

    #[test]
    fn test_normal_points_into_air() {
        let mut grid = VoxelGrid::new();
        for z in 0..TOTAL_SIZE_XZ {
            for y in 0..10 {
                for x in 0..TOTAL_SIZE_XZ {
                    grid.density[grid_index(x, y, z)] = 10.0 - y as f32;
                }
            }
        }
        let n = grid.normal(5, 9, 5);
        assert!(n[1] > 0.9, "Flat ground normal should point up: {n:?}");

        let (top, crossing) = grid.top_surface(5, 5).unwrap();
        assert_eq!(top, 9);
        assert!((crossing - (world_y(9) as f32 + 1.0 / 3.0)).abs() < 1e-4);
        assert_eq!(grid.floor_below(5, 5, 50).map(|(y, _)| y), Some(9));
        assert_eq!(grid.floor_below(5, 5, 5), None);
    }
}
