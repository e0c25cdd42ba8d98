//! # Edit Engine
//!
//! Brush edits on a generated grid: digging, building and liquid painting.
//!
//! Edits are the only mutation path after generation. They keep the same
//! invariants generation established: no voxel lands on [`ISO_LEVEL`], and
//! material changes only where solidity flips.

use crate::chunk::{
    grid_index, ChunkCoord, MaterialId, VoxelGrid, ISO_LEVEL, TOTAL_SIZE_XZ, TOTAL_SIZE_Y,
};
use crate::density::{NUDGE_MAGNITUDE, NUDGE_THRESHOLD};
use crate::modifications::ChunkModification;
use crate::noise::{NoiseField, WorldSeed};

/// Densities are clamped to `[-DENSITY_LIMIT, DENSITY_LIMIT]` after an edit.
pub const DENSITY_LIMIT: f32 = 64.0;

/// Maximum distance perturbation of a dig brush, in voxels.
pub const DIG_JITTER: f32 = 0.6;

const DIG_JITTER_SCALE: f32 = 0.45;

/// Wetness given to solid voxels touching painted liquid.
pub const LIQUID_CONTACT_WETNESS: u8 = 200;

/// A density brush.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditParams {
    /// Brush centre in grid coordinates.
    pub center: [f32; 3],
    /// Brush radius in voxels.
    pub radius: f32,
    /// Density change at the centre. Negative digs, positive builds.
    pub delta: f32,
    /// Material for voxels that become solid.
    pub material: MaterialId,
}

/// A liquid brush. Never touches density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiquidBrush {
    /// Brush centre in grid coordinates.
    pub center: [f32; 3],
    /// Brush radius in voxels.
    pub radius: f32,
    /// Liquid to place.
    pub material: MaterialId,
}

/// Voxels an edit changed, as records ready to persist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditOutcome {
    /// Changed voxels, in grid order.
    pub modified: Vec<ChunkModification>,
}

impl EditOutcome {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }
}

/// Inclusive grid range covered by a sphere on one axis.
fn axis_range(center: f32, reach: f32, size: usize) -> Option<(usize, usize)> {
    let lo = (center - reach).floor().max(0.0);
    let hi = (center + reach).ceil().min(size as f32 - 1.0);
    (lo <= hi).then(|| (lo as usize, hi as usize))
}

/// Brush editor. Holds only the dig-jitter noise.
pub struct EditEngine {
    jitter: NoiseField,
}

impl EditEngine {
    /// Creates the edit engine for a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            jitter: NoiseField::new(seed.derive(80)),
        }
    }

    /// Applies a density brush to a chunk.
    ///
    /// Falloff is `(1 - dist / radius)^3`. Digging perturbs `dist` with
    /// noise sampled at world coordinates and scales strength by the
    /// hardness of the voxel's current material.
    pub fn modify_chunk(&self, grid: &mut VoxelGrid, coord: ChunkCoord, params: &EditParams) -> EditOutcome {
        let mut outcome = EditOutcome::default();
        if params.delta == 0.0
            || !params.delta.is_finite()
            || params.radius.is_nan()
            || params.radius <= 0.0
            || !params.center.iter().all(|c| c.is_finite())
        {
            return outcome;
        }

        let digging = params.delta < 0.0;
        let reach = params.radius + if digging { DIG_JITTER } else { 0.0 };
        let [cx, cy, cz] = params.center;

        let (Some((x0, x1)), Some((y0, y1)), Some((z0, z1))) = (
            axis_range(cx, reach, TOTAL_SIZE_XZ),
            axis_range(cy, reach, TOTAL_SIZE_Y),
            axis_range(cz, reach, TOTAL_SIZE_XZ),
        ) else {
            return outcome;
        };

        let reach_sq = reach * reach;
        let brush_id = params.material.id();

        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = x as f32 - cx;
                    let dy = y as f32 - cy;
                    let dz = z as f32 - cz;
                    let dist_sq = dx * dx + dy * dy + dz * dz;
                    if dist_sq > reach_sq {
                        continue;
                    }

                    let mut dist = dist_sq.sqrt();
                    if digging {
                        let [wx, wy, wz] = coord.grid_to_world([x as f32, y as f32, z as f32]);
                        let n = self.jitter.sample3(
                            wx * DIG_JITTER_SCALE,
                            wy * DIG_JITTER_SCALE,
                            wz * DIG_JITTER_SCALE,
                        );
                        dist = (dist + n * DIG_JITTER).max(0.0);
                    }
                    if dist >= params.radius {
                        continue;
                    }

                    let index = grid_index(x, y, z);
                    let old_density = grid.density[index];
                    let old_material = grid.material[index];

                    let falloff = (1.0 - dist / params.radius).powi(3);
                    let mut strength = params.delta * falloff;
                    if digging {
                        strength *= MaterialId::from_u8(old_material).hardness();
                    }

                    let mut density = (old_density + strength).clamp(-DENSITY_LIMIT, DENSITY_LIMIT);
                    if (density - ISO_LEVEL).abs() < NUDGE_THRESHOLD {
                        density = if digging {
                            ISO_LEVEL - NUDGE_MAGNITUDE
                        } else {
                            ISO_LEVEL + NUDGE_MAGNITUDE
                        };
                    }

                    let was_solid = old_density > ISO_LEVEL;
                    let is_solid = density > ISO_LEVEL;
                    let material = match (was_solid, is_solid) {
                        (false, true) => brush_id,
                        (true, false) => MaterialId::Air.id(),
                        _ => old_material,
                    };

                    if density != old_density || material != old_material {
                        grid.density[index] = density;
                        grid.material[index] = material;
                        outcome.modified.push(ChunkModification::new(index as u32, density, material));
                    }
                }
            }
        }

        outcome
    }

    /// Places liquid into empty voxels inside a sphere.
    ///
    /// Only voxels that are on the air side and have no material are
    /// written. Solid voxels touching the new liquid get wetter.
    pub fn paint_liquid(&self, grid: &mut VoxelGrid, brush: &LiquidBrush) -> EditOutcome {
        let mut outcome = EditOutcome::default();
        if brush.radius.is_nan() || brush.radius <= 0.0 || !brush.center.iter().all(|c| c.is_finite()) {
            return outcome;
        }

        let [cx, cy, cz] = brush.center;
        let (Some((x0, x1)), Some((y0, y1)), Some((z0, z1))) = (
            axis_range(cx, brush.radius, TOTAL_SIZE_XZ),
            axis_range(cy, brush.radius, TOTAL_SIZE_Y),
            axis_range(cz, brush.radius, TOTAL_SIZE_XZ),
        ) else {
            return outcome;
        };

        let radius_sq = brush.radius * brush.radius;
        let liquid = brush.material.id();

        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = x as f32 - cx;
                    let dy = y as f32 - cy;
                    let dz = z as f32 - cz;
                    if dx * dx + dy * dy + dz * dz > radius_sq {
                        continue;
                    }

                    let index = grid_index(x, y, z);
                    if grid.density[index] > ISO_LEVEL || grid.material[index] != MaterialId::Air.id() {
                        continue;
                    }

                    grid.material[index] = liquid;
                    grid.wetness[index] = u8::MAX;
                    outcome
                        .modified
                        .push(ChunkModification::new(index as u32, grid.density[index], liquid));
                    wet_neighbours(grid, x, y, z);
                }
            }
        }

        outcome
    }
}

fn wet_neighbours(grid: &mut VoxelGrid, x: usize, y: usize, z: usize) {
    let neighbours = [
        (x.wrapping_sub(1), y, z),
        (x + 1, y, z),
        (x, y.wrapping_sub(1), z),
        (x, y + 1, z),
        (x, y, z.wrapping_sub(1)),
        (x, y, z + 1),
    ];
    for (nx, ny, nz) in neighbours {
        if nx >= TOTAL_SIZE_XZ || ny >= TOTAL_SIZE_Y || nz >= TOTAL_SIZE_XZ {
            continue;
        }
        if grid.is_solid(nx, ny, nz) {
            let index = grid_index(nx, ny, nz);
            grid.wetness[index] = grid.wetness[index].max(LIQUID_CONTACT_WETNESS);
        }
    }
}
