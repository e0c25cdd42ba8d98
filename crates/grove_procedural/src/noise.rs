//! # Noise Field
//!
//! Deterministic, seeded value noise in 2D and 3D, plus the positional
//! hashes every placement and hysteresis decision is derived from.
//!
//! ## Determinism Guarantee
//!
//! A `NoiseField` is a pure function of its `WorldSeed` and the sample
//! coordinates. Two fields built from the same seed return bit-identical
//! values for the same inputs, on any thread, in any chunk. Nothing here
//! holds mutable state, so one field is shared by every concurrent chunk
//! generation.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., cave noise).
    ///
    /// Independent streams from one seed; the same purpose always yields
    /// the same sub-seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Folds the seed into 32 bits for positional hashing.
    #[inline]
    #[must_use]
    pub const fn hash_key(self) -> u32 {
        (self.0 ^ (self.0 >> 32)) as u32
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(1337)
    }
}

/// Lattice permutation, shuffled once from the seed.
struct PermutationTable {
    /// 256 entries doubled so `perm[a + b]` never needs a wrap.
    perm: [u8; 512],
}

impl PermutationTable {
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates driven by xorshift64; zero state would never advance.
        let mut rng_state = seed.value() | 1;
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// Seeded value-noise generator.
///
/// Lattice values in [-1, 1] blended with a quintic fade, so every sample
/// (and every octave sum, once normalised) stays in [-1, 1].
///
/// # Example
///
/// ```rust,ignore
/// let noise = NoiseField::new(WorldSeed::new(42));
/// let h = noise.fbm2(x * 0.01, z * 0.01, 4);
/// assert!((-1.0..=1.0).contains(&h));
/// ```
pub struct NoiseField {
    table: PermutationTable,
}

impl NoiseField {
    /// Creates a noise field from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            table: PermutationTable::new(seed),
        }
    }

    #[inline]
    fn lattice2(&self, ix: i32, iz: i32) -> f32 {
        let p = &self.table;
        let h = p.get(p.get((ix & 255) as usize) + (iz & 255) as usize);
        h as f32 * (2.0 / 255.0) - 1.0
    }

    #[inline]
    fn lattice3(&self, ix: i32, iy: i32, iz: i32) -> f32 {
        let p = &self.table;
        let h = p.get(p.get(p.get((ix & 255) as usize) + (iy & 255) as usize) + (iz & 255) as usize);
        h as f32 * (2.0 / 255.0) - 1.0
    }

    /// Samples 2D value noise. Returns a value in [-1, 1].
    #[must_use]
    pub fn sample2(&self, x: f32, z: f32) -> f32 {
        let ix = fast_floor(x);
        let iz = fast_floor(z);
        let tx = fade(x - ix as f32);
        let tz = fade(z - iz as f32);

        let v00 = self.lattice2(ix, iz);
        let v10 = self.lattice2(ix + 1, iz);
        let v01 = self.lattice2(ix, iz + 1);
        let v11 = self.lattice2(ix + 1, iz + 1);

        lerp(lerp(v00, v10, tx), lerp(v01, v11, tx), tz)
    }

    /// Samples 3D value noise. Returns a value in [-1, 1].
    #[must_use]
    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        let ix = fast_floor(x);
        let iy = fast_floor(y);
        let iz = fast_floor(z);
        let tx = fade(x - ix as f32);
        let ty = fade(y - iy as f32);
        let tz = fade(z - iz as f32);

        let c000 = self.lattice3(ix, iy, iz);
        let c100 = self.lattice3(ix + 1, iy, iz);
        let c010 = self.lattice3(ix, iy + 1, iz);
        let c110 = self.lattice3(ix + 1, iy + 1, iz);
        let c001 = self.lattice3(ix, iy, iz + 1);
        let c101 = self.lattice3(ix + 1, iy, iz + 1);
        let c011 = self.lattice3(ix, iy + 1, iz + 1);
        let c111 = self.lattice3(ix + 1, iy + 1, iz + 1);

        let x00 = lerp(c000, c100, tx);
        let x10 = lerp(c010, c110, tx);
        let x01 = lerp(c001, c101, tx);
        let x11 = lerp(c011, c111, tx);

        lerp(lerp(x00, x10, ty), lerp(x01, x11, ty), tz)
    }

    /// Fractal (octaved) 2D noise, persistence 0.5 and lacunarity 2.0,
    /// normalised back to [-1, 1].
    #[must_use]
    pub fn fbm2(&self, x: f32, z: f32, octaves: u32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for octave in 0..octaves {
            // Offset each octave so lattice points don't stack up at the origin.
            let shift = octave as f32 * 17.31;
            total += self.sample2(x * frequency + shift, z * frequency - shift) * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Fractal 3D noise, same octave rules as [`NoiseField::fbm2`].
    #[must_use]
    pub fn fbm3(&self, x: f32, y: f32, z: f32, octaves: u32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for octave in 0..octaves {
            let shift = octave as f32 * 17.31;
            total += self.sample3(x * frequency + shift, y * frequency, z * frequency - shift)
                * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Ridged 2D noise in [0, 1]: sharp crests where the base noise crosses zero.
    #[must_use]
    pub fn ridged2(&self, x: f32, z: f32, octaves: u32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            let ridge = 1.0 - self.sample2(x * frequency, z * frequency).abs();
            total += ridge * ridge * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

/// Integer hash of a 3D lattice position.
///
/// Used wherever a decision must be reproducible from world coordinates
/// alone (placement rolls, hysteresis direction).
#[inline]
#[must_use]
pub fn hash3(seed: u32, x: i32, y: i32, z: i32) -> u32 {
    let mut h = seed ^ 0x9E37_79B9;
    h = (h ^ x as u32).wrapping_mul(0x85EB_CA6B);
    h = h.rotate_left(13);
    h = (h ^ y as u32).wrapping_mul(0xC2B2_AE35);
    h = h.rotate_left(17);
    h = (h ^ z as u32).wrapping_mul(0x27D4_EB2F);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h = h.wrapping_mul(0x297A_2D39);
    h ^ (h >> 15)
}

/// Integer hash of a 2D column position.
#[inline]
#[must_use]
pub fn hash2(seed: u32, x: i32, z: i32) -> u32 {
    hash3(seed, x, 0x3C6E_F372, z)
}

/// Maps a hash to [0, 1).
#[inline]
#[must_use]
pub fn unit(hash: u32) -> f32 {
    (hash >> 8) as f32 / 16_777_216.0
}

/// Hash of a 3D position mapped to [0, 1).
#[inline]
#[must_use]
pub fn hash01(seed: u32, x: i32, y: i32, z: i32) -> f32 {
    unit(hash3(seed, x, y, z))
}

/// Linear interpolation.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep between `edge0` and `edge1`, clamped to [0, 1].
#[inline]
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Floor to i32 without going through `f32::floor`.
#[inline]
fn fast_floor(x: f32) -> i32 {
    let xi = x as i32;
    if x < xi as f32 { xi - 1 } else { xi }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise1 = NoiseField::new(WorldSeed::new(12345));
        let noise2 = NoiseField::new(WorldSeed::new(12345));

        for i in 0..200 {
            let x = i as f32 * 0.37 - 20.0;
            let y = i as f32 * 0.11;
            let z = i as f32 * 0.53 + 3.0;
            assert_eq!(noise1.sample2(x, z).to_bits(), noise2.sample2(x, z).to_bits());
            assert_eq!(noise1.sample3(x, y, z).to_bits(), noise2.sample3(x, y, z).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = NoiseField::new(WorldSeed::new(1));
        let noise2 = NoiseField::new(WorldSeed::new(2));

        let differs = (0..64).any(|i| {
            let x = i as f32 * 1.7 + 0.5;
            noise1.sample2(x, x * 0.3) != noise2.sample2(x, x * 0.3)
        });
        assert!(differs, "Different seeds should produce different fields");
    }

    #[test]
    fn test_range() {
        let noise = NoiseField::new(WorldSeed::new(42));

        for i in 0..10_000 {
            let x = (i as f32 * 0.1) - 500.0;
            let y = (i as f32 * 0.07) - 40.0;
            let z = (i as f32 * 0.13) - 650.0;
            let a = noise.sample2(x, z);
            let b = noise.sample3(x, y, z);
            let c = noise.fbm3(x, y, z, 3);
            assert!((-1.0..=1.0).contains(&a), "2D value {a} out of range");
            assert!((-1.0..=1.0).contains(&b), "3D value {b} out of range");
            assert!((-1.0..=1.0).contains(&c), "fbm value {c} out of range");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = NoiseField::new(WorldSeed::new(42));
        let v1 = noise.sample3(10.3, 4.2, -7.7);
        let v2 = noise.sample3(10.301, 4.2, -7.7);
        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_negative_coordinates_floor_correctly() {
        assert_eq!(fast_floor(-0.5), -1);
        assert_eq!(fast_floor(-1.0), -1);
        assert_eq!(fast_floor(2.7), 2);
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        assert_ne!(base.derive(1), base.derive(2));
        assert_eq!(base.derive(1), base.derive(1));
        assert_ne!(base.derive(1), base);
    }

    #[test]
    fn test_hash_spread() {
        let mut buckets = [0u32; 4];
        for x in -50..50 {
            for z in -50..50 {
                buckets[(hash2(7, x, z) % 4) as usize] += 1;
            }
        }
        for count in buckets {
            assert!(count > 2000, "Hash buckets should be roughly even: {buckets:?}");
        }
        assert!(unit(u32::MAX) < 1.0);
    }
}
