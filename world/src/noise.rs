//! Seeded 2D gradient noise with fractal summation.
//!
//! Given the same seed the permutation table is byte-identical, so every
//! sample is reproducible across runs and platforms.

const LCG_MULTIPLIER: u64 = 9_301;
const LCG_INCREMENT: u64 = 49_297;
const LCG_MODULUS: u64 = 233_280;

/// Linear-congruential stream producing uniform draws in `[0, 1)`.
#[derive(Clone, Debug)]
pub(crate) struct Lcg {
    state: u64,
}

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        // The recurrence only depends on the state modulo the modulus, so
        // reducing up front keeps the multiplication from overflowing.
        Self {
            state: seed % LCG_MODULUS,
        }
    }

    pub(crate) fn next_unit(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }
}

/// Deterministic gradient noise field derived from a seed.
///
/// The field is immutable after construction and therefore safe to share
/// between threads sampling disjoint coordinates.
#[derive(Clone)]
pub struct NoiseField {
    seed: u64,
    perm: [u8; 512],
}

impl NoiseField {
    /// Builds the permutation table for the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut table = [0_u8; 256];
        for (index, slot) in table.iter_mut().enumerate() {
            *slot = index as u8;
        }

        let mut random = Lcg::new(seed);
        for index in (1..table.len()).rev() {
            let swap_index = (random.next_unit() * (index + 1) as f64).floor() as usize;
            table.swap(index, swap_index);
        }

        let mut perm = [0_u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);

        Self { seed, perm }
    }

    /// Seed the field was derived from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The 256-entry permutation (first half of the doubled table).
    #[must_use]
    pub fn permutation(&self) -> &[u8] {
        &self.perm[..256]
    }

    /// Raw gradient noise in `[-1, 1]`.
    #[must_use]
    pub fn noise_2d(&self, x: f64, y: f64) -> f64 {
        let floor_x = x.floor();
        let floor_y = y.floor();
        let cell_x = (floor_x as i64 & 255) as usize;
        let cell_y = (floor_y as i64 & 255) as usize;

        let x = x - floor_x;
        let y = y - floor_y;
        let u = fade(x);
        let v = fade(y);

        let perm = &self.perm;
        let a = usize::from(perm[cell_x]) + cell_y;
        let b = usize::from(perm[cell_x + 1]) + cell_y;
        let aa = perm[a];
        let ab = perm[a + 1];
        let ba = perm[b];
        let bb = perm[b + 1];

        lerp(
            lerp(grad(aa, x, y), grad(ba, x - 1.0, y), u),
            lerp(grad(ab, x, y - 1.0), grad(bb, x - 1.0, y - 1.0), u),
            v,
        )
    }

    /// Single-octave noise remapped to `[0, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        (self.noise_2d(x, y) + 1.0) / 2.0
    }

    /// Fractal sum of `octaves` noise passes, normalised to `[0, 1]`.
    ///
    /// Frequency starts at `scale` and grows by `lacunarity` per octave while
    /// amplitude starts at 1 and decays by `persistence`. The sum is divided
    /// by the total amplitude before remapping. Zero octaves yields the
    /// midpoint `0.5`.
    #[must_use]
    pub fn fractal(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
        scale: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut frequency = scale;
        let mut amplitude = 1.0;
        let mut amplitude_sum = 0.0;

        for _ in 0..octaves {
            total += self.noise_2d(x * frequency, y * frequency) * amplitude;
            amplitude_sum += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if amplitude_sum == 0.0 {
            return 0.5;
        }

        (total / amplitude_sum + 1.0) / 2.0
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: u8, x: f64, y: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        0.0
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_matches_reference_recurrence() {
        let mut random = Lcg::new(1);
        let first = random.next_unit();
        assert!((first - 58_598.0 / 233_280.0).abs() < 1e-12);
        let second = random.next_unit();
        let expected = ((58_598 * 9_301 + 49_297) % 233_280) as f64 / 233_280.0;
        assert!((second - expected).abs() < 1e-12);
    }

    #[test]
    fn large_seeds_do_not_overflow() {
        let mut random = Lcg::new(u64::MAX);
        let draw = random.next_unit();
        assert!((0.0..1.0).contains(&draw));
    }

    #[test]
    fn permutation_is_a_shuffle_of_identity() {
        let field = NoiseField::new(12_256_897);
        let mut sorted = field.permutation().to_vec();
        sorted.sort_unstable();
        let identity: Vec<u8> = (0..=255).collect();
        assert_eq!(sorted, identity);
        assert_eq!(&field.perm[..256], &field.perm[256..]);
    }

    #[test]
    fn identical_seeds_build_identical_tables() {
        assert_eq!(
            NoiseField::new(42).permutation(),
            NoiseField::new(42).permutation()
        );
        assert_ne!(
            NoiseField::new(42).permutation(),
            NoiseField::new(43).permutation()
        );
    }

    #[test]
    fn fractal_is_stable_across_calls() {
        let field = NoiseField::new(1);
        let first = field.fractal(10.0, 10.0, 4, 0.5, 2.0, 0.05);
        let second = field.fractal(10.0, 10.0, 4, 0.5, 2.0, 0.05);
        assert_eq!(first.to_bits(), second.to_bits());
        assert!((0.0..=1.0).contains(&first));
    }

    #[test]
    fn noise_vanishes_on_lattice_points() {
        let field = NoiseField::new(7);
        for (x, y) in [(0.0, 0.0), (3.0, 9.0), (-4.0, 17.0)] {
            assert_eq!(field.noise_2d(x, y), 0.0);
        }
    }

    #[test]
    fn noise_stays_within_unit_range() {
        let field = NoiseField::new(99);
        for step in 0..2_000 {
            let x = f64::from(step) * 0.173 - 150.0;
            let y = f64::from(step) * 0.311 - 40.0;
            let value = field.noise_2d(x, y);
            assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&value), "{value}");
            let normalised = field.fractal(x, y, 5, 0.5, 2.0, 0.07);
            assert!((0.0 - 1e-9..=1.0 + 1e-9).contains(&normalised), "{normalised}");
        }
    }

    #[test]
    fn zero_octaves_returns_midpoint() {
        let field = NoiseField::new(3);
        assert_eq!(field.fractal(1.5, 2.5, 0, 0.5, 2.0, 0.05), 0.5);
    }

    #[test]
    fn single_octave_matches_sample() {
        let field = NoiseField::new(5);
        let fractal = field.fractal(12.3, 4.5, 1, 0.5, 2.0, 1.0);
        assert!((fractal - field.sample(12.3, 4.5)).abs() < 1e-12);
    }
}
