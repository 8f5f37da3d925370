//! Memoized two-dimensional simplex noise over integer cells.

use std::collections::HashMap;

use catacomb_core::CellCoord;
use rand::{seq::SliceRandom, Rng};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

/// Scale applied to cell coordinates before sampling; neighbouring cells stay correlated.
const FREQUENCY: f32 = 0.1;

const F2: f32 = 0.366_025_42;
const G2: f32 = 0.211_324_87;

const GRADIENTS: [(f32, f32); 12] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// Deterministic scalar field in `[-1, 1]`, cached per cell.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perm: [u8; 512],
    cache: HashMap<CellCoord, f32>,
}

impl NoiseField {
    /// Builds the permutation table from `rng`.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(rng);
        let mut perm = [0_u8; 512];
        for (index, slot) in perm.iter_mut().enumerate() {
            *slot = table[index & 255];
        }
        Self {
            perm,
            cache: HashMap::new(),
        }
    }

    /// Builds a reproducible field from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Builds a field seeded from system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Noise at `cell`, computed once and then served from the cache.
    pub fn get_noise(&mut self, cell: CellCoord) -> f32 {
        let perm = &self.perm;
        *self.cache.entry(cell).or_insert_with(|| {
            simplex(
                perm,
                cell.column() as f32 * FREQUENCY,
                cell.row() as f32 * FREQUENCY,
            )
        })
    }

    /// Number of memoized cells.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn simplex(perm: &[u8; 512], x: f32, y: f32) -> f32 {
    let skew = (x + y) * F2;
    let i = (x + skew).floor();
    let j = (y + skew).floor();
    let unskew = (i + j) * G2;
    let x0 = x - (i - unskew);
    let y0 = y - (j - unskew);

    let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };
    let x1 = x0 - i1 as f32 + G2;
    let y1 = y0 - j1 as f32 + G2;
    let x2 = x0 - 1.0 + 2.0 * G2;
    let y2 = y0 - 1.0 + 2.0 * G2;

    let ii = (i as i64).rem_euclid(256) as usize;
    let jj = (j as i64).rem_euclid(256) as usize;
    let gradient = |a: usize, b: usize| usize::from(perm[a + usize::from(perm[b])]) % 12;
    let g0 = gradient(ii, jj);
    let g1 = gradient(ii + i1, jj + j1);
    let g2 = gradient(ii + 1, jj + 1);

    let total = corner(g0, x0, y0) + corner(g1, x1, y1) + corner(g2, x2, y2);
    (70.0 * total).clamp(-1.0, 1.0)
}

fn corner(gradient: usize, x: f32, y: f32) -> f32 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let (gx, gy) = GRADIENTS[gradient];
    let t2 = t * t;
    t2 * t2 * (gx * x + gy * y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_table_wraps_around() {
        let field = NoiseField::with_seed(7);
        for index in 0..256 {
            assert_eq!(field.perm[index], field.perm[index + 256]);
        }
        let mut sorted: Vec<u8> = field.perm[..256].to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..=255).collect::<Vec<u8>>());
    }

    #[test]
    fn noise_is_idempotent_and_bounded() {
        let mut field = NoiseField::with_seed(11);
        for column in -40..40 {
            for row in -40..40 {
                let cell = CellCoord::new(column, row);
                let first = field.get_noise(cell);
                assert!(first.is_finite());
                assert!((-1.0..=1.0).contains(&first));
                assert_eq!(first, field.get_noise(cell));
            }
        }
        assert_eq!(field.cached(), 80 * 80);
    }

    #[test]
    fn cache_does_not_change_values() {
        let mut cached = NoiseField::with_seed(3);
        let fresh = NoiseField::with_seed(3);
        let cell = CellCoord::new(12, -5);
        let _ = cached.get_noise(cell);
        let expected = simplex(&fresh.perm, 12.0 * FREQUENCY, -5.0 * FREQUENCY);
        assert_eq!(cached.get_noise(cell), expected);
    }

    #[test]
    fn different_seeds_produce_different_fields() {
        let mut first = NoiseField::with_seed(1);
        let mut second = NoiseField::with_seed(2);
        let differing = (0..64)
            .map(|index| CellCoord::new(index * 3, index * 7 - 100))
            .filter(|cell| first.get_noise(*cell) != second.get_noise(*cell))
            .count();
        assert!(differing > 32);
    }
}
