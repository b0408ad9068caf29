//! Corruption RNG Policy
//!
//! The single random source of a game session. Every corrupted choice (room
//! type, door rolls, enemy variants, cursed coins, glitch timers) is drawn
//! through [`CorruptionRng`], so a fixed seed reproduces a whole run.
//!
//! - `weighted_choice`: weight-proportional pick, fails fast on bad weights
//! - `chance`: Bernoulli trial
//! - range helpers for the uniform draws the generators need

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use sha3::{Digest, Sha3_256};
use thiserror::Error;

use crate::geometry::Rgb;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorruptionError {
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
}

/// Seedable random source owned by the game context
#[derive(Debug, Clone)]
pub struct CorruptionRng {
    seed: u64,
    rng: Xoshiro256PlusPlus,
}

impl CorruptionRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Fresh session with an OS-provided seed (still recorded for replay)
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    /// Seed derived from a text phrase, so runs can be shared by name
    pub fn from_phrase(phrase: &str) -> Self {
        Self::from_seed(phrase_seed(phrase))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Pick one value with probability proportional to its weight.
    ///
    /// Weights must be finite and non-negative with a positive sum; anything
    /// else is a caller bug and is reported as [`CorruptionError::InvalidWeights`].
    pub fn weighted_choice<'a, T>(
        &mut self,
        options: &'a [(T, f64)],
    ) -> Result<&'a T, CorruptionError> {
        if options.is_empty() {
            return Err(CorruptionError::InvalidWeights("no options".into()));
        }
        if let Some((i, (_, w))) = options
            .iter()
            .enumerate()
            .find(|(_, (_, w))| !w.is_finite() || *w < 0.0)
        {
            return Err(CorruptionError::InvalidWeights(format!(
                "weight #{i} is {w}"
            )));
        }

        let index = WeightedIndex::new(options.iter().map(|(_, w)| *w))
            .map_err(|e| CorruptionError::InvalidWeights(e.to_string()))?;
        Ok(&options[index.sample(&mut self.rng)].0)
    }

    /// True with probability `p` (clamped to [0, 1]; NaN never fires)
    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform float in `[lo, hi]`
    pub fn range_f32(&mut self, (lo, hi): (f32, f32)) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform integer in `[lo, hi]`
    pub fn range_u32(&mut self, (lo, hi): (u32, u32)) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform integer in `[lo, hi]`
    pub fn range_i32(&mut self, (lo, hi): (i32, i32)) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Symmetric uniform draw in `[-spread, spread]`
    pub fn spread(&mut self, spread: f32) -> f32 {
        self.range_f32((-spread, spread))
    }

    /// Uniformly pick one element, `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    pub fn color(&mut self) -> Rgb {
        Rgb(self.rng.gen(), self.rng.gen(), self.rng.gen())
    }
}

/// SHA3-256 of the phrase, first 8 bytes little-endian
pub fn phrase_seed(phrase: &str) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(phrase.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = CorruptionRng::from_seed(7);
        let mut b = CorruptionRng::from_seed(7);
        for _ in 0..100 {
            assert_eq!(a.range_u32((0, 1000)), b.range_u32((0, 1000)));
        }
    }

    #[test]
    fn test_weighted_choice_single_positive() {
        let mut rng = CorruptionRng::from_seed(1);
        let options = [("never", 0.0), ("always", 2.0), ("nope", 0.0)];
        for _ in 0..200 {
            assert_eq!(*rng.weighted_choice(&options).unwrap(), "always");
        }
    }

    #[test]
    fn test_weighted_choice_rejects_all_zero() {
        let mut rng = CorruptionRng::from_seed(1);
        let err = rng.weighted_choice(&[(1, 0.0), (2, 0.0)]).unwrap_err();
        assert!(matches!(err, CorruptionError::InvalidWeights(_)));
    }

    #[test]
    fn test_weighted_choice_rejects_negative_and_nan() {
        let mut rng = CorruptionRng::from_seed(1);
        assert!(rng.weighted_choice(&[(1, 3.0), (2, -1.0)]).is_err());
        assert!(rng.weighted_choice(&[(1, f64::NAN)]).is_err());
        assert!(rng.weighted_choice(&[(1, f64::INFINITY)]).is_err());
        assert!(rng.weighted_choice::<u8>(&[]).is_err());
    }

    #[test]
    fn test_weighted_choice_proportions() {
        let mut rng = CorruptionRng::from_seed(99);
        let options = [(0usize, 1.0), (1usize, 3.0)];
        let mut counts = [0u32; 2];
        for _ in 0..8000 {
            counts[*rng.weighted_choice(&options).unwrap()] += 1;
        }
        let ratio = counts[1] as f64 / 8000.0;
        assert!((ratio - 0.75).abs() < 0.03, "ratio was {ratio}");
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = CorruptionRng::from_seed(3);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
            assert!(rng.chance(4.0));
            assert!(!rng.chance(-1.0));
            assert!(!rng.chance(f64::NAN));
        }
    }

    #[test]
    fn test_ranges_inclusive_and_degenerate() {
        let mut rng = CorruptionRng::from_seed(5);
        for _ in 0..500 {
            let n = rng.range_u32((2, 5));
            assert!((2..=5).contains(&n));
            let f = rng.range_f32((1.0, 4.0));
            assert!((1.0..=4.0).contains(&f));
        }
        assert_eq!(rng.range_u32((4, 4)), 4);
        assert_eq!(rng.range_f32((2.0, 2.0)), 2.0);
    }

    #[test]
    fn test_phrase_seed_stable() {
        assert_eq!(phrase_seed("L is real 2401"), phrase_seed("L is real 2401"));
        assert_ne!(phrase_seed("L is real 2401"), phrase_seed("l is real 2401"));
        let rng = CorruptionRng::from_phrase("every copy");
        assert_eq!(rng.seed(), phrase_seed("every copy"));
    }
}
