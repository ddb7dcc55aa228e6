//! Seeded sampling primitives.
//!
//! Every draw is a pure function of `(seed, call index)`: the call counter
//! is prepended to the seed string, the result is hashed with SHA-256 and
//! the digest keys a fresh ChaCha8 stream. No draw ever touches an
//! unseeded generator, so a run replays identically across processes and
//! platforms as long as the calls happen in the same order.

use crate::error::GenError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Default recency-bias shape.
pub const DEFAULT_SHAPE: f64 = 2.0;

/// Deterministic sampler owned by a single generation run.
///
/// The counter is part of the run's state: it starts at zero and is never
/// reset mid-run.
#[derive(Debug, Clone)]
pub struct Sampler {
    /// Seed string shared by every call
    seed: String,

    /// Number of draws made so far
    counter: u64,
}

impl Sampler {
    /// Creates a sampler at call index zero.
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            counter: 0,
        }
    }

    /// Returns the seed string.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Returns how many draws have been made.
    pub fn calls(&self) -> u64 {
        self.counter
    }

    /// Rewinds to call index zero. Only valid before a fresh run.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Derives the per-call stream and advances the counter.
    fn instance_rng(&mut self) -> ChaCha8Rng {
        let instance_seed = format!("{}{}", self.counter, self.seed);
        self.counter += 1;

        let digest = Sha256::digest(instance_seed.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        ChaCha8Rng::from_seed(key)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.instance_rng().gen::<f64>()
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.random() < p
    }

    /// Picks one label with probability proportional to its weight.
    ///
    /// Weights need not sum to one: raw frequencies and normalized
    /// fractions both work.
    pub fn sample_weighted<K: Clone>(&mut self, table: &[(K, f64)]) -> Result<K, GenError> {
        let dist = WeightedIndex::new(table.iter().map(|(_, w)| *w))
            .map_err(|e| GenError::InvalidWeights(e.to_string()))?;
        let index = dist.sample(&mut self.instance_rng());
        Ok(table[index].0.clone())
    }

    /// Integer in `[min, max]`, rounded to nearest.
    ///
    /// The end points are half as likely as interior values.
    pub fn random_int(&mut self, min: usize, max: usize) -> usize {
        let r = self.random();
        if max <= min {
            return min;
        }
        (min as f64 + r * (max - min) as f64).round() as usize
    }

    /// Pareto-style pick over `items`.
    ///
    /// `index = max(min_index, floor(u^shape * len))`. Any shape other than
    /// 1 skews the pick; shapes above 1 concentrate it on low indexes. A
    /// `min_index` of 1 keeps the oldest element out of reach.
    pub fn pareto_sample<'a, T>(
        &mut self,
        items: &'a [T],
        shape: f64,
        min_index: usize,
    ) -> Result<&'a T, GenError> {
        if items.is_empty() {
            return Err(GenError::EmptySample("pareto pool"));
        }
        let len = items.len();
        let scaled = (skew(self.random(), shape) * len as f64).floor() as usize;
        let index = scaled.max(min_index);
        items.get(index).ok_or(GenError::OutOfRange { index, len })
    }

    /// Uniform pick.
    pub fn uniform_sample<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, GenError> {
        if items.is_empty() {
            return Err(GenError::EmptySample("uniform pool"));
        }
        let len = items.len();
        let index = (self.random() * len as f64).floor() as usize;
        items.get(index).ok_or(GenError::OutOfRange { index, len })
    }

    /// Collects distinct recency-biased picks from `pool` on top of
    /// `must_include`, up to `target` elements in total.
    ///
    /// The target is capped by what the pool can still supply, so the loop
    /// ends even when `target` asks for more distinct values than exist.
    pub fn pareto_sample_many<T: Clone + PartialEq>(
        &mut self,
        pool: &[T],
        target: usize,
        must_include: Vec<T>,
        shape: f64,
        min_index: usize,
    ) -> Result<Vec<T>, GenError> {
        let mut picked = must_include;

        let mut reachable: Vec<&T> = Vec::new();
        for item in pool.iter().skip(min_index) {
            if !picked.contains(item) && !reachable.contains(&item) {
                reachable.push(item);
            }
        }
        let quantity = target.min(pool.len()).min(picked.len() + reachable.len());

        while picked.len() < quantity {
            let other = loop {
                let candidate = self.pareto_sample(pool, shape, min_index)?;
                if !picked.contains(candidate) {
                    break candidate.clone();
                }
            };
            picked.push(other);
        }
        Ok(picked)
    }

    /// Bell-shaped value in `[0, 1)`: the mean of two uniform draws.
    ///
    /// Only used for magnitudes (sizes, dimensions).
    pub fn somewhat_gaussian(&mut self) -> f64 {
        (self.random() + self.random()) * 0.5
    }
}

/// `u^shape`. Whole shapes multiply directly, so the result is identical on
/// every platform; fractional shapes go through `powf` and the platform libm.
fn skew(u: f64, shape: f64) -> f64 {
    if shape.fract() == 0.0 && (0.0..=64.0).contains(&shape) {
        (0..shape as u32).fold(1.0, |acc, _| acc * u)
    } else {
        u.powf(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Sampler::new("deterministic");
        let mut b = Sampler::new("deterministic");

        for _ in 0..100 {
            assert_eq!(a.random().to_bits(), b.random().to_bits());
        }
        assert_eq!(a.calls(), 100);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Sampler::new("alpha");
        let mut b = Sampler::new("beta");

        let xs: Vec<f64> = (0..10).map(|_| a.random()).collect();
        let ys: Vec<f64> = (0..10).map(|_| b.random()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_reset_replays() {
        let mut s = Sampler::new("replay");
        let first: Vec<f64> = (0..5).map(|_| s.random()).collect();
        s.reset();
        let second: Vec<f64> = (0..5).map(|_| s.random()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_independent_samplers_do_not_share_counter() {
        let mut a = Sampler::new("shared");
        let _ = a.random();
        let _ = a.random();

        let mut b = Sampler::new("shared");
        assert_eq!(b.calls(), 0);

        let mut fresh = Sampler::new("shared");
        assert_eq!(b.random().to_bits(), fresh.random().to_bits());
    }

    #[test]
    fn test_weighted_frequency_ratio() {
        let mut s = Sampler::new("weights");
        let table = [("a", 1.0), ("b", 3.0)];

        let mut a = 0u32;
        let mut b = 0u32;
        for _ in 0..100_000 {
            match s.sample_weighted(&table).unwrap() {
                "a" => a += 1,
                _ => b += 1,
            }
        }

        let ratio = b as f64 / a as f64;
        assert_relative_eq!(ratio, 3.0, epsilon = 0.15);
    }

    #[test]
    fn test_weighted_accepts_raw_and_normalized() {
        let mut s = Sampler::new("weights");
        let raw = [("x", 269447.0), ("y", 173264.0)];
        let normalized = [("x", 0.25), ("y", 0.75)];

        assert!(s.sample_weighted(&raw).is_ok());
        assert!(s.sample_weighted(&normalized).is_ok());
    }

    #[test]
    fn test_weighted_rejects_degenerate_tables() {
        let mut s = Sampler::new("weights");
        let empty: [(&str, f64); 0] = [];
        let zeros = [("a", 0.0), ("b", 0.0)];

        assert!(matches!(s.sample_weighted(&empty), Err(GenError::InvalidWeights(_))));
        assert!(matches!(s.sample_weighted(&zeros), Err(GenError::InvalidWeights(_))));
    }

    #[test]
    fn test_zero_weight_never_drawn() {
        let mut s = Sampler::new("zero");
        let table = [("never", 0.0), ("always", 1.0)];
        for _ in 0..1000 {
            assert_eq!(s.sample_weighted(&table).unwrap(), "always");
        }
    }

    #[test]
    fn test_empty_pool_fails_loudly() {
        let mut s = Sampler::new("empty");
        let items: [u8; 0] = [];

        assert!(matches!(
            s.pareto_sample(&items, DEFAULT_SHAPE, 0),
            Err(GenError::EmptySample(_))
        ));
        assert!(matches!(s.uniform_sample(&items), Err(GenError::EmptySample(_))));
    }

    #[test]
    fn test_min_index_out_of_range_fails() {
        let mut s = Sampler::new("range");
        let items = [1u8];
        assert!(matches!(
            s.pareto_sample(&items, 1.6, 1),
            Err(GenError::OutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_pareto_shape_skews_distribution() {
        let mut s = Sampler::new("recency");
        let items: Vec<usize> = (0..10).collect();

        let mut upper = 0;
        for _ in 0..10_000 {
            if *s.pareto_sample(&items, DEFAULT_SHAPE, 0).unwrap() >= 5 {
                upper += 1;
            }
        }
        // index >= 5 iff u^2 >= 0.5, i.e. u >= 0.707
        assert!(upper > 2_500 && upper < 3_400, "upper-half picks: {}", upper);
    }

    #[test]
    fn test_sample_many_caps_at_pool_size() {
        let mut s = Sampler::new("many");
        let pool = vec!["a", "b", "c"];

        let picked = s.pareto_sample_many(&pool, 10, vec![], DEFAULT_SHAPE, 0).unwrap();
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_sample_many_keeps_forced_elements_first() {
        let mut s = Sampler::new("many");
        let pool = vec!["a", "b", "c", "d"];

        let picked = s
            .pareto_sample_many(&pool, 3, vec!["c"], DEFAULT_SHAPE, 0)
            .unwrap();
        assert_eq!(picked[0], "c");
        assert_eq!(picked.len(), 3);
        assert_eq!(picked.iter().filter(|x| **x == "c").count(), 1);
    }

    #[test]
    fn test_sample_many_respects_min_index() {
        let mut s = Sampler::new("many");
        let pool = vec![0, 1, 2];

        let picked = s.pareto_sample_many(&pool, 3, vec![], DEFAULT_SHAPE, 1).unwrap();
        assert_eq!(picked.len(), 2);
        assert!(!picked.contains(&0));
    }

    #[test]
    fn test_random_int_bounds() {
        let mut s = Sampler::new("ints");
        for _ in 0..1000 {
            let n = s.random_int(1, 5);
            assert!((1..=5).contains(&n));
        }
        assert_eq!(s.random_int(3, 3), 3);
    }

    proptest! {
        #[test]
        fn prop_random_in_unit_interval(seed in "[a-z]{1,12}", draws in 1usize..50) {
            let mut s = Sampler::new(seed);
            for _ in 0..draws {
                let x = s.random();
                prop_assert!((0.0..1.0).contains(&x));
            }
        }

        #[test]
        fn prop_gaussian_in_unit_interval(seed in "[a-z]{1,12}") {
            let mut s = Sampler::new(seed);
            let x = s.somewhat_gaussian();
            prop_assert!((0.0..1.0).contains(&x));
            prop_assert_eq!(s.calls(), 2);
        }

        #[test]
        fn prop_sample_many_distinct(seed in "[a-z]{1,12}", size in 1usize..20, target in 0usize..30) {
            let mut s = Sampler::new(seed);
            let pool: Vec<usize> = (0..size).collect();
            let picked = s.pareto_sample_many(&pool, target, vec![], DEFAULT_SHAPE, 0).unwrap();

            prop_assert_eq!(picked.len(), target.min(size));
            let mut dedup = picked.clone();
            dedup.sort();
            dedup.dedup();
            prop_assert_eq!(dedup.len(), picked.len());
        }
    }

    #[test]
    fn test_whole_shapes_multiply_exactly() {
        for u in [0.0, 0.1, 0.5, 0.73, 0.999] {
            assert_eq!(skew(u, 0.0), 1.0);
            assert_eq!(skew(u, 1.0), u);
            assert_eq!(skew(u, 2.0), u * u);
            assert_eq!(skew(u, 3.0), u * u * u);
        }
        assert_relative_eq!(skew(0.5, 1.6), 0.5f64.powf(1.6));
    }
}
