//! Generic RANSAC engine for robust model estimation.
//!
//! Repeatedly fits a model to a minimal random sample, scores it by
//! inlier count under an error threshold, and keeps the best consensus.
//! The iteration count is bounded so pathological data sets always
//! terminate, and the RNG can be seeded for reproducible runs.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct RobustConfig {
    /// Inlier threshold on the per-datum error.
    pub threshold: f64,
    /// Hard upper bound on sampling iterations.
    pub max_iterations: usize,
    /// Inlier fraction at which the search stops early.
    pub confidence: f64,
    /// RNG seed; `None` draws a seed from the OS.
    pub seed: Option<u64>,
}

impl Default for RobustConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            max_iterations: 1000,
            confidence: 0.99,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RobustResult<M> {
    pub model: Option<M>,
    pub inliers: Vec<bool>,
    pub num_inliers: usize,
    pub residual: f64,
}

impl<M> RobustResult<M> {
    fn empty(n: usize) -> Self {
        Self {
            model: None,
            inliers: vec![false; n],
            num_inliers: 0,
            residual: f64::INFINITY,
        }
    }
}

/// A model that can be estimated from a minimal sample and scored
/// per datum.
pub trait RobustModel<D> {
    type Model: Clone;

    /// Minimum number of data points required to estimate the model.
    fn min_sample_size(&self) -> usize;

    /// Estimate a candidate model from a minimal sample.
    fn estimate(&self, data: &[&D]) -> Option<Self::Model>;

    /// Error of a single data point against a model.
    fn compute_error(&self, model: &Self::Model, data: &D) -> f64;
}

pub struct Ransac {
    config: RobustConfig,
}

impl Ransac {
    pub fn new(config: RobustConfig) -> Self {
        Self { config }
    }

    pub fn run<D, M: RobustModel<D>>(&self, estimator: &M, data: &[D]) -> RobustResult<M::Model> {
        let n = data.len();
        let k = estimator.min_sample_size();

        if n < k {
            return RobustResult::empty(n);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut best = RobustResult::empty(n);
        let mut indices: Vec<usize> = (0..n).collect();

        for _ in 0..self.config.max_iterations {
            indices.shuffle(&mut rng);
            let sample: Vec<&D> = indices[..k].iter().map(|&i| &data[i]).collect();

            let Some(model) = estimator.estimate(&sample) else {
                continue;
            };

            let mut inliers = vec![false; n];
            let mut num_inliers = 0;
            let mut total_error = 0.0;

            for (j, d) in data.iter().enumerate() {
                let err = estimator.compute_error(&model, d);
                if err < self.config.threshold {
                    inliers[j] = true;
                    num_inliers += 1;
                    total_error += err;
                }
            }

            let residual = if num_inliers > 0 {
                total_error / num_inliers as f64
            } else {
                f64::INFINITY
            };

            if num_inliers > best.num_inliers
                || (num_inliers == best.num_inliers && residual < best.residual)
            {
                best = RobustResult {
                    model: Some(model),
                    inliers,
                    num_inliers,
                    residual,
                };

                if num_inliers as f64 > n as f64 * self.config.confidence {
                    break;
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1-D offset model: data are (x, y) pairs with y = x + b.
    struct OffsetEstimator;

    impl RobustModel<(f64, f64)> for OffsetEstimator {
        type Model = f64;

        fn min_sample_size(&self) -> usize {
            1
        }

        fn estimate(&self, data: &[&(f64, f64)]) -> Option<f64> {
            data.first().map(|(x, y)| y - x)
        }

        fn compute_error(&self, model: &f64, data: &(f64, f64)) -> f64 {
            (data.1 - data.0 - model).abs()
        }
    }

    fn noisy_offset_data() -> Vec<(f64, f64)> {
        let mut data: Vec<(f64, f64)> =
            (0..40).map(|i| (i as f64, i as f64 + 5.0)).collect();
        // Gross outliers.
        for i in 0..8 {
            data.push((i as f64, i as f64 * 50.0));
        }
        data
    }

    #[test]
    fn finds_consensus_offset_despite_outliers() {
        let data = noisy_offset_data();
        let ransac = Ransac::new(RobustConfig {
            threshold: 0.5,
            seed: Some(7),
            ..Default::default()
        });
        let result = ransac.run(&OffsetEstimator, &data);
        let model = result.model.expect("model");
        assert!((model - 5.0).abs() < 1e-9);
        assert_eq!(result.num_inliers, 40);
    }

    #[test]
    fn seeded_runs_are_deterministic() {
        let data = noisy_offset_data();
        let config = RobustConfig {
            threshold: 0.5,
            seed: Some(42),
            ..Default::default()
        };
        let a = Ransac::new(config.clone()).run(&OffsetEstimator, &data);
        let b = Ransac::new(config).run(&OffsetEstimator, &data);
        assert_eq!(a.model, b.model);
        assert_eq!(a.inliers, b.inliers);
    }

    #[test]
    fn too_few_points_yields_no_model() {
        let ransac = Ransac::new(RobustConfig::default());
        let result = ransac.run(&OffsetEstimator, &[]);
        assert!(result.model.is_none());
        assert_eq!(result.num_inliers, 0);
    }
}
