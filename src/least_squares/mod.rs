//! Least-squares minimizers used to fit Fisher matrices to overlap samples
//!
//! Every algorithm minimizes $\chi^2 = \sum_k r_k(x)^2$ for a residual vector $r(x)$ evaluated by
//! a caller-provided closure. [`LeastSquaresAlgorithm`] wraps the available implementations.

use enum_dispatch::enum_dispatch;
use ndarray::Array1;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod cobyla;
pub use cobyla::CobylaLeastSquares;

mod levenberg_marquardt;
pub use levenberg_marquardt::LmLeastSquares;

mod polyfit;
pub use polyfit::polyfit2;

/// Best-fit parameters and the goodness of fit
#[derive(Clone, Debug, PartialEq)]
pub struct LeastSquaresResult {
    pub x: Vec<f64>,
    /// Sum of squared residuals at `x`
    pub chi2: f64,
    /// Number of iterations or function evaluations, depending on the algorithm
    pub iterations: usize,
    pub success: bool,
}

#[enum_dispatch]
pub trait LeastSquaresTrait {
    fn minimize<F>(&self, residual: F, x0: &[f64]) -> LeastSquaresResult
    where
        F: Fn(&[f64]) -> Array1<f64>;
}

/// Least-squares algorithm selector
#[enum_dispatch(LeastSquaresTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[non_exhaustive]
pub enum LeastSquaresAlgorithm {
    LevenbergMarquardt(LmLeastSquares),
    Cobyla(CobylaLeastSquares),
}

impl Default for LeastSquaresAlgorithm {
    fn default() -> Self {
        LmLeastSquares::default().into()
    }
}

#[inline]
pub(crate) fn sum_of_squares(r: &Array1<f64>) -> f64 {
    r.dot(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::Zip;
    use rand::prelude::*;
    use rand_distr::Normal;

    /// Noisy samples of $a e^{-b t}$
    fn exponential_decay(rng: &mut StdRng) -> (Array1<f64>, Array1<f64>) {
        let noise = Normal::new(0.0, 0.01).unwrap();
        let t = Array1::linspace(0.0, 3.0, 50);
        let y = t.mapv(|t| 2.0 * f64::exp(-0.7 * t) + rng.sample(noise));
        (t, y)
    }

    #[test]
    fn algorithms_agree_on_exponential_decay() {
        let mut rng = StdRng::seed_from_u64(0);
        let (t, y) = exponential_decay(&mut rng);
        let residual = |x: &[f64]| {
            Zip::from(&t)
                .and(&y)
                .map_collect(|&t, &y| y - x[0] * f64::exp(-x[1] * t))
        };
        let algorithms: [LeastSquaresAlgorithm; 2] = [
            LmLeastSquares::default().into(),
            CobylaLeastSquares {
                niterations: 10_000,
                ftol_rel: 1e-14,
                ..CobylaLeastSquares::default()
            }
            .into(),
        ];
        let results: Vec<_> = algorithms
            .iter()
            .map(|algorithm| algorithm.minimize(residual, &[1.0, 1.0]))
            .collect();
        for result in &results {
            assert!(result.success, "{result:?}");
            assert_relative_eq!(result.x[0], 2.0, max_relative = 0.02);
            assert_relative_eq!(result.x[1], 0.7, max_relative = 0.02);
        }
        assert_relative_eq!(results[0].x[0], results[1].x[0], max_relative = 1e-3);
        assert_relative_eq!(results[0].x[1], results[1].x[1], max_relative = 1e-3);
        assert_relative_eq!(results[0].chi2, results[1].chi2, max_relative = 1e-4);
    }

    #[test]
    fn default_is_levenberg_marquardt() {
        assert!(matches!(
            LeastSquaresAlgorithm::default(),
            LeastSquaresAlgorithm::LevenbergMarquardt(_)
        ));
    }

    #[test]
    fn algorithm_serialization() {
        let algorithm: LeastSquaresAlgorithm = CobylaLeastSquares::default().into();
        let json = serde_json::to_string(&algorithm).unwrap();
        let restored: LeastSquaresAlgorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(algorithm, restored);
    }
}
