use crate::least_squares::{LeastSquaresResult, LeastSquaresTrait, sum_of_squares};

use cobyla::{Func, RhoBeg, StopTols, minimize};
use ndarray::Array1;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// COBYLA (Constrained Optimization BY Linear Approximations) least-squares wrapper
///
/// Derivative-free minimization of $\chi^2$. Parameters are boxed into $[-b, b]$ with
/// $b$ = `bound`, which should be far outside the expected solution.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "Cobyla", default)]
pub struct CobylaLeastSquares {
    /// Maximum number of function evaluations
    pub niterations: usize,
    /// Initial change to parameters
    pub rhobeg: f64,
    /// Relative tolerance on $\chi^2$
    pub ftol_rel: f64,
    /// Relative tolerance on parameters
    pub xtol_rel: f64,
    pub bound: f64,
}

impl CobylaLeastSquares {
    #[inline]
    pub fn default_niterations() -> usize {
        1000
    }

    #[inline]
    pub fn default_rhobeg() -> f64 {
        0.5
    }

    #[inline]
    pub fn default_ftol_rel() -> f64 {
        1e-6
    }

    #[inline]
    pub fn default_xtol_rel() -> f64 {
        1e-8
    }

    #[inline]
    pub fn default_bound() -> f64 {
        1e8
    }
}

impl Default for CobylaLeastSquares {
    fn default() -> Self {
        Self {
            niterations: Self::default_niterations(),
            rhobeg: Self::default_rhobeg(),
            ftol_rel: Self::default_ftol_rel(),
            xtol_rel: Self::default_xtol_rel(),
            bound: Self::default_bound(),
        }
    }
}

impl LeastSquaresTrait for CobylaLeastSquares {
    fn minimize<F>(&self, residual: F, x0: &[f64]) -> LeastSquaresResult
    where
        F: Fn(&[f64]) -> Array1<f64>,
    {
        let evaluations = Cell::new(0_usize);
        let objective = |x: &[f64], _user_data: &mut ()| -> f64 {
            evaluations.set(evaluations.get() + 1);
            sum_of_squares(&residual(x))
        };
        let bounds = vec![(-self.bound, self.bound); x0.len()];
        // No constraints beyond the bounds
        let constraints: Vec<&dyn Func<()>> = vec![];
        let stop_tol = StopTols {
            ftol_rel: self.ftol_rel,
            xtol_rel: self.xtol_rel,
            ..StopTols::default()
        };

        let (x, chi2, success) = match minimize(
            objective,
            x0,
            &bounds,
            &constraints,
            (),
            self.niterations,
            RhoBeg::All(self.rhobeg),
            Some(stop_tol),
        ) {
            Ok((status, x, chi2)) => {
                let success = matches!(
                    status,
                    cobyla::SuccessStatus::Success
                        | cobyla::SuccessStatus::FtolReached
                        | cobyla::SuccessStatus::XtolReached
                );
                (x, chi2, success)
            }
            Err((_status, x, chi2)) => (x, chi2, false),
        };
        let iterations = evaluations.get();
        tracing::debug!(iterations, chi2, success, "COBYLA finished");
        LeastSquaresResult {
            x,
            chi2,
            iterations,
            success,
        }
    }
}
