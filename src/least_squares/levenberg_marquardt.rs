use crate::least_squares::{LeastSquaresResult, LeastSquaresTrait, sum_of_squares};

use argmin::core::{CostFunction, Error, Executor, Gradient, Hessian, IterState, State};
use argmin::solver::trustregion::{Steihaug, TrustRegion};
use ndarray::{Array1, Array2, Axis};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Levenberg-Marquardt non-linear least squares
///
/// Uses the trust-region form of the method: every iteration minimizes the Gauss-Newton model
/// $$
/// \chi^2(x + \delta) \approx \chi^2(x) + 2 \delta^T J^T r + \delta^T J^T J \delta
/// $$
/// within a ball of adaptive radius, which is equivalent to damping $J^T J$ with a step-dependent
/// $\lambda$. The Jacobian is approximated by forward differences, the sub-problem is solved by
/// `argmin`'s Steihaug conjugate-gradient method.
///
/// The fit is successful if the residuals are orthogonal to every Jacobian column within
/// `gtol` (the cosine of the angle between them), or if $\chi^2$ dropped to round-off level.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "LevenbergMarquardt", default)]
pub struct LmLeastSquares {
    pub max_iterations: usize,
    /// Initial trust-region radius in parameter units, large values start with a plain
    /// Gauss-Newton step
    pub initial_radius: f64,
    pub max_radius: f64,
    /// Steps with a smaller ratio of actual to predicted decrease are rejected, `[0, 1/4)`
    pub eta: f64,
    pub gtol: f64,
}

impl LmLeastSquares {
    #[inline]
    pub fn default_max_iterations() -> usize {
        100
    }

    #[inline]
    pub fn default_initial_radius() -> f64 {
        1e8
    }

    #[inline]
    pub fn default_max_radius() -> f64 {
        1e8
    }

    #[inline]
    pub fn default_eta() -> f64 {
        0.125
    }

    #[inline]
    pub fn default_gtol() -> f64 {
        1e-6
    }
}

impl Default for LmLeastSquares {
    fn default() -> Self {
        Self {
            max_iterations: Self::default_max_iterations(),
            initial_radius: Self::default_initial_radius(),
            max_radius: Self::default_max_radius(),
            eta: Self::default_eta(),
            gtol: Self::default_gtol(),
        }
    }
}

/// Forward-difference Jacobian, one row per residual
fn jacobian<F>(residual: &F, x: &[f64], r: &Array1<f64>) -> Array2<f64>
where
    F: Fn(&[f64]) -> Array1<f64>,
{
    let mut jac = Array2::zeros((r.len(), x.len()));
    let mut shifted = x.to_vec();
    for (mut column, (j, &xj)) in jac.axis_iter_mut(Axis(1)).zip(x.iter().enumerate()) {
        let h = f64::EPSILON.sqrt() * xj.abs().max(1.0);
        shifted[j] = xj + h;
        column.assign(&((residual(&shifted) - r) / h));
        shifted[j] = xj;
    }
    jac
}

/// Largest cosine between the residual vector and a Jacobian column
fn max_gradient_cosine(jac: &Array2<f64>, r: &Array1<f64>) -> f64 {
    let r_norm = r.dot(r).sqrt();
    jac.axis_iter(Axis(1))
        .map(|column| {
            let norm = column.dot(&column).sqrt() * r_norm;
            if norm > 0.0 {
                column.dot(r).abs() / norm
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max)
}

/// $\chi^2$ with its Gauss-Newton gradient and Hessian
struct GaussNewtonProblem<'a, F> {
    residual: &'a F,
}

impl<F> GaussNewtonProblem<'_, F>
where
    F: Fn(&[f64]) -> Array1<f64>,
{
    fn residual_and_jacobian(&self, x: &[f64]) -> (Array1<f64>, Array2<f64>) {
        let r = (self.residual)(x);
        let jac = jacobian(self.residual, x, &r);
        (r, jac)
    }
}

impl<F> CostFunction for GaussNewtonProblem<'_, F>
where
    F: Fn(&[f64]) -> Array1<f64>,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        let chi2 = sum_of_squares(&(self.residual)(x));
        // Rejected by the trust region rather than aborting the fit
        Ok(if chi2.is_finite() { chi2 } else { f64::INFINITY })
    }
}

impl<F> Gradient for GaussNewtonProblem<'_, F>
where
    F: Fn(&[f64]) -> Array1<f64>,
{
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        let (r, jac) = self.residual_and_jacobian(x);
        Ok((2.0 * jac.t().dot(&r)).to_vec())
    }
}

impl<F> Hessian for GaussNewtonProblem<'_, F>
where
    F: Fn(&[f64]) -> Array1<f64>,
{
    type Param = Vec<f64>;
    type Hessian = Vec<Vec<f64>>;

    fn hessian(&self, x: &Self::Param) -> Result<Self::Hessian, Error> {
        let (_, jac) = self.residual_and_jacobian(x);
        let hessian = 2.0 * jac.t().dot(&jac);
        Ok(hessian.outer_iter().map(|row| row.to_vec()).collect())
    }
}

type TrustRegionState = IterState<Vec<f64>, Vec<f64>, (), Vec<Vec<f64>>, (), f64>;

impl LmLeastSquares {
    fn run<F>(&self, residual: &F, x0: &[f64]) -> Result<(Vec<f64>, usize), Error>
    where
        F: Fn(&[f64]) -> Array1<f64>,
    {
        // Conjugate gradients solve the n-dimensional quadratic model in n steps
        let subproblem: Steihaug<Vec<f64>, f64> = Steihaug::new()
            .with_epsilon(f64::EPSILON)?
            .with_max_iters(x0.len() as u64);
        let solver = TrustRegion::new(subproblem)
            .with_radius(self.initial_radius)?
            .with_max_radius(self.max_radius)?
            .with_eta(self.eta)?;
        let executor: Executor<_, _, TrustRegionState> =
            Executor::new(GaussNewtonProblem { residual }, solver);
        let result = executor
            .configure(|state| {
                state
                    .param(x0.to_vec())
                    .max_iters(self.max_iterations as u64)
            })
            .ctrlc(false)
            .timer(false)
            .run()?;
        let state = result.state();
        let x = state
            .get_best_param()
            .cloned()
            .unwrap_or_else(|| x0.to_vec());
        Ok((x, state.get_iter() as usize))
    }
}

impl LeastSquaresTrait for LmLeastSquares {
    fn minimize<F>(&self, residual: F, x0: &[f64]) -> LeastSquaresResult
    where
        F: Fn(&[f64]) -> Array1<f64>,
    {
        let chi2_initial = sum_of_squares(&residual(x0));
        let (x, iterations) = match self.run(&residual, x0) {
            Ok(fit) => fit,
            Err(error) => {
                tracing::warn!(%error, "Levenberg-Marquardt failed");
                return LeastSquaresResult {
                    x: x0.to_vec(),
                    chi2: chi2_initial,
                    iterations: 0,
                    success: false,
                };
            }
        };
        let r = residual(&x);
        let chi2 = sum_of_squares(&r);
        let success = chi2.is_finite()
            && (chi2 <= f64::EPSILON * chi2_initial
                || max_gradient_cosine(&jacobian(&residual, &x, &r), &r) <= self.gtol);
        tracing::debug!(iterations, chi2, success, "Levenberg-Marquardt finished");
        LeastSquaresResult {
            x,
            chi2,
            iterations,
            success,
        }
    }
}
