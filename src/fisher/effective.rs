use crate::config::OverlapSweepConfig;
use crate::error::FisherError;
use crate::least_squares::{LeastSquaresAlgorithm, LeastSquaresTrait, polyfit2};
use crate::matrix::symmetric_from_upper;
use crate::noise::NoiseCurveTrait;
use crate::param::{Param, ParameterPoint};
use crate::sweep::{OverlapTable, overlap_versus_parameter};
use crate::waveform::WaveformService;

use ndarray::{Array1, Array2, ArrayView1};

/// Residual of the quadratic ambiguity model
///
/// `gamma` is the flat row-major upper triangle of the effective Fisher matrix $g$, `y` the
/// tabulated overlaps and `coords` one array per dimension. Returns
/// $$
/// y - \left(1 - \sum_i g_{ii} x_i^2 / 2 - \sum_{i<j} g_{ij} x_i x_j\right).
/// $$
pub fn quadratic_residual(
    gamma: &[f64],
    y: ArrayView1<f64>,
    coords: &[ArrayView1<f64>],
) -> Array1<f64> {
    let n = coords.len();
    let pairs = (0..n).flat_map(|i| (i..n).map(move |j| (i, j)));
    let mut model = Array1::ones(y.len());
    for ((i, j), &g) in pairs.zip(gamma) {
        let factor = if i == j { 0.5 * g } else { g };
        model.scaled_add(-factor, &(&coords[i] * &coords[j]));
    }
    y.to_owned() - model
}

/// Fit an effective Fisher matrix to tabulated overlaps
///
/// `residual` maps the flat upper-triangular coefficients, the overlaps and the coordinates to
/// the residual vector, see [quadratic_residual]. The fit starts from all-ones coefficients and
/// the result is decoded into the symmetric matrix.
pub fn effective_fisher<F>(
    algorithm: &LeastSquaresAlgorithm,
    residual: F,
    y: ArrayView1<f64>,
    coords: &[ArrayView1<f64>],
) -> Result<Array2<f64>, FisherError>
where
    F: Fn(&[f64], ArrayView1<f64>, &[ArrayView1<f64>]) -> Array1<f64>,
{
    for x in coords {
        if x.len() != y.len() {
            return Err(FisherError::LengthMismatch(y.len(), x.len()));
        }
    }
    let n = coords.len();
    let x0 = vec![1.0; n * (n + 1) / 2];
    let result = algorithm.minimize(|gamma: &[f64]| residual(gamma, y, coords), &x0);
    if !result.success {
        return Err(FisherError::LeastSquaresNotConverged {
            iterations: result.iterations,
        });
    }
    symmetric_from_upper(&result.x)
}

/// Fit the quadratic ambiguity model to an overlap table
///
/// Coordinates are taken relative to the fiducial centre of the table.
pub fn effective_fisher_from_table(
    table: &OverlapTable,
    algorithm: &LeastSquaresAlgorithm,
) -> Result<Array2<f64>, FisherError> {
    let n = table.ndim();
    let minimum = n * (n + 1) / 2;
    if table.len() < minimum {
        return Err(FisherError::EmptyOverlapTable {
            actual: table.len(),
            minimum,
        });
    }
    let relative = table.relative_coords();
    let coords: Vec<_> = relative.columns().into_iter().collect();
    effective_fisher(algorithm, quadratic_residual, table.overlap.view(), &coords)
}

/// Diagonal Fisher element from a parabola fitted to the one-parameter overlap sweep
///
/// Returns $-c_2/2$ of the fit $z \approx c_2 x^2 + c_1 x + c_0$, with the sign of the sweep
/// direction. Off-diagonal elements are not supported.
///
/// Time maximization follows [OverlapSweepConfig::max_t], which is off by default like for every
/// other sweep. Pass [OverlapSweepConfig::time_maximized] to get the element marginalized over
/// the coalescence time, the fixed-time element is the curvature at the fiducial `tref`.
pub fn effective_fisher_element<P, W, N>(
    service: &W,
    point: &P,
    p1: Param,
    p2: Param,
    noise: &N,
    config: &OverlapSweepConfig,
) -> Result<f64, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    if p1 != p2 {
        return Err(FisherError::NotImplemented(
            "off-diagonal effective Fisher-matrix elements",
        ));
    }
    let table = overlap_versus_parameter(service, point, p1, noise, config)?;
    let x = table.column(0).to_vec();
    let z = table.overlap.to_vec();
    let [c2, _, _] = polyfit2(&x, &z)?;
    let direction = match (x.first(), x.last()) {
        (Some(first), Some(last)) => (last - first).signum(),
        _ => 0.0,
    };
    Ok(-0.5 * c2 * direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FisherConfig;
    use crate::fisher::approximate_fisher_element;
    use crate::least_squares::{CobylaLeastSquares, LmLeastSquares};
    use crate::noise::NoiseCurve;
    use crate::tests::*;
    use crate::waveform::LeadingOrderWaveform;

    use approx::assert_relative_eq;
    use ndarray::{Array1, array};
    use rand::prelude::*;
    use rand_distr::Normal;

    #[test]
    fn residual_of_known_quadratic_form() {
        let x1 = array![1.0, 0.0, 2.0];
        let x2 = array![0.0, 1.0, 1.0];
        let gamma = [2.0, 0.5, 4.0];
        let y = array![0.0, -1.0, -5.0];
        // 1 - x1^2 - 0.5 x1 x2 - 2 x2^2
        let desired = &y - &array![0.0, -1.0, -6.0];
        let actual = quadratic_residual(&gamma, y.view(), &[x1.view(), x2.view()]);
        assert_eq!(actual, desired);
    }

    fn synthetic_table(rng: &mut StdRng, fisher: &Array2<f64>, noise: f64) -> OverlapTable {
        let n = fisher.nrows();
        let normal = Normal::new(0.0, noise).unwrap();
        let k = 60;
        let coords = Array2::from_shape_fn((k, n), |_| rng.random_range(-0.2..0.2));
        let overlap = Array1::from_shape_fn(k, |i| {
            let x = coords.row(i);
            1.0 - 0.5 * x.dot(&fisher.dot(&x)) + rng.sample(normal)
        });
        let center = vec![3.0; n];
        OverlapTable {
            params: vec![Param::Mc; n],
            center: center.clone(),
            coords: coords + &Array1::from(center),
            overlap,
        }
    }

    #[test]
    fn recovers_quadratic_form_in_three_dimensions() {
        let mut rng = StdRng::seed_from_u64(0);
        let fisher = array![[4.0, 1.0, 0.5], [1.0, 3.0, -0.2], [0.5, -0.2, 2.0]];
        let table = synthetic_table(&mut rng, &fisher, 1e-6);
        let actual =
            effective_fisher_from_table(&table, &LmLeastSquares::default().into()).unwrap();
        for (a, b) in actual.iter().zip(fisher.iter()) {
            assert!((a - b).abs() < 1e-2, "{actual} vs {fisher}");
        }
    }

    #[test]
    fn cobyla_recovers_two_dimensional_form() {
        let mut rng = StdRng::seed_from_u64(1);
        let fisher = array![[2.0, 0.7], [0.7, 1.5]];
        let table = synthetic_table(&mut rng, &fisher, 1e-4);
        let algorithm = CobylaLeastSquares {
            niterations: 20_000,
            ftol_rel: 1e-14,
            ..CobylaLeastSquares::default()
        }
        .into();
        let actual = effective_fisher_from_table(&table, &algorithm).unwrap();
        for (a, b) in actual.iter().zip(fisher.iter()) {
            assert!((a - b).abs() < 0.05, "{actual} vs {fisher}");
        }
    }

    #[test]
    fn non_convergence_is_an_error() {
        let mut rng = StdRng::seed_from_u64(2);
        let fisher = array![[2.0, 0.7], [0.7, 1.5]];
        let table = synthetic_table(&mut rng, &fisher, 1e-3);
        let algorithm = LmLeastSquares {
            max_iterations: 0,
            ..LmLeastSquares::default()
        }
        .into();
        assert_eq!(
            effective_fisher_from_table(&table, &algorithm),
            Err(FisherError::LeastSquaresNotConverged { iterations: 0 })
        );
    }

    #[test]
    fn too_few_samples() {
        let table = OverlapTable {
            params: vec![Param::Tref, Param::Phiref],
            center: vec![0.0, 0.0],
            coords: Array2::zeros((2, 2)),
            overlap: Array1::ones(2),
        };
        assert_eq!(
            effective_fisher_from_table(&table, &LeastSquaresAlgorithm::default()),
            Err(FisherError::EmptyOverlapTable {
                actual: 2,
                minimum: 3
            })
        );
    }

    #[test]
    fn off_diagonal_element_is_not_implemented() {
        let res = effective_fisher_element(
            &LeadingOrderWaveform,
            &aligned_point(),
            Param::Mc,
            Param::Tref,
            &NoiseCurve::aligo_zero_det_high_power(),
            &OverlapSweepConfig::default(),
        );
        assert!(matches!(res, Err(FisherError::NotImplemented(_))));
    }

    #[test]
    fn time_maximized_tref_element_is_flat() {
        let point = aligned_point();
        let noise = NoiseCurve::aligo_zero_det_high_power();
        let element = |config: &OverlapSweepConfig| {
            effective_fisher_element(
                &LeadingOrderWaveform,
                &point,
                Param::Tref,
                Param::Tref,
                &noise,
                config,
            )
            .unwrap()
        };
        let fixed = element(&OverlapSweepConfig::default());
        let maximized = element(&OverlapSweepConfig::time_maximized());
        assert!(fixed > 0.0);
        assert!(maximized.abs() < 0.1 * fixed, "{maximized} vs {fixed}");
    }

    #[test]
    fn tref_element_tracks_semi_analytic_curvature() {
        let point = aligned_point();
        let noise = NoiseCurve::aligo_zero_det_high_power();
        let f_isco = LeadingOrderWaveform
            .modes_of_frequency(&point, 2)
            .unwrap()
            .fmax_safe;
        let sweep = OverlapSweepConfig {
            fmax: Some(0.98 * 0.98 * f_isco),
            ..OverlapSweepConfig::default()
        };
        let effective = effective_fisher_element(
            &LeadingOrderWaveform,
            &point,
            Param::Tref,
            Param::Tref,
            &noise,
            &sweep,
        )
        .unwrap();
        let approximate = approximate_fisher_element(
            &LeadingOrderWaveform,
            &point,
            Param::Tref,
            Param::Tref,
            &noise,
            None,
            &FisherConfig::default(),
        )
        .unwrap();
        // The parabola coefficient is half the overlap curvature, the fit halves it again
        assert_relative_eq!(4.0 * effective, approximate, max_relative = 0.1);
    }
}
