use crate::error::FisherError;

use nalgebra::{DMatrix, DVector};

/// Least-squares parabola $y \approx c_2 x^2 + c_1 x + c_0$, returns `[c2, c1, c0]`
///
/// The abscissa is centred and scaled before the Vandermonde system is solved by SVD, so narrow
/// windows far from zero are handled without loss of precision.
pub fn polyfit2(x: &[f64], y: &[f64]) -> Result<[f64; 3], FisherError> {
    if x.len() != y.len() {
        return Err(FisherError::LengthMismatch(x.len(), y.len()));
    }
    if x.len() < 3 {
        return Err(FisherError::EmptyOverlapTable {
            actual: x.len(),
            minimum: 3,
        });
    }
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    let scale = x.iter().fold(0.0_f64, |acc, &xi| acc.max((xi - mean).abs()));
    if !(scale > 0.0) {
        return Err(FisherError::SingularMatrix("Vandermonde matrix"));
    }

    let vandermonde = DMatrix::from_fn(x.len(), 3, |i, j| {
        let t = (x[i] - mean) / scale;
        t.powi(2 - j as i32)
    });
    let rhs = DVector::from_column_slice(y);
    let coeffs = vandermonde
        .svd(true, true)
        .solve(&rhs, f64::EPSILON)
        .map_err(FisherError::SingularMatrix)?;
    let (a, b, c) = (coeffs[0], coeffs[1], coeffs[2]);

    // y = a t^2 + b t + c with t = (x - mean) / scale
    let s2 = scale * scale;
    Ok([
        a / s2,
        b / scale - 2.0 * a * mean / s2,
        a * mean * mean / s2 - b * mean / scale + c,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::Array1;
    use rand::prelude::*;
    use rand_distr::Normal;

    #[test]
    fn exact_parabola() {
        let x = [-1.0, 0.0, 1.0, 2.0];
        let y: Vec<_> = x.iter().map(|&x| 3.0 * x * x - 2.0 * x + 0.5).collect();
        let c = polyfit2(&x, &y).unwrap();
        assert_relative_eq!(c[0], 3.0, max_relative = 1e-12);
        assert_relative_eq!(c[1], -2.0, max_relative = 1e-12);
        assert_relative_eq!(c[2], 0.5, max_relative = 1e-12);
    }

    #[test]
    fn narrow_window_far_from_origin() {
        // Overlap-like curvature around a chirp mass of ~8.7 solar masses
        let mut rng = StdRng::seed_from_u64(0);
        let noise = Normal::new(0.0, 1e-9).unwrap();
        let x = Array1::linspace(8.7 - 0.0087, 8.7 + 0.0087, 20);
        let y = x.mapv(|x: f64| 1.0 - 500.0 * (x - 8.7).powi(2) + rng.sample(noise));
        let c = polyfit2(x.as_slice().unwrap(), y.as_slice().unwrap()).unwrap();
        assert_relative_eq!(c[0], -500.0, max_relative = 1e-3);
        assert_relative_eq!(-c[1] / (2.0 * c[0]), 8.7, max_relative = 1e-6);
    }

    #[test]
    fn degenerate_input() {
        assert_eq!(
            polyfit2(&[1.0, 2.0], &[1.0, 2.0]),
            Err(FisherError::EmptyOverlapTable {
                actual: 2,
                minimum: 3
            })
        );
        assert_eq!(
            polyfit2(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(FisherError::SingularMatrix("Vandermonde matrix"))
        );
        assert_eq!(
            polyfit2(&[1.0, 2.0, 3.0], &[1.0]),
            Err(FisherError::LengthMismatch(3, 1))
        );
    }
}
