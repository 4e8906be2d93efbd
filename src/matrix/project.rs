use crate::error::FisherError;

use nalgebra::DMatrix;
use ndarray::Array2;

fn submatrix(matrix: &Array2<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| matrix[[rows[i], cols[j]]])
}

/// Project a Fisher matrix onto a subset of its parameters
///
/// With the retained indices $A$ and the dropped ones $B$ this is the Schur complement
/// $$
/// \Gamma_{AA} - \Gamma_{AB} \Gamma_{BB}^{-1} \Gamma_{AB}^T,
/// $$
/// i.e. the Fisher matrix of the retained parameters after marginalizing over the dropped ones
/// in the Gaussian approximation. The result is ordered as `preserve`.
pub fn fisher_project(
    matrix: &Array2<f64>,
    preserve: &[usize],
) -> Result<Array2<f64>, FisherError> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(FisherError::NotSquare { rows, cols });
    }
    let mut retained = vec![false; rows];
    for &index in preserve {
        if index >= rows {
            return Err(FisherError::IndexOutOfRange { index, size: rows });
        }
        if retained[index] {
            return Err(FisherError::DuplicateIndex(index));
        }
        retained[index] = true;
    }
    let drop: Vec<usize> = (0..rows).filter(|&i| !retained[i]).collect();

    let aa = submatrix(matrix, preserve, preserve);
    let projected = if drop.is_empty() {
        aa
    } else {
        let bb = submatrix(matrix, &drop, &drop);
        let ab = submatrix(matrix, preserve, &drop);
        let bb_inv = bb
            .try_inverse()
            .ok_or(FisherError::SingularMatrix("dropped-parameter block"))?;
        aa - &ab * bb_inv * ab.transpose()
    };
    Ok(Array2::from_shape_fn(projected.shape(), |(i, j)| {
        projected[(i, j)]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array, s};
    use rand::prelude::*;
    use rand_distr::StandardNormal;

    fn random_positive_definite(rng: &mut StdRng, n: usize) -> Array2<f64> {
        let a = Array2::from_shape_fn((n, n), |_| rng.sample::<f64, _>(StandardNormal));
        a.dot(&a.t()) + Array2::<f64>::eye(n) * n as f64
    }

    fn inverse_2x2(m: &Array2<f64>) -> Array2<f64> {
        let det = m[[0, 0]] * m[[1, 1]] - m[[0, 1]] * m[[1, 0]];
        array![[m[[1, 1]], -m[[0, 1]]], [-m[[1, 0]], m[[0, 0]]]] / det
    }

    #[test]
    fn schur_complement_of_block_matrix() {
        let mut rng = StdRng::seed_from_u64(0);
        let m = random_positive_definite(&mut rng, 4);
        let a = m.slice(s![..2, ..2]).to_owned();
        let b = m.slice(s![..2, 2..]).to_owned();
        let c = m.slice(s![2.., 2..]).to_owned();
        let desired = &a - &b.dot(&inverse_2x2(&c)).dot(&b.t());

        let actual = fisher_project(&m, &[0, 1]).unwrap();
        assert_abs_diff_eq!(actual, desired, epsilon = 1e-10);
    }

    #[test]
    fn projection_inverts_to_covariance_block() {
        // Marginal covariance is a block of the full covariance
        let mut rng = StdRng::seed_from_u64(1);
        let m = random_positive_definite(&mut rng, 4);
        let full = DMatrix::from_fn(4, 4, |i, j| m[[i, j]]);
        let cov = full.try_inverse().unwrap();
        let projected = fisher_project(&m, &[3, 1]).unwrap();
        let projected = DMatrix::from_fn(2, 2, |i, j| projected[[i, j]]);
        let marginal = projected.try_inverse().unwrap();
        assert_abs_diff_eq!(marginal[(0, 0)], cov[(3, 3)], epsilon = 1e-10);
        assert_abs_diff_eq!(marginal[(0, 1)], cov[(3, 1)], epsilon = 1e-10);
        assert_abs_diff_eq!(marginal[(1, 1)], cov[(1, 1)], epsilon = 1e-10);
    }

    #[test]
    fn keeping_everything_is_identity() {
        let m = array![[2.0, 1.0], [1.0, 3.0]];
        assert_eq!(fisher_project(&m, &[0, 1]).unwrap(), m);
        assert_eq!(
            fisher_project(&m, &[1, 0]).unwrap(),
            array![[3.0, 1.0], [1.0, 2.0]]
        );
    }

    #[test]
    fn singular_block_is_an_error() {
        let m = array![[2.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        assert_eq!(
            fisher_project(&m, &[0]),
            Err(FisherError::SingularMatrix("dropped-parameter block"))
        );
    }

    #[test]
    fn bad_indices_are_rejected() {
        let m = Array2::<f64>::eye(3);
        assert_eq!(
            fisher_project(&m, &[0, 3]),
            Err(FisherError::IndexOutOfRange { index: 3, size: 3 })
        );
        assert_eq!(
            fisher_project(&m, &[1, 1]),
            Err(FisherError::DuplicateIndex(1))
        );
    }
}
