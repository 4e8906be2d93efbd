use crate::error::FisherError;

use ndarray::Array2;
use num_traits::Zero;

/// Size of the symmetric matrix described by a flat upper triangle of the given length
fn matrix_size(length: usize) -> Option<usize> {
    match length {
        3 => Some(2),
        6 => Some(3),
        10 => Some(4),
        15 => Some(5),
        _ => None,
    }
}

/// Dense symmetric matrix from its flat upper triangle
///
/// The flat array lists the upper triangle row by row,
/// `[g11, g12, ..., g1N, g22, ..., g2N, ..., gNN]`, and is mirrored across the diagonal. Only
/// 2x2 to 5x5 matrices are supported, i.e. lengths 3, 6, 10 and 15.
///
/// ```
/// use rift_fisher::matrix::symmetric_from_upper;
/// use ndarray::array;
///
/// let m = symmetric_from_upper(&[1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(m, array![[1, 2, 3], [2, 4, 5], [3, 5, 6]]);
/// ```
pub fn symmetric_from_upper<T>(flat: &[T]) -> Result<Array2<T>, FisherError>
where
    T: Copy + Zero,
{
    let n = matrix_size(flat.len()).ok_or(FisherError::UnsupportedFlatLength(flat.len()))?;
    let mut matrix = Array2::zeros((n, n));
    let mut values = flat.iter();
    for i in 0..n {
        for j in i..n {
            // Length is checked above, there are exactly n(n+1)/2 values
            let &value = values.next().ok_or(FisherError::UnsupportedFlatLength(flat.len()))?;
            matrix[[i, j]] = value;
            matrix[[j, i]] = value;
        }
    }
    Ok(matrix)
}

/// Flat upper triangle of a square matrix, row by row
pub fn upper_triangle<T: Copy>(matrix: &Array2<T>) -> Result<Vec<T>, FisherError> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(FisherError::NotSquare { rows, cols });
    }
    Ok((0..rows)
        .flat_map(|i| (i..cols).map(move |j| (i, j)))
        .map(|(i, j)| matrix[[i, j]])
        .collect())
}
