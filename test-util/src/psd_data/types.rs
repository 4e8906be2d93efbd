use ndarray::Array1;

/// Frequencies and PSD values as plain arrays, so the main crate's types are not needed here
pub type PairArray = (Array1<f64>, Array1<f64>);

#[derive(Debug, thiserror::Error)]
pub(super) enum Error {
    #[error(transparent)]
    CsvError(#[from] csv::Error),
    #[error("PSD table is empty")]
    Empty,
}
