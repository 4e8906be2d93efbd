use crate::param::Param;

/// Error returned from the Fisher-matrix routines
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FisherError {
    #[error(
        "flat upper-triangular array of length {0} does not describe a 2x2..5x5 symmetric matrix"
    )]
    UnsupportedFlatLength(usize),

    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("index {index} is out of range for a matrix of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("index {0} is retained more than once")]
    DuplicateIndex(usize),

    #[error("matrix block is singular: {0}")]
    SingularMatrix(&'static str),

    #[error("least-squares solver did not converge after {iterations} iterations")]
    LeastSquaresNotConverged { iterations: usize },

    #[error(
        "catastrophic length change of the {param} derivative: {baseline} -> {perturbed} samples"
    )]
    CatastrophicLengthChange {
        param: Param,
        baseline: usize,
        perturbed: usize,
    },

    #[error("series lengths differ: {0} and {1}")]
    LengthMismatch(usize, usize),

    #[error("unknown parameter name {0:?}")]
    UnknownParameter(String),

    #[error("parameter {0} has no finite-difference step")]
    NoDerivativeStep(Param),

    #[error("phase-derivative cache for {0} was filled at another point or with other options")]
    DerivativeCacheMismatch(Param),

    #[error("value {value} is invalid for parameter {param}")]
    InvalidParameterValue { param: Param, value: f64 },

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("beta breakdown needs a fixed geometric factor, got {0}")]
    BetaBreakoutWithGeometricFactor(f64),

    #[error(
        "every harmonic term is pruned or out of band, the Fisher element normalization vanishes"
    )]
    NoContributingTerms,

    #[error("overlap table has too few samples above the cutoff: {actual} < {minimum}")]
    EmptyOverlapTable { actual: usize, minimum: usize },

    #[error("FFT failure: {0}")]
    Fft(String),

    #[error("invalid noise table: {0}")]
    NoiseTable(&'static str),
}
