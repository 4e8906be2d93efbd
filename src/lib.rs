#![doc = include_str!("../README.md")]

#[cfg(test)]
#[macro_use]
mod tests;

mod config;
pub use config::{BetaBreakoutPolicy, FisherConfig, OverlapSweepConfig};

pub mod constants;

mod error;
pub use error::FisherError;

pub mod fisher;
pub use fisher::{
    approximate_fisher_element, approximate_fisher_element_breakdown,
    approximate_fisher_element_intermediate, approximate_fisher_matrix, effective_fisher,
    effective_fisher_element, effective_fisher_from_table, numerical_fisher_element,
};

pub mod harmonics;

pub mod least_squares;
pub use least_squares::{
    CobylaLeastSquares, LeastSquaresAlgorithm, LeastSquaresResult, LeastSquaresTrait,
    LmLeastSquares,
};

pub mod matrix;
pub use matrix::{fisher_project, symmetric_from_upper, upper_triangle};

pub mod noise;
pub use noise::{NoiseCurve, NoiseCurveSet, NoiseCurveTrait};

mod param;
pub use param::{BinaryParams, Param, ParameterPoint};

mod phase_derivative;
pub use phase_derivative::{PhaseDerivative, PhaseDerivativeCache, phase_derivative_series};

mod series;
pub use series::{FrequencySeries, PhaseSeries, two_sided_grid, validity_mask};

pub mod sweep;
pub use sweep::{OverlapTable, overlap_grid_versus_parameters, overlap_versus_parameter};

pub mod waveform;
pub use waveform::{LeadingOrderWaveform, WaveformService};

pub use ndarray;
