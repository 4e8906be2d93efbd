//! Waveform and inner-product services the Fisher routines are fed by

use crate::error::FisherError;
use crate::param::ParameterPoint;
use crate::series::{FrequencySeries, PhaseSeries};

use num_complex::Complex64;

mod leading_order;
pub use leading_order::LeadingOrderWaveform;

mod overlap;
pub use overlap::{ComplexIp, ComplexOverlap, InnerProductTrait, Overlap, build_overlap};

/// Frequency-domain waveform model
pub trait WaveformService<P: ParameterPoint> {
    /// Complex frequency-domain strain on the two-sided grid of the parameter point
    fn complex_hoff(&self, point: &P) -> Result<FrequencySeries<Complex64>, FisherError>;

    /// Orbital phase and precession angles versus frequency, including harmonics up to `l_max`
    fn modes_of_frequency(&self, point: &P, l_max: u32) -> Result<PhaseSeries, FisherError>;
}
