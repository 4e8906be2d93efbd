use crate::error::FisherError;
use crate::noise::NoiseCurveTrait;

use itertools::Itertools;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Power spectral density tabulated on a strictly increasing frequency grid
///
/// Values between nodes are linearly interpolated. Outside the table the noise is infinite, so
/// those frequencies do not contribute to any noise-weighted integral.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(
    into = "TabulatedNoiseParameters",
    try_from = "TabulatedNoiseParameters"
)]
pub struct TabulatedNoise {
    freq: Vec<f64>,
    psd: Vec<f64>,
}

impl TabulatedNoise {
    pub fn new(freq: Vec<f64>, psd: Vec<f64>) -> Result<Self, FisherError> {
        if freq.len() != psd.len() {
            return Err(FisherError::LengthMismatch(freq.len(), psd.len()));
        }
        if freq.len() < 2 {
            return Err(FisherError::NoiseTable("at least two nodes are required"));
        }
        if !freq.iter().chain(psd.iter()).all(|x| x.is_finite()) {
            return Err(FisherError::NoiseTable("non-finite value"));
        }
        if !freq.iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(FisherError::NoiseTable(
                "frequencies must increase strictly",
            ));
        }
        Ok(Self { freq, psd })
    }

    pub fn freq(&self) -> &[f64] {
        &self.freq
    }

    pub fn values(&self) -> &[f64] {
        &self.psd
    }
}

impl NoiseCurveTrait for TabulatedNoise {
    fn psd(&self, f: f64) -> f64 {
        let n = self.freq.len();
        if !(f >= self.freq[0] && f <= self.freq[n - 1]) {
            return f64::INFINITY;
        }
        let i = self.freq.partition_point(|&x| x <= f);
        if i == n {
            return self.psd[n - 1];
        }
        let (f0, f1) = (self.freq[i - 1], self.freq[i]);
        let (s0, s1) = (self.psd[i - 1], self.psd[i]);
        s0 + (s1 - s0) * (f - f0) / (f1 - f0)
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename = "TabulatedNoise")]
struct TabulatedNoiseParameters {
    freq: Vec<f64>,
    psd: Vec<f64>,
}

impl From<TabulatedNoise> for TabulatedNoiseParameters {
    fn from(v: TabulatedNoise) -> Self {
        Self {
            freq: v.freq,
            psd: v.psd,
        }
    }
}

impl TryFrom<TabulatedNoiseParameters> for TabulatedNoise {
    type Error = FisherError;

    fn try_from(v: TabulatedNoiseParameters) -> Result<Self, Self::Error> {
        Self::new(v.freq, v.psd)
    }
}
