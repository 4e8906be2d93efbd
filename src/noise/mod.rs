//! Detector noise curves
//!
//! A noise curve maps a frequency in Hz to the one-sided power spectral density. The Fisher
//! routines evaluate it at arbitrary frequencies, so every implementation must return a value
//! off-grid; non-finite values are allowed and carry zero weight downstream.

use enum_dispatch::enum_dispatch;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

mod analytic;
pub use analytic::{AligoZeroDetHighPower, FlatNoise};

mod set;
pub use set::NoiseCurveSet;

mod tabulated;
pub use tabulated::TabulatedNoise;

/// One-sided power spectral density as a function of frequency
#[enum_dispatch]
pub trait NoiseCurveTrait: Clone + Debug {
    fn psd(&self, f: f64) -> f64;
}

/// Noise curve
#[enum_dispatch(NoiseCurveTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[non_exhaustive]
pub enum NoiseCurve {
    AligoZeroDetHighPower(AligoZeroDetHighPower),
    Flat(FlatNoise),
    Tabulated(TabulatedNoise),
}

impl NoiseCurve {
    pub fn aligo_zero_det_high_power() -> Self {
        Self::AligoZeroDetHighPower(AligoZeroDetHighPower)
    }

    pub fn flat(level: f64) -> Self {
        Self::Flat(FlatNoise(level))
    }
}
