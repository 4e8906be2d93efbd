use crate::noise::NoiseCurveTrait;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Analytic fit to the Advanced LIGO zero-detuning high-power design sensitivity
///
/// $$
/// S_n(f) = 10^{-49} \left[x^{-4.14} - 5 x^{-2} + 111 \frac{1 - x^2 + x^4/2}{1 + x^2/2}\right],
/// \quad x = f / 215\,\mathrm{Hz}.
/// $$
/// The fit is undefined at $f = 0$ and returns `NaN` there.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "AligoZeroDetHighPower")]
pub struct AligoZeroDetHighPower;

impl AligoZeroDetHighPower {
    const F0: f64 = 215.0;
    const S0: f64 = 1e-49;
}

impl NoiseCurveTrait for AligoZeroDetHighPower {
    fn psd(&self, f: f64) -> f64 {
        let x = f / Self::F0;
        let x2 = x * x;
        Self::S0
            * (x.powf(-4.14) - 5.0 / x2 + 111.0 * (1.0 - x2 + 0.5 * x2 * x2) / (1.0 + 0.5 * x2))
    }
}

/// Frequency-independent noise level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "Flat")]
pub struct FlatNoise(pub f64);

impl NoiseCurveTrait for FlatNoise {
    fn psd(&self, _f: f64) -> f64 {
        self.0
    }
}
