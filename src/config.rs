use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What to do when the beta breakdown is requested with a non-unity geometric factor
///
/// The breakdown assumes the geometric factor is held fixed by the caller, so the sub-blocks are
/// not meaningful otherwise.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum BetaBreakoutPolicy {
    /// Log a warning and compute the sub-blocks anyway
    #[default]
    Warn,
    /// Return [FisherError::BetaBreakoutWithGeometricFactor](crate::FisherError)
    Reject,
}

/// Options of the semi-analytic Fisher-matrix approximation
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct FisherConfig {
    /// Highest harmonic index requested from the waveform model
    pub l_max: u32,
    /// Use closed-form derivatives for `tref`, `phiJL` and `phiref` unless set
    pub skip_fast_derivative: bool,
    /// Replace every geometric mode-coupling factor by unity
    pub omit_geometric_factor: bool,
    /// Terms with a smaller geometric factor are skipped
    pub geometric_factor_cutoff: f64,
    /// Below this precession-cone opening angle alpha and gamma are undefined
    pub precession_beta_cutoff: f64,
    /// Fraction of the model's maximum frequency which is trusted
    pub fmax_safety_factor: f64,
    /// Largest relative change of the series length tolerated by finite differences
    pub max_length_change: f64,
    pub beta_breakout_policy: BetaBreakoutPolicy,
}

impl FisherConfig {
    #[inline]
    pub fn default_l_max() -> u32 {
        2
    }

    #[inline]
    pub fn default_geometric_factor_cutoff() -> f64 {
        1e-5
    }

    #[inline]
    pub fn default_precession_beta_cutoff() -> f64 {
        1e-2
    }

    #[inline]
    pub fn default_fmax_safety_factor() -> f64 {
        0.98
    }

    #[inline]
    pub fn default_max_length_change() -> f64 {
        0.01
    }
}

impl Default for FisherConfig {
    fn default() -> Self {
        Self {
            l_max: Self::default_l_max(),
            skip_fast_derivative: false,
            omit_geometric_factor: false,
            geometric_factor_cutoff: Self::default_geometric_factor_cutoff(),
            precession_beta_cutoff: Self::default_precession_beta_cutoff(),
            fmax_safety_factor: Self::default_fmax_safety_factor(),
            max_length_change: Self::default_max_length_change(),
            beta_breakout_policy: BetaBreakoutPolicy::default(),
        }
    }
}

/// Options of the overlap sweeps
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct OverlapSweepConfig {
    /// Samples with a normalized overlap not above this value are dropped
    pub cut: f64,
    /// Maximize the inner product over time shifts
    pub max_t: bool,
    /// Number of samples of a one-parameter sweep
    pub n_points_1d: usize,
    /// Number of samples per axis of a two-parameter sweep
    pub n_points_2d: usize,
    /// Upper frequency of the inner product, the Nyquist frequency if not set
    pub fmax: Option<f64>,
}

impl OverlapSweepConfig {
    #[inline]
    pub fn default_cut() -> f64 {
        0.95
    }

    #[inline]
    pub fn default_n_points_1d() -> usize {
        20
    }

    #[inline]
    pub fn default_n_points_2d() -> usize {
        9
    }

    /// Default options with the inner product maximized over time shifts
    pub fn time_maximized() -> Self {
        Self {
            max_t: true,
            ..Self::default()
        }
    }
}

impl Default for OverlapSweepConfig {
    fn default() -> Self {
        Self {
            cut: Self::default_cut(),
            max_t: false,
            n_points_1d: Self::default_n_points_1d(),
            n_points_2d: Self::default_n_points_2d(),
            fmax: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: FisherConfig =
            serde_json::from_str(r#"{"omit_geometric_factor": true}"#).unwrap();
        assert!(config.omit_geometric_factor);
        assert_eq!(config.l_max, 2);
        assert_eq!(config.geometric_factor_cutoff, 1e-5);

        let config: OverlapSweepConfig = serde_json::from_str(r#"{"cut": 0.9}"#).unwrap();
        assert_eq!(config.cut, 0.9);
        assert_eq!(config.n_points_1d, 20);
        assert_eq!(config.n_points_2d, 9);
    }
}
