//! Physical parameter names and the parameter-point abstraction
//!
//! The Fisher-matrix routines never look inside a parameter point: they only extract and assign
//! named quantities and clone the point before perturbing it. [`ParameterPoint`] is that
//! capability set, [`BinaryParams`] is a concrete quasi-circular binary in SI units.

use crate::constants::{MPC_SI, MSUN_SI};
use crate::error::FisherError;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of parameter names understood by the Fisher-matrix routines
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Param {
    M1,
    M2,
    Mc,
    Mtot,
    Eta,
    Q,
    Chi1,
    Theta1,
    Beta,
    #[serde(rename = "thetaJN")]
    ThetaJN,
    #[serde(rename = "phiJL")]
    PhiJL,
    Tref,
    Phiref,
    Dist,
    #[serde(rename = "deltaF")]
    DeltaF,
    #[serde(rename = "deltaT")]
    DeltaT,
    Fmin,
}

/// Finite-difference step policy of a parameter
#[derive(Clone, Copy, Debug, PartialEq)]
enum Tolerance {
    /// Step is a fraction of the current value
    Relative(f64),
    /// Step is a fixed physical amount
    Absolute(f64),
}

impl Param {
    pub const ALL: [Param; 17] = [
        Param::M1,
        Param::M2,
        Param::Mc,
        Param::Mtot,
        Param::Eta,
        Param::Q,
        Param::Chi1,
        Param::Theta1,
        Param::Beta,
        Param::ThetaJN,
        Param::PhiJL,
        Param::Tref,
        Param::Phiref,
        Param::Dist,
        Param::DeltaF,
        Param::DeltaT,
        Param::Fmin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::M1 => "m1",
            Param::M2 => "m2",
            Param::Mc => "mc",
            Param::Mtot => "mtot",
            Param::Eta => "eta",
            Param::Q => "q",
            Param::Chi1 => "chi1",
            Param::Theta1 => "theta1",
            Param::Beta => "beta",
            Param::ThetaJN => "thetaJN",
            Param::PhiJL => "phiJL",
            Param::Tref => "tref",
            Param::Phiref => "phiref",
            Param::Dist => "dist",
            Param::DeltaF => "deltaF",
            Param::DeltaT => "deltaT",
            Param::Fmin => "fmin",
        }
    }

    fn tolerance(self) -> Option<Tolerance> {
        // the tolerances should scale with the chirp mass, using the correct scaling law
        match self {
            Param::Mc | Param::Mtot | Param::M1 | Param::M2 | Param::Dist => {
                Some(Tolerance::Relative(1e-3))
            }
            Param::Tref => Some(Tolerance::Absolute(1e-3)),
            Param::Phiref => Some(Tolerance::Absolute(0.2)),
            Param::Chi1 => Some(Tolerance::Absolute(0.01)),
            Param::Eta => Some(Tolerance::Absolute(0.001)),
            Param::Q => Some(Tolerance::Absolute(0.01)),
            Param::Theta1 => Some(Tolerance::Absolute(0.02)),
            Param::Beta => Some(Tolerance::Absolute(0.01)),
            Param::ThetaJN => Some(Tolerance::Absolute(0.1)),
            Param::PhiJL => Some(Tolerance::Absolute(0.1)),
            Param::DeltaF | Param::DeltaT | Param::Fmin => None,
        }
    }

    /// Finite-difference step at the given parameter value
    pub fn step(self, value: f64) -> Result<f64, FisherError> {
        match self.tolerance() {
            Some(Tolerance::Relative(fraction)) => Ok(value * fraction),
            Some(Tolerance::Absolute(step)) => Ok(step),
            None => Err(FisherError::NoDerivativeStep(self)),
        }
    }

    /// Physical unit derivatives and sweep coordinates are reported in
    ///
    /// Masses are reported per solar mass and distances per megaparsec, everything else in the
    /// native SI unit of the parameter.
    pub fn unit_scale(self) -> f64 {
        match self {
            Param::Mc | Param::Mtot | Param::M1 | Param::M2 => MSUN_SI,
            Param::Dist => MPC_SI,
            _ => 1.0,
        }
    }

    /// Parameters with a closed-form phase derivative
    pub fn has_fast_derivative(self) -> bool {
        matches!(self, Param::Tref | Param::PhiJL | Param::Phiref)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = FisherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| FisherError::UnknownParameter(s.to_owned()))
    }
}

/// Capability set of a physical-parameter point
///
/// Implementations are cheap to clone, every routine which perturbs a parameter does so on its
/// own clone.
pub trait ParameterPoint: Clone {
    fn extract(&self, param: Param) -> f64;

    fn assign(&mut self, param: Param, value: f64) -> Result<(), FisherError>;

    #[inline]
    fn fmin(&self) -> f64 {
        self.extract(Param::Fmin)
    }

    #[inline]
    fn delta_f(&self) -> f64 {
        self.extract(Param::DeltaF)
    }
}

/// Quasi-circular compact binary with a single precessing spin, SI units
///
/// Masses are in kg, distance in m, times in s and frequencies in Hz. Chirp mass, total mass,
/// symmetric mass ratio and mass ratio are derived from the component masses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BinaryParams {
    pub m1: f64,
    pub m2: f64,
    pub chi1: f64,
    pub theta1: f64,
    pub beta: f64,
    pub theta_jn: f64,
    pub phi_jl: f64,
    pub tref: f64,
    pub phiref: f64,
    pub dist: f64,
    pub delta_f: f64,
    pub delta_t: f64,
    pub fmin: f64,
}

impl BinaryParams {
    /// Non-spinning binary at 100 Mpc sampled at 4096 Hz with 1/8 Hz resolution, fmin = 20 Hz
    pub fn from_solar_masses(m1: f64, m2: f64) -> Self {
        Self {
            m1: m1 * MSUN_SI,
            m2: m2 * MSUN_SI,
            chi1: 0.0,
            theta1: 0.0,
            beta: 0.0,
            theta_jn: 0.0,
            phi_jl: 0.0,
            tref: 0.0,
            phiref: 0.0,
            dist: 100.0 * MPC_SI,
            delta_f: 0.125,
            delta_t: 1.0 / 4096.0,
            fmin: 20.0,
        }
    }

    pub fn mtot(&self) -> f64 {
        self.m1 + self.m2
    }

    pub fn eta(&self) -> f64 {
        self.m1 * self.m2 / self.mtot().powi(2)
    }

    pub fn mc(&self) -> f64 {
        (self.m1 * self.m2).powf(0.6) / self.mtot().powf(0.2)
    }

    /// Mass ratio $m_2 / m_1$
    pub fn q(&self) -> f64 {
        self.m2 / self.m1
    }

    fn set_from_mc_eta(&mut self, mc: f64, eta: f64) {
        let mtot = mc * eta.powf(-0.6);
        let delta = f64::sqrt(1.0 - 4.0 * eta);
        self.m1 = 0.5 * mtot * (1.0 + delta);
        self.m2 = 0.5 * mtot * (1.0 - delta);
    }

    fn set_from_mtot_q(&mut self, mtot: f64, q: f64) {
        self.m1 = mtot / (1.0 + q);
        self.m2 = mtot * q / (1.0 + q);
    }
}

impl ParameterPoint for BinaryParams {
    fn extract(&self, param: Param) -> f64 {
        match param {
            Param::M1 => self.m1,
            Param::M2 => self.m2,
            Param::Mc => self.mc(),
            Param::Mtot => self.mtot(),
            Param::Eta => self.eta(),
            Param::Q => self.q(),
            Param::Chi1 => self.chi1,
            Param::Theta1 => self.theta1,
            Param::Beta => self.beta,
            Param::ThetaJN => self.theta_jn,
            Param::PhiJL => self.phi_jl,
            Param::Tref => self.tref,
            Param::Phiref => self.phiref,
            Param::Dist => self.dist,
            Param::DeltaF => self.delta_f,
            Param::DeltaT => self.delta_t,
            Param::Fmin => self.fmin,
        }
    }

    fn assign(&mut self, param: Param, value: f64) -> Result<(), FisherError> {
        let invalid = || FisherError::InvalidParameterValue { param, value };
        if !value.is_finite() {
            return Err(invalid());
        }
        match param {
            Param::M1 | Param::M2 | Param::Mc | Param::Mtot | Param::Q | Param::Dist
            | Param::DeltaF | Param::DeltaT
                if value <= 0.0 =>
            {
                return Err(invalid());
            }
            Param::Eta if value <= 0.0 || value > 0.25 => return Err(invalid()),
            Param::Fmin if value < 0.0 => return Err(invalid()),
            _ => {}
        }
        match param {
            Param::M1 => self.m1 = value,
            Param::M2 => self.m2 = value,
            Param::Mc => self.set_from_mc_eta(value, self.eta()),
            Param::Eta => self.set_from_mc_eta(self.mc(), value),
            Param::Mtot => self.set_from_mtot_q(value, self.q()),
            Param::Q => self.set_from_mtot_q(self.mtot(), value),
            Param::Chi1 => self.chi1 = value,
            Param::Theta1 => self.theta1 = value,
            Param::Beta => self.beta = value,
            Param::ThetaJN => self.theta_jn = value,
            Param::PhiJL => self.phi_jl = value,
            Param::Tref => self.tref = value,
            Param::Phiref => self.phiref = value,
            Param::Dist => self.dist = value,
            Param::DeltaF => self.delta_f = value,
            Param::DeltaT => self.delta_t = value,
            Param::Fmin => self.fmin = value,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn names_round_trip() {
        for param in Param::ALL {
            assert_eq!(param.name().parse::<Param>().unwrap(), param);
        }
        assert_eq!(
            "Mc".parse::<Param>(),
            Err(FisherError::UnknownParameter("Mc".to_owned()))
        );
    }

    #[test]
    fn serde_uses_pipeline_names() {
        for param in Param::ALL {
            let json = serde_json::to_string(&param).unwrap();
            assert_eq!(json, format!("\"{}\"", param.name()));
        }
    }

    #[test]
    fn chirp_mass_assignment_keeps_eta() {
        let mut p = BinaryParams::from_solar_masses(30.0, 20.0);
        let eta = p.eta();
        let mc = p.mc();
        p.assign(Param::Mc, 1.01 * mc).unwrap();
        assert_relative_eq!(p.eta(), eta, max_relative = 1e-12);
        assert_relative_eq!(p.mc(), 1.01 * mc, max_relative = 1e-12);
        assert!(p.m1 >= p.m2);
    }

    #[test]
    fn eta_assignment_keeps_chirp_mass() {
        let mut p = BinaryParams::from_solar_masses(30.0, 20.0);
        let mc = p.mc();
        p.assign(Param::Eta, 0.2).unwrap();
        assert_relative_eq!(p.mc(), mc, max_relative = 1e-12);
        assert_relative_eq!(p.eta(), 0.2, max_relative = 1e-12);
    }

    #[test]
    fn total_mass_assignment_keeps_mass_ratio() {
        let mut p = BinaryParams::from_solar_masses(30.0, 20.0);
        let q = p.q();
        p.assign(Param::Mtot, 60.0 * MSUN_SI).unwrap();
        assert_relative_eq!(p.q(), q, max_relative = 1e-12);
        assert_relative_eq!(p.m1, 36.0 * MSUN_SI, max_relative = 1e-12);
    }

    #[test]
    fn eta_above_equal_mass_is_rejected() {
        let mut p = BinaryParams::from_solar_masses(10.0, 10.0);
        let before = p.clone();
        assert_eq!(
            p.assign(Param::Eta, 0.251),
            Err(FisherError::InvalidParameterValue {
                param: Param::Eta,
                value: 0.251
            })
        );
        assert_eq!(p, before);
    }

    #[test]
    fn sampling_metadata_has_no_step() {
        assert_eq!(
            Param::DeltaF.step(0.125),
            Err(FisherError::NoDerivativeStep(Param::DeltaF))
        );
        assert_relative_eq!(Param::Mc.step(10.0).unwrap(), 1e-2);
        assert_relative_eq!(Param::Tref.step(1e9).unwrap(), 1e-3);
    }
}
