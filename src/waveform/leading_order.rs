use crate::constants::{distance_in_seconds, mass_in_seconds};
use crate::error::FisherError;
use crate::harmonics::{spin_weighted_y2, wigner_d};
use crate::param::{Param, ParameterPoint};
use crate::series::{FrequencySeries, PhaseSeries, two_sided_grid};
use crate::waveform::WaveformService;

use ndarray::{Array1, Zip};
use num_complex::Complex64;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Leading-order precessing inspiral in the stationary-phase approximation
///
/// With total mass $M$ and symmetric mass ratio $\eta$ in geometric units and
/// $v = (\pi M f)^{1/3}$, the orbit sweeps through frequency $f > 0$ at
/// $$
/// t(f) = t_\mathrm{ref} - \frac{5}{256} \frac{M}{\eta} v^{-8}, \qquad
/// \Phi(f) = \phi_\mathrm{ref} - \frac{v^{-5}}{32 \eta},
/// $$
/// while the orbital angular momentum precesses around the total one with
/// $$
/// \alpha(f) = \phi_{JL} - \frac{5}{96}\left(2 + \frac{3 m_2}{2 m_1}\right) v^{-3}, \qquad
/// \beta(f) = \beta, \qquad \gamma(f) = -\alpha(f) \cos\beta.
/// $$
/// The model is trusted up to the innermost stable circular orbit
/// $f_\mathrm{ISCO} = (6^{3/2} \pi M)^{-1}$ and is one-sided: every series vanishes for $f \le 0$.
/// Only the quadrupole is modelled, higher `l_max` requests return the same series.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LeadingOrderWaveform;

struct Binary {
    m_sec: f64,
    mc_sec: f64,
    dist_sec: f64,
    eta: f64,
    mass_ratio_factor: f64,
    tref: f64,
    phiref: f64,
    phi_jl: f64,
    beta: f64,
    theta_jn: f64,
    fmin: f64,
    delta_f: f64,
    n: usize,
}

impl Binary {
    fn new<P: ParameterPoint>(point: &P) -> Result<Self, FisherError> {
        let delta_f = point.extract(Param::DeltaF);
        let delta_t = point.extract(Param::DeltaT);
        let n = (1.0 / (delta_f * delta_t)).round();
        if !n.is_finite() || n < 2.0 {
            return Err(FisherError::InvalidParameterValue {
                param: Param::DeltaF,
                value: delta_f,
            });
        }
        let m1 = point.extract(Param::M1);
        let m2 = point.extract(Param::M2);
        Ok(Self {
            m_sec: mass_in_seconds(point.extract(Param::Mtot)),
            mc_sec: mass_in_seconds(point.extract(Param::Mc)),
            dist_sec: distance_in_seconds(point.extract(Param::Dist)),
            eta: point.extract(Param::Eta),
            mass_ratio_factor: 2.0 + 1.5 * m2 / m1,
            tref: point.extract(Param::Tref),
            phiref: point.extract(Param::Phiref),
            phi_jl: point.extract(Param::PhiJL),
            beta: point.extract(Param::Beta),
            theta_jn: point.extract(Param::ThetaJN),
            fmin: point.extract(Param::Fmin),
            delta_f,
            n: n as usize,
        })
    }

    fn f_isco(&self) -> f64 {
        1.0 / (6.0_f64.powf(1.5) * PI * self.m_sec)
    }

    fn v(&self, f: f64) -> f64 {
        (PI * self.m_sec * f).cbrt()
    }

    fn t(&self, v: f64) -> f64 {
        self.tref - 5.0 / 256.0 * self.m_sec / self.eta * v.powi(-8)
    }

    fn phi(&self, v: f64) -> f64 {
        self.phiref - v.powi(-5) / (32.0 * self.eta)
    }

    fn alpha(&self, v: f64) -> f64 {
        self.phi_jl - 5.0 / 96.0 * self.mass_ratio_factor * v.powi(-3)
    }

    fn gamma(&self, alpha: f64) -> f64 {
        -alpha * self.beta.cos()
    }

    fn amplitude(&self) -> f64 {
        f64::sqrt(5.0 / 24.0) * PI.powf(-2.0 / 3.0) * self.mc_sec.powf(5.0 / 6.0) / self.dist_sec
    }
}

impl<P: ParameterPoint> WaveformService<P> for LeadingOrderWaveform {
    fn complex_hoff(&self, point: &P) -> Result<FrequencySeries<Complex64>, FisherError> {
        let binary = Binary::new(point)?;
        let fvals = two_sided_grid(binary.n, binary.delta_f);
        let f_isco = binary.f_isco();
        let amplitude = binary.amplitude();
        let mode_weights: Vec<(f64, f64)> = (-2..=2)
            .map(|m| {
                (
                    f64::from(m),
                    spin_weighted_y2(binary.theta_jn, m) * wigner_d(2, m, 2, binary.beta),
                )
            })
            .collect();
        let data = fvals.mapv(|f| {
            if !(f > binary.fmin && f < f_isco) {
                return Complex64::new(0.0, 0.0);
            }
            let v = binary.v(f);
            let psi2 = 2.0 * PI * f * binary.t(v) - 2.0 * binary.phi(v);
            let alpha = binary.alpha(v);
            let gamma = binary.gamma(alpha);
            let modes: Complex64 = mode_weights
                .iter()
                .map(|&(m, weight)| {
                    weight * Complex64::from_polar(1.0, -(psi2 - 2.0 * gamma + m * alpha))
                })
                .sum();
            amplitude * f.powf(-7.0 / 6.0) * modes
        });
        FrequencySeries::new(fvals, data, binary.delta_f)
    }

    fn modes_of_frequency(&self, point: &P, _l_max: u32) -> Result<PhaseSeries, FisherError> {
        let binary = Binary::new(point)?;
        let fvals = two_sided_grid(binary.n, binary.delta_f);
        let n = fvals.len();
        let mut t = Array1::zeros(n);
        let mut phi = Array1::zeros(n);
        let mut alpha = Array1::zeros(n);
        let mut beta = Array1::zeros(n);
        let mut gamma = Array1::zeros(n);
        Zip::from(&fvals)
            .and(&mut t)
            .and(&mut phi)
            .and(&mut alpha)
            .and(&mut beta)
            .and(&mut gamma)
            .for_each(|&f, t, phi, alpha, beta, gamma| {
                if f <= 0.0 {
                    return;
                }
                let v = binary.v(f);
                *t = binary.t(v);
                *phi = binary.phi(v);
                *alpha = binary.alpha(v);
                *beta = binary.beta;
                *gamma = binary.gamma(*alpha);
            });
        Ok(PhaseSeries {
            fvals,
            fmax_safe: binary.f_isco(),
            t,
            phi,
            alpha,
            beta,
            gamma,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::BinaryParams;

    use approx::assert_relative_eq;

    #[test]
    fn grid_follows_sampling() {
        let p = BinaryParams::from_solar_masses(10.0, 10.0);
        let series = LeadingOrderWaveform.modes_of_frequency(&p, 2).unwrap();
        assert_eq!(series.len(), 32768);
        assert_relative_eq!(series.fvals[1] - series.fvals[0], 0.125);
        assert_relative_eq!(series.fvals[series.len() / 2], 0.0);
    }

    #[test]
    fn isco_of_twenty_solar_masses() {
        let p = BinaryParams::from_solar_masses(10.0, 10.0);
        let series = LeadingOrderWaveform.modes_of_frequency(&p, 2).unwrap();
        assert_relative_eq!(series.fmax_safe, 219.9, max_relative = 1e-3);
    }

    #[test]
    fn stationary_phase_combination() {
        // Psi_2 = 2 pi f t_c - 2 phi_c + 3 / (128 eta) v^-5
        let p = BinaryParams::from_solar_masses(12.0, 8.0);
        let series = LeadingOrderWaveform.modes_of_frequency(&p, 2).unwrap();
        let psi2 = series.psi2();
        let m_sec = mass_in_seconds(p.mtot());
        let eta = p.eta();
        for (&f, &psi) in series.fvals.iter().zip(psi2.iter()) {
            if f < 30.0 || f > 200.0 {
                continue;
            }
            let v = (PI * m_sec * f).cbrt();
            assert_relative_eq!(psi, 3.0 / (128.0 * eta) * v.powi(-5), max_relative = 1e-10);
        }
    }

    #[test]
    fn series_vanish_at_negative_frequencies() {
        let mut p = BinaryParams::from_solar_masses(12.0, 8.0);
        p.beta = 0.4;
        let series = LeadingOrderWaveform.modes_of_frequency(&p, 2).unwrap();
        for (i, &f) in series.fvals.iter().enumerate() {
            if f <= 0.0 {
                assert_eq!(series.alpha[i], 0.0);
                assert_eq!(series.beta[i], 0.0);
                assert_eq!(series.t[i], 0.0);
            }
        }
    }

    #[test]
    fn strain_is_band_limited() {
        let mut p = BinaryParams::from_solar_masses(12.0, 8.0);
        p.theta_jn = 0.5;
        let hoff = LeadingOrderWaveform.complex_hoff(&p).unwrap();
        let f_isco = 1.0 / (6.0_f64.powf(1.5) * PI * mass_in_seconds(p.mtot()));
        for (&f, h) in hoff.fvals.iter().zip(hoff.data.iter()) {
            if f > p.fmin && f < f_isco {
                assert!(h.norm() > 0.0);
            } else {
                assert_eq!(h.norm(), 0.0);
            }
        }
    }
}
