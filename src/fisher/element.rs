use crate::config::{BetaBreakoutPolicy, FisherConfig};
use crate::constants::{distance_in_seconds, mass_in_seconds};
use crate::error::FisherError;
use crate::harmonics::geometric_factor;
use crate::noise::NoiseCurveTrait;
use crate::param::{Param, ParameterPoint};
use crate::phase_derivative::{PhaseDerivative, PhaseDerivativeCache};
use crate::waveform::WaveformService;

use itertools::iproduct;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Azimuthal indices of the quadrupole harmonics
pub const HARMONIC_M: [i32; 5] = [-2, -1, 0, 1, 2];

/// Helicities of the precession-cone decomposition
pub const HELICITY_S: [i32; 2] = [-1, 1];

/// Contributions of the four phase-derivative products of one $(m, s)$ term
///
/// Used to re-assemble the dependence on the precession-cone opening angle by hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubBlocks {
    pub psi_psi: f64,
    pub psi_alpha: f64,
    pub alpha_psi: f64,
    pub alpha_alpha: f64,
}

/// Per-$(m, s)$ SNR weights and cross terms of one Fisher-matrix element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementTerms<T> {
    pub rho2: BTreeMap<(i32, i32), f64>,
    pub cross: BTreeMap<(i32, i32), T>,
}

impl ElementTerms<f64> {
    /// Normalized element $\sum \Gamma_{ms} / \sum \rho^2_{ms}$
    ///
    /// Fails with [FisherError::NoContributingTerms] if the SNR weights sum to zero, e.g. for a
    /// face-on binary without precession, where every term is pruned.
    pub fn normalized(&self) -> Result<f64, FisherError> {
        let rho2: f64 = self.rho2.values().sum();
        if rho2 == 0.0 {
            return Err(FisherError::NoContributingTerms);
        }
        let cross: f64 = self.cross.values().sum();
        Ok(cross / rho2)
    }
}

/// SNR weight and cross term of a single $(m, s)$ term
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TermFactor<T> {
    pub rhoms2: f64,
    pub cross: T,
}

/// Source-dependent part of the SNR density, common to all terms
struct SnrDensity {
    prefactor: f64,
    mc_s: f64,
    fmin: f64,
    delta_f: f64,
}

impl SnrDensity {
    fn new<P: ParameterPoint>(point: &P) -> Self {
        let mc_s = mass_in_seconds(point.extract(Param::Mc));
        let d_s = distance_in_seconds(point.extract(Param::Dist));
        Self {
            prefactor: 4.0 * (PI * mc_s * mc_s).powi(2) / (3.0 * d_s * d_s),
            mc_s,
            fmin: point.fmin(),
            delta_f: point.delta_f(),
        }
    }

    /// Weight of a frequency sample including $\Delta f$
    fn weight<N: NoiseCurveTrait>(&self, f: f64, noise: &N) -> f64 {
        let f_abs = f.abs();
        let psd = match noise.psd(f_abs) {
            s if s.is_nan() => f64::INFINITY,
            s => s,
        };
        let w = self.prefactor * (PI * self.mc_s * f_abs.max(0.5 * self.fmin)).powf(-7.0 / 3.0)
            / psd;
        if w.is_nan() { 0.0 } else { w * self.delta_f }
    }
}

/// Phase combination entering the precessing cross term
#[inline]
fn precessing_phase(d: &PhaseDerivative, i: usize, ms: f64) -> f64 {
    d.d_psi[i] - 2.0 * d.d_gamma[i] + ms * d.d_alpha[i]
}

/// Visit every kept sample with its weight, the caller receives `(index, weight)`
fn for_each_kept_sample<N: NoiseCurveTrait>(
    density: &SnrDensity,
    d1: &PhaseDerivative,
    d2: &PhaseDerivative,
    noise: &N,
    config: &FisherConfig,
    mut f: impl FnMut(usize, f64),
) {
    let n = d1.len().min(d2.len());
    let fmax = config.fmax_safety_factor * d1.fmax_safe.min(d2.fmax_safe);
    for i in 0..n {
        let freq = d1.fvals[i];
        if freq < density.fmin || freq > fmax {
            continue;
        }
        f(i, density.weight(freq, noise));
    }
}

/// SNR weight and cross term of one $(m, s)$ term for a given geometric factor
///
/// Terms with a geometric factor below [FisherConfig::geometric_factor_cutoff] are skipped and
/// give zeros. The result is symmetric in the two derivatives bit for bit.
#[allow(clippy::too_many_arguments)]
pub fn fisher_term_factor<P, N>(
    point: &P,
    d1: &PhaseDerivative,
    d2: &PhaseDerivative,
    m: i32,
    s: i32,
    noise: &N,
    geometric_factor: f64,
    config: &FisherConfig,
) -> TermFactor<f64>
where
    P: ParameterPoint,
    N: NoiseCurveTrait,
{
    if geometric_factor.abs() < config.geometric_factor_cutoff {
        tracing::debug!(m, s, geometric_factor, "pruning term");
        return TermFactor::default();
    }
    let density = SnrDensity::new(point);
    let degenerate = point.extract(Param::Beta) < config.precession_beta_cutoff;
    let ms = f64::from(m * s);
    let mut weight_sum = 0.0;
    let mut cross = 0.0;
    for_each_kept_sample(&density, d1, d2, noise, config, |i, w| {
        weight_sum += w;
        let product = if degenerate {
            d1.d_psi[i] * d2.d_psi[i]
        } else {
            precessing_phase(d1, i, ms) * precessing_phase(d2, i, ms)
        };
        cross += w * geometric_factor * product;
    });
    TermFactor {
        rhoms2: weight_sum * geometric_factor,
        cross,
    }
}

/// SNR weight and the four sub-blocks of one $(m, s)$ term
///
/// Below the precession cut-off only the $\Psi\Psi$ block is defined, the others are zero.
pub fn fisher_term_breakdown<P, N>(
    point: &P,
    d1: &PhaseDerivative,
    d2: &PhaseDerivative,
    noise: &N,
    geometric_factor: f64,
    config: &FisherConfig,
) -> TermFactor<SubBlocks>
where
    P: ParameterPoint,
    N: NoiseCurveTrait,
{
    if geometric_factor.abs() < config.geometric_factor_cutoff {
        return TermFactor::default();
    }
    let density = SnrDensity::new(point);
    let degenerate = point.extract(Param::Beta) < config.precession_beta_cutoff;
    let mut weight_sum = 0.0;
    let mut blocks = SubBlocks::default();
    for_each_kept_sample(&density, d1, d2, noise, config, |i, w| {
        weight_sum += w;
        let wg = w * geometric_factor;
        blocks.psi_psi += wg * (d1.d_psi[i] * d2.d_psi[i]);
        if !degenerate {
            blocks.psi_alpha += wg * (d1.d_psi[i] * d2.d_alpha[i]);
            blocks.alpha_psi += wg * (d1.d_alpha[i] * d2.d_psi[i]);
            blocks.alpha_alpha += wg * (d1.d_alpha[i] * d2.d_alpha[i]);
        }
    });
    TermFactor {
        rhoms2: weight_sum * geometric_factor,
        cross: blocks,
    }
}

fn term_geometric_factor<P: ParameterPoint>(
    point: &P,
    m: i32,
    s: i32,
    config: &FisherConfig,
) -> f64 {
    if config.omit_geometric_factor {
        1.0
    } else {
        geometric_factor(
            point.extract(Param::ThetaJN),
            point.extract(Param::Beta),
            m,
            s,
        )
    }
}

/// Fill the cache for both parameters and borrow their derivatives
fn derivative_pair<'a, P, W>(
    cache: &'a mut PhaseDerivativeCache,
    service: &W,
    point: &P,
    p1: Param,
    p2: Param,
    config: &FisherConfig,
) -> Result<(&'a PhaseDerivative, &'a PhaseDerivative), FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
{
    cache.get_or_compute(service, point, p1, config)?;
    cache.get_or_compute(service, point, p2, config)?;
    let cache = &*cache;
    match (cache.get(p1), cache.get(p2)) {
        (Some(d1), Some(d2)) => Ok((d1, d2)),
        (None, _) => Err(FisherError::NoDerivativeStep(p1)),
        (_, None) => Err(FisherError::NoDerivativeStep(p2)),
    }
}

/// Per-$(m, s)$ SNR weights and cross terms of the approximate Fisher element
///
/// `cache` holds phase derivatives computed at `point`; if it is `None` a call-local cache is
/// used.
pub fn approximate_fisher_element_intermediate<P, W, N>(
    service: &W,
    point: &P,
    p1: Param,
    p2: Param,
    noise: &N,
    cache: Option<&mut PhaseDerivativeCache>,
    config: &FisherConfig,
) -> Result<ElementTerms<f64>, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    let mut local = PhaseDerivativeCache::new();
    let cache = cache.unwrap_or(&mut local);
    let (d1, d2) = derivative_pair(cache, service, point, p1, p2, config)?;

    let mut terms = ElementTerms::default();
    for (m, s) in iproduct!(HARMONIC_M, HELICITY_S) {
        let g = term_geometric_factor(point, m, s, config);
        let factor = fisher_term_factor(point, d1, d2, m, s, noise, g, config);
        terms.rho2.insert((m, s), factor.rhoms2);
        terms.cross.insert((m, s), factor.cross);
    }
    Ok(terms)
}

/// Semi-analytic Fisher-matrix element of a precessing binary
///
/// The element is the curvature of the overlap for the pair of parameters `p1`, `p2`,
/// normalized by the squared SNR:
/// $$
/// \Gamma_{12} = \frac{
///     \sum_{ms} \int w(f)\, g_{ms}\, \partial_1\Psi_{ms}\, \partial_2\Psi_{ms}\, df
/// }{
///     \sum_{ms} \int w(f)\, g_{ms}\, df
/// },
/// $$
/// where $g_{ms}$ is the geometric factor of the $(m, s)$ term, $w(f) \propto f^{-7/3}/S_n(|f|)$
/// is the leading-order SNR density and
/// $\Psi_{ms} = \Psi_2 - 2\gamma + m s \alpha$ is the phase of the term. Below the
/// precession cut-off only the quadrupole phase $\Psi_2$ is used.
///
/// The result does not depend on the order of `p1` and `p2`.
pub fn approximate_fisher_element<P, W, N>(
    service: &W,
    point: &P,
    p1: Param,
    p2: Param,
    noise: &N,
    cache: Option<&mut PhaseDerivativeCache>,
    config: &FisherConfig,
) -> Result<f64, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    approximate_fisher_element_intermediate(service, point, p1, p2, noise, cache, config)
        .and_then(|terms| terms.normalized())
}

/// Per-$(m, s)$ SNR weights and the $\Psi\Psi$, $\Psi\alpha$, $\alpha\Psi$, $\alpha\alpha$
/// sub-blocks of the approximate Fisher element
///
/// The sub-blocks assume $\gamma = -\alpha\cos\beta$ and a geometric factor held fixed by the
/// caller, i.e. [FisherConfig::omit_geometric_factor] set. Otherwise the call is rejected or a
/// warning is logged, depending on [FisherConfig::beta_breakout_policy].
pub fn approximate_fisher_element_breakdown<P, W, N>(
    service: &W,
    point: &P,
    p1: Param,
    p2: Param,
    noise: &N,
    cache: Option<&mut PhaseDerivativeCache>,
    config: &FisherConfig,
) -> Result<ElementTerms<SubBlocks>, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    let mut local = PhaseDerivativeCache::new();
    let cache = cache.unwrap_or(&mut local);
    let (d1, d2) = derivative_pair(cache, service, point, p1, p2, config)?;

    let mut terms = ElementTerms::default();
    let mut warned = false;
    for (m, s) in iproduct!(HARMONIC_M, HELICITY_S) {
        let g = term_geometric_factor(point, m, s, config);
        if !config.omit_geometric_factor && g.abs() >= config.geometric_factor_cutoff {
            match config.beta_breakout_policy {
                BetaBreakoutPolicy::Reject => {
                    return Err(FisherError::BetaBreakoutWithGeometricFactor(g));
                }
                BetaBreakoutPolicy::Warn if !warned => {
                    tracing::warn!(
                        %p1,
                        %p2,
                        geometric_factor = g,
                        "beta breakdown requested without fixing the geometric factor"
                    );
                    warned = true;
                }
                BetaBreakoutPolicy::Warn => {}
            }
        }
        let factor = fisher_term_breakdown(point, d1, d2, noise, g, config);
        tracing::debug!(%p1, %p2, m, s, blocks = ?factor.cross, "sub-blocks");
        terms.rho2.insert((m, s), factor.rhoms2);
        terms.cross.insert((m, s), factor.cross);
    }
    Ok(terms)
}
