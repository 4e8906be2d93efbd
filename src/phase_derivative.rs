//! Derivatives of the quadrupole phase and precession angles with respect to one parameter

use crate::config::FisherConfig;
use crate::error::FisherError;
use crate::param::{Param, ParameterPoint};
use crate::series::{PhaseSeries, validity_mask};
use crate::waveform::WaveformService;

use ndarray::{Array1, Zip};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::f64::consts::PI;

/// Phase and precession-angle derivatives on the waveform's frequency grid
///
/// Every array is zero outside $(f_\mathrm{min}, f_\mathrm{max,safe})$, `fmax_safe` is the
/// already reduced upper frequency the derivatives can be trusted to.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseDerivative {
    pub fvals: Array1<f64>,
    pub fmax_safe: f64,
    /// $\partial \Psi_2 / \partial \lambda$, $\Psi_2 = 2\pi f t - 2\Phi$
    pub d_psi: Array1<f64>,
    /// $\partial \Phi / \partial \lambda$
    pub d_phi: Array1<f64>,
    pub d_alpha: Array1<f64>,
    pub d_gamma: Array1<f64>,
}

impl PhaseDerivative {
    pub fn len(&self) -> usize {
        self.fvals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fvals.is_empty()
    }
}

/// Point and derivative options a cache was filled for
///
/// The point is stored as the bits of every named parameter, so it works for any
/// [ParameterPoint].
#[derive(Clone, Debug, PartialEq)]
struct CacheOrigin {
    point: Vec<u64>,
    l_max: u32,
    skip_fast_derivative: bool,
    fmax_safety_factor: f64,
    max_length_change: f64,
}

impl CacheOrigin {
    fn new<P: ParameterPoint>(point: &P, config: &FisherConfig) -> Self {
        Self {
            point: Param::ALL.iter().map(|&p| point.extract(p).to_bits()).collect(),
            l_max: config.l_max,
            skip_fast_derivative: config.skip_fast_derivative,
            fmax_safety_factor: config.fmax_safety_factor,
            max_length_change: config.max_length_change,
        }
    }
}

/// Phase derivatives computed for one parameter point, keyed by parameter
///
/// Entries are inserted once and never changed, so the same cache can serve every element of a
/// Fisher matrix at the same point. The first request pins the point and the derivative options
/// of `FisherConfig`, later requests for another point or other options fail with
/// [FisherError::DerivativeCacheMismatch]. Options which do not enter the derivatives, like the
/// geometric-factor cut-off, may differ between requests.
#[derive(Clone, Debug, Default)]
pub struct PhaseDerivativeCache {
    origin: Option<CacheOrigin>,
    derivatives: BTreeMap<Param, PhaseDerivative>,
}

impl PhaseDerivativeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: Param) -> Option<&PhaseDerivative> {
        self.derivatives.get(&param)
    }

    pub fn contains(&self, param: Param) -> bool {
        self.derivatives.contains_key(&param)
    }

    pub fn len(&self) -> usize {
        self.derivatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derivatives.is_empty()
    }

    /// Cached derivative for `param`, computed on first request
    pub fn get_or_compute<P, W>(
        &mut self,
        service: &W,
        point: &P,
        param: Param,
        config: &FisherConfig,
    ) -> Result<&PhaseDerivative, FisherError>
    where
        P: ParameterPoint,
        W: WaveformService<P>,
    {
        let origin = CacheOrigin::new(point, config);
        match &self.origin {
            Some(cached) if *cached != origin => {
                return Err(FisherError::DerivativeCacheMismatch(param));
            }
            Some(_) => {}
            None => self.origin = Some(origin),
        }
        match self.derivatives.entry(param) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let derivative = phase_derivative_series(service, point, param, config)?;
                Ok(entry.insert(derivative))
            }
        }
    }
}

/// Zero every sample outside the mask
fn apply_mask(a: &mut Array1<f64>, mask: &Array1<bool>) {
    Zip::from(a).and(mask).for_each(|x, &ok| {
        if !ok {
            *x = 0.0;
        }
    });
}

struct MaskedSeries {
    psi: Array1<f64>,
    phi: Array1<f64>,
    alpha: Array1<f64>,
    gamma: Array1<f64>,
}

impl MaskedSeries {
    fn new(series: &PhaseSeries, mask: &Array1<bool>) -> Self {
        let mut psi = series.psi2();
        let mut phi = series.phi.clone();
        let mut alpha = series.alpha.clone();
        let mut gamma = series.gamma.clone();
        for a in [&mut psi, &mut phi, &mut alpha, &mut gamma] {
            apply_mask(a, mask);
        }
        Self {
            psi,
            phi,
            alpha,
            gamma,
        }
    }

    fn truncate(&mut self, n: usize) {
        for a in [&mut self.psi, &mut self.phi, &mut self.alpha, &mut self.gamma] {
            if a.len() > n {
                *a = a.slice(ndarray::s![..n]).to_owned();
            }
        }
    }
}

/// Closed-form derivative of the series with respect to `tref`, `phiJL` or `phiref`
fn fast_derivative(
    param: Param,
    series: &PhaseSeries,
    mask: &Array1<bool>,
    fmax_safe: f64,
) -> Option<PhaseDerivative> {
    let n = series.len();
    let (mut d_psi, mut d_phi, mut d_alpha, mut d_gamma) = match param {
        // Psi_2 = 2 pi f t - 2 Phi_orb, and neither Phi_orb nor the angles depend on tref
        Param::Tref => (
            series.fvals.mapv(|f| 2.0 * PI * f),
            Array1::zeros(n),
            Array1::zeros(n),
            Array1::zeros(n),
        ),
        // d alpha = d phiJL, d gamma = -cos(beta) d alpha
        Param::PhiJL => (
            Array1::zeros(n),
            Array1::zeros(n),
            Array1::ones(n),
            series.beta.mapv(|beta| -beta.cos()),
        ),
        Param::Phiref => (
            Array1::from_elem(n, -2.0),
            Array1::ones(n),
            Array1::zeros(n),
            Array1::zeros(n),
        ),
        _ => return None,
    };
    for a in [&mut d_psi, &mut d_phi, &mut d_alpha, &mut d_gamma] {
        apply_mask(a, mask);
    }
    Some(PhaseDerivative {
        fvals: series.fvals.clone(),
        fmax_safe,
        d_psi,
        d_phi,
        d_alpha,
        d_gamma,
    })
}

/// Derivatives of the quadrupole phase and precession angles with respect to `param`
///
/// The series is evaluated on the full two-sided grid of the waveform and is non-zero only for
/// $f_\mathrm{min} < f < 0.98 f_\mathrm{max,safe}$, where the waveform model is trusted.
///
/// `tref`, `phiJL` and `phiref` have closed-form derivatives which are used unless
/// [FisherConfig::skip_fast_derivative] is set. Every other parameter is differentiated by a
/// forward finite difference with the step given by [Param::step]; the result is reported per
/// [Param::unit_scale].
pub fn phase_derivative_series<P, W>(
    service: &W,
    point: &P,
    param: Param,
    config: &FisherConfig,
) -> Result<PhaseDerivative, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
{
    tracing::debug!(%param, "computing phase derivatives");
    let mut here = point.clone();
    let series = service.modes_of_frequency(&here, config.l_max)?;
    let fmax_safe = config.fmax_safety_factor * series.fmax_safe;
    let mask = validity_mask(&series.fvals, fmax_safe, point.fmin());

    if !config.skip_fast_derivative {
        if let Some(derivative) = fast_derivative(param, &series, &mask, fmax_safe) {
            return Ok(derivative);
        }
    }

    let value = here.extract(param);
    let step = param.step(value)?;
    let scaled_step = step / param.unit_scale();
    here.assign(param, value + step)?;
    let perturbed = service.modes_of_frequency(&here, config.l_max)?;

    let n = series.len();
    let n1 = perturbed.len();
    let ratio = n as f64 / n1 as f64;
    if !(ratio >= 1.0 - config.max_length_change && ratio <= 1.0 + config.max_length_change) {
        return Err(FisherError::CatastrophicLengthChange {
            param,
            baseline: n,
            perturbed: n1,
        });
    }

    // The baseline support is used for both series
    let mut base = MaskedSeries::new(&series, &mask);
    let common = n.min(n1);
    let mask = mask.slice(ndarray::s![..common]).to_owned();
    let mut perturbed = perturbed;
    perturbed.truncate(common);
    let shifted = MaskedSeries::new(&perturbed, &mask);
    base.truncate(common);

    let difference = |a: &Array1<f64>, b: &Array1<f64>| {
        Zip::from(a)
            .and(b)
            .map_collect(|&a, &b| (a - b) / scaled_step)
    };
    Ok(PhaseDerivative {
        fvals: series.fvals.slice(ndarray::s![..common]).to_owned(),
        fmax_safe,
        d_psi: difference(&shifted.psi, &base.psi),
        d_phi: difference(&shifted.phi, &base.phi),
        d_alpha: difference(&shifted.alpha, &base.alpha),
        d_gamma: difference(&shifted.gamma, &base.gamma),
    })
}
