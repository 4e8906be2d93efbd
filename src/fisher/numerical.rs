use crate::error::FisherError;
use crate::noise::NoiseCurveTrait;
use crate::param::{Param, ParameterPoint};
use crate::series::FrequencySeries;
use crate::waveform::{InnerProductTrait, WaveformService, build_overlap};

use ndarray::Zip;
use num_complex::Complex64;

/// Forward-difference derivative of the strain, per unit scale of the parameter
fn strain_derivative<P, W>(
    service: &W,
    point: &P,
    h0: &FrequencySeries<Complex64>,
    param: Param,
) -> Result<FrequencySeries<Complex64>, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
{
    let mut here = point.clone();
    let value = here.extract(param);
    let step = param.step(value)?;
    here.assign(param, value + step)?;
    let h = service.complex_hoff(&here)?;
    if h.len() != h0.len() {
        return Err(FisherError::LengthMismatch(h0.len(), h.len()));
    }
    let scaled_step = step / param.unit_scale();
    let data = Zip::from(&h.data)
        .and(&h0.data)
        .map_collect(|&a, &b| (a - b) / scaled_step);
    FrequencySeries::new(h0.fvals.clone(), data, h0.delta_f)
}

/// Fisher-matrix element $\langle \partial_1 h | \partial_2 h \rangle / \|h\|^2$ from strain
/// derivatives
///
/// No approximation is made beyond the forward differences, which need steps small enough to
/// resolve the phase change of the strain. With `max_t` the inner product is maximized over
/// time shifts.
pub fn numerical_fisher_element<P, W, N>(
    service: &W,
    point: &P,
    p1: Param,
    p2: Param,
    noise: &N,
    max_t: bool,
) -> Result<f64, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    let h0 = service.complex_hoff(point)?;
    let overlap = build_overlap(&h0, noise, point.fmin(), f64::INFINITY, max_t);
    let dh1 = strain_derivative(service, point, &h0, p1)?;
    let dh2 = strain_derivative(service, point, &h0, p2)?;
    Ok(overlap.ip(&dh1, &dh2)? / overlap.norm(&h0)?.powi(2))
}
