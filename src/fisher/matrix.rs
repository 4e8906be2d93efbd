use crate::config::FisherConfig;
use crate::error::FisherError;
use crate::fisher::element::approximate_fisher_element;
use crate::noise::NoiseCurveTrait;
use crate::param::{Param, ParameterPoint};
use crate::phase_derivative::PhaseDerivativeCache;
use crate::waveform::WaveformService;

use ndarray::Array2;

/// Approximate Fisher matrix for the given parameter ordering
///
/// Elements are computed for $i \le j$ and mirrored, all of them share one phase-derivative
/// cache so every derivative is computed once.
pub fn approximate_fisher_matrix<P, W, N>(
    service: &W,
    point: &P,
    params: &[Param],
    noise: &N,
    config: &FisherConfig,
) -> Result<Array2<f64>, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    let n = params.len();
    let mut cache = PhaseDerivativeCache::new();
    let mut matrix = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let value = approximate_fisher_element(
                service,
                point,
                params[i],
                params[j],
                noise,
                Some(&mut cache),
                config,
            )?;
            matrix[[i, j]] = value;
            matrix[[j, i]] = value;
        }
    }
    Ok(matrix)
}
