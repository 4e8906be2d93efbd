use crate::error::FisherError;

use ndarray::{Array1, Zip};

/// Uniformly sampled two-sided frequency series
///
/// `fvals` increases monotonically with step $\Delta f$, `data` has the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencySeries<T> {
    pub fvals: Array1<f64>,
    pub data: Array1<T>,
    pub delta_f: f64,
}

impl<T> FrequencySeries<T> {
    pub fn new(fvals: Array1<f64>, data: Array1<T>, delta_f: f64) -> Result<Self, FisherError> {
        if fvals.len() != data.len() {
            return Err(FisherError::LengthMismatch(fvals.len(), data.len()));
        }
        Ok(Self {
            fvals,
            data,
            delta_f,
        })
    }

    pub fn len(&self) -> usize {
        self.fvals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fvals.is_empty()
    }
}

/// Two-sided grid $f_k = (k - n/2) \Delta f$, $k = 0..n$
pub fn two_sided_grid(n: usize, delta_f: f64) -> Array1<f64> {
    let half = (n / 2) as f64;
    Array1::from_shape_fn(n, |k| (k as f64 - half) * delta_f)
}

/// Orbital phase and precession angles of the quadrupole as functions of frequency
///
/// `t` is the time at which the orbit sweeps through frequency `f`, `phi` the orbital phase,
/// `alpha`, `beta`, `gamma` the Euler angles of the orbital angular momentum. All arrays share the
/// `fvals` grid, `fmax_safe` is the highest frequency the model can be trusted up to.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseSeries {
    pub fvals: Array1<f64>,
    pub fmax_safe: f64,
    pub t: Array1<f64>,
    pub phi: Array1<f64>,
    pub alpha: Array1<f64>,
    pub beta: Array1<f64>,
    pub gamma: Array1<f64>,
}

impl PhaseSeries {
    pub fn len(&self) -> usize {
        self.fvals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fvals.is_empty()
    }

    /// Combined quadrupole phase $\Psi_2 = 2\pi f t(f) - 2\Phi(f)$
    pub fn psi2(&self) -> Array1<f64> {
        Zip::from(&self.fvals)
            .and(&self.t)
            .and(&self.phi)
            .map_collect(|&f, &t, &phi| 2.0 * std::f64::consts::PI * f * t - 2.0 * phi)
    }

    /// Truncate every array to the first `n` samples
    pub fn truncate(&mut self, n: usize) {
        let n = n.min(self.len());
        for a in [
            &mut self.fvals,
            &mut self.t,
            &mut self.phi,
            &mut self.alpha,
            &mut self.beta,
            &mut self.gamma,
        ] {
            if a.len() > n {
                *a = a.slice(ndarray::s![..n]).to_owned();
            }
        }
    }
}

/// Samples where the waveform model is trusted: $0 < f < f_\mathrm{max}$ and $f > f_\mathrm{min}$
pub fn validity_mask(fvals: &Array1<f64>, fmax: f64, fmin: f64) -> Array1<bool> {
    fvals.mapv(|f| f > 0.0 && f < fmax && f > fmin)
}
