use crate::error::FisherError;
use crate::noise::NoiseCurveTrait;
use crate::series::FrequencySeries;

use enum_dispatch::enum_dispatch;
use fftw::array::AlignedVec;
use fftw::plan::{C2CPlan, C2CPlan64};
use fftw::types::{Flag, Sign, c64};
use ndarray::{Array1, Zip};
use num_complex::Complex64;

/// Noise-weighted inner product of frequency-domain waveforms
#[enum_dispatch]
pub trait InnerProductTrait {
    fn ip(
        &self,
        a: &FrequencySeries<Complex64>,
        b: &FrequencySeries<Complex64>,
    ) -> Result<f64, FisherError>;

    fn norm(&self, a: &FrequencySeries<Complex64>) -> Result<f64, FisherError>;
}

/// Inner-product operator built for one frequency grid
#[enum_dispatch(InnerProductTrait)]
#[derive(Clone, Debug)]
pub enum Overlap {
    Ip(ComplexIp),
    MaxTime(ComplexOverlap),
}

/// Build an inner product compatible with the grid of `h0`
///
/// Only $f_\mathrm{min} < |f| < f_\mathrm{max}$ contributes. If `max_t` is set, the inner
/// product is maximized over relative time shifts.
pub fn build_overlap<N: NoiseCurveTrait>(
    h0: &FrequencySeries<Complex64>,
    noise: &N,
    fmin: f64,
    fmax: f64,
    max_t: bool,
) -> Overlap {
    let weights = noise_weights(h0, noise, fmin, fmax);
    if max_t {
        ComplexOverlap { weights }.into()
    } else {
        ComplexIp { weights }.into()
    }
}

/// $2 \Delta f / S_n(|f|)$ inside the band, zero elsewhere and where the noise is not finite
fn noise_weights<N: NoiseCurveTrait>(
    h0: &FrequencySeries<Complex64>,
    noise: &N,
    fmin: f64,
    fmax: f64,
) -> Array1<f64> {
    h0.fvals.mapv(|f| {
        let f = f.abs();
        if !(f > fmin && f < fmax) {
            return 0.0;
        }
        let w = 2.0 * h0.delta_f / noise.psd(f);
        if w.is_finite() { w } else { 0.0 }
    })
}

fn integrand(
    weights: &Array1<f64>,
    a: &FrequencySeries<Complex64>,
    b: &FrequencySeries<Complex64>,
) -> Result<Array1<Complex64>, FisherError> {
    if a.len() != weights.len() {
        return Err(FisherError::LengthMismatch(weights.len(), a.len()));
    }
    if b.len() != weights.len() {
        return Err(FisherError::LengthMismatch(weights.len(), b.len()));
    }
    Ok(Zip::from(weights)
        .and(&a.data)
        .and(&b.data)
        .map_collect(|&w, a, b| w * a.conj() * b))
}

/// $\langle a | b \rangle = \mathrm{Re}\, 2\Delta f \sum_f a^*(f) b(f) / S_n(|f|)$
#[derive(Clone, Debug)]
pub struct ComplexIp {
    weights: Array1<f64>,
}

impl InnerProductTrait for ComplexIp {
    fn ip(
        &self,
        a: &FrequencySeries<Complex64>,
        b: &FrequencySeries<Complex64>,
    ) -> Result<f64, FisherError> {
        Ok(integrand(&self.weights, a, b)?.sum().re)
    }

    fn norm(&self, a: &FrequencySeries<Complex64>) -> Result<f64, FisherError> {
        Ok(self.ip(a, a)?.sqrt())
    }
}

/// Inner product maximized over a relative time shift
///
/// $\max_t |2\Delta f \sum_f a^*(f) b(f) e^{2\pi i f t} / S_n(|f|)|$, evaluated on the time grid of
/// an inverse FFT of the integrand.
#[derive(Clone, Debug)]
pub struct ComplexOverlap {
    weights: Array1<f64>,
}

impl ComplexOverlap {
    fn max_over_time(z: &Array1<Complex64>) -> Result<f64, FisherError> {
        let n = z.len();
        let mut input = AlignedVec::<c64>::new(n);
        // Sorted frequency index k holds f = (k - n/2) df, FFT bin (k - n/2) mod n
        for (k, &value) in z.iter().enumerate() {
            input[(k + n - n / 2) % n] = value;
        }
        let mut output = AlignedVec::<c64>::new(n);
        let mut plan: C2CPlan64 =
            C2CPlan::aligned(&[n], Sign::Backward, Flag::ESTIMATE).map_err(fft_error)?;
        plan.c2c(&mut input, &mut output).map_err(fft_error)?;
        Ok(output.iter().map(|x| x.norm()).fold(0.0, f64::max))
    }
}

fn fft_error(err: fftw::error::Error) -> FisherError {
    FisherError::Fft(format!("{err:?}"))
}

impl InnerProductTrait for ComplexOverlap {
    fn ip(
        &self,
        a: &FrequencySeries<Complex64>,
        b: &FrequencySeries<Complex64>,
    ) -> Result<f64, FisherError> {
        let z = integrand(&self.weights, a, b)?;
        Self::max_over_time(&z)
    }

    fn norm(&self, a: &FrequencySeries<Complex64>) -> Result<f64, FisherError> {
        Ok(integrand(&self.weights, a, a)?.sum().re.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{FlatNoise, NoiseCurve};
    use crate::series::two_sided_grid;

    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn chirp(shift: f64) -> FrequencySeries<Complex64> {
        let fvals = two_sided_grid(1024, 0.5);
        let data = fvals.mapv(|f| {
            if f > 10.0 && f < 200.0 {
                Complex64::from_polar(f.powf(-7.0 / 6.0), 1e3 / f - 2.0 * PI * f * shift)
            } else {
                Complex64::new(0.0, 0.0)
            }
        });
        FrequencySeries::new(fvals, data, 0.5).unwrap()
    }

    #[test]
    fn self_overlap_is_unity() {
        let h = chirp(0.0);
        for max_t in [false, true] {
            let ip = build_overlap(&h, &FlatNoise(1.0), 10.0, 256.0, max_t);
            let norm = ip.norm(&h).unwrap();
            assert_relative_eq!(ip.ip(&h, &h).unwrap() / norm / norm, 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn time_maximization_recovers_shifted_signal() {
        let h0 = chirp(0.0);
        // one sample of the inverse-FFT time grid: 1 / (n df)
        let h1 = chirp(1.0 / 512.0 * 3.0);
        let plain = build_overlap(&h0, &NoiseCurve::flat(1.0), 10.0, 256.0, false);
        let maxed = build_overlap(&h0, &NoiseCurve::flat(1.0), 10.0, 256.0, true);
        let norm = plain.norm(&h0).unwrap();
        let plain_overlap = plain.ip(&h0, &h1).unwrap() / norm / norm;
        let maxed_overlap = maxed.ip(&h0, &h1).unwrap() / norm / norm;
        assert!(plain_overlap < 0.9);
        assert_relative_eq!(maxed_overlap, 1.0, max_relative = 1e-9);
    }

    #[test]
    fn out_of_band_and_infinite_noise_carry_no_weight() {
        let h = chirp(0.0);
        let full = build_overlap(&h, &FlatNoise(1.0), 0.0, 1e4, false);
        let band = build_overlap(&h, &FlatNoise(1.0), 50.0, 100.0, false);
        let dead = build_overlap(&h, &FlatNoise(f64::INFINITY), 0.0, 1e4, false);
        assert!(band.ip(&h, &h).unwrap() < full.ip(&h, &h).unwrap());
        assert_eq!(dead.ip(&h, &h).unwrap(), 0.0);
    }

    #[test]
    fn grid_mismatch_is_an_error() {
        let h = chirp(0.0);
        let ip = build_overlap(&h, &FlatNoise(1.0), 0.0, 1e4, false);
        let short =
            FrequencySeries::new(two_sided_grid(8, 0.5), Array1::zeros(8), 0.5).unwrap();
        assert_eq!(ip.ip(&h, &short), Err(FisherError::LengthMismatch(1024, 8)));
    }
}
