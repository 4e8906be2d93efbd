//! Spin-weighted spherical harmonics and Wigner d-matrices of the quadrupole
//!
//! Only the $l = 2$, spin-weight $-2$ harmonics are needed: the precessing Fisher approximation
//! weights every $(m, s)$ term by $|{}_{-2}Y_{2m}(\theta_{JN}, 0)\, d^2_{ms}(\beta)|^2$.

use std::f64::consts::PI;

fn factorial(n: i32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// Spin-weight $-2$, $l = 2$ spherical harmonic ${}_{-2}Y_{2m}(\theta, \phi)$ at $\phi = 0$
///
/// Returns zero for $|m| > 2$.
pub fn spin_weighted_y2(theta: f64, m: i32) -> f64 {
    let (sin, cos) = theta.sin_cos();
    match m {
        -2 => f64::sqrt(5.0 / (64.0 * PI)) * (1.0 - cos).powi(2),
        -1 => f64::sqrt(5.0 / (16.0 * PI)) * sin * (1.0 - cos),
        0 => f64::sqrt(15.0 / (32.0 * PI)) * sin.powi(2),
        1 => f64::sqrt(5.0 / (16.0 * PI)) * sin * (1.0 + cos),
        2 => f64::sqrt(5.0 / (64.0 * PI)) * (1.0 + cos).powi(2),
        _ => 0.0,
    }
}

/// Wigner small-d matrix element $d^l_{m' m}(\beta)$
///
/// Returns zero when either index is outside $[-l, l]$.
pub fn wigner_d(l: i32, mp: i32, m: i32, beta: f64) -> f64 {
    if mp.abs() > l || m.abs() > l {
        return 0.0;
    }
    let (sin, cos) = (0.5 * beta).sin_cos();
    let k_min = 0.max(m - mp);
    let k_max = (l + m).min(l - mp);
    let sum: f64 = (k_min..=k_max)
        .map(|k| {
            let sign = if (mp - m + k) % 2 == 0 { 1.0 } else { -1.0 };
            sign * cos.powi(2 * l + m - mp - 2 * k) * sin.powi(mp - m + 2 * k)
                / (factorial(l + m - k)
                    * factorial(k)
                    * factorial(mp - m + k)
                    * factorial(l - mp - k))
        })
        .sum();
    let norm =
        f64::sqrt(factorial(l + mp) * factorial(l - mp) * factorial(l + m) * factorial(l - m));
    norm * sum
}

/// Geometric mode-coupling factor of the $(m, s)$ term
pub fn geometric_factor(theta_jn: f64, beta: f64, m: i32, s: i32) -> f64 {
    (spin_weighted_y2(theta_jn, m) * wigner_d(2, m, s, beta)).powi(2)
}
