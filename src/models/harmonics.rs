//! Spin-weight -2 spherical harmonics for l = 2.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::AppError;

/// `-2Y_{2m}(theta, phi)` for `m` in `-2..=2`.
pub fn spin_weighted_y2(m: i32, theta: f64, phi: f64) -> Result<Complex64, AppError> {
    let (s, c) = theta.sin_cos();
    let magnitude = match m {
        -2 => (5.0 / (64.0 * PI)).sqrt() * (1.0 - c) * (1.0 - c),
        -1 => (5.0 / (16.0 * PI)).sqrt() * s * (1.0 - c),
        0 => (15.0 / (32.0 * PI)).sqrt() * s * s,
        1 => (5.0 / (16.0 * PI)).sqrt() * s * (1.0 + c),
        2 => (5.0 / (64.0 * PI)).sqrt() * (1.0 + c) * (1.0 + c),
        _ => return Err(AppError::input(format!("no l=2 harmonic with m={m}"))),
    };
    Ok(Complex64::from_polar(magnitude, m as f64 * phi))
}

pub fn spin_weighted_harmonic(l: i32, m: i32, theta: f64, phi: f64) -> Result<Complex64, AppError> {
    match l {
        2 => spin_weighted_y2(m, theta, phi),
        _ => Err(AppError::input(format!("spin-weighted harmonic l={l} not supported"))),
    }
}
