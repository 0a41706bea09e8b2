//! Quasi-circular initial conditions with a post-adiabatic radial momentum.

use std::f64::consts::PI;

use tracing::debug;

use crate::coefficients::DerivedCoefficients;
use crate::domain::{BinaryParameters, DynamicsState};
use crate::error::AppError;
use crate::models::factorized::{flux_22, mode_22};
use crate::models::hamiltonian::{partials, potential};

const BISECTION_ITERS: usize = 200;

/// Innermost separation searched for the starting orbit (M).
const MIN_START_RADIUS: f64 = 4.0;

/// Angular momentum of the circular orbit at `r`, i.e. the root of
/// `dH/dr = 0` at `pr = 0`. `None` inside the light ring.
pub fn circular_pphi(r: f64, coeffs: &DerivedCoefficients) -> Option<f64> {
    let c = &coeffs.hamiltonian;
    let force = |pphi: f64| partials(&DynamicsState::new(r, 0.0, 0.0, pphi), c).d_r;

    let (a, da) = potential(r, c);
    if !(a > 0.0) {
        return None;
    }
    // Non-spinning estimate, used only to size the bracket.
    let denom = 2.0 * a - da * r;
    let seed = if denom > 0.0 { (da * r * r * r / denom).sqrt() } else { r.sqrt() };

    let mut lo = 0.0;
    let mut hi = seed.max(1.0) * 2.0;
    let mut grow = 0;
    while force(hi) > 0.0 {
        lo = hi;
        hi *= 2.0;
        grow += 1;
        if grow > 60 || !hi.is_finite() {
            return None;
        }
    }
    if !(force(lo) > 0.0) {
        return None;
    }

    for _ in 0..BISECTION_ITERS {
        let mid = 0.5 * (lo + hi);
        if force(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-15 * hi {
            break;
        }
    }
    Some(0.5 * (lo + hi))
}

/// Orbital frequency of the circular orbit at `r`.
pub fn circular_omega(r: f64, coeffs: &DerivedCoefficients) -> Option<f64> {
    let pphi = circular_pphi(r, coeffs)?;
    let omega = partials(&DynamicsState::new(r, 0.0, 0.0, pphi), &coeffs.hamiltonian).d_pphi;
    omega.is_finite().then_some(omega)
}

/// Separation of the circular orbit whose frequency is `omega_target`.
pub fn radius_for_frequency(omega_target: f64, coeffs: &DerivedCoefficients) -> Result<f64, AppError> {
    let kepler = omega_target.powf(-2.0 / 3.0);
    let mut lo = MIN_START_RADIUS;
    let mut hi = (3.0 * kepler).max(2.0 * MIN_START_RADIUS);

    let omega_at = |r: f64| circular_omega(r, coeffs);
    let omega_lo = omega_at(lo).ok_or_else(|| AppError::input("no circular orbit at the inner search radius"))?;
    let omega_hi = omega_at(hi).ok_or_else(|| AppError::input("no circular orbit at the outer search radius"))?;
    if !(omega_lo > omega_target && omega_target > omega_hi) {
        return Err(AppError::input(format!(
            "starting frequency (M omega = {omega_target:.6e}) outside the range of circular orbits [{omega_hi:.6e}, {omega_lo:.6e}]"
        )));
    }

    for _ in 0..BISECTION_ITERS {
        let mid = 0.5 * (lo + hi);
        let omega = omega_at(mid).ok_or_else(|| AppError::numerical(format!("circular orbit lost at r={mid}")))?;
        if omega > omega_target {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-13 * hi {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// Initial state at `Omega = pi f_min M`: circular `pphi`, and `pr` from the
/// adiabatic inspiral rate `dr/dt = (dpphi/dt) / (dpphi_c/dr)`.
pub fn initial_state(params: &BinaryParameters, coeffs: &DerivedCoefficients) -> Result<DynamicsState, AppError> {
    let omega0 = PI * params.f_min * coeffs.total_mass_seconds;
    let r0 = radius_for_frequency(omega0, coeffs)?;
    let pphi0 = circular_pphi(r0, coeffs)
        .ok_or_else(|| AppError::numerical(format!("no circular angular momentum at r={r0}")))?;

    let circular = DynamicsState::new(r0, 0.0, 0.0, pphi0);
    let p = partials(&circular, &coeffs.hamiltonian);
    let omega = p.d_pphi;
    let v = omega.cbrt();
    let h22 = mode_22(&circular, v, p.h_real, coeffs);
    let flux = flux_22(omega, h22);
    let dpphi_dt = -flux / (coeffs.eta * omega);

    let dr = 1e-4 * r0;
    let pphi_out = circular_pphi(r0 + dr, coeffs);
    let pphi_in = circular_pphi(r0 - dr, coeffs);
    let (Some(pphi_out), Some(pphi_in)) = (pphi_out, pphi_in) else {
        return Err(AppError::numerical(format!("circular angular momentum undefined near r={r0}")));
    };
    let dpphi_dr = (pphi_out - pphi_in) / (2.0 * dr);
    // Circular angular momentum stops growing outward at the innermost stable orbit.
    if !(dpphi_dr > 0.0) {
        return Err(AppError::input(format!(
            "starting separation r={r0:.4}M is at or inside the innermost stable circular orbit; lower f_min"
        )));
    }
    let dr_dt = dpphi_dt / dpphi_dr;

    // dr/dt = dH/dpr = pr / (eta H sqrt(D)) with D evaluated at pr = 0.
    let (a, _) = potential(r0, &coeffs.hamiltonian);
    let sqrt_d = (a * (1.0 + pphi0 * pphi0 / (r0 * r0))).sqrt();
    let pr0 = dr_dt * coeffs.eta * p.h_real * sqrt_d;

    let state = DynamicsState::new(r0, 0.0, pr0, pphi0);
    if !state.is_finite() {
        return Err(AppError::numerical(format!("non-finite initial state {state:?}")));
    }
    debug!(r0, pr0, pphi0, omega0, "initial conditions");
    Ok(state)
}
