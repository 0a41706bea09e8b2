//! Reduced aligned-spin EOB Hamiltonian.
//!
//! The effective Hamiltonian is
//!
//! ```text
//! H_eff = beta(r) pphi + sqrt( A(r) (1 + pphi^2 / r^2) + pr^2 )
//! A(r)  = 1 - 2/r + a^2/r^2 + 2 eta / r^3
//! beta  = spin_orbit / r^3
//! ```
//!
//! and the real Hamiltonian per reduced mass is
//! `H = sqrt(1 + 2 eta (H_eff - 1)) / eta`. Partial derivatives are analytic.
//! Below the horizon of `A` the square root may go non-finite; callers treat
//! that as a non-finite derivative rather than guarding it here.

use crate::coefficients::HamiltonianCoeffs;
use crate::domain::DynamicsState;

/// Position and momentum of the reduced problem in the orbital plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianPoint {
    pub position: [f64; 3],
    pub momentum: [f64; 3],
}

impl CartesianPoint {
    /// Phase-space point at orbital phase zero: `x = (r, 0, 0)`,
    /// `p = (pr, pphi / r, 0)`.
    pub fn from_polar(state: &DynamicsState) -> Self {
        Self {
            position: [state.r, 0.0, 0.0],
            momentum: [state.pr, state.pphi / state.r, 0.0],
        }
    }

    /// `(r, pr, pphi)` of this point.
    pub fn to_polar(&self) -> (f64, f64, f64) {
        let [x, y, z] = self.position;
        let [px, py, pz] = self.momentum;
        let r = (x * x + y * y + z * z).sqrt();
        let pr = (x * px + y * py + z * pz) / r;
        let pphi = x * py - y * px;
        (r, pr, pphi)
    }
}

/// Hamiltonian value and its partial derivatives at one phase-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HamiltonianPartials {
    /// Real Hamiltonian per reduced mass.
    pub h_real: f64,
    pub h_eff: f64,
    pub d_r: f64,
    pub d_pr: f64,
    pub d_pphi: f64,
}

/// `A(r)` and `dA/dr`.
pub fn potential(r: f64, c: &HamiltonianCoeffs) -> (f64, f64) {
    let u = 1.0 / r;
    let u2 = u * u;
    let a2 = c.a * c.a;
    let a = 1.0 - 2.0 * u + a2 * u2 + 2.0 * c.eta * u2 * u;
    let da = 2.0 * u2 - 2.0 * a2 * u2 * u - 6.0 * c.eta * u2 * u2;
    (a, da)
}

pub fn effective_hamiltonian(r: f64, pr: f64, pphi: f64, c: &HamiltonianCoeffs) -> f64 {
    let (a, _) = potential(r, c);
    let beta = c.spin_orbit / (r * r * r);
    beta * pphi + (a * (1.0 + pphi * pphi / (r * r)) + pr * pr).sqrt()
}

/// Map the effective Hamiltonian to the real one (per reduced mass).
pub fn real_from_effective(h_eff: f64, eta: f64) -> f64 {
    (1.0 + 2.0 * eta * (h_eff - 1.0)).sqrt() / eta
}

/// Inverse of [`real_from_effective`].
pub fn effective_from_real(h_real: f64, eta: f64) -> f64 {
    let e = eta * h_real;
    (e * e - 1.0) / (2.0 * eta) + 1.0
}

pub fn partials(state: &DynamicsState, c: &HamiltonianCoeffs) -> HamiltonianPartials {
    let r = state.r;
    let pr = state.pr;
    let pphi = state.pphi;

    let (a, da) = potential(r, c);
    let r2 = r * r;
    let r3 = r2 * r;
    let beta = c.spin_orbit / r3;
    let dbeta = -3.0 * c.spin_orbit / (r3 * r);

    let centrifugal = 1.0 + pphi * pphi / r2;
    let d = a * centrifugal + pr * pr;
    let sqrt_d = d.sqrt();

    let h_eff = beta * pphi + sqrt_d;
    let h_real = real_from_effective(h_eff, c.eta);

    let deff_dr = dbeta * pphi + (da * centrifugal - 2.0 * a * pphi * pphi / r3) / (2.0 * sqrt_d);
    let deff_dpr = pr / sqrt_d;
    let deff_dpphi = beta + a * pphi / (r2 * sqrt_d);

    // dH/dH_eff = 1 / (eta H).
    let scale = 1.0 / (c.eta * h_real);
    HamiltonianPartials {
        h_real,
        h_eff,
        d_r: deff_dr * scale,
        d_pr: deff_dpr * scale,
        d_pphi: deff_dpphi * scale,
    }
}
