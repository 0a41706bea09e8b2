//! Natural cubic spline interpolation.
//!
//! Used for peak finding and for the derivatives the NQC matching needs, so
//! first and second derivatives are exposed alongside the value.

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Build a natural spline (zero curvature at both ends).
    ///
    /// Needs at least three knots with strictly increasing abscissae.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, AppError> {
        let n = x.len();
        if n != y.len() {
            return Err(AppError::numerical(format!(
                "spline knots mismatch: {} abscissae vs {} ordinates",
                n,
                y.len()
            )));
        }
        if n < 3 {
            return Err(AppError::numerical(format!("spline needs at least 3 knots, got {n}")));
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(AppError::numerical("spline abscissae must be strictly increasing"));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(AppError::numerical("spline ordinates must be finite"));
        }

        // Tridiagonal system for the interior second derivatives (Thomas algorithm).
        let mut m = vec![0.0; n];
        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];
        for i in 1..n - 1 {
            let h0 = x[i] - x[i - 1];
            let h1 = x[i + 1] - x[i];
            let diag = 2.0 * (h0 + h1);
            let rhs = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
            let denom = diag - h0 * c_prime[i - 1];
            c_prime[i] = h1 / denom;
            d_prime[i] = (rhs - h0 * d_prime[i - 1]) / denom;
        }
        for i in (1..n - 1).rev() {
            m[i] = d_prime[i] - c_prime[i] * m[i + 1];
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Interval `i` such that `x[i] <= t <= x[i+1]`, clamped to the ends.
    fn interval(&self, t: f64) -> usize {
        let idx = self.x.partition_point(|&v| v <= t);
        idx.saturating_sub(1).min(self.x.len() - 2)
    }

    fn local(&self, t: f64) -> (f64, f64, f64, usize) {
        let i = self.interval(t);
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - t) / h;
        let b = (t - self.x[i]) / h;
        (h, a, b, i)
    }

    pub fn eval(&self, t: f64) -> f64 {
        let (h, a, b, i) = self.local(t);
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }

    pub fn derivative(&self, t: f64) -> f64 {
        let (h, a, b, i) = self.local(t);
        (self.y[i + 1] - self.y[i]) / h
            - (3.0 * a * a - 1.0) * h * self.m[i] / 6.0
            + (3.0 * b * b - 1.0) * h * self.m[i + 1] / 6.0
    }

    pub fn second_derivative(&self, t: f64) -> f64 {
        let (_, a, b, i) = self.local(t);
        a * self.m[i] + b * self.m[i + 1]
    }
}
