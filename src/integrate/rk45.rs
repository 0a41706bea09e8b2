//! Dormand–Prince 5(4) integrator with dense output onto a uniform grid.
//!
//! The integrator takes adaptive steps internally but only reports states at
//! `t_k = k * output_step`, interpolated with the cubic Hermite polynomial
//! through the endpoints of each accepted step. A [`StopCondition`] is
//! consulted after every accepted step; the output stops at the last grid
//! point not past that step.

use crate::error::{try_with_capacity, AppError};

const STAGES: usize = 7;

const C: [f64; STAGES] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A: [[f64; 6]; STAGES] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0, 0.0, 0.0],
    [9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0, 0.0],
    [35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0],
];

/// Fifth-order weights (identical to the last row of `A`, so the last stage
/// is the derivative at the new point).
const B: [f64; STAGES] = [35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0, 0.0];

/// Difference between the fifth- and fourth-order weights.
const B_ERR: [f64; STAGES] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Autonomous system `dy/dt = f(y)`.
pub trait VectorField<const N: usize> {
    /// May produce non-finite components; the integrator handles them.
    fn derivatives(&self, y: &[f64; N]) -> [f64; N];
}

/// Termination predicate, evaluated on accepted states.
pub trait StopCondition<const N: usize> {
    /// `dydt` may be non-finite when the field broke down during a trial step.
    fn should_stop(&mut self, y: &[f64; N], dydt: &[f64; N]) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct Tolerances {
    pub atol: f64,
    pub rtol: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub fn_evals: u64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
}

/// I-controller: `h_new = safety * h * err^(-1/5)`.
#[derive(Debug, Clone)]
pub struct StepController {
    pub safety: f64,
    pub max_factor: f64,
    pub min_factor: f64,
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / 5.0,
        }
    }
}

impl StepController {
    pub fn compute_factor(&self, error: f64) -> f64 {
        if !error.is_finite() {
            return self.min_factor;
        }
        if error == 0.0 {
            return self.max_factor;
        }
        (self.safety * error.powf(-self.exponent)).clamp(self.min_factor, self.max_factor)
    }
}

/// Uniformly sampled output of one integration.
#[derive(Debug, Clone)]
pub struct DenseOutput<const N: usize> {
    pub times: Vec<f64>,
    pub states: Vec<[f64; N]>,
    /// Whether the stop condition fired (as opposed to a bare return).
    pub stopped: bool,
}

struct TrialStep<const N: usize> {
    y: [f64; N],
    dydt: [f64; N],
    error: f64,
    /// First non-finite stage derivative, if any.
    broken: Option<[f64; N]>,
}

#[derive(Debug, Clone)]
pub struct DormandPrince {
    tol: Tolerances,
    controller: StepController,
    pub h_min: f64,
    pub max_steps: u64,
    pub stats: Stats,
}

impl DormandPrince {
    pub fn new(tol: Tolerances, max_steps: u64) -> Self {
        Self {
            tol,
            controller: StepController::default(),
            h_min: 1e-12,
            max_steps,
            stats: Stats::default(),
        }
    }

    fn trial<const N: usize, F: VectorField<N>>(
        &mut self,
        field: &F,
        y: &[f64; N],
        f0: &[f64; N],
        h: f64,
    ) -> TrialStep<N> {
        let mut k = [[0.0; N]; STAGES];
        k[0] = *f0;
        let mut broken = None;

        for s in 1..STAGES {
            let mut ys = *y;
            for (i, yi) in ys.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (j, kj) in k.iter().enumerate().take(s) {
                    acc += A[s][j] * kj[i];
                }
                *yi += h * acc;
            }
            k[s] = field.derivatives(&ys);
            self.stats.fn_evals += 1;
            if k[s].iter().any(|v| !v.is_finite()) {
                broken = Some(k[s]);
                break;
            }
        }
        debug_assert!(C[STAGES - 1] == 1.0);

        if broken.is_some() {
            return TrialStep {
                y: *y,
                dydt: *f0,
                error: f64::INFINITY,
                broken,
            };
        }

        let mut y_new = *y;
        let mut error: f64 = 0.0;
        for i in 0..N {
            let mut inc = 0.0;
            let mut err = 0.0;
            for s in 0..STAGES {
                inc += B[s] * k[s][i];
                err += B_ERR[s] * k[s][i];
            }
            y_new[i] = y[i] + h * inc;
            let scale = self.tol.atol + self.tol.rtol * y[i].abs().max(y_new[i].abs());
            error = error.max((h * err).abs() / scale);
        }

        TrialStep {
            y: y_new,
            dydt: k[STAGES - 1],
            error,
            broken: None,
        }
    }

    /// Integrate from `t = 0` until `stop` fires.
    ///
    /// Fails with [`AppError::Numerical`] if the accepted state goes
    /// non-finite, `t_max` passes without a stop, the step budget runs out or
    /// the step size underflows.
    pub fn integrate<const N: usize, F: VectorField<N>, S: StopCondition<N>>(
        &mut self,
        field: &F,
        stop: &mut S,
        y0: [f64; N],
        output_step: f64,
        t_max: f64,
    ) -> Result<DenseOutput<N>, AppError> {
        if !(output_step > 0.0 && output_step.is_finite()) {
            return Err(AppError::numerical(format!("invalid output step {output_step}")));
        }
        if y0.iter().any(|v| !v.is_finite()) {
            return Err(AppError::numerical("non-finite initial state"));
        }
        let f0 = field.derivatives(&y0);
        self.stats.fn_evals += 1;
        if f0.iter().any(|v| !v.is_finite()) {
            return Err(AppError::numerical("non-finite derivatives at the initial state"));
        }

        let expected = ((t_max / output_step).min(1.0e6) as usize).max(16);
        let mut times = try_with_capacity(expected.min(1 << 16), "trajectory times")?;
        let mut states = try_with_capacity(expected.min(1 << 16), "trajectory states")?;
        times.push(0.0);
        states.push(y0);

        let mut t = 0.0;
        let mut y = y0;
        let mut f = f0;
        let mut h = output_step;
        let mut next_k: u64 = 1;
        let mut steps: u64 = 0;

        loop {
            if steps >= self.max_steps {
                return Err(AppError::numerical(format!(
                    "integrator exceeded {} steps at t={t:.6}",
                    self.max_steps
                )));
            }
            if t > t_max {
                return Err(AppError::numerical(format!(
                    "integration reached t_max={t_max:.3} without meeting the stop condition"
                )));
            }
            steps += 1;

            let trial = self.trial(field, &y, &f, h);

            if let Some(bad) = trial.broken {
                self.stats.rejected_steps += 1;
                if stop.should_stop(&y, &bad) {
                    return Ok(DenseOutput { times, states, stopped: true });
                }
                h *= self.controller.min_factor;
                if h < self.h_min {
                    return Err(AppError::numerical(format!(
                        "step size underflow at t={t:.6} (non-finite derivatives)"
                    )));
                }
                continue;
            }

            let factor = self.controller.compute_factor(trial.error);
            if trial.error <= 1.0 {
                self.stats.accepted_steps += 1;
                if trial.y.iter().any(|v| !v.is_finite()) {
                    return Err(AppError::numerical(format!("non-finite state at t={:.6}", t + h)));
                }

                let t_new = t + h;
                loop {
                    let t_k = next_k as f64 * output_step;
                    if t_k > t_new {
                        break;
                    }
                    let theta = (t_k - t) / h;
                    times.push(t_k);
                    states.push(hermite(&y, &f, &trial.y, &trial.dydt, h, theta));
                    next_k += 1;
                }

                t = t_new;
                y = trial.y;
                f = trial.dydt;
                if stop.should_stop(&y, &f) {
                    return Ok(DenseOutput { times, states, stopped: true });
                }
            } else {
                self.stats.rejected_steps += 1;
            }

            h *= factor;
            if h < self.h_min {
                return Err(AppError::numerical(format!("step size underflow at t={t:.6}")));
            }
        }
    }
}

/// Cubic Hermite interpolant on `[t, t + h]` at fraction `theta`.
fn hermite<const N: usize>(
    y0: &[f64; N],
    f0: &[f64; N],
    y1: &[f64; N],
    f1: &[f64; N],
    h: f64,
    theta: f64,
) -> [f64; N] {
    let t2 = theta * theta;
    let t3 = t2 * theta;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + theta;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    let mut out = [0.0; N];
    for i in 0..N {
        out[i] = h00 * y0[i] + h10 * h * f0[i] + h01 * y1[i] + h11 * h * f1[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay;

    impl VectorField<1> for Decay {
        fn derivatives(&self, y: &[f64; 1]) -> [f64; 1] {
            [-y[0]]
        }
    }

    struct Oscillator;

    impl VectorField<2> for Oscillator {
        fn derivatives(&self, y: &[f64; 2]) -> [f64; 2] {
            [y[1], -y[0]]
        }
    }

    struct Below(f64);

    impl<const N: usize> StopCondition<N> for Below {
        fn should_stop(&mut self, y: &[f64; N], _dydt: &[f64; N]) -> bool {
            y[0] < self.0
        }
    }

    struct Never;

    impl<const N: usize> StopCondition<N> for Never {
        fn should_stop(&mut self, _y: &[f64; N], _dydt: &[f64; N]) -> bool {
            false
        }
    }

    /// Blows up for y < 0.5; the stop predicate sees the NaN.
    struct Singular;

    impl VectorField<1> for Singular {
        fn derivatives(&self, y: &[f64; 1]) -> [f64; 1] {
            if y[0] < 0.5 { [f64::NAN] } else { [-1.0] }
        }
    }

    struct NonFinite;

    impl StopCondition<1> for NonFinite {
        fn should_stop(&mut self, _y: &[f64; 1], dydt: &[f64; 1]) -> bool {
            !dydt[0].is_finite()
        }
    }

    fn solver() -> DormandPrince {
        DormandPrince::new(Tolerances { atol: 1e-12, rtol: 1e-12 }, 1_000_000)
    }

    #[test]
    fn uniform_grid_matches_exponential() {
        let mut s = solver();
        let out = s.integrate(&Decay, &mut Below(0.01), [1.0], 0.1, 100.0).unwrap();
        assert!(out.stopped);
        for (t, y) in out.times.iter().zip(&out.states) {
            assert!((y[0] - (-t).exp()).abs() < 1e-6, "t={t} y={}", y[0]);
        }
        for (k, t) in out.times.iter().enumerate() {
            assert!((t - k as f64 * 0.1).abs() < 1e-12);
        }
        // Stops at the first accepted step past ln(100); no states beyond it.
        let last = *out.times.last().unwrap();
        assert!(last >= 100.0_f64.ln() - 5.0 && last < 100.0_f64.ln() + 5.0);
    }

    #[test]
    fn oscillator_conserves_energy_on_grid() {
        let mut s = solver();
        struct AfterTime(usize);
        impl StopCondition<2> for AfterTime {
            fn should_stop(&mut self, _y: &[f64; 2], _d: &[f64; 2]) -> bool {
                self.0 += 1;
                self.0 > 200
            }
        }
        let out = s.integrate(&Oscillator, &mut AfterTime(0), [1.0, 0.0], 0.05, 1e4).unwrap();
        for y in &out.states {
            assert!((y[0] * y[0] + y[1] * y[1] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn t_max_without_stop_is_numerical_error() {
        let mut s = solver();
        let err = s.integrate(&Decay, &mut Never, [1.0], 0.1, 5.0).unwrap_err();
        assert!(matches!(err, AppError::Numerical(_)));
    }

    #[test]
    fn step_budget_is_enforced() {
        let mut s = DormandPrince::new(Tolerances { atol: 1e-12, rtol: 1e-12 }, 3);
        let err = s.integrate(&Decay, &mut Never, [1.0], 0.1, 1e9).unwrap_err();
        assert!(matches!(err, AppError::Numerical(_)));
    }

    #[test]
    fn non_finite_derivative_can_trigger_stop() {
        let mut s = solver();
        let out = s.integrate(&Singular, &mut NonFinite, [1.0], 0.01, 10.0).unwrap();
        assert!(out.stopped);
        assert!(out.states.iter().all(|y| y[0].is_finite() && y[0] >= 0.5 - 1e-9));
    }

    #[test]
    fn non_finite_derivative_without_stop_underflows() {
        let mut s = solver();
        let err = s.integrate(&Singular, &mut Never, [1.0], 0.01, 10.0).unwrap_err();
        assert!(matches!(err, AppError::Numerical(_)));
    }
}
