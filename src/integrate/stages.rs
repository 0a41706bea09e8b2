//! Two-pass dynamics: a coarse inspiral-plunge pass at the output rate, then
//! a fine pass restarted a fixed lead time before the end of the coarse one.

use tracing::{debug, info, warn};

use crate::coefficients::DerivedCoefficients;
use crate::domain::{BinaryParameters, DynamicsState, GenerationConfig, Trajectory};
use crate::error::{AppError, PostProcessingWarning};
use crate::integrate::rk45::{DenseOutput, DormandPrince, StopCondition, Tolerances, VectorField};
use crate::integrate::stop::{InspiralPlungeStop, RingdownStop};
use crate::models::EobModel;

/// Largest supported power-of-two resampling exponent.
const MAX_RESAMPLE_POWER: i32 = 24;

/// Sampling plan shared by both passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagePlan {
    /// Output step in units of M.
    pub low_step: f64,
    /// Fine step in units of M: `low_step / resample_factor`.
    pub high_step: f64,
    pub resample_factor: usize,
    /// Samples stepped back from the end of the coarse pass.
    pub step_back: usize,
    /// Per-pass integration limit in units of M.
    pub t_max: f64,
}

pub fn plan_stages(
    params: &BinaryParameters,
    coeffs: &DerivedCoefficients,
    config: &GenerationConfig,
) -> Result<StagePlan, AppError> {
    let m_s = coeffs.total_mass_seconds;
    let low_step = params.delta_t / m_s;

    let step_back = (config.hand_off_lead * m_s / params.delta_t).ceil() as usize;

    let ratio = config.resample_target * params.delta_t / m_s;
    let resample_factor = if ratio > 1.0 {
        let power = ratio.log2().ceil() as i32;
        if power > MAX_RESAMPLE_POWER {
            return Err(AppError::input(format!(
                "sample interval {:.3e}s too coarse for total mass {:.3}",
                params.delta_t, coeffs.total_mass
            )));
        }
        1usize << power
    } else {
        1
    };

    Ok(StagePlan {
        low_step,
        high_step: low_step / resample_factor as f64,
        resample_factor,
        step_back,
        t_max: coeffs.to_mass_units(config.max_time_seconds),
    })
}

/// Index in the coarse pass where the fine pass starts.
///
/// Falls back to 0 with a warning when the lead covers the whole pass.
pub fn hand_off_index(low_len: usize, step_back: usize) -> (usize, Option<PostProcessingWarning>) {
    if low_len > step_back {
        (low_len - step_back, None)
    } else {
        (0, Some(PostProcessingWarning::DegenerateHandOff { low_len, step_back }))
    }
}

/// Output of the two passes.
#[derive(Debug, Clone)]
pub struct StagedDynamics {
    pub plan: StagePlan,
    pub low: Trajectory,
    pub high: Trajectory,
    pub hand_off_index: usize,
    pub warnings: Vec<PostProcessingWarning>,
}

/// Adapts an [`EobModel`] to the integrator.
pub struct EobField<'a, M: EobModel> {
    model: &'a M,
    coeffs: &'a DerivedCoefficients,
}

impl<'a, M: EobModel> EobField<'a, M> {
    pub fn new(model: &'a M, coeffs: &'a DerivedCoefficients) -> Self {
        Self { model, coeffs }
    }
}

impl<M: EobModel> VectorField<4> for EobField<'_, M> {
    fn derivatives(&self, y: &[f64; 4]) -> [f64; 4] {
        self.model.derivatives(&DynamicsState::from_array(y), self.coeffs)
    }
}

fn run_pass<M: EobModel, S: StopCondition<4>>(
    field: &EobField<'_, M>,
    stop: &mut S,
    start: DynamicsState,
    step: f64,
    plan: &StagePlan,
    config: &GenerationConfig,
    label: &str,
) -> Result<Trajectory, AppError> {
    let mut solver = DormandPrince::new(
        Tolerances {
            atol: config.abs_tol,
            rtol: config.rel_tol,
        },
        config.max_steps,
    );
    let DenseOutput { times, states, .. } = solver
        .integrate(field, stop, start.to_array(), step, plan.t_max)
        .map_err(|e| match e {
            AppError::Numerical(msg) => AppError::numerical(format!("{label} pass: {msg}")),
            other => other,
        })?;
    debug!(
        pass = label,
        samples = times.len(),
        accepted = solver.stats.accepted_steps,
        rejected = solver.stats.rejected_steps,
        fn_evals = solver.stats.fn_evals,
        "integration finished"
    );
    let states = states.iter().map(DynamicsState::from_array).collect();
    Ok(Trajectory::new(step, times, states))
}

/// Run both passes from `initial`.
pub fn run_stages<M: EobModel>(
    model: &M,
    params: &BinaryParameters,
    coeffs: &DerivedCoefficients,
    config: &GenerationConfig,
    initial: DynamicsState,
) -> Result<StagedDynamics, AppError> {
    let plan = plan_stages(params, coeffs, config)?;
    let field = EobField::new(model, coeffs);

    let mut inspiral_stop = InspiralPlungeStop::new(config.inspiral_stop_radius);
    let low = run_pass(&field, &mut inspiral_stop, initial, plan.low_step, &plan, config, "inspiral")?;

    let mut warnings = Vec::new();
    let (hand_off, warning) = hand_off_index(low.len(), plan.step_back);
    if let Some(w) = warning {
        warn!("{w}");
        warnings.push(w);
    }
    let restart = *low
        .state(hand_off)
        .ok_or_else(|| AppError::numerical("inspiral pass produced no samples"))?;

    let mut ringdown_stop = RingdownStop::new(config.ringdown_stop_radius);
    let high = run_pass(&field, &mut ringdown_stop, restart, plan.high_step, &plan, config, "high-resolution")?;

    info!(
        low_len = low.len(),
        high_len = high.len(),
        hand_off,
        resample_factor = plan.resample_factor,
        "dynamics integrated"
    );

    Ok(StagedDynamics {
        plan,
        low,
        high,
        hand_off_index: hand_off,
        warnings,
    })
}
