//! Termination predicates for the two integration passes.
//!
//! State layout is `(r, phi, pr, pphi)`, so `dydt[1]` is the orbital
//! frequency.

use crate::integrate::rk45::StopCondition;

/// Stops the low-resolution pass once the orbital frequency starts falling
/// inside `radius`. Remembers the last frequency it saw.
#[derive(Debug, Clone)]
pub struct InspiralPlungeStop {
    radius: f64,
    last_omega: f64,
}

impl InspiralPlungeStop {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            last_omega: 0.0,
        }
    }
}

impl StopCondition<4> for InspiralPlungeStop {
    fn should_stop(&mut self, y: &[f64; 4], dydt: &[f64; 4]) -> bool {
        let omega = dydt[1];
        if y[0] < self.radius && omega < self.last_omega {
            return true;
        }
        if omega.is_finite() {
            self.last_omega = omega;
        }
        false
    }
}

/// Stops the high-resolution pass at `radius` or when any derivative is
/// non-finite.
#[derive(Debug, Clone)]
pub struct RingdownStop {
    radius: f64,
}

impl RingdownStop {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl StopCondition<4> for RingdownStop {
    fn should_stop(&mut self, y: &[f64; 4], dydt: &[f64; 4]) -> bool {
        y[0] <= self.radius || dydt.iter().any(|v| !v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspiral_stop_needs_both_radius_and_turnover() {
        let mut stop = InspiralPlungeStop::new(6.0);
        // Falling frequency outside the radius does not stop.
        assert!(!stop.should_stop(&[8.0, 0.0, 0.0, 0.0], &[0.0, 0.10, 0.0, 0.0]));
        assert!(!stop.should_stop(&[7.0, 0.0, 0.0, 0.0], &[0.0, 0.09, 0.0, 0.0]));
        // Rising inside the radius does not stop.
        assert!(!stop.should_stop(&[5.0, 0.0, 0.0, 0.0], &[0.0, 0.12, 0.0, 0.0]));
        assert!(!stop.should_stop(&[4.0, 0.0, 0.0, 0.0], &[0.0, 0.15, 0.0, 0.0]));
        // First decrease inside the radius stops.
        assert!(stop.should_stop(&[3.0, 0.0, 0.0, 0.0], &[0.0, 0.149, 0.0, 0.0]));
    }

    #[test]
    fn inspiral_stop_ignores_nan_frequency() {
        let mut stop = InspiralPlungeStop::new(6.0);
        assert!(!stop.should_stop(&[5.0, 0.0, 0.0, 0.0], &[0.0, 0.2, 0.0, 0.0]));
        assert!(!stop.should_stop(&[4.9, 0.0, 0.0, 0.0], &[0.0, f64::NAN, 0.0, 0.0]));
        assert!(stop.should_stop(&[4.8, 0.0, 0.0, 0.0], &[0.0, 0.19, 0.0, 0.0]));
    }

    #[test]
    fn ringdown_stop_on_radius_or_breakdown() {
        let mut stop = RingdownStop::new(1.8);
        assert!(!stop.should_stop(&[2.0, 0.0, 0.0, 0.0], &[-1.0, 0.2, 0.0, 0.0]));
        assert!(stop.should_stop(&[1.8, 0.0, 0.0, 0.0], &[-1.0, 0.2, 0.0, 0.0]));
        assert!(stop.should_stop(&[2.5, 0.0, 0.0, 0.0], &[f64::NAN, 0.2, 0.0, 0.0]));
    }
}
