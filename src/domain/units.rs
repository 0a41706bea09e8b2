//! Geometrized-unit conversions.

/// Solar mass times G/c^3 (s).
pub const MTSUN_SI: f64 = 4.925_491_025_543_576e-6;

/// Solar mass times G/c^2 (m).
pub const MRSUN_SI: f64 = 1_476.625_061_404_649_4;

/// One megaparsec (m).
pub const MPC_SI: f64 = 3.085_677_581_491_367e22;

/// Euler–Mascheroni constant.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
