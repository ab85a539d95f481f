//! Secondary-motion configuration.

use serde::{Deserialize, Serialize};

/// Default simulation step, seconds.
pub const DEFAULT_SIMULATION_STEP: f32 = 1.0 / 60.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Upper bound for the delta handed to chains. Larger frame gaps are clamped.
    pub simulation_step: f32,
    /// Whether solvers start enabled.
    pub enabled: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            simulation_step: DEFAULT_SIMULATION_STEP,
            enabled: true,
        }
    }
}

impl MotionConfig {
    /// Clamp a raw wall-clock delta into `[0, simulation_step]`. Non-finite input yields 0.
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        let step = if self.simulation_step.is_finite() && self.simulation_step > 0.0 {
            self.simulation_step
        } else {
            DEFAULT_SIMULATION_STEP
        };
        if dt.is_finite() {
            dt.clamp(0.0, step)
        } else {
            0.0
        }
    }
}
