//! Spring parameters
//!
//! A spring is the damped harmonic oscillator `m·x'' + c·x' + k·(x - to) = 0`.
//! Parameters are given in "feel" units (tension, friction, mass). Time is
//! measured in milliseconds; the steppers scale tension by [`TENSION_SCALE`]
//! and friction by [`FRICTION_SCALE`] so velocities come out in units per ms.

use rebound_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tension is applied per ms², so it is scaled down from per-second²
pub const TENSION_SCALE: f64 = 1e-6;
/// Friction is applied per ms
pub const FRICTION_SCALE: f64 = 1e-3;
/// Default fixed sub-step (ms)
pub const DEFAULT_STEP: f64 = 1.0;
/// Step hints above this are treated as a multiple of the oscillator period
pub const ADAPTIVE_STEP_THRESHOLD: f64 = 20.0;

/// Numerical method used to advance a spring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integration {
    /// Explicit fixed-step Euler
    #[default]
    Euler,
    /// Semi-implicit velocity update with averaged damping
    Verlet,
    /// Classic fourth-order Runge-Kutta with cross-frame state
    Rk4,
    /// Closed-form solution evaluated at the elapsed time
    Analytical,
}

impl Integration {
    pub fn name(self) -> &'static str {
        match self {
            Integration::Euler => "euler",
            Integration::Verlet => "verlet",
            Integration::Rk4 => "rk4",
            Integration::Analytical => "analytical",
        }
    }

}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Integration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(Integration::Euler),
            "verlet" => Ok(Integration::Verlet),
            "rk4" | "runge-kutta" => Ok(Integration::Rk4),
            "analytical" | "exact" => Ok(Integration::Analytical),
            _ => Err(ConfigError::UnknownIntegration(s.to_owned())),
        }
    }
}

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub tension: f64,
    pub friction: f64,
    pub mass: f64,
    pub integration: Integration,
    /// Sub-step size hint in ms
    pub step: f64,
}

impl SpringConfig {
    /// Create a new spring configuration using the default integrator
    pub fn new(tension: f64, friction: f64, mass: f64) -> Self {
        Self {
            tension,
            friction,
            mass,
            integration: Integration::Euler,
            step: DEFAULT_STEP,
        }
    }

    /// Balanced default
    pub fn standard() -> Self {
        Self::new(170.0, 26.0, 1.0)
    }

    /// A gentle, slow spring (good for page transitions)
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// A wobbly spring with overshoot (good for playful UI)
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// A stiff, snappy spring (good for buttons)
    pub fn stiff() -> Self {
        Self::new(210.0, 20.0, 1.0)
    }

    /// Heavily damped, no visible overshoot
    pub fn slow() -> Self {
        Self::new(280.0, 60.0, 1.0)
    }

    /// Over-damped crawl toward the target
    pub fn molasses() -> Self {
        Self::new(280.0, 120.0, 1.0)
    }

    /// Builder: select the integration method
    pub fn with_integration(mut self, integration: Integration) -> Self {
        self.integration = integration;
        self
    }

    /// Builder: set the sub-step hint (ms)
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Check that every parameter is usable by the steppers
    pub fn validated(self) -> Result<Self> {
        let checks = [
            ("tension", self.tension, self.tension >= 0.0),
            ("friction", self.friction, self.friction >= 0.0),
            ("mass", self.mass, self.mass > 0.0),
            ("step", self.step, self.step > 0.0),
        ];
        for (name, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(ConfigError::InvalidSpring { name, value });
            }
        }
        Ok(self)
    }

    /// Natural angular frequency `sqrt(tension / mass)` in unscaled units
    pub fn natural_frequency(&self) -> f64 {
        (self.tension / self.mass).sqrt()
    }

    /// Calculate critical damping for this spring's tension and mass
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.tension * self.mass).sqrt()
    }

    /// Damping ratio ζ; unaffected by the ms scaling of tension and friction
    pub fn damping_ratio(&self) -> f64 {
        self.friction / self.critical_damping()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping_ratio() < 1.0
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping_ratio() > 1.0
    }

    /// Fixed sub-step size (ms) for the stepping integrators
    ///
    /// Hints above [`ADAPTIVE_STEP_THRESHOLD`] are divided by the natural
    /// frequency so that coarse hints still resolve the oscillation. A spring
    /// without tension has no period and keeps the raw hint.
    pub fn step_size(&self) -> f64 {
        let w0 = self.natural_frequency();
        if self.step > ADAPTIVE_STEP_THRESHOLD && w0 > 0.0 && w0.is_finite() {
            self.step / w0
        } else {
            self.step
        }
    }

    /// Tension in per-ms² units
    pub(crate) fn scaled_tension(&self) -> f64 {
        self.tension * TENSION_SCALE
    }

    /// Friction in per-ms units
    pub(crate) fn scaled_friction(&self) -> f64 {
        self.friction * FRICTION_SCALE
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::standard()
    }
}
