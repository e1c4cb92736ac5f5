//! Spring stepping strategies
//!
//! Every strategy advances a spring by one frame delta under the same force
//! law and the same ms-based scaling (see [`crate::spring`]). They differ only
//! in transient accuracy and cost, so the integrator can swap them freely.
//!
//! Dispatch is a closed match on [`Integration`]: each strategy is a plain
//! function with the `(phase, input, cache) -> phase` shape.

mod analytical;
mod euler;
mod rk4;
mod verlet;

use crate::spring::{Integration, SpringConfig};
use rebound_core::SolverCache;

/// Position and velocity of a spring at one instant
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Phase {
    pub position: f64,
    /// Units per ms
    pub velocity: f64,
}

impl Phase {
    pub fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }
}

/// Per-frame inputs shared by every strategy
#[derive(Clone, Copy, Debug)]
pub struct StepInput<'a> {
    pub spring: &'a SpringConfig,
    /// Resolved target for this frame
    pub to: f64,
    /// Frame delta (ms)
    pub dt: f64,
    /// Elapsed time (ms) at the end of this frame
    pub elapsed: f64,
}

/// Advance `phase` by one frame with the configured method
pub fn step(
    method: Integration,
    phase: Phase,
    input: &StepInput<'_>,
    cache: &mut Option<SolverCache>,
) -> Phase {
    match method {
        Integration::Euler => euler::step(phase, input),
        Integration::Verlet => verlet::step(phase, input),
        Integration::Rk4 => rk4::step(phase, input, cache),
        Integration::Analytical => analytical::step(phase, input, cache),
    }
}

/// Re-align cross-frame solver state after the integrator changed `phase`
/// outside the solver (bounce, clamp)
pub fn reseat(
    method: Integration,
    phase: Phase,
    input: &StepInput<'_>,
    cache: &mut Option<SolverCache>,
) {
    match method {
        Integration::Euler | Integration::Verlet => {}
        Integration::Rk4 => {
            let carry = match *cache {
                Some(SolverCache::Rk4 { carry, .. }) => carry,
                _ => 0.0,
            };
            *cache = Some(SolverCache::Rk4 {
                position: phase.position,
                velocity: phase.velocity,
                carry,
            });
        }
        Integration::Analytical => {
            *cache = Some(SolverCache::Analytical {
                origin: phase.position,
                velocity: phase.velocity,
                start: input.elapsed,
                target: input.to,
            });
        }
    }
}

/// Number of fixed sub-steps needed to cover `dt`
fn substeps(dt: f64, step: f64) -> usize {
    if !(step > 0.0) || !step.is_finite() {
        return 0;
    }
    (dt / step).ceil().max(0.0) as usize
}

/// Acceleration under the scaled spring force law
#[inline]
fn acceleration(spring: &SpringConfig, to: f64, position: f64, velocity: f64) -> f64 {
    let spring_force = -spring.scaled_tension() * (position - to);
    let damping_force = -spring.scaled_friction() * velocity;
    (spring_force + damping_force) / spring.mass
}
