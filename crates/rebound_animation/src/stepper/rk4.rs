//! Fourth-order Runge-Kutta on a fixed step
//!
//! Unlike the Euler variants this strategy never simulates past the frame:
//! time that does not fill a whole step is carried to the next frame in
//! [`SolverCache::Rk4`], together with the solver's own position and velocity.

use super::{acceleration, Phase, StepInput};
use crate::spring::SpringConfig;
use rebound_core::SolverCache;

pub(super) fn step(phase: Phase, input: &StepInput<'_>, cache: &mut Option<SolverCache>) -> Phase {
    let (mut state, carry) = match *cache {
        Some(SolverCache::Rk4 {
            position,
            velocity,
            carry,
        }) => (Phase::new(position, velocity), carry),
        _ => (phase, 0.0),
    };

    let h = input.spring.step_size();
    let budget = carry + input.dt;
    let (count, carry) = if h > 0.0 && h.is_finite() {
        let count = (budget / h).floor().max(0.0);
        (count as usize, budget - count * h)
    } else {
        (0, 0.0)
    };

    for _ in 0..count {
        state = rk4_step(input.spring, input.to, state, h);
    }

    *cache = Some(SolverCache::Rk4 {
        position: state.position,
        velocity: state.velocity,
        carry,
    });
    state
}

fn rk4_step(spring: &SpringConfig, to: f64, state: Phase, h: f64) -> Phase {
    let Phase { position, velocity } = state;

    let k1_v = acceleration(spring, to, position, velocity);
    let k1_x = velocity;

    let k2_v = acceleration(
        spring,
        to,
        position + k1_x * h * 0.5,
        velocity + k1_v * h * 0.5,
    );
    let k2_x = velocity + k1_v * h * 0.5;

    let k3_v = acceleration(
        spring,
        to,
        position + k2_x * h * 0.5,
        velocity + k2_v * h * 0.5,
    );
    let k3_x = velocity + k2_v * h * 0.5;

    let k4_v = acceleration(spring, to, position + k3_x * h, velocity + k3_v * h);
    let k4_x = velocity + k3_v * h;

    Phase {
        position: position + (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * h / 6.0,
        velocity: velocity + (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * h / 6.0,
    }
}
