//! Explicit fixed-step Euler

use super::{acceleration, substeps, Phase, StepInput};

/// `ceil(dt / h)` sub-steps of `v += a·h; x += v·h`
///
/// Each frame always covers whole sub-steps, so the simulated time may run
/// ahead of the frame by less than one step.
pub(super) fn step(phase: Phase, input: &StepInput<'_>) -> Phase {
    let spring = input.spring;
    let h = spring.step_size();
    let Phase {
        mut position,
        mut velocity,
    } = phase;

    for _ in 0..substeps(input.dt, h) {
        let a = acceleration(spring, input.to, position, velocity);
        velocity += a * h;
        position += velocity * h;
    }

    Phase { position, velocity }
}
