//! Closed-form spring solution
//!
//! Solves `x'' + 2β·x' + ω0²·(x - to) = 0` exactly from an anchor state and
//! evaluates it at the time since that anchor. No sub-stepping, so the result
//! is independent of frame rate up to floating-point error.
//!
//! The anchor starts at the value's initial state and is re-seated whenever
//! the target moves (live trail targets) or the integrator changes the phase
//! behind the solver's back (bounce).

use super::{Phase, StepInput};
use crate::spring::SpringConfig;
use rebound_core::SolverCache;

/// Damping ratios this close to 1 use the critically damped form
const CRITICAL_EPSILON: f64 = 1e-6;

pub(super) fn step(phase: Phase, input: &StepInput<'_>, cache: &mut Option<SolverCache>) -> Phase {
    let (origin, start) = match *cache {
        Some(SolverCache::Analytical {
            origin,
            velocity,
            start,
            target,
        }) if target == input.to => (Phase::new(origin, velocity), start),
        _ => {
            let start = input.elapsed - input.dt;
            *cache = Some(SolverCache::Analytical {
                origin: phase.position,
                velocity: phase.velocity,
                start,
                target: input.to,
            });
            (phase, start)
        }
    };

    solve(input.spring, input.to, origin, input.elapsed - start)
}

/// Phase at time `t` (ms) after `origin`
pub(crate) fn solve(spring: &SpringConfig, to: f64, origin: Phase, t: f64) -> Phase {
    let k = spring.scaled_tension();
    let c = spring.scaled_friction();
    let m = spring.mass;
    let x0 = origin.position - to;
    let v0 = origin.velocity;

    if k == 0.0 {
        return free_damped(origin, c / m, t);
    }

    let beta = c / (2.0 * m);
    let w0 = (k / m).sqrt();
    let zeta = beta / w0;

    if (zeta - 1.0).abs() < CRITICAL_EPSILON {
        // x = e^(-βt)·(x0 + (v0 + β·x0)·t)
        let b = v0 + beta * x0;
        let envelope = (-beta * t).exp();
        Phase {
            position: to + envelope * (x0 + b * t),
            velocity: envelope * (v0 - beta * b * t),
        }
    } else if zeta < 1.0 {
        // x = e^(-βt)·(x0·cos(ω1·t) + (v0 + β·x0)/ω1·sin(ω1·t))
        let w1 = w0 * (1.0 - zeta * zeta).sqrt();
        let b = (v0 + beta * x0) / w1;
        let envelope = (-beta * t).exp();
        let (sin, cos) = (w1 * t).sin_cos();
        Phase {
            position: to + envelope * (x0 * cos + b * sin),
            velocity: envelope * (v0 * cos - (beta * b + x0 * w1) * sin),
        }
    } else {
        // Two real decay rates r1 > r2. Written as separate exponentials rather
        // than e^(-βt)·cosh/sinh so long runs cannot overflow.
        let w2 = w0 * (zeta * zeta - 1.0).sqrt();
        let r1 = -beta + w2;
        let r2 = -beta - w2;
        let c1 = (v0 - r2 * x0) / (r1 - r2);
        let c2 = x0 - c1;
        let e1 = (r1 * t).exp();
        let e2 = (r2 * t).exp();
        Phase {
            position: to + c1 * e1 + c2 * e2,
            velocity: c1 * r1 * e1 + c2 * r2 * e2,
        }
    }
}

/// No restoring force: velocity decays at rate `c/m`, or not at all
fn free_damped(origin: Phase, rate: f64, t: f64) -> Phase {
    if rate == 0.0 {
        return Phase {
            position: origin.position + origin.velocity * t,
            velocity: origin.velocity,
        };
    }
    let decay = (-rate * t).exp();
    Phase {
        position: origin.position + origin.velocity / rate * (1.0 - decay),
        velocity: origin.velocity * decay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spring_with_ratio(zeta: f64) -> SpringConfig {
        // tension 100, mass 1 => critical friction 20
        SpringConfig::new(100.0, 20.0 * zeta, 1.0)
    }

    #[test]
    fn test_initial_conditions_hold_for_every_regime() {
        for zeta in [0.3, 1.0, 2.5] {
            let spring = spring_with_ratio(zeta);
            let phase = solve(&spring, 10.0, Phase::new(2.0, 0.05), 0.0);
            assert!((phase.position - 2.0).abs() < 1e-12, "zeta={}", zeta);
            assert!((phase.velocity - 0.05).abs() < 1e-12, "zeta={}", zeta);
        }
    }

    #[test]
    fn test_every_regime_converges_to_target() {
        for zeta in [0.3, 1.0, 2.5] {
            let spring = spring_with_ratio(zeta);
            let phase = solve(&spring, 10.0, Phase::new(0.0, 0.0), 20_000.0);
            assert!((phase.position - 10.0).abs() < 1e-6, "zeta={}", zeta);
            assert!(phase.velocity.abs() < 1e-6);
        }
    }

    #[test]
    fn test_overdamped_far_future_is_finite() {
        let spring = SpringConfig::molasses();
        let phase = solve(&spring, 1.0, Phase::new(0.0, 0.0), 1.0e7);
        assert!(phase.position.is_finite());
        assert!((phase.position - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_is_derivative_of_position() {
        for zeta in [0.3, 1.0, 2.5] {
            let spring = spring_with_ratio(zeta);
            let origin = Phase::new(0.0, 0.01);
            let t = 150.0;
            let dt = 1e-4;
            let a = solve(&spring, 1.0, origin, t - dt);
            let b = solve(&spring, 1.0, origin, t + dt);
            let numeric = (b.position - a.position) / (2.0 * dt);
            let exact = solve(&spring, 1.0, origin, t).velocity;
            assert!((numeric - exact).abs() < 1e-8, "zeta={}", zeta);
        }
    }

    #[test]
    fn test_target_change_reseats_anchor() {
        let spring = SpringConfig::standard();
        let mut cache = None;
        let first = StepInput {
            spring: &spring,
            to: 1.0,
            dt: 16.0,
            elapsed: 16.0,
        };
        let phase = step(Phase::default(), &first, &mut cache);

        let moved = StepInput {
            spring: &spring,
            to: 2.0,
            dt: 16.0,
            elapsed: 32.0,
        };
        step(phase, &moved, &mut cache);
        assert_eq!(
            cache,
            Some(SolverCache::Analytical {
                origin: phase.position,
                velocity: phase.velocity,
                start: 16.0,
                target: 2.0,
            })
        );
    }
}
