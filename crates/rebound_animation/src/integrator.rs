//! Per-config integration
//!
//! [`Integrator::advance`] moves every channel of one config forward by one
//! frame delta, applies the config's motion model and settle rules, and
//! writes the new positions into the value store.

use crate::config::{AnimationConfig, Clamp, Motion, Target};
use crate::group::{Changes, ConfigValue};
use crate::settings::EngineSettings;
use crate::spring::SpringConfig;
use crate::stepper::{self, Phase, StepInput};
use rebound_core::{Animatable, AnimatedValue, ValueStore};

/// Advances configs with a fixed set of settle tolerances
#[derive(Clone, Debug)]
pub struct Integrator {
    default_decay: f64,
    decay_rest_distance: f64,
    zero_displacement_precision: f64,
}

impl Integrator {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            default_decay: settings.default_decay,
            decay_rest_distance: settings.decay_rest_distance,
            zero_displacement_precision: settings.zero_displacement_precision,
        }
    }

    /// Advance every active channel of `config` by `delta` ms
    ///
    /// When `sink` is given and at least one channel moved, `(key, value)` is
    /// appended to it. Returns true while any channel is still active.
    pub fn advance(
        &self,
        delta: f64,
        key: &str,
        config: &mut AnimationConfig,
        values: &mut ValueStore,
        sink: Option<&mut Changes>,
    ) -> bool {
        let AnimationConfig {
            channels,
            motion,
            initial_velocity,
            precision,
            clamp,
            immediate,
            ..
        } = config;

        let mut active = false;
        let mut changed = false;

        for channel in channels.iter_mut() {
            if values.is_done(channel.value) {
                continue;
            }

            // Trails read the leader every step; a vanished leader pins the
            // follower where it stands.
            let (to, leader_done) = match &channel.to {
                Target::Fixed(to) => (to.clone(), true),
                Target::Value(leader) => match values.current(*leader) {
                    Some(to) => (to, values.is_done(*leader)),
                    None => (
                        values
                            .current(channel.value)
                            .unwrap_or_else(|| channel.from.clone()),
                        true,
                    ),
                },
            };

            let Some(value) = values.get_mut(channel.value) else {
                continue;
            };

            let (from, to) = match (channel.from.as_number(), to.as_number()) {
                (Some(from), Some(to)) if !*immediate => (from, to),
                _ => {
                    changed |= value.current() != &to;
                    value.finish_at(to);
                    continue;
                }
            };

            value.elapsed += delta;
            let v0 = channel.velocity_or(*initial_velocity);
            let precision = precision.unwrap_or_else(|| {
                if from == to {
                    self.zero_displacement_precision
                } else {
                    ((to - from).abs() / 1000.0).min(1.0)
                }
            });
            let last = Phase::new(
                value.last_position.unwrap_or(from),
                value.last_velocity.unwrap_or(v0),
            );

            let frame = ChannelFrame {
                from,
                to,
                v0,
                delta,
                precision,
            };
            let (mut next, mut finished) = match *motion {
                Motion::Duration { duration, easing } => {
                    let p0 = value.resume_progress;
                    let p = if duration <= 0.0 || value.elapsed >= duration {
                        1.0
                    } else {
                        p0 + (1.0 - p0) * (value.elapsed / duration)
                    };
                    value.progress = p;
                    let position = from + easing.apply(p) * (to - from);
                    let velocity = if delta > 0.0 {
                        (position - last.position) / delta
                    } else {
                        0.0
                    };
                    (Phase::new(position, velocity), p == 1.0)
                }
                Motion::Decay { rate } => {
                    let rate = rate.unwrap_or(self.default_decay);
                    let next = decay_phase(from, v0, rate, value.elapsed);
                    let finished = (last.position - next.position).abs() < self.decay_rest_distance;
                    (next, finished)
                }
                Motion::Spring(ref spring) => spring_frame(spring, *clamp, &frame, last, value),
            };

            let mut to = to;
            if finished {
                if let Motion::Decay { .. } = motion {
                    // Decay has no destination of its own: wherever it stops
                    // becomes the target.
                    to = next.position;
                    if let Target::Fixed(_) = channel.to {
                        channel.to = Target::Fixed(Animatable::Number(to));
                    }
                    tracing::trace!(key, to, "decay came to rest");
                }
            }

            if finished && !leader_done {
                finished = false;
            }

            if finished {
                next = Phase::new(to, 0.0);
            }

            value.last_position = Some(next.position);
            value.last_velocity = Some(next.velocity);
            changed |= value.number() != Some(next.position);
            value.set_current(next.position);

            if finished {
                value.done = true;
                value.cache = None;
            } else {
                active = true;
            }
        }

        if changed {
            if let Some(sink) = sink {
                sink.push((key.to_owned(), aggregate(channels, values)));
            }
        }

        active
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

/// Advance one config with the default tolerances
pub fn advance(
    delta: f64,
    key: &str,
    config: &mut AnimationConfig,
    values: &mut ValueStore,
    sink: Option<&mut Changes>,
) -> bool {
    Integrator::default().advance(delta, key, config, values, sink)
}

/// Per-channel quantities resolved before dispatching to a motion model
struct ChannelFrame {
    from: f64,
    to: f64,
    v0: f64,
    delta: f64,
    precision: f64,
}

/// Exponential slow-down toward `from + v0 / (1 - rate)`
fn decay_phase(from: f64, v0: f64, rate: f64, elapsed: f64) -> Phase {
    let k = 1.0 - rate;
    let e = (-k * elapsed).exp();
    Phase::new(from + v0 / k * (1.0 - e), v0 * e)
}

/// Step a spring channel and apply the overshoot and settle rules
fn spring_frame(
    spring: &SpringConfig,
    clamp: Clamp,
    frame: &ChannelFrame,
    last: Phase,
    value: &mut AnimatedValue,
) -> (Phase, bool) {
    let input = StepInput {
        spring,
        to: frame.to,
        dt: frame.delta,
        elapsed: value.elapsed,
    };
    let mut next = stepper::step(spring.integration, last, &input, &mut value.cache);

    if clamp.is_enabled() && spring.tension != 0.0 {
        let growing = if frame.from == frame.to {
            frame.v0 > 0.0
        } else {
            frame.from < frame.to
        };
        let overshot = if growing {
            next.position > frame.to
        } else {
            next.position < frame.to
        };
        let moving_away = if growing {
            next.velocity > 0.0
        } else {
            next.velocity < 0.0
        };

        if overshot && moving_away {
            match clamp {
                Clamp::Bounce(factor) => {
                    next = Phase::new(frame.to, -next.velocity * factor);
                    stepper::reseat(spring.integration, next, &input, &mut value.cache);
                }
                _ => return (Phase::new(frame.to, 0.0), true),
            }
        }
    }

    let settled = next.velocity.abs() <= frame.precision
        && (spring.tension == 0.0 || (frame.to - next.position).abs() <= frame.precision);
    (next, settled)
}

/// Current value of a config: scalar for one channel, list otherwise
fn aggregate(channels: &[crate::config::Channel], values: &ValueStore) -> ConfigValue {
    let mut current = channels.iter().map(|c| {
        values
            .current(c.value)
            .unwrap_or_else(|| c.from.clone())
    });
    if channels.len() == 1 {
        match current.next() {
            Some(value) => ConfigValue::Single(value),
            None => ConfigValue::Many(Vec::new()),
        }
    } else {
        ConfigValue::Many(current.collect())
    }
}
