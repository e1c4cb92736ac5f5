//! Animation configs
//!
//! An [`AnimationConfig`] binds one motion model to one or more animated
//! values. Values in the same config move in lockstep (e.g. the components of
//! an array-valued key) and are reported together.

use crate::easing::Easing;
use crate::spring::SpringConfig;
use rebound_core::{Animatable, ConfigError, Result, ValueId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where a channel is heading
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// A fixed destination
    Fixed(Animatable),
    /// Another animated value, read live on every step (trail)
    Value(ValueId),
}

/// One animated value inside a config
#[derive(Clone, Debug)]
pub struct Channel {
    pub from: Animatable,
    pub to: Target,
    pub value: ValueId,
    /// Overrides the config's shared initial velocity
    pub initial_velocity: Option<f64>,
}

impl Channel {
    pub fn new(from: impl Into<Animatable>, to: Target, value: ValueId) -> Self {
        Self {
            from: from.into(),
            to,
            value,
            initial_velocity: None,
        }
    }

    /// The value this channel trails, if any
    /// Starting velocity: the channel's own, else the config's shared one
    pub fn velocity_or(&self, shared: f64) -> f64 {
        self.initial_velocity.unwrap_or(shared)
    }

    pub fn leader(&self) -> Option<ValueId> {
        match self.to {
            Target::Value(id) => Some(id),
            Target::Fixed(_) => None,
        }
    }
}

/// Motion model; exactly one parameter set is active per config
#[derive(Clone, Copy, Debug)]
pub enum Motion {
    /// Timed interpolation through an easing curve
    Duration { duration: f64, easing: Easing },
    /// Exponential slow-down from the initial velocity, no fixed destination;
    /// `None` takes the engine's default rate
    Decay { rate: Option<f64> },
    /// Damped harmonic oscillator
    Spring(SpringConfig),
}

impl Default for Motion {
    fn default() -> Self {
        Motion::Spring(SpringConfig::default())
    }
}

/// What happens when a spring overshoots its target
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clamp {
    #[default]
    Off,
    /// Stop dead at the target
    Stop,
    /// Reflect the velocity, scaled by the factor
    Bounce(f64),
}

impl Clamp {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Clamp::Off)
    }
}

impl From<bool> for Clamp {
    fn from(enabled: bool) -> Self {
        if enabled {
            Clamp::Stop
        } else {
            Clamp::Off
        }
    }
}

/// A motion description bound to one or more animated values
#[derive(Clone, Debug, Default)]
pub struct AnimationConfig {
    pub channels: SmallVec<[Channel; 1]>,
    pub motion: Motion,
    /// Shared initial velocity (units per ms)
    pub initial_velocity: f64,
    /// Settle threshold; derived from the displacement when unset
    pub precision: Option<f64>,
    pub clamp: Clamp,
    /// Skip integration and jump to the target
    pub immediate: bool,
    /// Already settled; the scheduler skips idle configs
    pub idle: bool,
}

impl AnimationConfig {
    /// A spring config with no channels yet
    pub fn spring(spring: SpringConfig) -> Self {
        Self {
            motion: Motion::Spring(spring),
            ..Default::default()
        }
    }

    /// A timed config
    pub fn duration(duration: f64, easing: Easing) -> Self {
        Self {
            motion: Motion::Duration { duration, easing },
            ..Default::default()
        }
    }

    /// A decay config; `None` defers to `EngineSettings::default_decay`
    pub fn decay(rate: Option<f64>) -> Self {
        Self {
            motion: Motion::Decay { rate },
            ..Default::default()
        }
    }

    /// Builder: add a channel toward a fixed target
    pub fn channel(
        mut self,
        value: ValueId,
        from: impl Into<Animatable>,
        to: impl Into<Animatable>,
    ) -> Self {
        self.channels.push(Channel::new(from, Target::Fixed(to.into()), value));
        self
    }

    /// Builder: add a channel that follows another animated value
    pub fn trail(mut self, value: ValueId, from: impl Into<Animatable>, leader: ValueId) -> Self {
        self.channels.push(Channel::new(from, Target::Value(leader), value));
        self
    }

    /// Builder: set the shared initial velocity
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.initial_velocity = velocity;
        self
    }

    /// Builder: set the initial velocity of the most recently added channel
    pub fn with_channel_velocity(mut self, velocity: f64) -> Self {
        if let Some(channel) = self.channels.last_mut() {
            channel.initial_velocity = Some(velocity);
        }
        self
    }

    /// Builder: set an explicit settle precision
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Builder: set the overshoot policy
    pub fn with_clamp(mut self, clamp: impl Into<Clamp>) -> Self {
        self.clamp = clamp.into();
        self
    }

    /// Builder: jump straight to the target
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Check the motion parameters before handing the config to the engine
    pub fn validate(&self) -> Result<()> {
        match self.motion {
            Motion::Duration { duration, .. } => {
                if !duration.is_finite() || duration < 0.0 {
                    return Err(ConfigError::InvalidDuration(duration));
                }
            }
            Motion::Decay { rate: Some(rate) } => {
                if !(rate > 0.0 && rate < 1.0) {
                    return Err(ConfigError::InvalidDecay(rate));
                }
            }
            Motion::Decay { rate: None } => {}
            Motion::Spring(spring) => {
                spring.validated()?;
            }
        }
        Ok(())
    }
}
