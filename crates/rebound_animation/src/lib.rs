//! Rebound Animation Engine
//!
//! Per-frame integration of animated values, and the scheduler that drives it.
//!
//! # Features
//!
//! - **Spring Physics**: Euler, semi-implicit, RK4, and closed-form integrators
//!   sharing one force law and one settle rule
//! - **Fixed Sub-stepping**: Frame deltas are split into fixed steps so springs
//!   behave the same at 30 and 144 fps
//! - **Decay**: Momentum that coasts to a stop and re-targets where it lands
//! - **Timed Easing**: Duration animations with resumable progress
//! - **Trails**: Values that chase another live animated value
//! - **Frame Scheduler**: Host-driven loop with injected clock and frame requests

pub mod config;
pub mod easing;
pub mod group;
pub mod host;
pub mod integrator;
pub mod scheduler;
pub mod settings;
pub mod spring;
pub mod stepper;

pub use config::{AnimationConfig, Channel, Clamp, Motion, Target};
pub use easing::Easing;
pub use group::{AnimationGroup, Changes, ConfigValue, FrameUpdate, GroupId};
pub use host::{Clock, FrameCallback, FrameHandle, FrameQueue, FrameRequester, InstantClock, ManualClock};
pub use integrator::{advance, Integrator};
pub use scheduler::{FrameLoop, SchedulerHandle, TickOutcome, UpdateListener};
pub use settings::EngineSettings;
pub use spring::{Integration, SpringConfig};

pub use rebound_core::{Animatable, AnimatedValue, ConfigError, SolverCache, ValueId, ValueStore};
