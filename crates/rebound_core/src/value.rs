//! Animated values
//!
//! An [`AnimatedValue`] is the storage slot for one scalar being animated plus
//! the integration state the engine carries between frames.

use serde::{Deserialize, Serialize};

/// A value that can be written into an animated slot
///
/// Numbers are interpolated. Text is never interpolated: it jumps straight to
/// the target on the first frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Animatable {
    Number(f64),
    Text(String),
}

impl Animatable {
    /// Numeric view of this value (`None` for text)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Animatable::Number(n) => Some(*n),
            Animatable::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Animatable::Number(_))
    }
}

impl From<f64> for Animatable {
    fn from(value: f64) -> Self {
        Animatable::Number(value)
    }
}

impl From<f32> for Animatable {
    fn from(value: f32) -> Self {
        Animatable::Number(value as f64)
    }
}

impl From<&str> for Animatable {
    fn from(value: &str) -> Self {
        Animatable::Text(value.to_owned())
    }
}

impl From<String> for Animatable {
    fn from(value: String) -> Self {
        Animatable::Text(value)
    }
}

/// Integrator state that has to survive between frames
///
/// Each frame only advances a value by one outer delta, but fixed-step and
/// closed-form solvers need more than the last position and velocity to
/// continue where they left off.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SolverCache {
    /// Fixed-step RK4 state
    Rk4 {
        position: f64,
        velocity: f64,
        /// Time (ms) handed to the solver but not yet consumed by a whole step
        carry: f64,
    },
    /// Anchor of a closed-form spring solution
    Analytical {
        /// Position at `start`
        origin: f64,
        /// Velocity at `start`
        velocity: f64,
        /// Elapsed time (ms) the solution is measured from
        start: f64,
        /// Target the solution converges to
        target: f64,
    },
}

/// One animated slot
#[derive(Clone, Debug)]
pub struct AnimatedValue {
    current: Animatable,
    /// Set once the value settled; cleared by [`AnimatedValue::reset`]
    pub done: bool,
    /// Milliseconds since this value's animation began
    pub elapsed: f64,
    pub last_position: Option<f64>,
    pub last_velocity: Option<f64>,
    /// Eased-time progress of the duration model, in [0, 1]
    pub progress: f64,
    /// Progress the duration model resumes from
    pub resume_progress: f64,
    pub cache: Option<SolverCache>,
}

impl AnimatedValue {
    pub fn new(initial: impl Into<Animatable>) -> Self {
        Self {
            current: initial.into(),
            done: false,
            elapsed: 0.0,
            last_position: None,
            last_velocity: None,
            progress: 0.0,
            resume_progress: 0.0,
            cache: None,
        }
    }

    /// Current stored value
    pub fn current(&self) -> &Animatable {
        &self.current
    }

    /// Current value as a number (`None` while holding text)
    pub fn number(&self) -> Option<f64> {
        self.current.as_number()
    }

    /// Overwrite the stored value without touching integration state
    pub fn set_current(&mut self, value: impl Into<Animatable>) {
        self.current = value.into();
    }

    /// Whether the integrator may still mutate this value
    pub fn is_active(&self) -> bool {
        !self.done
    }

    /// Clear integration state so the value can run a new animation
    ///
    /// The stored value is kept and becomes the natural start point.
    pub fn reset(&mut self) {
        self.done = false;
        self.elapsed = 0.0;
        self.last_position = None;
        self.last_velocity = None;
        self.progress = 0.0;
        self.resume_progress = 0.0;
        self.cache = None;
    }

    /// Reset and resume a duration animation from `progress`
    pub fn resume_from(&mut self, progress: f64) {
        self.reset();
        self.resume_progress = progress.clamp(0.0, 1.0);
        self.progress = self.resume_progress;
    }

    /// Settle at `value` immediately
    pub fn finish_at(&mut self, value: impl Into<Animatable>) {
        self.current = value.into();
        self.done = true;
        self.cache = None;
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_value_is_active() {
        let value = AnimatedValue::new(3.0);
        assert!(value.is_active());
        assert_eq!(value.number(), Some(3.0));
        assert!(value.cache.is_none());
    }

    #[test]
    fn test_reset_clears_integration_state() {
        let mut value = AnimatedValue::new(0.0);
        value.elapsed = 120.0;
        value.last_position = Some(4.0);
        value.last_velocity = Some(0.2);
        value.cache = Some(SolverCache::Rk4 {
            position: 4.0,
            velocity: 0.2,
            carry: 0.5,
        });
        value.finish_at(10.0);
        assert!(value.done);

        value.reset();
        assert!(!value.done);
        assert_eq!(value.elapsed, 0.0);
        assert!(value.last_position.is_none());
        assert!(value.cache.is_none());
        // Stored value survives the reset
        assert_eq!(value.number(), Some(10.0));
    }

    #[test]
    fn test_resume_progress_is_clamped() {
        let mut value = AnimatedValue::new(0.0);
        value.resume_from(1.5);
        assert_eq!(value.resume_progress, 1.0);
        assert_eq!(value.progress, 1.0);
    }

    #[test]
    fn test_text_has_no_numeric_view() {
        let value = AnimatedValue::new("red");
        assert_eq!(value.number(), None);
        assert!(!value.current().is_number());
    }
}
