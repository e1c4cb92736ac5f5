//! Rebound Core
//!
//! This crate provides the data model shared by the Rebound animation engine:
//!
//! - **Animated Values**: Per-value integration state (position, velocity, elapsed time)
//! - **Solver Caches**: Cross-frame state for fixed-step and closed-form integrators
//! - **Value Store**: Slotmap arena so trails can reference live values by id
//!
//! # Example
//!
//! ```rust
//! use rebound_core::{Animatable, AnimatedValue, ValueStore};
//!
//! let mut store = ValueStore::new();
//! let opacity = store.insert(AnimatedValue::new(0.0));
//!
//! store.get_mut(opacity).unwrap().set_current(0.5);
//! assert_eq!(store.number(opacity), Some(0.5));
//! assert_eq!(store.get(opacity).map(|v| v.current().clone()), Some(Animatable::Number(0.5)));
//! ```

pub mod error;
pub mod store;
pub mod value;

pub use error::{ConfigError, Result};
pub use store::{ValueId, ValueStore};
pub use value::{Animatable, AnimatedValue, SolverCache};
