//! Animation groups and frame updates
//!
//! A group is the unit the scheduler registers: a keyed set of configs that
//! share one identity and one listener flag. Groups are normally owned by a
//! controller layer that turns user-facing props into configs.

use crate::config::AnimationConfig;
use indexmap::IndexMap;
use rebound_core::Animatable;
use std::fmt;

/// Identity of an animation group
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// A named collection of configs sharing one identity
#[derive(Clone, Debug)]
pub struct AnimationGroup {
    id: GroupId,
    configs: IndexMap<String, AnimationConfig>,
    /// Collect per-config changes every frame for a listener
    pub has_listener: bool,
}

impl AnimationGroup {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            configs: IndexMap::new(),
            has_listener: false,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Builder: add or replace a config under `key`
    pub fn with_config(mut self, key: impl Into<String>, config: AnimationConfig) -> Self {
        self.insert(key, config);
        self
    }

    /// Builder: request change reports every frame
    pub fn with_listener(mut self, has_listener: bool) -> Self {
        self.has_listener = has_listener;
        self
    }

    /// Add or replace a config, returning the previous one
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        config: AnimationConfig,
    ) -> Option<AnimationConfig> {
        self.configs.insert(key.into(), config)
    }

    pub fn config(&self, key: &str) -> Option<&AnimationConfig> {
        self.configs.get(key)
    }

    pub fn config_mut(&mut self, key: &str) -> Option<&mut AnimationConfig> {
        self.configs.get_mut(key)
    }

    /// Configs in insertion order
    pub fn configs(&self) -> impl Iterator<Item = (&str, &AnimationConfig)> {
        self.configs.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub(crate) fn configs_mut(&mut self) -> impl Iterator<Item = (&String, &mut AnimationConfig)> {
        self.configs.iter_mut()
    }

    /// True once every config has settled
    pub fn is_idle(&self) -> bool {
        self.configs.values().all(|c| c.idle)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

/// Value reported for a config: a scalar for single-channel configs, a list
/// for lockstep arrays
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Single(Animatable),
    Many(Vec<Animatable>),
}

/// Per-config changes collected during one frame
pub type Changes = Vec<(String, ConfigValue)>;

/// Outcome of one frame for one group
#[derive(Clone, Debug, PartialEq)]
pub struct FrameUpdate {
    pub group: GroupId,
    /// Every config in the group has settled
    pub idle: bool,
    /// Present only for groups with a listener
    pub changes: Option<Changes>,
}
