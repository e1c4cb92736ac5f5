//! Value store
//!
//! Animated values live in a slotmap arena. Configs and trails refer to them
//! by [`ValueId`], so a follower always reads the leader's live value rather
//! than a copy.

use crate::value::{Animatable, AnimatedValue};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to an animated value in a [`ValueStore`]
    pub struct ValueId;
}

/// Arena of animated values
#[derive(Clone, Debug, Default)]
pub struct ValueStore {
    values: SlotMap<ValueId, AnimatedValue>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self {
            values: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, value: AnimatedValue) -> ValueId {
        self.values.insert(value)
    }

    pub fn get(&self, id: ValueId) -> Option<&AnimatedValue> {
        self.values.get(id)
    }

    pub fn get_mut(&mut self, id: ValueId) -> Option<&mut AnimatedValue> {
        self.values.get_mut(id)
    }

    pub fn remove(&mut self, id: ValueId) -> Option<AnimatedValue> {
        self.values.remove(id)
    }

    pub fn contains(&self, id: ValueId) -> bool {
        self.values.contains_key(id)
    }

    /// Current numeric value of a slot
    pub fn number(&self, id: ValueId) -> Option<f64> {
        self.values.get(id).and_then(AnimatedValue::number)
    }

    /// Current value of a slot, cloned
    pub fn current(&self, id: ValueId) -> Option<Animatable> {
        self.values.get(id).map(|v| v.current().clone())
    }

    /// Whether a slot has settled (missing slots count as settled)
    pub fn is_done(&self, id: ValueId) -> bool {
        self.values.get(id).map_or(true, |v| v.done)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &AnimatedValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_value_counts_as_done() {
        let mut store = ValueStore::new();
        let id = store.insert(AnimatedValue::new(1.0));
        assert!(!store.is_done(id));

        store.remove(id);
        assert!(store.is_done(id));
        assert_eq!(store.number(id), None);
    }

    #[test]
    fn test_current_reads_live_value() {
        let mut store = ValueStore::new();
        let id = store.insert(AnimatedValue::new(1.0));
        store.get_mut(id).unwrap().set_current(2.5);
        assert_eq!(store.current(id), Some(Animatable::Number(2.5)));
        assert_eq!(store.len(), 1);
    }
}
