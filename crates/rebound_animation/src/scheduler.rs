//! Frame scheduler
//!
//! Owns the registered animation groups and the value store, and drives one
//! integration pass per host frame. The loop is single-threaded and
//! cooperative: the host calls back once per display refresh, the scheduler
//! advances every active config, hands one batch of [`FrameUpdate`]s to the
//! listener, then either asks for another frame or goes idle.
//!
//! ```ignore
//! let frames = FrameQueue::new();
//! let scheduler = FrameLoop::new(EngineSettings::default(), InstantClock::new(), frames.clone());
//! scheduler.set_listener(|updates| apply(updates));
//! scheduler.start(group);
//! // host: on every vsync
//! frames.run_next(None);
//! ```

use crate::group::{AnimationGroup, Changes, FrameUpdate, GroupId};
use crate::host::{Clock, FrameRequester};
use crate::integrator::Integrator;
use crate::settings::EngineSettings;
use rebound_core::{AnimatedValue, ValueId, ValueStore};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Receives the batch of updates produced by one frame
pub type UpdateListener = Box<dyn FnMut(&[FrameUpdate])>;

/// What a call to [`SchedulerHandle::update`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The scheduler was idle; nothing ran
    NotScheduled,
    /// Another frame was requested
    Scheduled,
    /// The registry emptied and the scheduler went idle
    Stopped,
}

/// Scheduler state
///
/// Only reachable through a [`SchedulerHandle`], which also lets the host's
/// frame callback find its way back to the loop.
pub struct FrameLoop {
    groups: BTreeMap<GroupId, AnimationGroup>,
    values: ValueStore,
    idle: bool,
    last_tick: Option<f64>,
    max_frame_delta: f64,
    integrator: Integrator,
    clock: Box<dyn Clock>,
    requester: Box<dyn FrameRequester>,
    listener: Option<UpdateListener>,
    this: Weak<RefCell<FrameLoop>>,
}

impl FrameLoop {
    /// Create an idle scheduler
    pub fn new<C, R>(settings: EngineSettings, clock: C, requester: R) -> SchedulerHandle
    where
        C: Clock + 'static,
        R: FrameRequester + 'static,
    {
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(FrameLoop {
                groups: BTreeMap::new(),
                values: ValueStore::new(),
                idle: true,
                last_tick: None,
                max_frame_delta: settings.max_frame_delta,
                integrator: Integrator::new(&settings),
                clock: Box::new(clock),
                requester: Box::new(requester),
                listener: None,
                this: this.clone(),
            })
        });
        SchedulerHandle { inner }
    }

    fn request_frame(&mut self) {
        let this = self.this.clone();
        self.requester.request_frame(Box::new(move |time| {
            if let Some(inner) = this.upgrade() {
                SchedulerHandle { inner }.update(time);
            }
        }));
    }

    fn start(&mut self, group: AnimationGroup) {
        let id = group.id();
        self.groups.insert(id, group);
        if self.idle {
            tracing::debug!(%id, "frame loop waking up");
            self.idle = false;
            self.last_tick = None;
            self.request_frame();
        }
    }

    /// Integration half of a frame: everything up to delivering the batch
    ///
    /// A frame without elapsed time integrates nothing and yields an empty
    /// batch.
    fn integrate(&mut self, time: Option<f64>) -> Vec<FrameUpdate> {
        let now = time.unwrap_or_else(|| self.clock.now());
        let delta = (now - self.last_tick.unwrap_or(now)).min(self.max_frame_delta);
        self.last_tick = Some(now);

        if !(delta > 0.0) {
            return Vec::new();
        }

        tracing::trace!(delta, groups = self.groups.len(), "frame");

        let mut batch = Vec::new();
        for (id, group) in self.groups.iter_mut() {
            let has_listener = group.has_listener;
            let mut changes = has_listener.then(Changes::new);

            for (key, config) in group.configs_mut() {
                if config.idle {
                    continue;
                }
                let active =
                    self.integrator
                        .advance(delta, key, config, &mut self.values, changes.as_mut());
                if !active {
                    tracing::trace!(group = %id, key = key.as_str(), "config settled");
                    config.idle = true;
                }
            }

            let idle = group.is_idle();
            if idle || has_listener {
                batch.push(FrameUpdate {
                    group: *id,
                    idle,
                    changes,
                });
            }
        }

        self.groups.retain(|_, group| !group.is_idle());
        batch
    }

    /// Tail of a frame: go idle or ask for the next one
    fn reschedule(&mut self) -> TickOutcome {
        if self.groups.is_empty() {
            tracing::debug!("frame loop idle");
            self.idle = true;
            TickOutcome::Stopped
        } else {
            self.request_frame();
            TickOutcome::Scheduled
        }
    }
}

/// Shared handle to a [`FrameLoop`]
///
/// Cheap to clone. All calls are synchronous; none may be made from inside a
/// [`FrameRequester::request_frame`] implementation.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Rc<RefCell<FrameLoop>>,
}

impl SchedulerHandle {
    /// Set the callback that receives each frame's batch
    pub fn set_listener<F>(&self, listener: F)
    where
        F: FnMut(&[FrameUpdate]) + 'static,
    {
        self.inner.borrow_mut().listener = Some(Box::new(listener));
    }

    /// Register (or replace) a group; wakes the loop if it was idle
    pub fn start(&self, group: AnimationGroup) {
        self.inner.borrow_mut().start(group);
    }

    /// Remove a group; unknown ids are ignored
    ///
    /// The loop only goes idle on the next frame that sees an empty registry.
    pub fn stop(&self, id: GroupId) -> Option<AnimationGroup> {
        let removed = self.inner.borrow_mut().groups.remove(&id);
        if removed.is_some() {
            tracing::debug!(%id, "group stopped");
        }
        removed
    }

    /// Run one frame
    ///
    /// `time` is the frame timestamp in ms; `None` reads the clock. This is
    /// also the continuation handed to the frame requester.
    pub fn update(&self, time: Option<f64>) -> TickOutcome {
        let batch = {
            let mut inner = self.inner.borrow_mut();
            if inner.idle {
                return TickOutcome::NotScheduled;
            }
            inner.integrate(time)
        };

        self.deliver(&batch);

        self.inner.borrow_mut().reschedule()
    }

    /// Hand a batch to the listener without holding the loop borrowed, so the
    /// listener may start or stop groups
    fn deliver(&self, batch: &[FrameUpdate]) {
        let listener = self.inner.borrow_mut().listener.take();
        if let Some(mut listener) = listener {
            listener(batch);
            let mut inner = self.inner.borrow_mut();
            if inner.listener.is_none() {
                inner.listener = Some(listener);
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        self.inner.borrow().idle
    }

    pub fn group_count(&self) -> usize {
        self.inner.borrow().groups.len()
    }

    pub fn is_registered(&self, id: GroupId) -> bool {
        self.inner.borrow().groups.contains_key(&id)
    }

    /// Run `f` against a registered group
    pub fn with_group<F, R>(&self, id: GroupId, f: F) -> Option<R>
    where
        F: FnOnce(&mut AnimationGroup) -> R,
    {
        self.inner.borrow_mut().groups.get_mut(&id).map(f)
    }

    /// Add a value to the store
    pub fn insert_value(&self, value: AnimatedValue) -> ValueId {
        self.inner.borrow_mut().values.insert(value)
    }

    /// Snapshot of a value
    pub fn value(&self, id: ValueId) -> Option<AnimatedValue> {
        self.inner.borrow().values.get(id).cloned()
    }

    /// Current numeric value
    pub fn number(&self, id: ValueId) -> Option<f64> {
        self.inner.borrow().values.number(id)
    }

    /// Run `f` against the value store
    pub fn with_values<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ValueStore) -> R,
    {
        f(&mut self.inner.borrow_mut().values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimationConfig;
    use crate::easing::Easing;
    use crate::host::{FrameQueue, ManualClock};
    use crate::spring::SpringConfig;

    fn scheduler() -> (SchedulerHandle, FrameQueue, ManualClock) {
        let frames = FrameQueue::new();
        let clock = ManualClock::new(0.0);
        let handle = FrameLoop::new(EngineSettings::default(), clock.clone(), frames.clone());
        (handle, frames, clock)
    }

    fn timed_group(handle: &SchedulerHandle, id: u64, duration: f64) -> (AnimationGroup, ValueId) {
        let value = handle.insert_value(AnimatedValue::new(0.0));
        let group = AnimationGroup::new(GroupId(id)).with_config(
            "x",
            AnimationConfig::duration(duration, Easing::Linear).channel(value, 0.0, 1.0),
        );
        (group, value)
    }

    #[test]
    fn test_update_while_idle_is_a_noop() {
        let (handle, frames, _) = scheduler();
        assert!(handle.is_idle());
        assert_eq!(handle.update(Some(16.0)), TickOutcome::NotScheduled);
        assert_eq!(frames.requested(), 0);
    }

    #[test]
    fn test_start_requests_exactly_one_frame() {
        let (handle, frames, _) = scheduler();
        let (group, _) = timed_group(&handle, 1, 100.0);
        let (other, _) = timed_group(&handle, 2, 100.0);

        handle.start(group);
        assert!(!handle.is_idle());
        assert_eq!(frames.requested(), 1);

        // Already awake: no second request
        handle.start(other);
        assert_eq!(frames.requested(), 1);
    }

    #[test]
    fn test_first_frame_has_zero_delta() {
        let (handle, frames, _) = scheduler();
        let (group, value) = timed_group(&handle, 1, 100.0);
        handle.start(group);

        assert!(frames.run_next(Some(1000.0)));
        assert_eq!(handle.number(value), Some(0.0));
        assert_eq!(frames.pending(), 1);

        frames.run_next(Some(1050.0));
        assert!((handle.number(value).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_delta_is_clamped() {
        let (handle, _, _) = scheduler();
        let (group, value) = timed_group(&handle, 1, 1000.0);
        handle.start(group);

        handle.update(Some(0.0));
        handle.update(Some(1000.0));
        // Integrated 64ms, not 1000ms
        assert!((handle.number(value).unwrap() - 0.064).abs() < 1e-12);
    }

    #[test]
    fn test_clock_is_read_when_time_is_absent() {
        let (handle, frames, clock) = scheduler();
        let (group, value) = timed_group(&handle, 1, 100.0);
        handle.start(group);

        clock.set(500.0);
        frames.run_next(None);
        clock.advance(25.0);
        frames.run_next(None);
        assert!((handle.number(value).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_settled_groups_are_removed_and_loop_stops() {
        let (handle, frames, _) = scheduler();
        let (group, value) = timed_group(&handle, 1, 32.0);
        handle.start(group);

        let ran = frames.run_until_idle(0.0, 16.0, 100);
        assert_eq!(ran, 3);
        assert!(handle.is_idle());
        assert_eq!(handle.group_count(), 0);
        assert_eq!(handle.number(value), Some(1.0));
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_listener_receives_one_batch_per_frame() {
        let (handle, _, _) = scheduler();
        let batches = Rc::new(RefCell::new(Vec::new()));
        let sink = batches.clone();
        handle.set_listener(move |updates| sink.borrow_mut().push(updates.to_vec()));

        let (group, _) = timed_group(&handle, 1, 32.0);
        handle.start(group.with_listener(true));

        handle.update(Some(0.0));
        handle.update(Some(16.0));
        handle.update(Some(32.0));

        let batches = batches.borrow();
        assert_eq!(batches.len(), 3);
        // The zero-delta first frame moves nothing
        assert!(batches[0].is_empty());
        assert!(!batches[1][0].idle);
        assert_eq!(batches[1][0].changes.as_ref().map(Vec::len), Some(1));
        assert!(batches[2][0].idle);
    }

    #[test]
    fn test_groups_without_listener_report_only_when_idle() {
        let (handle, _, _) = scheduler();
        let batches = Rc::new(RefCell::new(Vec::new()));
        let sink = batches.clone();
        handle.set_listener(move |updates| sink.borrow_mut().push(updates.to_vec()));

        let (group, _) = timed_group(&handle, 1, 32.0);
        handle.start(group);
        handle.update(Some(0.0));
        handle.update(Some(16.0));
        handle.update(Some(32.0));

        let batches = batches.borrow();
        assert!(batches[0].is_empty());
        assert!(batches[1].is_empty());
        assert_eq!(
            batches[2],
            vec![FrameUpdate {
                group: GroupId(1),
                idle: true,
                changes: None,
            }]
        );
    }

    #[test]
    fn test_groups_run_in_ascending_id_order() {
        let (handle, _, _) = scheduler();
        let order = Rc::new(RefCell::new(Vec::new()));
        let sink = order.clone();
        handle.set_listener(move |updates| {
            sink.borrow_mut()
                .extend(updates.iter().map(|u| u.group.0));
        });

        for id in [3, 1, 2] {
            let (group, _) = timed_group(&handle, id, 100.0);
            handle.start(group.with_listener(true));
        }
        handle.update(Some(0.0));
        handle.update(Some(16.0));
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_listener_called_on_every_frame() {
        let (handle, _, _) = scheduler();
        let calls = Rc::new(RefCell::new(0usize));
        let sink = calls.clone();
        handle.set_listener(move |_| *sink.borrow_mut() += 1);

        let (group, _) = timed_group(&handle, 1, 100.0);
        handle.start(group.with_listener(true));

        // Repeated timestamps still count as frames
        handle.update(Some(0.0));
        handle.update(Some(0.0));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_stop_takes_effect_on_next_frame() {
        let (handle, frames, _) = scheduler();
        let (group, value) = timed_group(&handle, 1, 100.0);
        handle.start(group);
        handle.update(Some(0.0));

        assert!(handle.stop(GroupId(1)).is_some());
        assert!(handle.stop(GroupId(1)).is_none());
        // Still awake until a frame sees the empty registry
        assert!(!handle.is_idle());

        let requested = frames.requested();
        assert_eq!(handle.update(Some(16.0)), TickOutcome::Stopped);
        assert!(handle.is_idle());
        assert_eq!(frames.requested(), requested);
        assert_eq!(handle.number(value), Some(0.0));
    }

    #[test]
    fn test_listener_may_stop_groups() {
        let (handle, _, _) = scheduler();
        let (group, _) = timed_group(&handle, 1, 1000.0);
        handle.start(group.with_listener(true));

        let inner = handle.clone();
        handle.set_listener(move |updates| {
            for update in updates {
                inner.stop(update.group);
            }
        });

        handle.update(Some(0.0));
        assert_eq!(handle.update(Some(16.0)), TickOutcome::Stopped);
    }

    #[test]
    fn test_spring_group_settles_under_frame_queue() {
        let (handle, frames, _) = scheduler();
        let value = handle.insert_value(AnimatedValue::new(0.0));
        let group = AnimationGroup::new(GroupId(9)).with_config(
            "scale",
            AnimationConfig::spring(SpringConfig::stiff()).channel(value, 0.0, 2.0),
        );
        handle.start(group);

        let ran = frames.run_until_idle(0.0, 16.0, 1000);
        assert!(ran < 1000);
        assert!(handle.is_idle());
        assert_eq!(handle.number(value), Some(2.0));
        assert!(handle.value(value).unwrap().done);
    }
}
