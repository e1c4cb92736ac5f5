//! Host collaborators
//!
//! The frame loop never reads ambient time or schedules itself: it is handed
//! a [`Clock`] and a [`FrameRequester`] at construction. Real hosts wire these
//! to their display-refresh mechanism; headless hosts and tests use
//! [`ManualClock`] and [`FrameQueue`] to drive frames deterministically.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

/// Continuation handed to the host; called with the frame timestamp (ms), or
/// `None` to let the scheduler read its clock
pub type FrameCallback = Box<dyn FnOnce(Option<f64>)>;

/// Host-issued token for a pending frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Source of the current time, in milliseconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// "Call me on the next frame"
///
/// Implementations must not invoke `callback` before returning: the scheduler
/// is still mid-update when it asks for the next frame.
pub trait FrameRequester {
    fn request_frame(&mut self, callback: FrameCallback) -> FrameHandle;
}

impl<F> FrameRequester for F
where
    F: FnMut(FrameCallback) -> FrameHandle,
{
    fn request_frame(&mut self, callback: FrameCallback) -> FrameHandle {
        self(callback)
    }
}

/// Monotonic wall clock measured from construction
#[derive(Clone, Copy, Debug)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to
///
/// Clones share the same time source.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: f64) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<(FrameHandle, FrameCallback)>,
    next_handle: u64,
    requested: u64,
}

/// Frame requester that queues callbacks until the host runs them
///
/// Clones share the same queue, so a host can keep one clone to pump frames
/// while the scheduler owns another.
#[derive(Clone, Default)]
pub struct FrameQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting to run
    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Total frames requested since construction
    pub fn requested(&self) -> u64 {
        self.inner.borrow().requested
    }

    /// Drop a pending request; returns false if it already ran
    pub fn cancel(&self, handle: FrameHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.pending.len();
        inner.pending.retain(|(h, _)| *h != handle);
        inner.pending.len() != before
    }

    /// Run the oldest pending callback; returns false when the queue is empty
    pub fn run_next(&self, time: Option<f64>) -> bool {
        // Release the queue before running: the callback usually requests
        // the next frame.
        let next = self.inner.borrow_mut().pending.pop_front();
        match next {
            Some((_, callback)) => {
                callback(time);
                true
            }
            None => false,
        }
    }

    /// Run frames at `start, start + interval, ...` until the queue drains or
    /// `max_frames` ran; returns the number of frames run
    pub fn run_until_idle(&self, start: f64, interval: f64, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.run_next(Some(start + interval * frames as f64)) {
            frames += 1;
        }
        frames
    }
}

impl FrameRequester for FrameQueue {
    fn request_frame(&mut self, callback: FrameCallback) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_handle += 1;
        inner.requested += 1;
        let handle = FrameHandle(inner.next_handle);
        inner.pending.push_back((handle, callback));
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(10.0);
        let other = clock.clone();
        clock.advance(6.0);
        assert_eq!(other.now(), 16.0);
        other.set(100.0);
        assert_eq!(clock.now(), 100.0);
    }

    #[test]
    fn test_instant_clock_is_monotonic() {
        let clock = InstantClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_frame_queue_runs_in_order() {
        let mut queue = FrameQueue::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let seen = seen.clone();
            queue.request_frame(Box::new(move |time| seen.borrow_mut().push((i, time))));
        }
        assert_eq!(queue.pending(), 3);

        assert_eq!(queue.run_until_idle(0.0, 16.0, 10), 3);
        assert_eq!(
            *seen.borrow(),
            vec![(0, Some(0.0)), (1, Some(16.0)), (2, Some(32.0))]
        );
        assert_eq!(queue.requested(), 3);
        assert!(!queue.run_next(None));
    }

    #[test]
    fn test_cancel_removes_pending_request() {
        let mut queue = FrameQueue::new();
        let handle = queue.request_frame(Box::new(|_| panic!("cancelled frame ran")));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(!queue.run_next(Some(0.0)));
    }

    #[test]
    fn test_closure_requester() {
        let mut calls = 0;
        let mut requester = |_cb: FrameCallback| {
            calls += 1;
            FrameHandle(calls)
        };
        assert_eq!(requester.request_frame(Box::new(|_| {})), FrameHandle(1));
    }
}
