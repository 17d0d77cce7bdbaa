use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Handle to a registered frame request, interval or resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

/// A callback that came due during `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Due {
    /// An interval fired at clock time `at` (seconds).
    Interval { id: CallbackId, at: f64 },
    /// A one-shot frame request fired. Frames always come after intervals.
    Frame { id: CallbackId },
}

#[derive(Debug)]
struct Interval {
    period: f64,
    next_due: f64,
}

/// Frame requests, intervals and resize listeners on a virtual clock.
///
/// Callers register callbacks and get an id back; the host advances the
/// clock and dispatches whatever came due, one callback at a time.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_id: u64,
    frames: BTreeSet<CallbackId>,
    intervals: BTreeMap<CallbackId, Interval>,
    resize_listeners: BTreeSet<CallbackId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    fn allocate(&mut self) -> CallbackId {
        self.next_id += 1;
        CallbackId(self.next_id)
    }

    /// Ask for a callback on the next frame. One-shot.
    pub fn request_frame(&mut self) -> CallbackId {
        let id = self.allocate();
        self.frames.insert(id);
        id
    }

    pub fn cancel_frame(&mut self, id: CallbackId) -> bool {
        self.frames.remove(&id)
    }

    /// Fire every `period` until cleared. A zero period is bumped to 1 ms.
    pub fn set_interval(&mut self, period: Duration) -> CallbackId {
        let id = self.allocate();
        let period = period.as_secs_f64().max(0.001);
        self.intervals.insert(
            id,
            Interval {
                period,
                next_due: self.now + period,
            },
        );
        id
    }

    pub fn clear_interval(&mut self, id: CallbackId) -> bool {
        self.intervals.remove(&id).is_some()
    }

    pub fn add_resize_listener(&mut self) -> CallbackId {
        let id = self.allocate();
        self.resize_listeners.insert(id);
        id
    }

    pub fn remove_resize_listener(&mut self, id: CallbackId) -> bool {
        self.resize_listeners.remove(&id)
    }

    pub fn has_resize_listener(&self, id: CallbackId) -> bool {
        self.resize_listeners.contains(&id)
    }

    pub fn is_interval_active(&self, id: CallbackId) -> bool {
        self.intervals.contains_key(&id)
    }

    /// Move the clock forward and collect everything that came due, intervals
    /// in firing order first, then all pending frame requests.
    pub fn advance(&mut self, dt: Duration) -> Vec<Due> {
        let target = self.now + dt.as_secs_f64();

        let mut fired: Vec<(f64, CallbackId)> = Vec::new();
        for (&id, interval) in &mut self.intervals {
            while interval.next_due <= target {
                fired.push((interval.next_due, id));
                interval.next_due += interval.period;
            }
        }
        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        self.now = target;

        let mut due: Vec<Due> = fired
            .into_iter()
            .map(|(at, id)| Due::Interval { id, at })
            .collect();
        due.extend(
            std::mem::take(&mut self.frames)
                .into_iter()
                .map(|id| Due::Frame { id }),
        );
        due
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn active_intervals(&self) -> usize {
        self.intervals.len()
    }

    pub fn resize_listeners(&self) -> usize {
        self.resize_listeners.len()
    }

    /// Nothing registered at all.
    pub fn is_idle(&self) -> bool {
        self.frames.is_empty() && self.intervals.is_empty() && self.resize_listeners.is_empty()
    }
}
