//! Virtual clock and timer scheduler.
//!
//! The browser hands us a monotonically increasing frame timestamp; everything that
//! used to be a `setInterval` / `setTimeout` is a timer here, fired from
//! [`Scheduler::pop_due`] in chronological order. Native tests drive the same code by
//! feeding synthetic timestamps.

/// Milliseconds on the virtual clock.
pub type Millis = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// How a periodic timer behaves when several periods elapsed between two advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Missed {
    /// Fire once per elapsed period.
    Burst,
    /// Fire once, then realign to the next period after `now`.
    Skip,
}

#[derive(Clone, Copy, Debug)]
enum Repeat {
    Once,
    Every { period: Millis, missed: Missed },
}

#[derive(Debug)]
struct Timer<E> {
    id: TimerId,
    due: Millis,
    repeat: Repeat,
    event: E,
}

/// Ordered set of pending timers carrying an event payload `E`.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Millis,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new(now: Millis) -> Self {
        Self { now, next_id: 0, timers: Vec::new() }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Fire `event` once, `delay` ms from now.
    pub fn after(&mut self, delay: Millis, event: E) -> TimerId {
        self.insert(self.now + delay, Repeat::Once, event)
    }

    /// Fire `event` every `period` ms, first at `now + period`.
    pub fn every(&mut self, period: Millis, missed: Missed, event: E) -> TimerId {
        let period = period.max(1);
        self.insert(self.now + period, Repeat::Every { period, missed }, event)
    }

    /// Returns whether a timer was actually removed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its due time.
    /// Periodic timers are re-armed before returning. Once nothing is due the clock
    /// settles on `until`; an `until` in the past is ignored.
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, E)> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now = self.now.max(until);
            return None;
        };

        let due = self.timers[idx].due;
        self.now = self.now.max(due);
        match self.timers[idx].repeat {
            Repeat::Once => {
                let timer = self.timers.swap_remove(idx);
                Some((due, timer.event))
            }
            Repeat::Every { period, missed } => {
                let timer = &mut self.timers[idx];
                timer.due = match missed {
                    Missed::Burst => due + period,
                    Missed::Skip => {
                        let behind = until.saturating_sub(due) / period;
                        due + (behind + 1) * period
                    }
                };
                Some((due, timer.event.clone()))
            }
        }
    }

    fn insert(&mut self, due: Millis, repeat: Repeat, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, due, repeat, event });
        id
    }
}
