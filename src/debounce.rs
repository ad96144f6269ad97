use std::time::{Duration, Instant};

/// Cancellable quiescence timer.
///
/// Holds at most one pending value. Every `schedule` replaces the pending value
/// and restarts the window; `fire` releases the value once the window has
/// elapsed without another `schedule`. Time is supplied by the caller so the
/// timer can be driven with synthetic instants.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.window, value));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }
}
