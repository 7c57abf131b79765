use std::time::{Duration, Instant};

/// Holds the latest input until it has been left alone for `delay`.
///
/// Clock-driven rather than timer-driven: the event loop calls `poll` on every
/// tick with the current instant.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    /// A `None` deadline lies past the end of the clock and never elapses.
    pending: Option<(T, Option<Instant>)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now.checked_add(self.delay)));
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, Some(deadline))) if *deadline <= now => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
