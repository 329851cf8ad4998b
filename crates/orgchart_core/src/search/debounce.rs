//! Keystroke debouncing against an explicit clock.

use std::time::{Duration, Instant};

/// What a keystroke did to the pending query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceInput {
    /// A search will fire once the delay passes without further input.
    Scheduled,
    /// Input was blank; any pending search was cancelled.
    Cleared,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// Replaces the pending query and restarts the delay from `now`.
    pub fn input(&mut self, text: &str, now: Instant) -> DebounceInput {
        let query = text.trim();
        if query.is_empty() {
            self.pending = None;
            return DebounceInput::Cleared;
        }
        self.pending = Some((query.to_string(), now + self.delay));
        DebounceInput::Scheduled
    }

    /// Takes the pending query once its delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.pending.as_ref().map(|(_, due)| *due)?;
        if now < due {
            return None;
        }
        self.pending.take().map(|(query, _)| query)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{DebounceInput, Debouncer};
    use std::time::{Duration, Instant};

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::from_millis(150);
        assert_eq!(debouncer.input("jo", start), DebounceInput::Scheduled);
        assert_eq!(debouncer.poll(start + Duration::from_millis(149)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(150)).as_deref(),
            Some("jo")
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn each_keystroke_restarts_the_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::from_millis(150);
        debouncer.input("j", start);
        debouncer.input("jo", start + Duration::from_millis(100));
        assert_eq!(debouncer.poll(start + Duration::from_millis(200)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(250)).as_deref(),
            Some("jo")
        );
    }

    #[test]
    fn clearing_cancels_pending_search() {
        let start = Instant::now();
        let mut debouncer = Debouncer::from_millis(150);
        debouncer.input("jo", start);
        assert_eq!(debouncer.input("  ", start), DebounceInput::Cleared);
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
