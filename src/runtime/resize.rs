//! Resize coalescing.

use std::time::{Duration, Instant};

pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Holds the latest terminal size until no new signal arrived for one debounce interval.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(u16, u16)>,
    deadline: Option<Instant>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    /// Records a size. Every signal restarts the quiet period.
    pub fn signal(&mut self, columns: u16, rows: u16, now: Instant) {
        self.pending = Some((columns, rows));
        self.deadline = Some(now + self.delay);
    }

    /// Returns the size to apply once the quiet period elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<(u16, u16)> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::ResizeDebouncer;

    #[test]
    fn latest_size_wins_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::new(Duration::from_millis(150));
        debouncer.signal(100, 40, start);
        debouncer.signal(90, 30, start + Duration::from_millis(100));

        assert_eq!(debouncer.take_due(start + Duration::from_millis(200)), None);
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(250)),
            Some((90, 30))
        );
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.take_due(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn cancel_drops_pending_size() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::default();
        debouncer.signal(10, 10, start);
        debouncer.cancel();
        assert_eq!(debouncer.take_due(start + Duration::from_secs(1)), None);
        assert_eq!(debouncer.deadline(), None);
    }
}
