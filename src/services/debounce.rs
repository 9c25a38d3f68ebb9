use std::time::{Duration, Instant};

/// Default quiet period for search input
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Trailing-edge debouncer.
///
/// Every `push` replaces the pending value and restarts the quiet period.
/// `poll` hands out the latest value once, after the period has elapsed with
/// no newer push. Time is passed in so callers and tests control the clock.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, pushed_at)) if now.saturating_duration_since(*pushed_at) >= self.wait => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Hand out the pending value now, skipping the rest of the quiet period
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.push("a", start);
        assert_eq!(d.poll(start + Duration::from_millis(299)), None);
        assert_eq!(d.poll(start + Duration::from_millis(300)), Some("a"));
        assert_eq!(d.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_newer_push_cancels_pending() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.push("s", start);
        d.push("sc", start + Duration::from_millis(200));
        d.push("sco", start + Duration::from_millis(400));

        // 300ms after the first push, but the latest keystroke restarted the clock
        assert_eq!(d.poll(start + Duration::from_millis(500)), None);
        assert_eq!(d.poll(start + Duration::from_millis(700)), Some("sco"));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_no_leading_edge_fire() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.push(1, start);
        assert_eq!(d.poll(start), None);
    }

    #[test]
    fn test_flush_and_cancel() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.push("x", start);
        assert_eq!(d.flush(), Some("x"));
        assert_eq!(d.flush(), None);

        d.push("y", start);
        d.cancel();
        assert_eq!(d.poll(start + Duration::from_secs(1)), None);
    }
}
