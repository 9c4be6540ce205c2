//! Rate limiting for telemetry reports

/// Lets an event through at most once per interval
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl Throttle {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True if an event at `now_ms` may pass; records it if so
    ///
    /// The first event always passes. A clock that steps backwards lets the
    /// next event through and restarts the interval from there.
    pub fn allow(&mut self, now_ms: u64) -> bool {
        let pass = match self.last_ms {
            None => true,
            Some(last) if now_ms < last => true,
            Some(last) => now_ms - last >= self.interval_ms,
        };
        if pass {
            self.last_ms = Some(now_ms);
        }
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_event_passes() {
        let mut throttle = Throttle::new(500);
        assert!(throttle.allow(12_345));
    }

    #[test]
    fn test_interval_boundary() {
        let mut throttle = Throttle::new(500);
        assert!(throttle.allow(0));
        assert!(!throttle.allow(1));
        assert!(!throttle.allow(499));
        assert!(throttle.allow(500));
        assert!(!throttle.allow(999));
        assert!(throttle.allow(1000));
    }

    #[test]
    fn test_suppressed_events_do_not_restart_interval() {
        let mut throttle = Throttle::new(100);
        assert!(throttle.allow(0));
        for now in (10..100).step_by(10) {
            assert!(!throttle.allow(now));
        }
        assert!(throttle.allow(100));
    }

    #[test]
    fn test_zero_interval_passes_everything() {
        let mut throttle = Throttle::new(0);
        assert!(throttle.allow(5));
        assert!(throttle.allow(5));
    }

    #[test]
    fn test_clock_step_back() {
        let mut throttle = Throttle::new(100);
        assert!(throttle.allow(1000));
        assert!(throttle.allow(10));
        assert!(!throttle.allow(50));
    }
}
