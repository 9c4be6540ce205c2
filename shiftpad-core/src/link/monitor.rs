//! Link monitor implementation
//!
//! Compares the last liveness timestamp against a timeout and reports
//! transitions between connected and disconnected, once each.

/// Silence after which the shifter counts as disconnected
pub const DEFAULT_LINK_TIMEOUT_MS: u64 = 2000;

/// Link transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Liveness frames are arriving again (or for the first time)
    Restored,
    /// Nothing heard for longer than the timeout
    Lost,
}

/// Edge-triggered silence detector
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    timeout_ms: u64,
    connected: bool,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_TIMEOUT_MS)
    }
}

impl LinkMonitor {
    /// Create a monitor; the link starts out disconnected
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Evaluate the link at `now_ms`
    ///
    /// # Arguments
    /// - `last_seen_ms`: time of the last liveness frame, `None` if none yet
    ///
    /// Returns an event only on a transition.
    pub fn check(&mut self, now_ms: u64, last_seen_ms: Option<u64>) -> Option<LinkEvent> {
        // A timestamp newer than `now` (writer raced ahead) counts as fresh
        let alive = last_seen_ms
            .map(|seen| now_ms.saturating_sub(seen) <= self.timeout_ms)
            .unwrap_or(false);

        match (self.connected, alive) {
            (false, true) => {
                self.connected = true;
                Some(LinkEvent::Restored)
            }
            (true, false) => {
                self.connected = false;
                Some(LinkEvent::Lost)
            }
            _ => None,
        }
    }
}
