//! Arrival-rate measurement over a sliding window of timestamps.
//!
//! Used to estimate how often a topic is being published to — e.g. how
//! many velocity commands per second a controller is issuing — without
//! looking at payloads at all.

/// Sliding-window frequency estimator.
///
/// Keeps the last `window` arrival timestamps (nanoseconds) in a ring;
/// the measured rate is `(count - 1) / (newest - oldest)`.
pub struct RateMeter {
    stamps: Vec<u64>,
    window: usize,
    next: usize,
    count: usize,
}

impl RateMeter {
    /// Create a meter with the given window size (minimum 2).
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            stamps: vec![0; window],
            window,
            next: 0,
            count: 0,
        }
    }

    /// Record one arrival. Stamps older than the newest seen are ignored
    /// so a reordered batch cannot corrupt the window span.
    pub fn observe(&mut self, stamp_ns: u64) {
        if self.count > 0 {
            let newest = self.stamps[(self.next + self.window - 1) % self.window];
            if stamp_ns < newest {
                return;
            }
        }
        self.stamps[self.next] = stamp_ns;
        self.next = (self.next + 1) % self.window;
        if self.count < self.window {
            self.count += 1;
        }
    }

    /// Number of arrivals currently in the window.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Measured arrival rate in Hz.
    ///
    /// Returns 0.0 with fewer than two arrivals, or when all arrivals in
    /// the window carry the same timestamp.
    pub fn rate_hz(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let newest = self.stamps[(self.next + self.window - 1) % self.window];
        let oldest = if self.count < self.window {
            self.stamps[0]
        } else {
            self.stamps[self.next]
        };
        let span_ns = newest.saturating_sub(oldest);
        if span_ns == 0 {
            return 0.0;
        }
        (self.count as f64 - 1.0) / (span_ns as f64 / 1e9)
    }

    /// Forget all recorded arrivals.
    pub fn reset(&mut self) {
        self.next = 0;
        self.count = 0;
    }
}
