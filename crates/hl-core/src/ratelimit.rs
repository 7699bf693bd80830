//! Minimum-interval rate limiting for transformation passes

/// Decide whether a pass may run at `now_ms`
///
/// True when there is no previous run or at least `min_interval_ms` has
/// elapsed since it. A clock that went backwards never permits a run.
pub fn should_run(now_ms: u64, last_ms: Option<u64>, min_interval_ms: u64) -> bool {
    match last_ms {
        None => true,
        Some(last) => now_ms
            .checked_sub(last)
            .is_some_and(|elapsed| elapsed >= min_interval_ms),
    }
}

/// Rate limiter holding the last accepted timestamp
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval_ms: u64,
    last_ms: Option<u64>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum interval
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_ms: None,
        }
    }

    /// Whether a pass may run now (does not record anything)
    pub fn permits(&self, now_ms: u64) -> bool {
        should_run(now_ms, self.last_ms, self.min_interval_ms)
    }

    /// Record that a pass ran at `now_ms`
    pub fn record(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    /// Timestamp of the last recorded pass
    pub fn last(&self) -> Option<u64> {
        self.last_ms
    }

    /// Configured minimum interval
    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_allowed() {
        assert!(should_run(1000, None, 200));
    }

    #[test]
    fn test_too_fast_blocked() {
        assert!(!should_run(1100, Some(1000), 200));
    }

    #[test]
    fn test_interval_elapsed() {
        assert!(should_run(1300, Some(1000), 200));
        assert!(should_run(1200, Some(1000), 200));
    }

    #[test]
    fn test_clock_went_backwards() {
        assert!(!should_run(900, Some(1000), 0));
    }

    #[test]
    fn test_limiter_bookkeeping() {
        let mut limiter = RateLimiter::new(200);
        assert!(limiter.permits(0));
        limiter.record(0);
        assert!(!limiter.permits(150));
        assert!(limiter.permits(200));
        assert_eq!(limiter.last(), Some(0));
    }
}
