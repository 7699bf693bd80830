//! Single-flight debounce scheduler

/// Holds at most one pending pass and the time it becomes due
#[derive(Debug, Clone)]
pub struct Scheduler {
    delay_ms: u64,
    due_ms: Option<u64>,
}

impl Scheduler {
    /// Create a scheduler with the given debounce delay
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            due_ms: None,
        }
    }

    /// Debounce delay
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Schedule a pass `delay_ms` after `now_ms`
    ///
    /// Returns false (and keeps the existing deadline) if one is pending.
    pub fn schedule(&mut self, now_ms: u64) -> bool {
        if self.due_ms.is_some() {
            return false;
        }
        self.due_ms = Some(now_ms.saturating_add(self.delay_ms));
        true
    }

    /// Whether a pass is pending
    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    /// When the pending pass is due
    pub fn deadline(&self) -> Option<u64> {
        self.due_ms
    }

    /// Consume the pending pass if it is due at `now_ms`
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending pass; returns whether one was pending
    pub fn cancel(&mut self) -> bool {
        self.due_ms.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let mut s = Scheduler::new(150);
        assert!(s.schedule(1000));
        assert!(!s.schedule(1100));
        assert_eq!(s.deadline(), Some(1150));
    }

    #[test]
    fn test_take_due() {
        let mut s = Scheduler::new(150);
        s.schedule(0);
        assert!(!s.take_due(149));
        assert!(s.take_due(150));
        assert!(!s.is_pending());
        assert!(!s.take_due(500));
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new(10);
        assert!(!s.cancel());
        s.schedule(0);
        assert!(s.cancel());
        assert!(!s.take_due(100));
    }
}
