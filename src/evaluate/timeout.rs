//! Consecutive timeout tracking

use crate::checks::CheckState;

/// Consecutive timeouts after which a check is disabled
pub const DEFAULT_TIMEOUT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct TimeoutTracker {
    threshold: u32,
}

impl TimeoutTracker {
    /// A zero threshold falls back to [`DEFAULT_TIMEOUT_THRESHOLD`].
    pub fn new(threshold: u32) -> Self {
        let threshold = if threshold == 0 {
            DEFAULT_TIMEOUT_THRESHOLD
        } else {
            threshold
        };
        Self { threshold }
    }

    /// Returns the new counter and final state. Records without a counter
    /// pass through untouched.
    pub fn apply(
        &self,
        counter: Option<u32>,
        timed_out: bool,
        state: CheckState,
    ) -> (Option<u32>, CheckState) {
        let Some(previous) = counter else {
            return (None, state);
        };

        if !timed_out {
            return (Some(0), state);
        }

        let count = previous.saturating_add(1);
        if count >= self.threshold {
            (Some(count), CheckState::Disabled)
        } else {
            (Some(count), state)
        }
    }
}

impl Default for TimeoutTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disables_on_third_timeout() {
        let tracker = TimeoutTracker::default();
        let (c, s) = tracker.apply(Some(0), true, CheckState::TimedOut);
        assert_eq!((c, s), (Some(1), CheckState::TimedOut));
        let (c, s) = tracker.apply(c, true, CheckState::TimedOut);
        assert_eq!((c, s), (Some(2), CheckState::TimedOut));
        let (c, s) = tracker.apply(c, true, CheckState::TimedOut);
        assert_eq!((c, s), (Some(3), CheckState::Disabled));
    }

    #[test]
    fn test_reset_on_success() {
        let tracker = TimeoutTracker::default();
        assert_eq!(
            tracker.apply(Some(2), false, CheckState::Passing),
            (Some(0), CheckState::Passing)
        );
    }

    #[test]
    fn test_zero_threshold_uses_default() {
        let tracker = TimeoutTracker::new(0);
        let (c, s) = tracker.apply(Some(0), true, CheckState::TimedOut);
        assert_eq!((c, s), (Some(1), CheckState::TimedOut));
        let (c, s) = tracker.apply(Some(2), true, CheckState::TimedOut);
        assert_eq!((c, s), (Some(3), CheckState::Disabled));
    }

    #[test]
    fn test_threshold_of_one() {
        let tracker = TimeoutTracker::new(1);
        assert_eq!(
            tracker.apply(Some(0), true, CheckState::TimedOut),
            (Some(1), CheckState::Disabled)
        );
    }

    #[test]
    fn test_untracked_passes_through() {
        let tracker = TimeoutTracker::default();
        assert_eq!(
            tracker.apply(None, true, CheckState::TimedOut),
            (None, CheckState::TimedOut)
        );
    }
}
