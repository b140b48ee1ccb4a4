//! Sliding-window risk policy primitive.
//!
//! Every brute-force and burst check in the security engine is the same
//! question asked with different parameters: "how many qualifying events
//! fell inside the trailing window, and does that meet the threshold?"
//! [`SlidingWindow`] carries one window/threshold pair; each call site
//! builds its own from configuration.

use chrono::{DateTime, Duration, Utc};

/// A trailing time window paired with an event-count threshold.
///
/// The window is re-evaluated relative to a caller-supplied "now" on every
/// query; nothing about it is bucketed or cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingWindow {
    /// Length of the trailing window.
    pub window: Duration,
    /// Minimum number of events inside the window for the policy to fire.
    pub threshold: u32,
}

/// Outcome of evaluating an event count against a [`SlidingWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvaluation {
    /// Number of qualifying events observed in the window.
    pub count: u64,
    /// The threshold the count was compared against.
    pub threshold: u32,
    /// Whether the threshold is met.
    pub met: bool,
}

impl SlidingWindow {
    /// Create a window/threshold pair.
    pub fn new(window: Duration, threshold: u32) -> Self {
        Self { window, threshold }
    }

    /// The earliest instant still inside the window, relative to `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// Whether `count` events meet the threshold.
    pub fn is_met(&self, count: u64) -> bool {
        count >= u64::from(self.threshold)
    }

    /// Evaluate a count, keeping the inputs alongside the verdict.
    pub fn evaluate(&self, count: u64) -> WindowEvaluation {
        WindowEvaluation {
            count,
            threshold: self.threshold,
            met: self.is_met(count),
        }
    }

    /// Count how many of `timestamps` fall inside the window ending at `now`.
    ///
    /// Events exactly on the cutoff are counted as inside.
    pub fn count_within(&self, timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> u64 {
        let cutoff = self.cutoff(now);
        timestamps.iter().filter(|t| **t >= cutoff).count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let w = SlidingWindow::new(Duration::minutes(15), 5);
        assert!(!w.is_met(4));
        assert!(w.is_met(5));
        assert!(w.is_met(6));
    }

    #[test]
    fn test_cutoff_trails_now() {
        let w = SlidingWindow::new(Duration::minutes(15), 5);
        assert_eq!(w.cutoff(at(20)), at(5));
    }

    #[test]
    fn test_count_within_excludes_aged_out_events() {
        let w = SlidingWindow::new(Duration::seconds(60), 3);
        let stamps = vec![at(0), at(0), at(1)];
        // All three inside a window ending just after the last event.
        assert_eq!(w.count_within(&stamps, at(1)), 3);
        // Two minutes later the first two have aged out.
        assert_eq!(w.count_within(&stamps, at(2)), 1);
    }

    #[test]
    fn test_evaluate_carries_inputs() {
        let w = SlidingWindow::new(Duration::hours(1), 5);
        let eval = w.evaluate(7);
        assert_eq!(eval.count, 7);
        assert_eq!(eval.threshold, 5);
        assert!(eval.met);
    }
}
