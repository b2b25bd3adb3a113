//! Wall time and call counts per solver section.

use std::time::{Duration, Instant};

/// Time spent in one section and how often it was entered.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SectionStats {
    pub elapsed: Duration,
    pub calls: usize,
}

impl SectionStats {
    /// Start timing one call; it is recorded when the returned timer drops.
    pub fn start(&mut self) -> SectionTimer<'_> {
        SectionTimer { start: Instant::now(), stats: self }
    }

    /// Record one call that took `dt`.
    pub fn record(&mut self, dt: Duration) {
        self.elapsed += dt;
        self.calls += 1;
    }

    pub fn millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Per-section statistics of one solve.
#[derive(Debug, Default, Clone)]
pub struct PerfTimers {
    pub cost: SectionStats,
    pub gradient: SectionStats,
    pub hessian: SectionStats,
    pub retraction: SectionStats,
    /// One call per truncated-CG solve
    pub subproblem: SectionStats,
}

/// Records a call into its [`SectionStats`] on drop.
pub struct SectionTimer<'a> {
    start: Instant,
    stats: &'a mut SectionStats,
}

impl Drop for SectionTimer<'_> {
    fn drop(&mut self) {
        self.stats.record(self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_one_call_per_drop() {
        let mut timers = PerfTimers::default();
        {
            let _t = timers.cost.start();
        }
        for _ in 0..2 {
            let _t = timers.hessian.start();
        }
        timers.hessian.record(Duration::from_millis(2));
        timers.retraction.record(Duration::from_millis(1));

        assert_eq!(timers.cost.calls, 1);
        assert_eq!(timers.gradient, SectionStats::default());
        assert_eq!(timers.hessian.calls, 3);
        assert!(timers.hessian.elapsed >= Duration::from_millis(2));
        assert_eq!(timers.retraction.elapsed, Duration::from_millis(1));
        assert_eq!(timers.retraction.millis(), 1);
    }
}
