//! Residual-time bookkeeping for the fixed logging interval.

use embassy_time::Duration;

/// Millisecond counter that is monotonic until it wraps at `u32::MAX`.
pub trait Clock {
    fn now_millis(&self) -> u32;
}

/// Time left in the current logging interval. Never negative, never longer than the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalBudget(u32);

impl IntervalBudget {
    pub const ZERO: Self = Self(0);

    pub fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<IntervalBudget> for Duration {
    fn from(budget: IntervalBudget) -> Self {
        Duration::from_millis(u64::from(budget.0))
    }
}

/// Time left in an interval of `interval_ms` that started at `start` and was last sampled at
/// `end`.
///
/// * `end <= start`: the counter wrapped, so assume the whole interval is still ahead.
/// * elapsed `>= interval_ms`: the cycle overran, proceed immediately.
/// * otherwise the remainder.
pub fn remaining_budget(start: u32, end: u32, interval_ms: u32) -> IntervalBudget {
    if end <= start {
        return IntervalBudget(interval_ms);
    }
    let elapsed = end - start;
    if elapsed >= interval_ms {
        IntervalBudget::ZERO
    } else {
        IntervalBudget(interval_ms - elapsed)
    }
}
