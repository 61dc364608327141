//! Key expirations
//!
//! The store only understands whole seconds (EXPIRE key seconds). Callers
//! describe an expiry in any unit; it is converted once, right before the
//! command is built.

use std::time::Duration;

/// Unit of an expiry amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    #[default]
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Whole seconds in `amount` of this unit, truncated toward zero
    fn to_whole_seconds(self, amount: i64) -> i64 {
        match self {
            TimeUnit::Nanoseconds => amount / 1_000_000_000,
            TimeUnit::Microseconds => amount / 1_000_000,
            TimeUnit::Milliseconds => amount / 1_000,
            TimeUnit::Seconds => amount,
            TimeUnit::Minutes => amount.saturating_mul(60),
            TimeUnit::Hours => amount.saturating_mul(60 * 60),
            TimeUnit::Days => amount.saturating_mul(60 * 60 * 24),
        }
    }
}

/// An expiry to attach to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    amount: i64,
    unit: TimeUnit,
}

impl Expiry {
    pub fn new(amount: i64, unit: TimeUnit) -> Self {
        Expiry { amount, unit }
    }

    pub fn millis(amount: i64) -> Self {
        Self::new(amount, TimeUnit::Milliseconds)
    }

    pub fn seconds(amount: i64) -> Self {
        Self::new(amount, TimeUnit::Seconds)
    }

    pub fn minutes(amount: i64) -> Self {
        Self::new(amount, TimeUnit::Minutes)
    }

    pub fn hours(amount: i64) -> Self {
        Self::new(amount, TimeUnit::Hours)
    }

    pub fn days(amount: i64) -> Self {
        Self::new(amount, TimeUnit::Days)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Seconds to pass to EXPIRE
    ///
    /// Never below one: a sub-second or non-positive expiry still expires the
    /// key after one second instead of deleting it or leaving it forever.
    pub fn as_seconds(&self) -> u64 {
        let secs = self.unit.to_whole_seconds(self.amount);
        if secs <= 0 {
            1
        } else {
            secs as u64
        }
    }
}

impl From<Duration> for Expiry {
    fn from(d: Duration) -> Self {
        let millis = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        Expiry::millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert_eq!(Expiry::millis(5_000).as_seconds(), 5);
        assert_eq!(Expiry::seconds(42).as_seconds(), 42);
        assert_eq!(Expiry::minutes(2).as_seconds(), 120);
        assert_eq!(Expiry::hours(1).as_seconds(), 3_600);
        assert_eq!(Expiry::days(1).as_seconds(), 86_400);
        assert_eq!(Expiry::new(3_000_000, TimeUnit::Microseconds).as_seconds(), 3);
        assert_eq!(Expiry::new(2_000_000_000, TimeUnit::Nanoseconds).as_seconds(), 2);
    }

    #[test]
    fn test_truncates_partial_seconds() {
        assert_eq!(Expiry::millis(1_999).as_seconds(), 1);
        assert_eq!(Expiry::millis(2_500).as_seconds(), 2);
    }

    #[test]
    fn test_sub_second_rounds_up_to_one() {
        assert_eq!(Expiry::millis(500).as_seconds(), 1);
        assert_eq!(Expiry::new(10, TimeUnit::Nanoseconds).as_seconds(), 1);
    }

    #[test]
    fn test_non_positive_becomes_one() {
        assert_eq!(Expiry::millis(0).as_seconds(), 1);
        assert_eq!(Expiry::seconds(-30).as_seconds(), 1);
        assert_eq!(Expiry::minutes(-1).as_seconds(), 1);
    }

    #[test]
    fn test_from_duration() {
        let expiry = Expiry::from(Duration::from_secs(90));
        assert_eq!(expiry.unit(), TimeUnit::Milliseconds);
        assert_eq!(expiry.as_seconds(), 90);
        assert_eq!(Expiry::from(Duration::from_millis(10)).as_seconds(), 1);
    }

    #[test]
    fn test_default_unit_is_millis() {
        assert_eq!(TimeUnit::default(), TimeUnit::Milliseconds);
    }
}
