//! crates/foodshare_core/src/expiry.rs
//!
//! Expiry severity classification and the injectable clock it depends on.
//! The classifier is a pure function of the day count, so the server and any
//! client re-evaluating after a mutation produce the same tier.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::sync::Mutex;

/// Severity tier for an item's remaining shelf life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryTier {
    /// Expired, or expiring today.
    Critical,
    /// 1-2 days left.
    Warning,
    /// 3-5 days left.
    Caution,
    /// More than 5 days left.
    Good,
}

impl ExpiryTier {
    /// Classifies a signed day count into a tier.
    pub fn classify(days_remaining: i64) -> ExpiryTier {
        match days_remaining {
            d if d <= 0 => ExpiryTier::Critical,
            1..=2 => ExpiryTier::Warning,
            3..=5 => ExpiryTier::Caution,
            _ => ExpiryTier::Good,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryTier::Critical => "critical",
            ExpiryTier::Warning => "warning",
            ExpiryTier::Caution => "caution",
            ExpiryTier::Good => "good",
        }
    }
}

impl fmt::Display for ExpiryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of "now" for expiry math and transition timestamps.
///
/// Injected rather than read from the environment so date-sensitive logic is
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance_days(&self, days: i64) {
        let mut guard = self.now.lock().unwrap();
        *guard += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn negative_and_zero_days_are_critical() {
        assert_eq!(ExpiryTier::classify(-30), ExpiryTier::Critical);
        assert_eq!(ExpiryTier::classify(-1), ExpiryTier::Critical);
        assert_eq!(ExpiryTier::classify(0), ExpiryTier::Critical);
    }

    #[test]
    fn boundary_between_critical_and_warning() {
        assert_eq!(ExpiryTier::classify(0), ExpiryTier::Critical);
        assert_eq!(ExpiryTier::classify(1), ExpiryTier::Warning);
        assert_eq!(ExpiryTier::classify(2), ExpiryTier::Warning);
    }

    #[test]
    fn boundary_between_warning_and_caution() {
        assert_eq!(ExpiryTier::classify(2), ExpiryTier::Warning);
        assert_eq!(ExpiryTier::classify(3), ExpiryTier::Caution);
        assert_eq!(ExpiryTier::classify(5), ExpiryTier::Caution);
    }

    #[test]
    fn six_days_and_beyond_are_good() {
        assert_eq!(ExpiryTier::classify(6), ExpiryTier::Good);
        assert_eq!(ExpiryTier::classify(365), ExpiryTier::Good);
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(
            clock.today(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        clock.advance_days(4);
        assert_eq!(
            clock.today(),
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
        );
    }
}
