//! Mission countdown
//!
//! The clock is computed from the session's start time and an explicit `now`,
//! so nothing here reads the system time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default mission length in seconds
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 600;

const WARNING_BELOW_SECS: u64 = 300;
const DANGER_BELOW_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    started_at: DateTime<Utc>,
    limit_secs: u64,
}

impl Countdown {
    pub fn new(started_at: DateTime<Utc>, limit_secs: u64) -> Self {
        Self {
            started_at,
            limit_secs,
        }
    }

    pub fn limit_secs(&self) -> u64 {
        self.limit_secs
    }

    /// Whole seconds since the start; a `now` before the start counts as zero
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let elapsed: Duration = now - self.started_at;
        u64::try_from(elapsed.num_seconds()).unwrap_or(0)
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        self.limit_secs.saturating_sub(self.elapsed_secs(now))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }

    pub fn urgency(&self, now: DateTime<Utc>) -> Urgency {
        let remaining = self.remaining_secs(now);
        if remaining <= DANGER_BELOW_SECS {
            Urgency::Danger
        } else if remaining <= WARNING_BELOW_SECS {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

/// `MM:SS`; minutes keep counting past 99
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 8, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn test_remaining_and_expiry() {
        let clock = Countdown::new(start(), DEFAULT_TIME_LIMIT_SECS);
        assert_eq!(clock.remaining_secs(start()), 600);
        assert_eq!(clock.remaining_secs(start() + Duration::seconds(45)), 555);
        assert!(!clock.is_expired(start() + Duration::seconds(599)));
        assert!(clock.is_expired(start() + Duration::seconds(600)));
        assert_eq!(clock.remaining_secs(start() + Duration::seconds(9000)), 0);
        assert_eq!(clock.elapsed_secs(start() - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_urgency_thresholds() {
        let clock = Countdown::new(start(), DEFAULT_TIME_LIMIT_SECS);
        assert_eq!(clock.urgency(start() + Duration::seconds(299)), Urgency::Normal);
        assert_eq!(clock.urgency(start() + Duration::seconds(300)), Urgency::Warning);
        assert_eq!(clock.urgency(start() + Duration::seconds(479)), Urgency::Warning);
        assert_eq!(clock.urgency(start() + Duration::seconds(480)), Urgency::Danger);
    }
}
