use chrono::{DateTime, Duration, Utc};

use crate::types::DueStatus;

/// default look-ahead for flagging an installment as upcoming
pub const DEFAULT_UPCOMING_WINDOW_DAYS: u32 = 3;

/// classifies a due date relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueStatusClassifier {
    pub upcoming_window: Duration,
}

impl DueStatusClassifier {
    pub fn new(upcoming_window: Duration) -> Self {
        Self { upcoming_window }
    }

    pub fn with_window_days(days: u32) -> Self {
        Self::new(Duration::days(days as i64))
    }

    /// overdue strictly after the due instant, upcoming within the window (inclusive)
    pub fn classify(&self, now: DateTime<Utc>, next_due_date: DateTime<Utc>) -> DueStatus {
        if now > next_due_date {
            DueStatus::Overdue
        } else if next_due_date - now <= self.upcoming_window {
            DueStatus::Upcoming
        } else {
            DueStatus::Normal
        }
    }
}

impl Default for DueStatusClassifier {
    fn default() -> Self {
        Self::with_window_days(DEFAULT_UPCOMING_WINDOW_DAYS)
    }
}

/// classify with the default three day window
pub fn classify(now: DateTime<Utc>, next_due_date: DateTime<Utc>) -> DueStatus {
    DueStatusClassifier::default().classify(now, next_due_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_overdue_after_due_instant() {
        let due = now() - Duration::seconds(1);
        assert_eq!(classify(now(), due), DueStatus::Overdue);
        assert_eq!(classify(now(), now() - Duration::days(40)), DueStatus::Overdue);
    }

    #[test]
    fn test_due_exactly_now_is_upcoming() {
        assert_eq!(classify(now(), now()), DueStatus::Upcoming);
    }

    #[test]
    fn test_upcoming_window_is_inclusive() {
        assert_eq!(classify(now(), now() + Duration::days(3)), DueStatus::Upcoming);
        assert_eq!(
            classify(now(), now() + Duration::days(3) + Duration::seconds(1)),
            DueStatus::Normal
        );
        assert_eq!(classify(now(), now() + Duration::days(7)), DueStatus::Normal);
    }

    #[test]
    fn test_custom_window() {
        let classifier = DueStatusClassifier::with_window_days(1);
        assert_eq!(classifier.classify(now(), now() + Duration::hours(20)), DueStatus::Upcoming);
        assert_eq!(classifier.classify(now(), now() + Duration::days(2)), DueStatus::Normal);
    }
}
