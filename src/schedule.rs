//! weekly installment schedule arithmetic
//!
//! The period length is fixed at seven days. All arithmetic is exact on
//! instants, anchored on the loan's due date rather than on "now", so a
//! schedule never drifts off its original weekday and time.

use chrono::{DateTime, Duration, Utc};

/// length of one installment period in days
pub const INSTALLMENT_PERIOD_DAYS: i64 = 7;

/// one installment period
pub fn installment_period() -> Duration {
    Duration::days(INSTALLMENT_PERIOD_DAYS)
}

/// move a due date forward by `periods` whole periods
pub fn advance_periods(date: DateTime<Utc>, periods: u32) -> DateTime<Utc> {
    date + installment_period() * periods as i32
}

/// number of whole periods elapsed from `from` to `to`, zero when `to <= from`
pub fn whole_periods_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    if to <= from {
        return 0;
    }

    // period boundaries are whole milliseconds, so truncating sub-millisecond
    // precision never crosses one
    let elapsed_ms = (to - from).num_milliseconds();
    let period_ms = installment_period().num_milliseconds();

    u32::try_from(elapsed_ms / period_ms).unwrap_or(u32::MAX)
}

/// first due date of a freshly originated loan
pub fn first_due_date(origination: DateTime<Utc>) -> DateTime<Utc> {
    advance_periods(origination, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_advance_periods() {
        assert_eq!(advance_periods(due(), 0), due());
        assert_eq!(advance_periods(due(), 1), Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap());
        assert_eq!(advance_periods(due(), 4), Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_whole_periods_boundaries() {
        let d = due();

        assert_eq!(whole_periods_between(d, d), 0);
        assert_eq!(whole_periods_between(d, d - Duration::days(30)), 0);
        assert_eq!(whole_periods_between(d, d + Duration::seconds(1)), 0);
        assert_eq!(whole_periods_between(d, d + Duration::days(7) - Duration::seconds(1)), 0);
        assert_eq!(whole_periods_between(d, d + Duration::days(7)), 1);
        assert_eq!(whole_periods_between(d, d + Duration::days(7) + Duration::seconds(1)), 1);
        assert_eq!(whole_periods_between(d, d + Duration::days(14) - Duration::nanoseconds(1)), 1);
        assert_eq!(whole_periods_between(d, d + Duration::days(15)), 2);
        assert_eq!(whole_periods_between(d, d + Duration::days(70)), 10);
    }

    #[test]
    fn test_first_due_date() {
        let origination = Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap();
        assert_eq!(first_due_date(origination), Utc.with_ymd_and_hms(2024, 1, 8, 9, 30, 0).unwrap());
    }
}
