//! Recurrence frequencies.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often a recurring definition generates an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every 7 days.
    Weekly,
    /// Every calendar month.
    Monthly,
    /// Every 3 calendar months.
    Quarterly,
    /// Every 12 calendar months.
    Yearly,
}

impl Frequency {
    /// Advances a date by one period.
    ///
    /// Month-based frequencies clamp to the end of the target month
    /// (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn advance(self, from: NaiveDate) -> NaiveDate {
        let advanced = match self {
            Self::Daily => from.checked_add_days(Days::new(1)),
            Self::Weekly => from.checked_add_days(Days::new(7)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
            Self::Quarterly => from.checked_add_months(Months::new(3)),
            Self::Yearly => from.checked_add_months(Months::new(12)),
        };
        // Only reachable at the edge of the calendar's representable range.
        advanced.unwrap_or(NaiveDate::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(Frequency::Daily, date(2026, 1, 15), date(2026, 1, 16))]
    #[case(Frequency::Weekly, date(2026, 1, 15), date(2026, 1, 22))]
    #[case(Frequency::Monthly, date(2026, 1, 15), date(2026, 2, 15))]
    #[case(Frequency::Quarterly, date(2026, 1, 15), date(2026, 4, 15))]
    #[case(Frequency::Yearly, date(2026, 1, 15), date(2027, 1, 15))]
    fn test_advance(
        #[case] frequency: Frequency,
        #[case] from: NaiveDate,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(frequency.advance(from), expected);
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        assert_eq!(
            Frequency::Monthly.advance(date(2026, 1, 31)),
            date(2026, 2, 28)
        );
        // Leap year
        assert_eq!(
            Frequency::Monthly.advance(date(2028, 1, 31)),
            date(2028, 2, 29)
        );
    }

    #[test]
    fn test_yearly_over_leap_day() {
        assert_eq!(
            Frequency::Yearly.advance(date(2028, 2, 29)),
            date(2029, 2, 28)
        );
    }

    #[test]
    fn test_daily_over_month_boundary() {
        assert_eq!(Frequency::Daily.advance(date(2026, 1, 31)), date(2026, 2, 1));
    }
}
