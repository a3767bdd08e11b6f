//! Gestational age calculation from the last menstrual period.
//!
//! Everything here is pure calendar-day arithmetic: the caller supplies
//! "today" explicitly, so the same `(lmp, today)` pair always yields the same
//! result. Only [`compute_today`] reads the system clock.

use chrono::{DateTime, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{GestationError, GestationResult};

/// Length of a full-term pregnancy in days (Naegele's rule, 40 weeks).
pub const FULL_TERM_DAYS: i64 = 280;

/// Full term expressed in weeks.
pub const FULL_TERM_WEEKS: i64 = FULL_TERM_DAYS / 7;

/// First completed week that counts as second trimester.
pub const SECOND_TRIMESTER_WEEK: i64 = 13;

/// First completed week that counts as third trimester.
pub const THIRD_TRIMESTER_WEEK: i64 = 27;

/// Pregnancy trimester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    /// Classify by completed weeks. Negative weeks fall in the first trimester.
    pub fn from_weeks(weeks: i64) -> Self {
        if weeks >= THIRD_TRIMESTER_WEEK {
            Trimester::Third
        } else if weeks >= SECOND_TRIMESTER_WEEK {
            Trimester::Second
        } else {
            Trimester::First
        }
    }

    /// Trimester number (1, 2 or 3).
    pub fn number(self) -> u8 {
        match self {
            Trimester::First => 1,
            Trimester::Second => 2,
            Trimester::Third => 3,
        }
    }

    /// Display label, e.g. "Second Trimester".
    pub fn label(self) -> &'static str {
        match self {
            Trimester::First => "First Trimester",
            Trimester::Second => "Second Trimester",
            Trimester::Third => "Third Trimester",
        }
    }
}

impl From<Trimester> for u8 {
    fn from(trimester: Trimester) -> Self {
        trimester.number()
    }
}

impl TryFrom<u8> for Trimester {
    type Error = GestationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Trimester::First),
            2 => Ok(Trimester::Second),
            3 => Ok(Trimester::Third),
            other => Err(GestationError::InvalidTrimester(other)),
        }
    }
}

/// Gestational age of a pregnancy on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationalAge {
    /// Completed weeks, `floor(total_days / 7)`
    pub weeks: i64,
    /// Days past the last completed week, always in `0..=6`
    pub days: i64,
    /// Calendar days from LMP to today; negative for a future LMP
    pub total_days: i64,
    /// Trimester derived from `weeks`
    pub trimester: Trimester,
    /// Estimated due date (LMP + 280 days)
    pub due_date: NaiveDate,
    /// True once more than 280 days have passed
    pub is_overdue: bool,
}

impl GestationalAge {
    /// Progress towards full term in percent, capped at 100.
    ///
    /// Not clamped below zero: a future LMP gives a negative value.
    pub fn progress_percent(&self) -> f64 {
        (self.total_days as f64 / FULL_TERM_DAYS as f64 * 100.0).min(100.0)
    }

    /// True when the LMP lies after the reference day.
    pub fn is_future(&self) -> bool {
        self.total_days < 0
    }
}

/// Compute gestational age for `lmp` as seen on `today`.
///
/// Total over every pair of representable dates.
pub fn compute(lmp: NaiveDate, today: NaiveDate) -> GestationalAge {
    let total_days = today.signed_duration_since(lmp).num_days();
    let weeks = total_days.div_euclid(7);
    let days = total_days.rem_euclid(7);

    GestationalAge {
        weeks,
        days,
        total_days,
        trimester: Trimester::from_weeks(weeks),
        due_date: due_date(lmp),
        is_overdue: total_days > FULL_TERM_DAYS,
    }
}

/// Compute gestational age against the local system date.
pub fn compute_today(lmp: NaiveDate) -> GestationalAge {
    compute(lmp, Local::now().date_naive())
}

/// Estimated due date for an LMP.
///
/// Saturates at `NaiveDate::MAX` for LMPs within 280 days of the end of the
/// calendar.
pub fn due_date(lmp: NaiveDate) -> NaiveDate {
    lmp.checked_add_days(Days::new(FULL_TERM_DAYS as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Parse an LMP string.
///
/// Accepts `yyyy-MM-dd`, or an RFC 3339 timestamp whose time-of-day is
/// dropped.
pub fn parse_lmp(input: &str) -> GestationResult<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| GestationError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_same_day() {
        let age = compute(date("2024-01-01"), date("2024-01-01"));

        assert_eq!(age.total_days, 0);
        assert_eq!(age.weeks, 0);
        assert_eq!(age.days, 0);
        assert_eq!(age.trimester, Trimester::First);
        assert_eq!(age.due_date, date("2024-10-07"));
        assert!(!age.is_overdue);
    }

    #[test]
    fn test_fourteen_weeks() {
        let age = compute(date("2024-01-01"), date("2024-04-08"));

        assert_eq!(age.total_days, 98);
        assert_eq!(age.weeks, 14);
        assert_eq!(age.days, 0);
        assert_eq!(age.trimester, Trimester::Second);
    }

    #[test]
    fn test_one_year_overdue() {
        let age = compute(date("2023-01-01"), date("2024-01-01"));

        assert_eq!(age.total_days, 365);
        assert_eq!(age.days, 1);
        assert_eq!(age.weeks, 52);
        assert!(age.is_overdue);
        assert_eq!(age.trimester, Trimester::Third);
    }

    #[test]
    fn test_trimester_boundaries() {
        assert_eq!(Trimester::from_weeks(12), Trimester::First);
        assert_eq!(Trimester::from_weeks(13), Trimester::Second);
        assert_eq!(Trimester::from_weeks(26), Trimester::Second);
        assert_eq!(Trimester::from_weeks(27), Trimester::Third);
        assert_eq!(Trimester::from_weeks(-3), Trimester::First);
    }

    #[test]
    fn test_overdue_boundary() {
        let lmp = date("2024-01-01");

        let at_term = compute(lmp, date("2024-10-07"));
        assert_eq!(at_term.total_days, 280);
        assert!(!at_term.is_overdue);

        let past_term = compute(lmp, date("2024-10-08"));
        assert_eq!(past_term.total_days, 281);
        assert!(past_term.is_overdue);
    }

    #[test]
    fn test_future_lmp_uses_floor_division() {
        let age = compute(date("2024-01-02"), date("2024-01-01"));

        assert_eq!(age.total_days, -1);
        assert_eq!(age.weeks, -1);
        assert_eq!(age.days, 6);
        assert_eq!(age.trimester, Trimester::First);
        assert!(age.is_future());
        assert!(!age.is_overdue);
    }

    #[test]
    fn test_leap_day_counted() {
        let age = compute(date("2024-02-28"), date("2024-03-01"));
        assert_eq!(age.total_days, 2);
    }

    #[test]
    fn test_progress_percent() {
        let lmp = date("2024-01-01");

        assert_eq!(compute(lmp, lmp).progress_percent(), 0.0);
        assert_eq!(compute(lmp, date("2024-05-20")).progress_percent(), 50.0);
        assert_eq!(compute(lmp, date("2025-01-01")).progress_percent(), 100.0);
        assert!(compute(lmp, date("2023-12-25")).progress_percent() < 0.0);
    }

    #[test]
    fn test_due_date_saturates() {
        assert_eq!(due_date(NaiveDate::MAX), NaiveDate::MAX);

        // Must not panic at the edges of the calendar.
        let age = compute(NaiveDate::MIN, NaiveDate::MAX);
        assert!(age.is_overdue);
        assert!((0..7).contains(&age.days));
    }

    #[test]
    fn test_parse_lmp() {
        assert_eq!(parse_lmp("2024-01-01").unwrap(), date("2024-01-01"));
        assert_eq!(parse_lmp(" 2024-01-01 ").unwrap(), date("2024-01-01"));
        assert_eq!(
            parse_lmp("2024-01-01T23:30:00+00:00").unwrap(),
            date("2024-01-01")
        );
        assert!(matches!(
            parse_lmp("01/01/2024"),
            Err(GestationError::InvalidDate(_))
        ));
        assert!(parse_lmp("2024-02-30").is_err());
    }

    #[test]
    fn test_trimester_serializes_as_number() {
        let json = serde_json::to_string(&Trimester::Second).unwrap();
        assert_eq!(json, "2");

        let parsed: Trimester = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, Trimester::Third);
        assert!(serde_json::from_str::<Trimester>("4").is_err());
    }
}
