//! Inclusive calendar-date ranges used by every reporting query.
use chrono::{Days, Local, NaiveDate};

/// An inclusive `[start, end]` range of calendar dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Build a range from optional bounds.
    ///
    /// Reporting endpoints treat missing bounds as "the trailing 30 days":
    /// if either bound is absent the whole range defaults to
    /// `[today - 29 days, today]`.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => Self { start, end },
            _ => Self::trailing_month(),
        }
    }

    /// The default window: 30 days ending today.
    pub fn trailing_month() -> Self {
        let end = Local::now().date_naive();
        let start = end - Days::new(29);
        Self { start, end }
    }

    /// Number of days spanned, start and end included.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days().abs() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn explicit_bounds_are_kept() {
        let range = DateRange::from_bounds(Some(day("2025-09-01")), Some(day("2025-09-10")));
        assert_eq!(range.start, day("2025-09-01"));
        assert_eq!(range.end, day("2025-09-10"));
        assert_eq!(range.span_days(), 10);
    }

    #[test]
    fn missing_bound_defaults_to_trailing_month() {
        let range = DateRange::from_bounds(Some(day("2025-09-01")), None);
        assert_eq!(range.span_days(), 30);
        assert_eq!(range.end, Local::now().date_naive());
    }

    #[test]
    fn contains_is_inclusive() {
        let range = DateRange::new(day("2025-09-01"), day("2025-09-10"));
        assert!(range.contains(day("2025-09-01")));
        assert!(range.contains(day("2025-09-10")));
        assert!(!range.contains(day("2025-09-11")));
    }
}
