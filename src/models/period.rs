//! Calendar month model and year/month keyed maps.
//!
//! Historical payroll data is stored as nested `year → month → value` maps.
//! [`PayMonth`] names one entry of such a map.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// A nested `year → month → value` map.
pub type YearMonthMap<T> = BTreeMap<i32, BTreeMap<u32, T>>;

/// A single calendar month.
///
/// Ordering is chronological.
///
/// # Example
///
/// ```
/// use ctc_breakdown::models::PayMonth;
///
/// let april = PayMonth::new(2025, 4).unwrap();
/// assert_eq!(april.to_string(), "2025-04");
/// assert_eq!(april.label(), "April 2025");
/// assert!(PayMonth::new(2024, 12).unwrap() < april);
/// assert!(PayMonth::new(2025, 13).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPayMonth", into = "RawPayMonth")]
pub struct PayMonth(NaiveDate);

/// Serialized `{year, month}` form of a [`PayMonth`].
#[derive(Serialize, Deserialize)]
struct RawPayMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawPayMonth> for PayMonth {
    type Error = EngineError;

    fn try_from(raw: RawPayMonth) -> EngineResult<Self> {
        PayMonth::new(raw.year, raw.month)
    }
}

impl From<PayMonth> for RawPayMonth {
    fn from(month: PayMonth) -> Self {
        Self {
            year: month.year(),
            month: month.month(),
        }
    }
}

impl PayMonth {
    /// Creates a pay month, rejecting months outside 1-12.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(EngineError::InvalidPeriod { year, month })
    }

    /// Returns the pay month containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The month, 1-12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Returns a human-readable label such as "April 2025".
    pub fn label(&self) -> String {
        format!("{} {}", self.0.format("%B"), self.year())
    }

    /// Reads the value stored for this month in a year/month map.
    pub fn lookup<'a, T>(&self, map: &'a YearMonthMap<T>) -> Option<&'a T> {
        map.get(&self.year())?.get(&self.month())
    }

    /// Stores a value for this month in a year/month map.
    pub fn insert<T>(&self, map: &mut YearMonthMap<T>, value: T) -> Option<T> {
        map.entry(self.year()).or_default().insert(self.month(), value)
    }
}

impl fmt::Display for PayMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_every_calendar_month() {
        for month in 1..=12 {
            assert!(PayMonth::new(2025, month).is_ok());
        }
    }

    #[test]
    fn test_new_rejects_invalid_months() {
        match PayMonth::new(2025, 0) {
            Err(EngineError::InvalidPeriod { year, month }) => {
                assert_eq!(year, 2025);
                assert_eq!(month, 0);
            }
            other => panic!("Expected InvalidPeriod error, got {:?}", other),
        }
        assert!(PayMonth::new(2025, 13).is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let dec_2024 = PayMonth::new(2024, 12).unwrap();
        let jan_2025 = PayMonth::new(2025, 1).unwrap();
        let mar_2025 = PayMonth::new(2025, 3).unwrap();
        assert!(dec_2024 < jan_2025);
        assert!(jan_2025 < mar_2025);
    }

    #[test]
    fn test_display_and_label() {
        let month = PayMonth::new(2026, 1).unwrap();
        assert_eq!(month.to_string(), "2026-01");
        assert_eq!(month.label(), "January 2026");
        assert_eq!(
            month.first_day(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_containing_date() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 17).unwrap();
        let month = PayMonth::containing(date);
        assert_eq!(month, PayMonth::new(2025, 8).unwrap());
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert_eq!(month.month(), 8);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut map: YearMonthMap<&str> = YearMonthMap::new();
        let month = PayMonth::new(2025, 4).unwrap();

        assert!(month.insert(&mut map, "standard").is_none());
        assert_eq!(month.lookup(&map), Some(&"standard"));
        assert_eq!(month.insert(&mut map, "metro"), Some("standard"));
        assert!(PayMonth::new(2025, 5).unwrap().lookup(&map).is_none());
    }

    #[test]
    fn test_serde_shape() {
        let month = PayMonth::new(2025, 4).unwrap();
        let json = serde_json::to_value(month).unwrap();
        assert_eq!(json, serde_json::json!({"year": 2025, "month": 4}));
    }

    #[test]
    fn test_deserialize_validates_month() {
        let month: PayMonth = serde_json::from_str(r#"{"year": 2025, "month": 4}"#).unwrap();
        assert_eq!(month, PayMonth::new(2025, 4).unwrap());
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());

        let err = serde_json::from_str::<PayMonth>(r#"{"year": 2025, "month": 13}"#).unwrap_err();
        assert!(err.to_string().contains("2025"));
        assert!(serde_json::from_str::<PayMonth>(r#"{"year": 2025, "month": 0}"#).is_err());
    }
}
