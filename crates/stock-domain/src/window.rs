//! Reporting date ranges.

use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Inclusive range of calendar dates used by reports.
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        if end < start {
            return Err(DateWindowError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when constructing [`DateWindow`] values.
pub enum DateWindowError {
    InvalidRange,
}

impl fmt::Display for DateWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindowError::InvalidRange => f.write_str("date window end must not precede start"),
        }
    }
}

impl std::error::Error for DateWindowError {}

/// Quick filters offered by the analytics screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangePreset {
    Last7Days,
    LastMonth,
    Last3Months,
    Last6Months,
    LastYear,
    All,
}

impl RangePreset {
    /// Resolves the preset relative to `today`. `All` has no bounds.
    pub fn window(&self, today: NaiveDate) -> Option<DateWindow> {
        let start = match self {
            RangePreset::Last7Days => today.checked_sub_days(Days::new(7)),
            RangePreset::LastMonth => today.checked_sub_months(Months::new(1)),
            RangePreset::Last3Months => today.checked_sub_months(Months::new(3)),
            RangePreset::Last6Months => today.checked_sub_months(Months::new(6)),
            RangePreset::LastYear => today.checked_sub_months(Months::new(12)),
            RangePreset::All => None,
        }?;
        Some(DateWindow { start, end: today })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::Last7Days => "7days",
            RangePreset::LastMonth => "1month",
            RangePreset::Last3Months => "3months",
            RangePreset::Last6Months => "6months",
            RangePreset::LastYear => "1year",
            RangePreset::All => "all",
        }
    }
}

impl FromStr for RangePreset {
    type Err = DateWindowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "7days" | "week" => Ok(RangePreset::Last7Days),
            "1month" | "month" => Ok(RangePreset::LastMonth),
            "3months" => Ok(RangePreset::Last3Months),
            "6months" => Ok(RangePreset::Last6Months),
            "1year" | "year" => Ok(RangePreset::LastYear),
            "all" => Ok(RangePreset::All),
            _ => Err(DateWindowError::InvalidRange),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let window = DateWindow::new(start, end).unwrap();
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(DateWindow::new(end, start).is_err());
    }

    #[test]
    fn presets_resolve_against_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let month = RangePreset::LastMonth.window(today).unwrap();
        assert_eq!(month.start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(month.end, today);
        assert!(RangePreset::All.window(today).is_none());
        assert_eq!("7days".parse::<RangePreset>(), Ok(RangePreset::Last7Days));
    }
}
