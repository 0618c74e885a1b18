//! View period resolution
//!
//! Turns a day/month/year selector plus an anchor date into the predicate
//! used by the stats aggregator, the chart bucketing key and month-end helpers.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Dashboard view granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPeriod {
    Daily,
    Monthly,
    Yearly,
}

impl ViewPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for ViewPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" => Ok(Self::Yearly),
            _ => Err(format!(
                "Unknown period: {} (valid: daily, monthly, yearly)",
                s
            )),
        }
    }
}

impl std::fmt::Display for ViewPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A view granularity anchored on a concrete date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub view: ViewPeriod,
    pub anchor: NaiveDate,
}

impl Period {
    pub fn new(view: ViewPeriod, anchor: NaiveDate) -> Self {
        Self { view, anchor }
    }

    pub fn daily(anchor: NaiveDate) -> Self {
        Self::new(ViewPeriod::Daily, anchor)
    }

    pub fn monthly(anchor: NaiveDate) -> Self {
        Self::new(ViewPeriod::Monthly, anchor)
    }

    pub fn yearly(anchor: NaiveDate) -> Self {
        Self::new(ViewPeriod::Yearly, anchor)
    }

    /// Parse a selector in the form the view uses: `YYYY-MM-DD` for daily,
    /// `YYYY-MM` for monthly (anchored on the 1st) and `YYYY` for yearly
    /// (anchored on January 1st). Monthly and yearly also accept a full date.
    pub fn from_selector(view: ViewPeriod, selector: &str) -> Result<Self> {
        let selector = selector.trim();
        let invalid = || ValidationError::InvalidPeriod(format!("{} {}", view, selector));

        if let Ok(date) = NaiveDate::parse_from_str(selector, "%Y-%m-%d") {
            return Ok(Self::new(view, date));
        }

        let anchor = match view {
            ViewPeriod::Daily => return Err(invalid().into()),
            ViewPeriod::Monthly => {
                NaiveDate::parse_from_str(&format!("{}-01", selector), "%Y-%m-%d")
                    .map_err(|_| invalid())?
            }
            ViewPeriod::Yearly => {
                let year: i32 = selector.parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?
            }
        };

        Ok(Self::new(view, anchor))
    }

    /// Whether a timestamp falls inside this period (UTC calendar)
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.contains_date(ts.date_naive())
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match self.view {
            ViewPeriod::Daily => date == self.anchor,
            ViewPeriod::Monthly => {
                date.year() == self.anchor.year() && date.month() == self.anchor.month()
            }
            ViewPeriod::Yearly => date.year() == self.anchor.year(),
        }
    }

    /// Whether a timestamp falls on the anchor day itself
    pub fn is_anchor_day(&self, ts: DateTime<Utc>) -> bool {
        ts.date_naive() == self.anchor
    }

    /// First and last day of the period, inclusive
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        match self.view {
            ViewPeriod::Daily => (self.anchor, self.anchor),
            ViewPeriod::Monthly => (first_day_of_month(self.anchor), last_day_of_month(self.anchor)),
            ViewPeriod::Yearly => {
                let year = self.anchor.year();
                (
                    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(self.anchor),
                    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(self.anchor),
                )
            }
        }
    }

    /// Start of the chart bucket a date belongs to
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self.view {
            ViewPeriod::Daily => date,
            ViewPeriod::Monthly => first_day_of_month(date),
            ViewPeriod::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// Chart bucket label: `YYYY-MM-DD`, `YYYY-M` or `YYYY`
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self.view {
            ViewPeriod::Daily => date.format("%Y-%m-%d").to_string(),
            ViewPeriod::Monthly => format!("{}-{}", date.year(), date.month()),
            ViewPeriod::Yearly => date.year().to_string(),
        }
    }

    /// Inverse of [`Period::from_selector`]
    pub fn selector(&self) -> String {
        match self.view {
            ViewPeriod::Daily => self.anchor.format("%Y-%m-%d").to_string(),
            ViewPeriod::Monthly => self.anchor.format("%Y-%m").to_string(),
            ViewPeriod::Yearly => self.anchor.year().to_string(),
        }
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date == last_day_of_month(date)
}

/// `YYYY-MM` key identifying a calendar month
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_matches_only_anchor_day() {
        let period = Period::daily(date(2024, 3, 15));
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2023, 3, 15, 10, 0, 0).unwrap()));
    }

    #[test]
    fn test_monthly_requires_same_year() {
        let period = Period::monthly(date(2024, 3, 1));
        assert!(period.contains_date(date(2024, 3, 31)));
        assert!(!period.contains_date(date(2023, 3, 10)));
        assert!(!period.contains_date(date(2024, 4, 1)));
    }

    #[test]
    fn test_yearly_matches_whole_year() {
        let period = Period::yearly(date(2024, 6, 1));
        assert!(period.contains_date(date(2024, 1, 1)));
        assert!(period.contains_date(date(2024, 12, 31)));
        assert!(!period.contains_date(date(2025, 1, 1)));
    }

    #[test]
    fn test_from_selector() {
        let monthly = Period::from_selector(ViewPeriod::Monthly, "2024-02").unwrap();
        assert_eq!(monthly.anchor, date(2024, 2, 1));
        assert_eq!(monthly.selector(), "2024-02");

        let yearly = Period::from_selector(ViewPeriod::Yearly, "2023").unwrap();
        assert_eq!(yearly.anchor, date(2023, 1, 1));

        let daily = Period::from_selector(ViewPeriod::Daily, "2024-02-29").unwrap();
        assert_eq!(daily.anchor, date(2024, 2, 29));

        assert!(Period::from_selector(ViewPeriod::Daily, "2024-02").is_err());
        assert!(Period::from_selector(ViewPeriod::Monthly, "2024-13").is_err());
        assert!(Period::from_selector(ViewPeriod::Yearly, "next year").is_err());
    }

    #[test]
    fn test_bucket_keys() {
        let d = date(2024, 3, 5);
        assert_eq!(Period::daily(d).bucket_key(d), "2024-03-05");
        assert_eq!(Period::monthly(d).bucket_key(d), "2024-3");
        assert_eq!(Period::yearly(d).bucket_key(d), "2024");
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(last_day_of_month(date(2023, 2, 10)), date(2023, 2, 28));
        assert_eq!(last_day_of_month(date(2024, 12, 1)), date(2024, 12, 31));
        assert!(is_last_day_of_month(date(2024, 4, 30)));
        assert!(!is_last_day_of_month(date(2024, 4, 29)));
    }

    #[test]
    fn test_monthly_bounds() {
        let (from, to) = Period::monthly(date(2024, 2, 14)).bounds();
        assert_eq!(from, date(2024, 2, 1));
        assert_eq!(to, date(2024, 2, 29));
    }
}
