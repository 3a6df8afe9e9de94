//! Calendar month keys in the `YYYY-MM` wire format.
//!
//! Ordering is chronological and agrees with the lexical order of the
//! formatted keys, so stored keys can be compared either way.

use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{LedgerError, Result};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// build from parts; month must be 1..=12 and year 1..=9999
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidMonthKey {
                value: format!("{}-{}", year, month),
            });
        }
        Ok(Self { year, month })
    }

    /// strict `YYYY-MM` parse
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || LedgerError::InvalidMonthKey { value: raw.to_string() };

        let bytes = raw.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year_part, month_part) = (&raw[..4], &raw[5..]);
        if !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// month containing `date`; dates outside years 1..=9999 have no key
    pub fn from_date(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), date.month()).map_err(|_| LedgerError::InvalidDate {
            message: format!("{} is outside the supported calendar range", date),
        })
    }

    /// month containing the provider's current instant
    pub fn current(time_provider: &SafeTimeProvider) -> Result<Self> {
        Self::from_date(time_provider.now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// immediately preceding calendar month; january rolls back to december.
    /// `None` before 0001-01
    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year - 1, 12).ok()
        } else {
            Some(Self { year: self.year, month: self.month - 1 })
        }
    }

    /// `None` after 9999-12
    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1).ok()
        } else {
            Some(Self { year: self.year, month: self.month + 1 })
        }
    }

    /// first calendar day of the month
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// e.g. "March 2025"
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }

    /// january through december of a year
    pub fn months_of_year(year: i32) -> Result<Vec<MonthKey>> {
        (1..=12).map(|month| MonthKey::new(year, month)).collect()
    }

    /// inclusive range from `self` to `end`, empty when `end` precedes `self`
    pub fn through(self, end: MonthKey) -> Vec<MonthKey> {
        let mut months = Vec::new();
        let mut cursor = Some(self);
        while let Some(month) = cursor.filter(|m| *m <= end) {
            months.push(month);
            cursor = month.next();
        }
        months
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        MonthKey::parse(s)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        MonthKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    #[test]
    fn test_parse_and_format() {
        let key = MonthKey::parse("2025-03").unwrap();
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 3);
        assert_eq!(key.to_string(), "2025-03");
    }

    #[test]
    fn test_rejects_malformed_keys() {
        for raw in ["2025-3", "2025-13", "2025-00", "25-03", "2025/03", "abcd-ef", "", "2025-03-01", "0000-05"] {
            assert!(MonthKey::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_previous_rolls_back_year() {
        let jan = MonthKey::parse("2025-01").unwrap();
        assert_eq!(jan.previous().unwrap().to_string(), "2024-12");
        assert_eq!(jan.previous().and_then(|m| m.next()), Some(jan));

        let jul = MonthKey::parse("2025-07").unwrap();
        assert_eq!(jul.previous().unwrap().to_string(), "2025-06");
    }

    #[test]
    fn test_navigation_stops_at_calendar_bounds() {
        let last = MonthKey::parse("9999-12").unwrap();
        assert_eq!(last.next(), None);
        assert_eq!(last.previous().unwrap().to_string(), "9999-11");
        assert_eq!(last.through(last), vec![last]);

        let first = MonthKey::parse("0001-01").unwrap();
        assert_eq!(first.previous(), None);
        assert_eq!(first.next().unwrap().to_string(), "0001-02");
    }

    #[test]
    fn test_out_of_range_years_rejected() {
        assert!(MonthKey::months_of_year(0).is_err());
        assert!(MonthKey::months_of_year(10000).is_err());

        let far = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        assert!(matches!(MonthKey::from_date(far), Err(LedgerError::InvalidDate { .. })));

        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(10000, 6, 1, 0, 0, 0).unwrap()
        ));
        assert!(MonthKey::current(&time).is_err());
    }

    #[test]
    fn test_ordering_matches_string_order() {
        let mut keys: Vec<MonthKey> = ["2025-02", "2024-12", "2025-10", "2025-01"]
            .iter()
            .map(|k| k.parse().unwrap())
            .collect();
        keys.sort();
        let formatted: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(formatted, vec!["2024-12", "2025-01", "2025-02", "2025-10"]);
    }

    #[test]
    fn test_current_month_from_time_provider() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap()
        ));
        assert_eq!(MonthKey::current(&time).unwrap().to_string(), "2025-03");
    }

    #[test]
    fn test_label_and_range() {
        let key = MonthKey::parse("2025-03").unwrap();
        assert_eq!(key.label(), "March 2025");
        assert_eq!(MonthKey::months_of_year(2025).unwrap().len(), 12);

        let range = MonthKey::parse("2024-11").unwrap().through(MonthKey::parse("2025-02").unwrap());
        assert_eq!(range.len(), 4);
        assert!(key.through(key.previous().unwrap()).is_empty());
    }

    #[test]
    fn test_serde_as_string() {
        let key = MonthKey::parse("2025-03").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-03\"");
        let back: MonthKey = serde_json::from_str("\"2025-03\"").unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<MonthKey>("\"March\"").is_err());
    }
}
