//! Cell-level parsers: dates, handicap percentages and score values.

use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};

lazy_static! {
    static ref US_LONG_DATE: Regex = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap();
    static ref US_SHORT_DATE: Regex = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap();
    static ref PERCENT: Regex = Regex::new(r"^(\d+(?:\.\d+)?)\s*%$").unwrap();
}

/// Parse a header date: `MM/DD/YYYY`, then `MM/DD/YY`, then `YYYY-MM-DD`.
///
/// Month and day may be written without leading zeros ("12/1/2025").
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = US_LONG_DATE.captures(s) {
        if let Some(date) = ymd(&caps[3], &caps[1], &caps[2]) {
            return Some(date);
        }
    }
    if let Some(caps) = US_SHORT_DATE.captures(s) {
        let yy: i32 = caps[3].parse().ok()?;
        // strptime's %y pivot
        let year = if yy < 69 { 2000 + yy } else { 1900 + yy };
        let month = caps[1].parse().ok()?;
        let day = caps[2].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }
    if let Some(caps) = ISO_DATE.captures(s) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parse "75%" -> 0.75. Anything else, or a percentage outside (0, 100], is no handicap.
pub fn parse_handicap(s: &str) -> Option<f64> {
    let caps = PERCENT.captures(s.trim())?;
    let pct: f64 = caps[1].parse().ok()?;
    if pct <= 0.0 || pct > 100.0 {
        return None;
    }
    Some(pct / 100.0)
}

/// A score as written in the sheet: integers stay integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreValue {
    Int(i64),
    Decimal(f64),
}

impl ScoreValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ScoreValue::Int(v) => v as f64,
            ScoreValue::Decimal(v) => v,
        }
    }

    /// Integer part, truncated toward zero.
    pub fn truncate(self) -> i64 {
        match self {
            ScoreValue::Int(v) => v,
            ScoreValue::Decimal(v) => v.trunc() as i64,
        }
    }

    pub fn rounded(self, places: i32) -> Self {
        match self {
            ScoreValue::Int(_) => self,
            ScoreValue::Decimal(v) => {
                let scale = 10f64.powi(places);
                let scaled = v * scale;
                if !scaled.is_finite() {
                    return self;
                }
                ScoreValue::Decimal(scaled.round() / scale)
            }
        }
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreValue::Int(v) => write!(f, "{}", v),
            ScoreValue::Decimal(v) if v.abs() >= 1e16 => write!(f, "{:e}", v),
            ScoreValue::Decimal(v) if v.fract() == 0.0 => write!(f, "{:.1}", v),
            ScoreValue::Decimal(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for ScoreValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScoreValue::Int(v) => serializer.serialize_i64(*v),
            ScoreValue::Decimal(v) => serializer.serialize_f64(*v),
        }
    }
}

/// Parse a score cell. Empty or non-numeric cells yield `None`.
pub fn parse_score_cell(cell: &str) -> Option<ScoreValue> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains('.') {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ScoreValue::Decimal)
    } else {
        s.parse::<i64>().ok().map(ScoreValue::Int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("12/1/2025"), Some(day(2025, 12, 1)));
        assert_eq!(parse_date("03/09/2024"), Some(day(2024, 3, 9)));
        assert_eq!(parse_date(" 1/5/25 "), Some(day(2025, 1, 5)));
        assert_eq!(parse_date("1/5/99"), Some(day(1999, 1, 5)));
        assert_eq!(parse_date("2024-11-24"), Some(day(2024, 11, 24)));
        assert_eq!(
            parse_date("12/1/2025").map(|d| d.to_string()),
            Some("2025-12-01".to_string())
        );
    }

    #[test]
    fn test_parse_date_rejects() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("cat."), None);
        assert_eq!(parse_date("13/1/2025"), None);
        assert_eq!(parse_date("2/30/2025"), None);
        assert_eq!(parse_date("12/1/225"), None);
        assert_eq!(parse_date("2025/12/01"), None);
    }

    #[test]
    fn test_parse_handicap() {
        assert_eq!(parse_handicap("75%"), Some(0.75));
        assert_eq!(parse_handicap("50 %"), Some(0.5));
        assert_eq!(parse_handicap("100%"), Some(1.0));
        assert_eq!(parse_handicap(" 12.5% "), Some(0.125));
        assert_eq!(parse_handicap("0%"), None);
        assert_eq!(parse_handicap("150%"), None);
        assert_eq!(parse_handicap("-5%"), None);
        assert_eq!(parse_handicap("75"), None);
        assert_eq!(parse_handicap("xword handicap"), None);
        assert_eq!(parse_handicap(""), None);
    }

    #[test]
    fn test_parse_score_cell() {
        assert_eq!(parse_score_cell("10"), Some(ScoreValue::Int(10)));
        assert_eq!(parse_score_cell("-1"), Some(ScoreValue::Int(-1)));
        assert_eq!(parse_score_cell(" 3.5 "), Some(ScoreValue::Decimal(3.5)));
        assert_eq!(parse_score_cell(""), None);
        assert_eq!(parse_score_cell("DNF"), None);
        assert_eq!(parse_score_cell("1.2.3"), None);
    }

    #[test]
    fn test_score_value_display() {
        assert_eq!(ScoreValue::Int(7).to_string(), "7");
        assert_eq!(ScoreValue::Decimal(20.0).to_string(), "20.0");
        assert_eq!(ScoreValue::Decimal(13.3333).to_string(), "13.3333");
        assert_eq!(
            ScoreValue::Decimal(40.0 / 3.0).rounded(4),
            ScoreValue::Decimal(13.3333)
        );
    }

    #[test]
    fn test_huge_decimals_survive_rounding() {
        let huge = ScoreValue::Decimal(1.0e305);
        assert_eq!(huge.rounded(4), huge);
        assert_eq!(huge.rounded(4).to_string(), "1e305");
        assert_eq!(serde_json::to_string(&huge.rounded(4)).unwrap(), "1e305");
    }
}
