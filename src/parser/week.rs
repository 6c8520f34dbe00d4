use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::{Captures, Regex};

use super::compile;
use crate::errors::{ParseError, ParseResult};

/// Sheet columns 0..=6 relative to the first day column, Monday first.
pub const DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Dates covered by one week header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub week_number: Option<u32>,
    pub start: NaiveDate,
    /// Always `start + 6 days`, whatever the header says.
    pub end: NaiveDate,
}

/// Resolves "Week 1\n22 Dec - 28 Dec" style headers into dates.
pub struct WeekResolver {
    reference: NaiveDate,
    pinned_year: Option<i32>,
    range_pattern: Regex,
    week_pattern: Regex,
}

impl WeekResolver {
    /// `reference` is "today"; headers carry no year so it is inferred from it.
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            reference,
            pinned_year: None,
            range_pattern: compile(
                r"(?i)\b(?:(?P<d1>\d{1,2})\s+(?P<m1>[a-z]{3,9})|(?P<m1b>[a-z]{3,9})\s+(?P<d1b>\d{1,2}))\s*-\s*(?:(?P<d2>\d{1,2})\s+(?P<m2>[a-z]{3,9})|(?P<m2b>[a-z]{3,9})\s+(?P<d2b>\d{1,2}))\b",
            ),
            week_pattern: compile(r"(?i)\bweek\s*(\d+)"),
        }
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.pinned_year = year;
        self
    }

    pub fn resolve_week(&self, header: &str) -> ParseResult<WeekRange> {
        let (start_month, start_day, end) = self
            .range_pattern
            .captures_iter(header)
            .find_map(|caps| parse_range(&caps))
            .ok_or_else(|| ParseError::DateFormat(header.to_string()))?;

        let year = self.infer_year(start_month);
        let start = NaiveDate::from_ymd_opt(year, start_month, start_day)
            .ok_or_else(|| ParseError::DateFormat(header.to_string()))?;
        let derived_end = start + Duration::days(6);

        if (derived_end.month(), derived_end.day()) != end {
            tracing::debug!(
                "Week header {:?} states an end of {}/{}, using {}",
                header,
                end.1,
                end.0,
                derived_end
            );
        }

        let week_number = self
            .week_pattern
            .captures(header)
            .and_then(|caps| caps[1].parse().ok());

        Ok(WeekRange {
            week_number,
            start,
            end: derived_end,
        })
    }

    /// Early-year months that already passed roll over into next year.
    fn infer_year(&self, month: u32) -> i32 {
        if let Some(year) = self.pinned_year {
            return year;
        }

        let year = self.reference.year();
        if month < self.reference.month() && month <= 3 {
            year + 1
        } else {
            year
        }
    }
}

/// Calendar date of a day within the week starting at `start`.
pub fn day_date(start: NaiveDate, day: Weekday) -> NaiveDate {
    start + Duration::days(i64::from(day.num_days_from_monday()))
}

pub fn weekday_for_column(column: usize) -> Option<Weekday> {
    DAYS.get(column).copied()
}

type MonthDay = (u32, u32);

fn parse_range(caps: &Captures) -> Option<(u32, u32, MonthDay)> {
    let (start_month, start_day) = month_day(caps, ("m1", "d1"), ("m1b", "d1b"))?;
    let end = month_day(caps, ("m2", "d2"), ("m2b", "d2b"))?;
    Some((start_month, start_day, end))
}

fn month_day(caps: &Captures, day_first: (&str, &str), month_first: (&str, &str)) -> Option<MonthDay> {
    let (month, day) = [day_first, month_first]
        .into_iter()
        .find_map(|(month, day)| Some((caps.name(month)?, caps.name(day)?)))?;

    Some((month_number(month.as_str())?, day.as_str().parse().ok()?))
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
