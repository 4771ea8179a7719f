//! Splits a month into week segments that end on Sundays.

use crate::Result;
use anyhow::{anyhow, bail, Context};
use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Polish month names, indexed by zero-based month.
pub const MONTH_NAMES_PL: [&str; 12] = [
    "Styczeń",
    "Luty",
    "Marzec",
    "Kwiecień",
    "Maj",
    "Czerwiec",
    "Lipiec",
    "Sierpień",
    "Wrzesień",
    "Październik",
    "Listopad",
    "Grudzień",
];

/// A run of consecutive days inside one month. Every segment but the last ends on a Sunday; the
/// last one ends on the last day of the month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct WeekSegment {
    /// 1-based position within the month.
    pub ordinal: u32,
    /// Days of month, ascending and contiguous.
    pub days: Vec<u32>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// e.g. `Tydzień 1 (01.06 - 01.06)`
    pub label: String,
}

/// A year and a zero-based month index. Parses from and displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    month_index: u32,
}

impl YearMonth {
    pub fn new(year: i32, month_index: u32) -> Result<Self> {
        if month_index > 11 {
            bail!("Month index must be between 0 and 11, got {month_index}");
        }
        Ok(Self { year, month_index })
    }

    /// The month containing today's local date.
    pub fn current() -> Self {
        Local::now().date_naive().into()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_index(&self) -> u32 {
        self.month_index
    }

    /// The Polish month name followed by the year, e.g. `Czerwiec 2025`.
    pub fn display_pl(&self) -> String {
        format!("{} {}", month_name_pl(self.month_index), self.year)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month_index: date.month0(),
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month_index + 1)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Expected a period like 2025-06, got '{s}'"))?;
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in period '{s}'"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in period '{s}'"))?;
        if !(1..=12).contains(&month) {
            bail!("Month must be between 01 and 12 in period '{s}'");
        }
        YearMonth::new(year, month - 1)
    }
}

/// Returns the Polish name of a zero-based month, or an empty string when out of range.
pub fn month_name_pl(month_index: u32) -> &'static str {
    MONTH_NAMES_PL
        .get(month_index as usize)
        .copied()
        .unwrap_or_default()
}

/// Returns the date for a zero-based month index and a 1-based day.
pub fn date(year: i32, month_index: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month_index + 1, day)
        .with_context(|| format!("Invalid date: year {year}, month index {month_index}, day {day}"))
}

/// Number of days in a month, e.g. 29 for February 2024.
pub fn days_in_month(year: i32, month_index: u32) -> Result<u32> {
    let first = date(year, month_index, 1)?;
    let next = if month_index == 11 {
        date(year + 1, 0, 1)?
    } else {
        date(year, month_index + 1, 1)?
    };
    let days = next.signed_duration_since(first).num_days();
    Ok(days as u32)
}

/// Splits the month into week segments.
///
/// Starting from day 1, each segment runs up to and including the first Sunday or the last day
/// of the month, whichever comes first. The next segment starts the day after.
pub fn partition_month(year: i32, month_index: u32) -> Result<Vec<WeekSegment>> {
    let num_days = days_in_month(year, month_index)?;
    let mut weeks = Vec::new();
    let mut start = 1;
    let mut ordinal = 1;

    while start <= num_days {
        let mut end = start;
        while end < num_days && date(year, month_index, end)?.weekday() != Weekday::Sun {
            end += 1;
        }

        let start_date = date(year, month_index, start)?;
        let end_date = date(year, month_index, end)?;
        weeks.push(WeekSegment {
            ordinal,
            days: (start..=end).collect(),
            start: start_date,
            end: end_date,
            label: format!(
                "Tydzień {ordinal} ({} - {})",
                start_date.format("%d.%m"),
                end_date.format("%d.%m")
            ),
        });

        start = end + 1;
        ordinal += 1;
    }
    Ok(weeks)
}
