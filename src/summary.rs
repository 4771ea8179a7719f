//! Totals per source over a month or a week.

use crate::calendar::WeekSegment;
use crate::model::{MonthData, Source};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-source totals and their sum. Always holds every source, with zero where nothing was
/// recorded.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    per_source: BTreeMap<Source, u64>,
    total: u64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            per_source: Source::ALL.into_iter().map(|s| (s, 0)).collect(),
            total: 0,
        }
    }
}

impl Summary {
    pub fn count(&self, source: Source) -> u64 {
        self.per_source.get(&source).copied().unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_source(&self) -> &BTreeMap<Source, u64> {
        &self.per_source
    }

    fn add(&mut self, source: Source, count: u32) {
        *self.per_source.entry(source).or_default() += u64::from(count);
        self.total += u64::from(count);
    }
}

/// Sums the counts of the given days. Days that are absent from `month` contribute nothing, and
/// an absent month yields an all-zero summary.
pub fn aggregate(month: Option<&MonthData>, days: impl IntoIterator<Item = u32>) -> Summary {
    let mut summary = Summary::default();
    let Some(month) = month else {
        return summary;
    };
    let days: BTreeSet<u32> = days.into_iter().collect();
    for day in days {
        if let Some(day_data) = month.get(&day) {
            for source in Source::ALL {
                if let Some(entry) = day_data.get(&source) {
                    summary.add(source, entry.count);
                }
            }
        }
    }
    summary
}

/// Sums every day stored for the month.
pub fn aggregate_month(month: Option<&MonthData>) -> Summary {
    let days: Vec<u32> = month.map(|m| m.keys().copied().collect()).unwrap_or_default();
    aggregate(month, days)
}

/// Sums the days of one week segment.
pub fn aggregate_week(month: Option<&MonthData>, week: &WeekSegment) -> Summary {
    aggregate(month, week.days.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::partition_month;
    use crate::model::{DayData, SourceEntry};

    fn day(entries: &[(Source, u32)]) -> DayData {
        entries
            .iter()
            .map(|(s, c)| (*s, SourceEntry::new(*c, "")))
            .collect()
    }

    #[test]
    fn test_month_total() {
        let mut month = MonthData::new();
        month.insert(1, day(&[(Source::Facebook, 2)]));
        month.insert(15, day(&[(Source::Facebook, 3)]));
        let summary = aggregate_month(Some(&month));
        assert_eq!(summary.count(Source::Facebook), 5);
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.count(Source::Olx), 0);
        assert_eq!(summary.per_source().len(), Source::ALL.len());
    }

    #[test]
    fn test_absent_month_is_zero() {
        let summary = aggregate_month(None);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.per_source().len(), 12);
    }

    #[test]
    fn test_week_filter() {
        // June 2025: week 2 is the 2nd to the 8th
        let weeks = partition_month(2025, 5).unwrap();
        let mut month = MonthData::new();
        month.insert(1, day(&[(Source::Website, 4)]));
        month.insert(2, day(&[(Source::Website, 1), (Source::Other, 2)]));
        month.insert(8, day(&[(Source::Event, 1)]));
        month.insert(9, day(&[(Source::Event, 7)]));

        let first = aggregate_week(Some(&month), &weeks[0]);
        assert_eq!(first.total(), 4);

        let second = aggregate_week(Some(&month), &weeks[1]);
        assert_eq!(second.count(Source::Website), 1);
        assert_eq!(second.count(Source::Other), 2);
        assert_eq!(second.count(Source::Event), 1);
        assert_eq!(second.total(), 4);
    }

    #[test]
    fn test_duplicate_days_counted_once() {
        let mut month = MonthData::new();
        month.insert(3, day(&[(Source::Mailing, 2)]));
        let summary = aggregate(Some(&month), [3, 3, 3]);
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn test_notes_do_not_affect_totals() {
        let mut month = MonthData::new();
        let mut d = DayData::new();
        d.insert(Source::Other, SourceEntry::new(0, "orphan note"));
        d.insert(Source::Referral, SourceEntry::new(1, "ignored"));
        month.insert(10, d);
        let summary = aggregate_month(Some(&month));
        assert_eq!(summary.count(Source::Other), 0);
        assert_eq!(summary.total(), 1);
    }
}
