use crate::model::Source;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The count of contacts for one source on one day, plus a free-text note.
///
/// The note only carries meaning for [`Source::Other`]; for other sources it is stored but
/// ignored.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub count: u32,
    #[serde(default)]
    pub note: String,
}

impl SourceEntry {
    pub fn new(count: u32, note: impl Into<String>) -> Self {
        Self {
            count,
            note: note.into(),
        }
    }
}

/// Source -> entry. A missing source is the same as a zero count.
pub type DayData = BTreeMap<Source, SourceEntry>;

/// Day of month (1-based) -> day data.
pub type MonthData = BTreeMap<u32, DayData>;

/// Zero-based month index (0..=11) -> month data.
pub type YearData = BTreeMap<u32, MonthData>;

/// Year -> year data.
pub type SalespersonData = BTreeMap<i32, YearData>;

/// Addresses one day in the ledger. `month` is zero-based, `day` is one-based.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DayKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DayKey {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0(), date.day())
    }
}

/// What an [`Ledger::increment`] call did.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Increment {
    /// The count went up by one.
    Counted,
    /// Only the note of an `OTHER` entry was replaced; the count is unchanged.
    NoteEdited,
}

/// Every salesperson's contact counts: salesperson -> year -> month -> day -> source -> entry.
///
/// Levels are created on demand by mutations and are never removed, except that
/// [`Ledger::replace`] swaps a salesperson's whole subtree.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    salespeople: BTreeMap<String, SalespersonData>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn salesperson(&self, salesperson: &str) -> Option<&SalespersonData> {
        self.salespeople.get(salesperson)
    }

    pub fn salespeople(&self) -> impl Iterator<Item = &str> {
        self.salespeople.keys().map(String::as_str)
    }

    pub fn month(&self, salesperson: &str, year: i32, month: u32) -> Option<&MonthData> {
        self.salesperson(salesperson)?.get(&year)?.get(&month)
    }

    pub fn day(&self, salesperson: &str, key: DayKey) -> Option<&DayData> {
        self.month(salesperson, key.year, key.month)?.get(&key.day)
    }

    pub fn entry(&self, salesperson: &str, key: DayKey, source: Source) -> Option<&SourceEntry> {
        self.day(salesperson, key)?.get(&source)
    }

    /// Records one contact, or edits the `OTHER` note.
    ///
    /// When `source` is `OTHER`, a note is given, the stored count is already positive and the
    /// note differs from the stored one, only the note is replaced. In every other case the
    /// count goes up by one and, for `OTHER`, a given note replaces the stored one.
    ///
    /// Missing levels are created empty. The day is not checked against the calendar.
    pub fn increment(
        &mut self,
        salesperson: &str,
        key: DayKey,
        source: Source,
        note: Option<&str>,
    ) -> Increment {
        let entry = self.cell_mut(salesperson, key, source);
        match note {
            Some(note) if source.is_other() && entry.count > 0 && entry.note != note => {
                entry.note = note.to_string();
                Increment::NoteEdited
            }
            _ => {
                entry.count = entry.count.saturating_add(1);
                if source.is_other() {
                    if let Some(note) = note {
                        entry.note = note.to_string();
                    }
                }
                Increment::Counted
            }
        }
    }

    /// Removes one contact. Returns `false`, and changes nothing, when there is no entry or its
    /// count is already zero. An `OTHER` entry that drops to zero loses its note.
    pub fn decrement(&mut self, salesperson: &str, key: DayKey, source: Source) -> bool {
        let entry = self
            .salespeople
            .get_mut(salesperson)
            .and_then(|s| s.get_mut(&key.year))
            .and_then(|y| y.get_mut(&key.month))
            .and_then(|m| m.get_mut(&key.day))
            .and_then(|d| d.get_mut(&source));
        match entry {
            Some(entry) if entry.count > 0 => {
                entry.count -= 1;
                if source.is_other() && entry.count == 0 {
                    entry.note.clear();
                }
                true
            }
            _ => false,
        }
    }

    /// Replaces the `OTHER` note for a day without touching the count.
    pub fn set_note(&mut self, salesperson: &str, key: DayKey, note: &str) {
        self.cell_mut(salesperson, key, Source::Other).note = note.to_string();
    }

    /// Swaps in `data` as the whole subtree for `salesperson`, returning the previous one.
    pub fn replace(
        &mut self,
        salesperson: &str,
        data: SalespersonData,
    ) -> Option<SalespersonData> {
        self.salespeople.insert(salesperson.to_string(), data)
    }

    fn cell_mut(&mut self, salesperson: &str, key: DayKey, source: Source) -> &mut SourceEntry {
        self.salespeople
            .entry(salesperson.to_string())
            .or_default()
            .entry(key.year)
            .or_default()
            .entry(key.month)
            .or_default()
            .entry(key.day)
            .or_default()
            .entry(source)
            .or_default()
    }
}

/// Folds one cell into a salesperson subtree, creating levels on demand. A later write for the
/// same cell replaces the earlier one.
pub(crate) fn insert_cell(
    data: &mut SalespersonData,
    key: DayKey,
    source: Source,
    entry: SourceEntry,
) {
    data.entry(key.year)
        .or_default()
        .entry(key.month)
        .or_default()
        .entry(key.day)
        .or_default()
        .insert(source, entry);
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "A";

    fn key() -> DayKey {
        DayKey::new(2025, 5, 3)
    }

    #[test]
    fn test_increment_empty_ledger() {
        let mut ledger = Ledger::new();
        let outcome = ledger.increment(A, key(), Source::Facebook, None);
        assert_eq!(outcome, Increment::Counted);
        assert_eq!(
            ledger.entry(A, key(), Source::Facebook),
            Some(&SourceEntry::new(1, ""))
        );
        assert_eq!(ledger.salespeople().collect::<Vec<_>>(), vec![A]);
    }

    #[test]
    fn test_increment_ignores_note_for_regular_source() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Olx, Some("x"));
        ledger.increment(A, key(), Source::Olx, Some("y"));
        assert_eq!(
            ledger.entry(A, key(), Source::Olx),
            Some(&SourceEntry::new(2, ""))
        );
    }

    #[test]
    fn test_other_second_note_is_note_only_edit() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.increment(A, key(), Source::Other, Some("x")),
            Increment::Counted
        );
        assert_eq!(
            ledger.increment(A, key(), Source::Other, Some("y")),
            Increment::NoteEdited
        );
        assert_eq!(
            ledger.entry(A, key(), Source::Other),
            Some(&SourceEntry::new(1, "y"))
        );
    }

    #[test]
    fn test_other_same_note_increments() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Other, Some("x"));
        ledger.increment(A, key(), Source::Other, Some("x"));
        ledger.increment(A, key(), Source::Other, None);
        assert_eq!(
            ledger.entry(A, key(), Source::Other),
            Some(&SourceEntry::new(3, "x"))
        );
    }

    // Pins the behavior when a user changes the note and wants another contact in the same
    // call: the count does not move, only the note changes.
    #[test]
    fn test_other_changed_note_never_increments() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Other, None);
        ledger.increment(A, key(), Source::Other, None);
        let outcome = ledger.increment(A, key(), Source::Other, Some("targi"));
        assert_eq!(outcome, Increment::NoteEdited);
        assert_eq!(
            ledger.entry(A, key(), Source::Other),
            Some(&SourceEntry::new(2, "targi"))
        );
    }

    #[test]
    fn test_decrement_inverts_increment() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Other, Some("note"));
        assert!(ledger.decrement(A, key(), Source::Other));
        assert_eq!(
            ledger.entry(A, key(), Source::Other),
            Some(&SourceEntry::new(0, ""))
        );

        ledger.increment(A, key(), Source::Website, None);
        assert!(ledger.decrement(A, key(), Source::Website));
        assert_eq!(ledger.entry(A, key(), Source::Website).unwrap().count, 0);
    }

    #[test]
    fn test_decrement_floor_at_zero() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Allegro, None);
        assert!(ledger.decrement(A, key(), Source::Allegro));
        for _ in 0..5 {
            assert!(!ledger.decrement(A, key(), Source::Allegro));
        }
        assert_eq!(ledger.entry(A, key(), Source::Allegro).unwrap().count, 0);
    }

    #[test]
    fn test_decrement_missing_cell_creates_nothing() {
        let mut ledger = Ledger::new();
        assert!(!ledger.decrement(A, key(), Source::Event));
        assert_eq!(ledger, Ledger::new());
    }

    #[test]
    fn test_decrement_other_keeps_note_above_zero() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Other, Some("n"));
        ledger.increment(A, key(), Source::Other, None);
        ledger.decrement(A, key(), Source::Other);
        assert_eq!(
            ledger.entry(A, key(), Source::Other),
            Some(&SourceEntry::new(1, "n"))
        );
    }

    #[test]
    fn test_set_note() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Other, None);
        ledger.set_note(A, key(), "fair");
        assert_eq!(
            ledger.entry(A, key(), Source::Other),
            Some(&SourceEntry::new(1, "fair"))
        );
    }

    #[test]
    fn test_replace_only_touches_one_salesperson() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::Facebook, None);
        ledger.increment("B", key(), Source::Facebook, None);
        let previous = ledger.replace(A, SalespersonData::new());
        assert!(previous.is_some());
        assert_eq!(ledger.entry(A, key(), Source::Facebook), None);
        assert_eq!(ledger.entry("B", key(), Source::Facebook).unwrap().count, 1);
    }

    #[test]
    fn test_json_shape() {
        let mut ledger = Ledger::new();
        ledger.increment(A, key(), Source::GoogleAds, None);
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(
            json,
            r#"{"A":{"2025":{"5":{"3":{"GOOGLE_ADS":{"count":1,"note":""}}}}}}"#
        );
        let back: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn test_day_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert_eq!(DayKey::from(date), DayKey::new(2025, 5, 3));
    }
}
