use crate::commands::Out;
use crate::model::{DayKey, Increment, Source, SourceEntry};
use crate::tracker::Tracker;
use crate::{Config, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// One ledger cell after a command touched it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ContactCell {
    pub salesperson: String,
    pub date: NaiveDate,
    pub source: Source,
    pub count: u32,
    pub note: String,
}

impl ContactCell {
    fn new(salesperson: &str, date: NaiveDate, source: Source, entry: Option<&SourceEntry>) -> Self {
        let entry = entry.cloned().unwrap_or_default();
        Self {
            salesperson: salesperson.to_string(),
            date,
            source,
            count: entry.count,
            note: entry.note,
        }
    }
}

/// Records one contact from `source`. For `OTHER` the note may be given too, which follows the
/// ledger's note-edit rule.
pub async fn add_contact(
    config: Config,
    salesperson: Option<&str>,
    date: NaiveDate,
    source: Source,
    note: Option<&str>,
) -> Result<Out<ContactCell>> {
    let salesperson = config.salesperson(salesperson)?;
    let mut tracker = Tracker::load(config.store()).await;
    let key = DayKey::from(date);
    let outcome = tracker.increment(&salesperson, key, source, note).await?;
    let cell = ContactCell::new(
        &salesperson,
        date,
        source,
        tracker.ledger().entry(&salesperson, key, source),
    );
    let message = match outcome {
        Increment::Counted => format!(
            "Added a {} contact for {salesperson} on {date}, the count is now {}",
            source.label(),
            cell.count
        ),
        Increment::NoteEdited => format!(
            "Updated the {} note for {salesperson} on {date}, the count stays at {}",
            source.label(),
            cell.count
        ),
    };
    Ok(Out::new(message, cell))
}

/// Removes one contact from `source`. Nothing happens when the count is already zero.
pub async fn remove_contact(
    config: Config,
    salesperson: Option<&str>,
    date: NaiveDate,
    source: Source,
) -> Result<Out<ContactCell>> {
    let salesperson = config.salesperson(salesperson)?;
    let mut tracker = Tracker::load(config.store()).await;
    let key = DayKey::from(date);
    let changed = tracker.decrement(&salesperson, key, source).await?;
    let cell = ContactCell::new(
        &salesperson,
        date,
        source,
        tracker.ledger().entry(&salesperson, key, source),
    );
    let message = if changed {
        format!(
            "Removed a {} contact for {salesperson} on {date}, the count is now {}",
            source.label(),
            cell.count
        )
    } else {
        format!(
            "There are no {} contacts to remove for {salesperson} on {date}",
            source.label()
        )
    };
    Ok(Out::new(message, cell))
}

/// Replaces the note of the `OTHER` entry without touching its count.
pub async fn set_note(
    config: Config,
    salesperson: Option<&str>,
    date: NaiveDate,
    note: &str,
) -> Result<Out<ContactCell>> {
    let salesperson = config.salesperson(salesperson)?;
    let mut tracker = Tracker::load(config.store()).await;
    let key = DayKey::from(date);
    tracker.set_note(&salesperson, key, note).await?;
    let cell = ContactCell::new(
        &salesperson,
        date,
        Source::Other,
        tracker.ledger().entry(&salesperson, key, Source::Other),
    );
    Ok(Out::new(
        format!("Saved the note for {salesperson} on {date}"),
        cell,
    ))
}

/// Shows every category of one day, including those without contacts.
pub async fn show_day(
    config: Config,
    salesperson: Option<&str>,
    date: NaiveDate,
) -> Result<Out<Vec<ContactCell>>> {
    let salesperson = config.salesperson(salesperson)?;
    let tracker = Tracker::load(config.store()).await;
    let day = tracker.ledger().day(&salesperson, DayKey::from(date));
    let cells: Vec<ContactCell> = Source::ALL
        .into_iter()
        .map(|source| {
            ContactCell::new(
                &salesperson,
                date,
                source,
                day.and_then(|d| d.get(&source)),
            )
        })
        .collect();

    let mut message = format!("Contacts of {salesperson} on {date}:");
    for cell in &cells {
        message.push_str(&format!("\n  {}: {}", cell.source.label(), cell.count));
        if !cell.note.is_empty() {
            message.push_str(&format!(" ({})", cell.note));
        }
    }
    let total: u64 = cells.iter().map(|c| u64::from(c.count)).sum();
    message.push_str(&format!("\n  Łącznie: {total}"));
    Ok(Out::new(message, cells))
}
