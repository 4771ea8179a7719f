use crate::backup::{self, Decoded};
use crate::commands::Out;
use crate::store::Store;
use crate::tracker::Tracker;
use crate::{Config, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes a backup file of one salesperson's data. A salesperson without any recorded data gets
/// no file.
pub async fn backup(
    config: Config,
    salesperson: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Result<Out<PathBuf>> {
    let salesperson = config.salesperson(salesperson)?;
    let tracker = Tracker::load(config.store()).await;
    match backup_salesperson(&config, &tracker, &salesperson, timestamp).await? {
        Some(path) => Ok(Out::new(
            format!("Saved a backup of {salesperson} to {}", path.display()),
            path,
        )),
        None => Ok(format!("There is no data for {salesperson}, no backup was created").into()),
    }
}

/// Saves a backup of `salesperson` when the ledger holds data for them. Returns `None` without
/// writing anything otherwise.
pub(crate) async fn backup_salesperson<S: Store>(
    config: &Config,
    tracker: &Tracker<S>,
    salesperson: &str,
    timestamp: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
    let Some(data) = tracker
        .ledger()
        .salesperson(salesperson)
        .filter(|data| !data.is_empty())
    else {
        info!("There is no data to back up for {salesperson}");
        return Ok(None);
    };
    config
        .backup()
        .save(salesperson, data, timestamp)
        .await
        .map(Some)
}

/// What a restore did.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RestoreOutcome {
    pub salesperson: String,
    pub restored_rows: usize,
    pub skipped_rows: usize,
    pub applied: bool,
}

/// Restores a salesperson's data from a backup file in two steps. The file is decoded and
/// staged, then `confirm` is shown the staged candidate. Only when it returns `true` does the
/// candidate replace the salesperson's data; otherwise nothing changes.
pub async fn restore<F>(config: Config, file: &Path, confirm: F) -> Result<Out<RestoreOutcome>>
where
    F: FnOnce(&Decoded) -> bool,
{
    let decoded = backup::load(file).await?;
    if !config
        .salespeople()
        .iter()
        .any(|s| s == &decoded.salesperson_id)
    {
        warn!(
            "The backup belongs to '{}', who is not a configured salesperson",
            decoded.salesperson_id
        );
    }

    let mut tracker = Tracker::load(config.store()).await;
    let staged = tracker.stage_restore(decoded);
    let mut outcome = RestoreOutcome {
        salesperson: staged.salesperson_id.clone(),
        restored_rows: staged.restored_rows,
        skipped_rows: staged.skipped.len(),
        applied: false,
    };

    if !confirm(staged) {
        let _ = tracker.cancel_restore();
        return Ok(Out::new(
            format!("Restore of {} cancelled, nothing changed", outcome.salesperson),
            outcome,
        ));
    }

    let _ = tracker.confirm_restore().await?;
    outcome.applied = true;
    let mut message = format!(
        "Restored {} rows for {}",
        outcome.restored_rows, outcome.salesperson
    );
    if outcome.skipped_rows > 0 {
        message.push_str(&format!(
            ", {} invalid rows were skipped",
            outcome.skipped_rows
        ));
    }
    Ok(Out::new(message, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::add_contact;
    use crate::error::{error_type, ErrorType};
    use crate::model::{DayKey, Source};
    use crate::test::TestEnv;
    use crate::utils;
    use chrono::{NaiveDate, TimeZone};

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 3, 10, 15, 30).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
    }

    #[tokio::test]
    async fn test_backup_without_data() {
        let env = TestEnv::new().await;
        let out = backup(env.config(), None, timestamp()).await.unwrap();
        assert!(out.structure().is_none());
        assert!(out.message().starts_with("There is no data"));
        assert!(env.config().backup().list("Handlowiec 1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backup_and_restore() {
        let env = TestEnv::new().await;
        add_contact(env.config(), None, date(), Source::Mailing, None)
            .await
            .unwrap();
        let out = backup(env.config(), None, timestamp()).await.unwrap();
        let path = out.structure().unwrap().clone();
        assert!(path.is_file());

        // change the data after the backup
        add_contact(env.config(), None, date(), Source::Mailing, None)
            .await
            .unwrap();

        let out = restore(env.config(), &path, |staged| {
            assert_eq!(staged.salesperson_id, "Handlowiec 1");
            false
        })
        .await
        .unwrap();
        assert!(!out.structure().unwrap().applied);
        let tracker = Tracker::load(env.config().store()).await;
        let key = DayKey::from(date());
        let entry = tracker.ledger().entry("Handlowiec 1", key, Source::Mailing);
        assert_eq!(entry.unwrap().count, 2);

        let out = restore(env.config(), &path, |_| true).await.unwrap();
        let outcome = out.structure().unwrap();
        assert!(outcome.applied);
        assert_eq!(outcome.restored_rows, 1);
        assert_eq!(outcome.skipped_rows, 0);
        let tracker = Tracker::load(env.config().store()).await;
        let entry = tracker.ledger().entry("Handlowiec 1", key, Source::Mailing);
        assert_eq!(entry.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_restore_invalid_files() {
        let env = TestEnv::new().await;
        let empty = env.scratch().join("empty.csv");
        utils::write(&empty, "").await.unwrap();
        let e = restore(env.config(), &empty, |_| true).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::FileRead));

        let headless = env.scratch().join("headless.csv");
        utils::write(&headless, "Year;Month;Day;Source;Count;Note\r\n")
            .await
            .unwrap();
        let e = restore(env.config(), &headless, |_| true).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::BackupDecode));

        let missing = env.scratch().join("missing.csv");
        let e = restore(env.config(), &missing, |_| true).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::FileRead));
    }
}
