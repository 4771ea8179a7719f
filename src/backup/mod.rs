//! Backup files: writing encoded salesperson data to the backups directory, rotating old copies,
//! and reading a backup back for a restore.

mod codec;

pub use codec::{decode, encode, Decoded, SkipReason, SkippedRow, BACKUP_VERSION};

use crate::error::{ErrorType, IntoResult};
use crate::model::SalespersonData;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix shared by all backup file names.
pub const PREFIX: &str = "backup";

/// The seconds-precision part of the timestamp in a backup file name.
const FILE_STAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";
const FILE_STAMP_LEN: usize = "2025-06-03T10-15-30".len();

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: Option<u32>,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Encodes `data` and saves it as a CSV backup file.
    ///
    /// The filename format is `backup_<salesperson>_<timestamp>.csv`, see [`file_name`]. The
    /// document is fully encoded before anything touches the disk, so a failed encode leaves no
    /// file behind. When `backup_copies` is configured, older backups of the same salesperson
    /// beyond that number are deleted.
    ///
    /// Returns the path to the created backup file.
    pub async fn save(
        &self,
        salesperson: &str,
        data: &SalespersonData,
        timestamp: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let csv = encode(salesperson, data, timestamp)?;
        let path = self.backups_dir.join(file_name(salesperson, timestamp));
        utils::write(&path, csv)
            .await
            .pub_result(ErrorType::StorageWrite)?;
        debug!("Wrote backup {}", path.display());

        if let Some(copies) = self.backup_copies {
            self.rotate(salesperson, copies).await?;
        }
        Ok(path)
    }

    /// Lists the backup files of `salesperson`, oldest first.
    pub async fn list(&self, salesperson: &str) -> Result<Vec<PathBuf>> {
        let prefix = file_prefix(salesperson);
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, &prefix) {
                files.push((entry.path(), name));
            }
        }

        // The timestamp in the name sorts chronologically
        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files.into_iter().map(|(path, _)| path).collect())
    }

    /// Deletes the oldest backups of `salesperson` so that at most `copies` remain.
    async fn rotate(&self, salesperson: &str, copies: u32) -> Result<()> {
        let files = self.list(salesperson).await?;
        let to_delete = files.len().saturating_sub(copies as usize);
        for path in files.into_iter().take(to_delete) {
            debug!("Rotating out old backup {}", path.display());
            utils::remove(&path).await?;
        }
        Ok(())
    }
}

/// Returns the backup file name for `salesperson` at `timestamp`, e.g.
/// `backup_Handlowiec_1_2025-06-03T10-15-30-000Z.csv`.
pub fn file_name(salesperson: &str, timestamp: DateTime<Utc>) -> String {
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}{stamp}.csv", file_prefix(salesperson))
}

fn file_prefix(salesperson: &str) -> String {
    format!("{PREFIX}_{}_", utils::sanitize_file_component(salesperson))
}

/// Checks if a filename is a backup file with the given prefix. The rest of the name must be
/// exactly a timestamp as written by [`file_name`], so that the prefix `backup_Anna_` does not
/// claim `backup_Anna_2_...`.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix("Z.csv"))
        .is_some_and(is_file_stamp)
}

/// Matches `YYYY-MM-DDTHH-MM-SS-mmm`.
fn is_file_stamp(stamp: &str) -> bool {
    let Some((date_time, millis)) = stamp.rsplit_once('-') else {
        return false;
    };
    millis.len() == 3
        && millis.chars().all(|c| c.is_ascii_digit())
        && date_time.len() == FILE_STAMP_LEN
        && NaiveDateTime::parse_from_str(date_time, FILE_STAMP_FORMAT).is_ok()
}

/// Reads a backup file for a restore.
///
/// # Errors
/// Returns an error tagged [`ErrorType::FileRead`] when the file cannot be read or is empty.
pub async fn read(path: &Path) -> Result<String> {
    let text = utils::read(path).await.pub_result(ErrorType::FileRead)?;
    if text.trim().is_empty() {
        return Err(anyhow::anyhow!("The backup file '{}' is empty", path.display()))
            .pub_result(ErrorType::FileRead);
    }
    Ok(text)
}

/// Reads and decodes a backup file.
pub async fn load(path: &Path) -> Result<Decoded> {
    let text = read(path).await?;
    decode(&text).with_context(|| format!("Unable to restore from '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{DayKey, Ledger, Source};
    use crate::test::TestEnv;
    use chrono::{Duration, TimeZone};

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 3, 10, 15, 30).unwrap()
    }

    fn data() -> SalespersonData {
        let mut ledger = Ledger::new();
        ledger.increment("A", DayKey::new(2025, 5, 1), Source::Olx, None);
        ledger.salesperson("A").unwrap().clone()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name("Handlowiec 1", timestamp()),
            "backup_Handlowiec_1_2025-06-03T10-15-30-000Z.csv"
        );
    }

    #[test]
    fn test_is_backup_file() {
        let prefix = file_prefix("A");
        assert!(is_backup_file("backup_A_2025-06-03T10-15-30-000Z.csv", &prefix));
        assert!(!is_backup_file("backup_A_B_2025-06-03T10-15-30-000Z.csv", &prefix));
        assert!(!is_backup_file("backup_A_2025-06-03T10-15-30-000Z.json", &prefix));
        assert!(!is_backup_file("Raport_A_Czerwiec_2025.csv", &prefix));
        assert!(!is_backup_file("backup_A_2_2025-06-03T10-15-30-000Z.csv", &prefix));
        assert!(!is_backup_file("backup_A_2025-13-03T10-15-30-000Z.csv", &prefix));
        assert!(!is_backup_file("backup_A_2025-06-03T10-15-30-0000Z.csv", &prefix));
        assert!(!is_backup_file("backup_A_2025-06-03T10-15-30Z.csv", &prefix));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();
        let path = backup.save("A", &data(), timestamp()).await.unwrap();
        assert!(path.is_file());
        assert_eq!(path.parent().unwrap(), env.config().backups());

        let decoded = load(&path).await.unwrap();
        assert_eq!(decoded.salesperson_id, "A");
        assert_eq!(decoded.data, data());
    }

    #[tokio::test]
    async fn test_rotation() {
        let env = TestEnv::with_backup_copies(2).await;
        let backup = env.config().backup();
        let mut paths = Vec::new();
        for minutes in 0..4 {
            let ts = timestamp() + Duration::minutes(minutes);
            paths.push(backup.save("A", &data(), ts).await.unwrap());
        }
        backup.save("B", &data(), timestamp()).await.unwrap();

        let remaining = backup.list("A").await.unwrap();
        assert_eq!(remaining, paths[2..].to_vec());
        assert_eq!(backup.list("B").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rotation_ignores_salespeople_sharing_a_prefix() {
        let env = TestEnv::with_backup_copies(1).await;
        let backup = env.config().backup();
        let other = backup.save("Anna 2", &data(), timestamp()).await.unwrap();
        let underscore = backup.save("Anna_3", &data(), timestamp()).await.unwrap();
        let later = timestamp() + Duration::minutes(1);
        let anna = backup.save("Anna", &data(), later).await.unwrap();

        assert!(anna.is_file());
        assert!(other.is_file());
        assert!(underscore.is_file());
        assert_eq!(backup.list("Anna").await.unwrap(), vec![anna]);
        assert_eq!(backup.list("Anna 2").await.unwrap(), vec![other]);
    }

    #[tokio::test]
    async fn test_read_empty_file() {
        let env = TestEnv::new().await;
        let path = env.config().backups().join("empty.csv");
        utils::write(&path, "  \r\n").await.unwrap();
        let e = read(&path).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::FileRead));

        let missing = env.config().backups().join("missing.csv");
        let e = read(&missing).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::FileRead));
    }
}
