//! Configuration file handling.
//!
//! The configuration file is stored at `$CONTACTS_HOME/config.json` and holds the list of
//! salespeople, the active salesperson and backup rotation settings.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult};
use crate::store::FileStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "contacts";
const CONFIG_VERSION: u8 = 1;
const SALESPEOPLE_COUNT: usize = 10;
const BACKUPS: &str = ".backups";
const STORE: &str = ".store";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CONTACTS_HOME` and from there it loads `$CONTACTS_HOME/config.json`. It provides
/// paths to the other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    store: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and an initial `config.json` with default
    /// settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the contacts home directory")?;

        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The config file already exists '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let store = root.join(STORE);
        utils::make_dir(&store).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            store,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the backups and store directories exist
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The contacts home directory is missing, run 'contacts init'")
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            return Err(anyhow::anyhow!(
                "The config file is missing '{}'",
                config_path.display()
            ))
            .pub_result(ErrorType::Config);
        }
        let config_file = ConfigFile::load(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            store: root.join(STORE),
            config_path,
            config_file,
        };
        for dir in [&config.backups, &config.store] {
            if !dir.is_dir() {
                return Err(anyhow::anyhow!("The directory is missing '{}'", dir.display()))
                    .pub_result(ErrorType::Config);
            }
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn store_dir(&self) -> &Path {
        &self.store
    }

    pub fn salespeople(&self) -> &[String] {
        &self.config_file.salespeople
    }

    pub fn active_salesperson(&self) -> &str {
        &self.config_file.active_salesperson
    }

    pub fn backup_copies(&self) -> Option<u32> {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Opens the key-value store that holds the ledger and the backup settings.
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.store)
    }

    /// Returns `requested`, or the active salesperson when `None`, after checking that it is one
    /// of the configured salespeople.
    pub fn salesperson(&self, requested: Option<&str>) -> Result<String> {
        let salesperson = requested.unwrap_or(self.active_salesperson());
        if !self.salespeople().iter().any(|s| s == salesperson) {
            return Err(anyhow::anyhow!(
                "Unknown salesperson '{salesperson}', expected one of: {}",
                self.salespeople().join(", ")
            ))
            .pub_result(ErrorType::Request);
        }
        Ok(salesperson.to_string())
    }

    /// Makes `salesperson` the active one and saves the config file.
    pub async fn set_active_salesperson(&mut self, salesperson: &str) -> Result<()> {
        let salesperson = self.salesperson(Some(salesperson))?;
        self.config_file.active_salesperson = salesperson;
        self.config_file.save(&self.config_path).await
    }

    #[cfg(test)]
    pub(crate) async fn set_backup_copies(&mut self, copies: Option<u32>) -> Result<()> {
        self.config_file.backup_copies = copies;
        self.config_file.save(&self.config_path).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "contacts",
///   "config_version": 1,
///   "salespeople": ["Handlowiec 1", "Handlowiec 2"],
///   "active_salesperson": "Handlowiec 1",
///   "backup_copies": 20
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "contacts"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The salespeople whose contacts can be tracked
    salespeople: Vec<String>,

    /// The salesperson used when a command does not name one
    active_salesperson: String,

    /// Number of backup copies to keep per salesperson. All backups are kept when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backup_copies: Option<u32>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let salespeople: Vec<String> = (1..=SALESPEOPLE_COUNT)
            .map(|i| format!("Handlowiec {i}"))
            .collect();
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            active_salesperson: salespeople[0].clone(),
            salespeople,
            backup_copies: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it fails validation.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            !config.salespeople.is_empty(),
            "The config file lists no salespeople"
        );
        anyhow::ensure!(
            config.salespeople.contains(&config.active_salesperson),
            "The active salesperson '{}' is not in the salespeople list",
            config.active_salesperson
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
