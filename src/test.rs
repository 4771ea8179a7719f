//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up a contacts home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a default Config.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("contacts");
        let config = Config::create(&root).await.unwrap();
        Self { temp_dir, config }
    }

    /// Creates a test environment that keeps at most `copies` backups per salesperson.
    pub async fn with_backup_copies(copies: u32) -> Self {
        let mut env = Self::new().await;
        env.config.set_backup_copies(Some(copies)).await.unwrap();
        env
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A scratch directory outside of the contacts home.
    pub fn scratch(&self) -> std::path::PathBuf {
        let dir = self.temp_dir.path().join("scratch");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
