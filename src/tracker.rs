//! Application state: the loaded ledger and backup settings, the store they persist to, and a
//! pending restore waiting for confirmation.

use crate::backup::Decoded;
use crate::model::{DayKey, Increment, Ledger, Source};
use crate::schedule::{warn_on_invalid_times, BackupSettings, SETTINGS_KEY};
use crate::store::{load_or_default, save, Store};
use crate::Result;
use tracing::{debug, info};

/// Store key for the persisted [`Ledger`].
pub const LEDGER_KEY: &str = "contactTrackerData";

/// Owns the state of a running application.
///
/// Every mutation is applied to the in-memory ledger and then written to the store. A restore is
/// two-phase: [`Tracker::stage_restore`] holds a decoded backup without applying it, and only
/// [`Tracker::confirm_restore`] replaces the salesperson's data.
#[derive(Debug)]
pub struct Tracker<S: Store> {
    store: S,
    ledger: Ledger,
    settings: BackupSettings,
    pending: Option<Decoded>,
}

impl<S: Store> Tracker<S> {
    /// Loads the ledger and settings from `store`. Missing or unreadable values are replaced by
    /// empty defaults.
    pub async fn load(store: S) -> Self {
        let ledger: Ledger = load_or_default(&store, LEDGER_KEY).await;
        let settings: BackupSettings = load_or_default(&store, SETTINGS_KEY).await;
        warn_on_invalid_times(&settings);
        Self {
            store,
            ledger,
            settings,
            pending: None,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn settings(&self) -> &BackupSettings {
        &self.settings
    }

    pub async fn increment(
        &mut self,
        salesperson: &str,
        key: DayKey,
        source: Source,
        note: Option<&str>,
    ) -> Result<Increment> {
        let outcome = self.ledger.increment(salesperson, key, source, note);
        self.save_ledger().await?;
        Ok(outcome)
    }

    /// Returns `false` when there was nothing to remove. The store is not written in that case.
    pub async fn decrement(
        &mut self,
        salesperson: &str,
        key: DayKey,
        source: Source,
    ) -> Result<bool> {
        let changed = self.ledger.decrement(salesperson, key, source);
        if changed {
            self.save_ledger().await?;
        }
        Ok(changed)
    }

    pub async fn set_note(&mut self, salesperson: &str, key: DayKey, note: &str) -> Result<()> {
        self.ledger.set_note(salesperson, key, note);
        self.save_ledger().await
    }

    pub async fn save_settings(&mut self, settings: BackupSettings) -> Result<()> {
        save(&self.store, SETTINGS_KEY, &settings).await?;
        self.settings = settings;
        Ok(())
    }

    /// Holds `decoded` until it is confirmed or cancelled, replacing any earlier candidate.
    pub fn stage_restore(&mut self, decoded: Decoded) -> &Decoded {
        debug!(
            "Staged restore for '{}' ({} rows)",
            decoded.salesperson_id, decoded.restored_rows
        );
        self.pending.insert(decoded)
    }

    pub fn pending_restore(&self) -> Option<&Decoded> {
        self.pending.as_ref()
    }

    /// Replaces the pending candidate's salesperson subtree with the decoded data and persists
    /// the ledger. Returns the restored salesperson, or `None` when nothing was pending.
    pub async fn confirm_restore(&mut self) -> Result<Option<String>> {
        let Some(decoded) = self.pending.take() else {
            return Ok(None);
        };
        let salesperson = decoded.salesperson_id;
        let _ = self.ledger.replace(&salesperson, decoded.data);
        self.save_ledger().await?;
        info!("Data for {salesperson} restored");
        Ok(Some(salesperson))
    }

    /// Drops the pending candidate without touching the ledger.
    pub fn cancel_restore(&mut self) -> Option<Decoded> {
        let cancelled = self.pending.take();
        if let Some(decoded) = &cancelled {
            info!("Restore for {} cancelled", decoded.salesperson_id);
        }
        cancelled
    }

    async fn save_ledger(&self) -> Result<()> {
        save(&self.store, LEDGER_KEY, &self.ledger).await
    }
}
