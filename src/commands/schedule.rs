use crate::commands::backup::backup_salesperson;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::schedule::{BackupScheduler, BackupSettings, POLL_INTERVAL};
use crate::tracker::Tracker;
use crate::{Config, Result};
use anyhow::Context;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Requested changes to the automatic backup settings. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ScheduleChange {
    pub enabled: Option<bool>,
    pub time1: Option<String>,
    pub time2: Option<String>,
}

impl ScheduleChange {
    fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.time1.is_none() && self.time2.is_none()
    }
}

/// Shows the automatic backup settings, or changes and saves them.
pub async fn schedule(config: Config, change: ScheduleChange) -> Result<Out<BackupSettings>> {
    let mut tracker = Tracker::load(config.store()).await;
    let current = tracker.settings().clone();
    let verb = if change.is_empty() {
        "are"
    } else {
        let settings = BackupSettings::new(
            change.enabled.unwrap_or(current.enabled()),
            change.time1.as_deref().unwrap_or(current.time1()),
            change.time2.as_deref().unwrap_or(current.time2()),
        )
        .pub_result(ErrorType::Request)?;
        tracker.save_settings(settings).await?;
        "saved"
    };

    let settings = tracker.settings().clone();
    let state = if settings.enabled() {
        "enabled"
    } else {
        "disabled"
    };
    Ok(Out::new(
        format!(
            "Automatic backups {verb}: {state}, at {} and {}",
            settings.time1(),
            settings.time2()
        ),
        settings,
    ))
}

/// Runs the automatic backup schedule until Ctrl-C.
///
/// Every [`POLL_INTERVAL`] the settings and the ledger are reloaded, so changes made by other
/// commands while the watcher runs take effect. A failed backup is logged and the watcher keeps
/// going.
pub async fn watch(config: Config) -> Result<Out<()>> {
    info!("Watching for scheduled backups, press Ctrl-C to stop");
    let mut scheduler = BackupScheduler::new();
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut count = 0usize;

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("Unable to listen for Ctrl-C")?;
                break;
            }
            _ = interval.tick() => {
                let now = Local::now().naive_local();
                match tick(&config, &mut scheduler, now, Utc::now()).await {
                    Ok(Some(path)) => {
                        count += 1;
                        info!("Scheduled backup saved to {}", path.display());
                    }
                    Ok(None) => {}
                    Err(e) => error!("Scheduled backup failed: {e:#}"),
                }
            }
        }
    }

    Ok(format!("Stopped watching after {count} scheduled backups").into())
}

/// One poll of the schedule. Backs up the active salesperson when a trigger time is due.
async fn tick(
    config: &Config,
    scheduler: &mut BackupScheduler,
    now: NaiveDateTime,
    timestamp: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
    let tracker = Tracker::load(config.store()).await;
    if !scheduler.poll(tracker.settings(), now) {
        return Ok(None);
    }
    // pick up a salesperson selected after the watcher started
    let config = Config::load(config.root()).await?;
    let salesperson = config.active_salesperson();
    debug!("Scheduled backup due for {salesperson} at {now}");
    backup_salesperson(&config, &tracker, salesperson, timestamp).await
}
