//! Automatic backup schedule: up to two daily trigger times, checked by a once-a-minute poll.

use crate::Result;
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Store key for the persisted [`BackupSettings`].
pub const SETTINGS_KEY: &str = "contactBackupSettings";

/// How often the watcher compares the clock against the trigger times.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

const TIME_FORMAT: &str = "%H:%M";

/// Persisted automatic backup settings.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSettings {
    enabled: bool,
    /// `HH:MM`
    time1: String,
    /// `HH:MM`
    time2: String,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            time1: "10:00".to_string(),
            time2: "16:00".to_string(),
        }
    }
}

impl BackupSettings {
    /// Validates both times and normalizes them to zero-padded `HH:MM`.
    pub fn new(enabled: bool, time1: &str, time2: &str) -> Result<Self> {
        Ok(Self {
            enabled,
            time1: normalize_time(time1)?,
            time2: normalize_time(time2)?,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn time1(&self) -> &str {
        &self.time1
    }

    pub fn time2(&self) -> &str {
        &self.time2
    }

    fn trigger_times(&self) -> [&str; 2] {
        [&self.time1, &self.time2]
    }
}

/// Parses `HH:MM` (hours may be a single digit) and formats it back as zero-padded `HH:MM`.
pub fn normalize_time(s: &str) -> Result<String> {
    let time = NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .with_context(|| format!("Invalid time '{s}', expected HH:MM"))?;
    Ok(time.format(TIME_FORMAT).to_string())
}

/// Decides when an automatic backup is due.
///
/// A backup is due when the wall-clock `HH:MM` equals one of the trigger times. Each trigger
/// time fires at most once per calendar day, so several polls landing in the same minute produce
/// one backup, and two identical trigger times count as one.
#[derive(Debug, Default, Clone)]
pub struct BackupScheduler {
    fired: BTreeMap<String, NaiveDate>,
}

impl BackupScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when a backup should run now. Marks the matching trigger times as fired.
    pub fn poll(&mut self, settings: &BackupSettings, now: NaiveDateTime) -> bool {
        if !settings.enabled() {
            return false;
        }
        let current = now.format(TIME_FORMAT).to_string();
        let today = now.date();
        let mut due = false;
        for trigger in settings.trigger_times() {
            if trigger != current {
                continue;
            }
            if self.fired.get(trigger) == Some(&today) {
                continue;
            }
            let _ = self.fired.insert(trigger.to_string(), today);
            due = true;
        }
        due
    }
}

/// Logs a warning for trigger times that can never match, such as hand-edited values.
pub(crate) fn warn_on_invalid_times(settings: &BackupSettings) {
    for time in settings.trigger_times() {
        if normalize_time(time).ok().as_deref() != Some(time) {
            warn!("Backup time '{time}' is not a valid HH:MM time and will never trigger");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn enabled() -> BackupSettings {
        BackupSettings::new(true, "10:00", "16:30").unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = BackupSettings::default();
        assert!(!settings.enabled());
        assert_eq!(settings.time1(), "10:00");
        assert_eq!(settings.time2(), "16:00");
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"enabled":false,"time1":"10:00","time2":"16:00"}"#);
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("9:05").unwrap(), "09:05");
        assert_eq!(normalize_time(" 16:30 ").unwrap(), "16:30");
        assert!(normalize_time("25:00").is_err());
        assert!(normalize_time("noon").is_err());
        assert!(BackupSettings::new(true, "10:00", "10:61").is_err());
    }

    #[test]
    fn test_disabled_never_fires() {
        let mut scheduler = BackupScheduler::new();
        let settings = BackupSettings::default();
        assert!(!scheduler.poll(&settings, at(3, 10, 0, 0)));
    }

    #[test]
    fn test_fires_once_per_trigger_minute() {
        let mut scheduler = BackupScheduler::new();
        let settings = enabled();
        assert!(!scheduler.poll(&settings, at(3, 9, 59, 30)));
        assert!(scheduler.poll(&settings, at(3, 10, 0, 5)));
        assert!(!scheduler.poll(&settings, at(3, 10, 0, 45)));
        assert!(!scheduler.poll(&settings, at(3, 10, 1, 5)));
        assert!(scheduler.poll(&settings, at(3, 16, 30, 0)));
        assert!(!scheduler.poll(&settings, at(3, 16, 30, 59)));
        // the next day fires again
        assert!(scheduler.poll(&settings, at(4, 10, 0, 0)));
    }

    #[test]
    fn test_identical_trigger_times_fire_once() {
        let mut scheduler = BackupScheduler::new();
        let settings = BackupSettings::new(true, "12:00", "12:00").unwrap();
        assert!(scheduler.poll(&settings, at(3, 12, 0, 0)));
        assert!(!scheduler.poll(&settings, at(3, 12, 0, 30)));
    }
}
