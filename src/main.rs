use chrono::{Local, Utc};
use clap::Parser;
use contact_tracker::args::{Args, Command};
use contact_tracker::backup::Decoded;
use contact_tracker::commands::{self, ScheduleChange};
use contact_tracker::{Config, Result};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use tracing::{debug, error, trace, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().contacts_home().path();
    let salesperson = args.common().salesperson();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Select(select_args) => {
            commands::select(Config::load(home).await?, select_args.salesperson())
                .await?
                .print()
        }

        Command::Add(add_args) => commands::add_contact(
            Config::load(home).await?,
            salesperson,
            add_args.date(),
            add_args.source(),
            add_args.note(),
        )
        .await?
        .print(),

        Command::Remove(remove_args) => commands::remove_contact(
            Config::load(home).await?,
            salesperson,
            remove_args.date(),
            remove_args.source(),
        )
        .await?
        .print(),

        Command::Note(note_args) => commands::set_note(
            Config::load(home).await?,
            salesperson,
            note_args.date(),
            note_args.note(),
        )
        .await?
        .print(),

        Command::Show(date_args) => {
            commands::show_day(Config::load(home).await?, salesperson, date_args.date())
                .await?
                .print()
        }

        Command::Weeks(period_args) => commands::weeks(period_args.period()).await?.print(),

        Command::Summary(summary_args) => commands::summary(
            Config::load(home).await?,
            salesperson,
            summary_args.period(),
            summary_args.weekly(),
        )
        .await?
        .print(),

        Command::Report(report_args) => commands::report(
            Config::load(home).await?,
            salesperson,
            report_args.period(),
            report_args.report_type(),
            report_args.out_dir(),
            Local::now().date_naive(),
        )
        .await?
        .print(),

        Command::Backup => commands::backup(Config::load(home).await?, salesperson, Utc::now())
            .await?
            .print(),

        Command::Restore(restore_args) => {
            let config = Config::load(home).await?;
            if restore_args.yes() {
                commands::restore(config, restore_args.file(), |_| true)
                    .await?
                    .print()
            } else {
                commands::restore(config, restore_args.file(), confirm_restore)
                    .await?
                    .print()
            }
        }

        Command::Schedule(schedule_args) => {
            let change = ScheduleChange {
                enabled: schedule_args.enabled(),
                time1: schedule_args.time1().map(str::to_string),
                time2: schedule_args.time2().map(str::to_string),
            };
            commands::schedule(Config::load(home).await?, change)
                .await?
                .print()
        }

        Command::Watch => commands::watch(Config::load(home).await?).await?.print(),
    };
    Ok(())
}

/// Asks on the terminal whether the staged backup should replace the current data.
fn confirm_restore(decoded: &Decoded) -> bool {
    if !decoded.skipped.is_empty() {
        warn!(
            "{} rows of the backup are invalid and will not be restored",
            decoded.skipped.len()
        );
    }
    eprint!(
        "Replace all data of {} with {} rows from the backup{}? [y/N] ",
        decoded.salesperson_id,
        decoded.restored_rows,
        decoded
            .timestamp
            .as_deref()
            .map(|t| format!(" made at {t}"))
            .unwrap_or_default()
    );
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut answer) {
        warn!("Unable to read the answer: {e}");
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
