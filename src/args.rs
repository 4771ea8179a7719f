//! These structs provide the CLI interface for the contacts CLI.

use crate::calendar::YearMonth;
use crate::model::Source;
use crate::report::ReportType;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// contacts: A command-line tool for tracking daily customer contacts.
///
/// Each salesperson records, day by day, how many customers reached them through each
/// acquisition channel (website, Facebook, OLX, referrals and so on). The counts can be
/// summarized per week or per month, exported as reports, and backed up to CSV files that can
/// later be restored.
///
/// Commands that work on a salesperson use the active one (see `contacts select`) unless
/// --salesperson is given.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/contacts. If you want it somewhere else, pass --contacts-home or set
    /// CONTACTS_HOME.
    Init,
    /// Show the salespeople, or make one of them the active salesperson.
    Select(SelectArgs),
    /// Record one contact from a source.
    Add(AddArgs),
    /// Remove one contact from a source.
    Remove(RemoveArgs),
    /// Set the note of the "other" source for a day without changing its count.
    Note(NoteArgs),
    /// Show the contacts recorded on a day.
    Show(DateArgs),
    /// Show how a month is split into weeks.
    Weeks(PeriodArgs),
    /// Show the contact totals of a month, or of each of its weeks.
    Summary(SummaryArgs),
    /// Export a monthly or weekly report as a CSV file.
    Report(ReportArgs),
    /// Save a backup of a salesperson's data to the backups directory.
    Backup,
    /// Restore a salesperson's data from a backup file.
    ///
    /// The salesperson is the one named in the backup file. All of their current data is
    /// replaced by the contents of the backup.
    Restore(RestoreArgs),
    /// Show or change the automatic backup schedule.
    Schedule(ScheduleArgs),
    /// Run the automatic backup schedule until interrupted with Ctrl-C.
    Watch,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where contact data and configuration is held. Defaults to ~/contacts
    #[arg(long, env = "CONTACTS_HOME", default_value_t = default_contacts_home())]
    contacts_home: DisplayPath,

    /// The salesperson to work with instead of the active one.
    #[arg(long, global = true)]
    salesperson: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, contacts_home: PathBuf, salesperson: Option<String>) -> Self {
        Self {
            log_level,
            contacts_home: contacts_home.into(),
            salesperson,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn contacts_home(&self) -> &DisplayPath {
        &self.contacts_home
    }

    pub fn salesperson(&self) -> Option<&str> {
        self.salesperson.as_deref()
    }
}

/// Args for the `contacts select` command.
#[derive(Debug, Parser, Clone)]
pub struct SelectArgs {
    /// The salesperson to make active. Lists the salespeople when omitted.
    salesperson: Option<String>,
}

impl SelectArgs {
    pub fn new(salesperson: Option<String>) -> Self {
        Self { salesperson }
    }

    pub fn salesperson(&self) -> Option<&str> {
        self.salesperson.as_deref()
    }
}

/// Args for the `contacts add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The source of the contact, e.g. facebook, google-ads, other
    #[arg(value_parser = parse_source)]
    source: Source,

    /// A note. Only kept for the "other" source.
    #[arg(long)]
    note: Option<String>,

    #[clap(flatten)]
    date: DateArgs,
}

impl AddArgs {
    pub fn new(source: Source, note: Option<String>, date: Option<NaiveDate>) -> Self {
        Self {
            source,
            note,
            date: DateArgs::new(date),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Args for the `contacts remove` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveArgs {
    /// The source of the contact, e.g. facebook, google-ads, other
    #[arg(value_parser = parse_source)]
    source: Source,

    #[clap(flatten)]
    date: DateArgs,
}

impl RemoveArgs {
    pub fn new(source: Source, date: Option<NaiveDate>) -> Self {
        Self {
            source,
            date: DateArgs::new(date),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn date(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Args for the `contacts note` command.
#[derive(Debug, Parser, Clone)]
pub struct NoteArgs {
    /// The note text. An empty string clears the note.
    note: String,

    #[clap(flatten)]
    date: DateArgs,
}

impl NoteArgs {
    pub fn new(note: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            note: note.into(),
            date: DateArgs::new(date),
        }
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn date(&self) -> NaiveDate {
        self.date.date()
    }
}

/// The day a command works on.
#[derive(Debug, Parser, Clone)]
pub struct DateArgs {
    /// The day as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl DateArgs {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// The month a command works on.
#[derive(Debug, Parser, Clone)]
pub struct PeriodArgs {
    /// The month as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    period: Option<YearMonth>,
}

impl PeriodArgs {
    pub fn new(period: Option<YearMonth>) -> Self {
        Self { period }
    }

    pub fn period(&self) -> YearMonth {
        self.period.unwrap_or_else(YearMonth::current)
    }
}

/// Args for the `contacts summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Show one total per week instead of one for the month.
    #[arg(long)]
    weekly: bool,

    #[clap(flatten)]
    period: PeriodArgs,
}

impl SummaryArgs {
    pub fn new(weekly: bool, period: Option<YearMonth>) -> Self {
        Self {
            weekly,
            period: PeriodArgs::new(period),
        }
    }

    pub fn weekly(&self) -> bool {
        self.weekly
    }

    pub fn period(&self) -> YearMonth {
        self.period.period()
    }
}

/// Args for the `contacts report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The kind of report.
    #[arg(long = "type", value_enum, default_value_t = ReportType::Monthly)]
    report_type: ReportType,

    /// The directory to write the report to. Defaults to the current directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[clap(flatten)]
    period: PeriodArgs,
}

impl ReportArgs {
    pub fn new(report_type: ReportType, out_dir: Option<PathBuf>, period: Option<YearMonth>) -> Self {
        Self {
            report_type,
            out_dir,
            period: PeriodArgs::new(period),
        }
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn out_dir(&self) -> &Path {
        self.out_dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn period(&self) -> YearMonth {
        self.period.period()
    }
}

/// Args for the `contacts restore` command.
#[derive(Debug, Parser, Clone)]
pub struct RestoreArgs {
    /// The backup file to restore from.
    file: PathBuf,

    /// Restore without asking for confirmation.
    #[arg(long, short = 'y')]
    yes: bool,
}

impl RestoreArgs {
    pub fn new(file: impl Into<PathBuf>, yes: bool) -> Self {
        Self {
            file: file.into(),
            yes,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `contacts schedule` command. Without flags the current settings are shown.
#[derive(Debug, Parser, Clone)]
pub struct ScheduleArgs {
    /// Turn automatic backups on.
    #[arg(long, conflicts_with = "disable")]
    enable: bool,

    /// Turn automatic backups off.
    #[arg(long)]
    disable: bool,

    /// The first daily backup time, HH:MM.
    #[arg(long)]
    time1: Option<String>,

    /// The second daily backup time, HH:MM.
    #[arg(long)]
    time2: Option<String>,
}

impl ScheduleArgs {
    pub fn new(enabled: Option<bool>, time1: Option<String>, time2: Option<String>) -> Self {
        Self {
            enable: enabled == Some(true),
            disable: enabled == Some(false),
            time1,
            time2,
        }
    }

    /// `Some(true)` for --enable, `Some(false)` for --disable, otherwise `None`.
    pub fn enabled(&self) -> Option<bool> {
        match (self.enable, self.disable) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }

    pub fn time1(&self) -> Option<&str> {
        self.time1.as_deref()
    }

    pub fn time2(&self) -> Option<&str> {
        self.time2.as_deref()
    }
}

fn parse_source(s: &str) -> Result<Source, String> {
    Source::parse_loose(s).ok_or_else(|| {
        let keys: Vec<String> = Source::ALL
            .iter()
            .map(|s| s.key().to_lowercase().replace('_', "-"))
            .collect();
        format!("unknown source '{s}', expected one of: {}", keys.join(", "))
    })
}

fn default_contacts_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("contacts"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --contacts-home or CONTACTS_HOME instead of relying on the \
                default contacts home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("contacts")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "contacts",
            "--contacts-home",
            "/tmp/c",
            "add",
            "google-ads",
            "--date",
            "2025-06-03",
            "--salesperson",
            "Handlowiec 2",
        ])
        .unwrap();
        assert_eq!(args.common().contacts_home().path(), Path::new("/tmp/c"));
        assert_eq!(args.common().salesperson(), Some("Handlowiec 2"));
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.source(), Source::GoogleAds);
        assert_eq!(add.date(), NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(add.note(), None);
    }

    #[test]
    fn test_parse_unknown_source() {
        let result = Args::try_parse_from(["contacts", "add", "tiktok"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_report_and_schedule() {
        let args =
            Args::try_parse_from(["contacts", "report", "--type", "weekly", "--period", "2025-06"])
                .unwrap();
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        assert_eq!(report.report_type(), ReportType::Weekly);
        assert_eq!(report.period(), YearMonth::new(2025, 5).unwrap());
        assert_eq!(report.out_dir(), Path::new("."));

        let args = Args::try_parse_from(["contacts", "schedule", "--disable", "--time1", "9:30"])
            .unwrap();
        let Command::Schedule(schedule) = args.command() else {
            panic!("expected schedule");
        };
        assert_eq!(schedule.enabled(), Some(false));
        assert_eq!(schedule.time1(), Some("9:30"));

        let conflicting = Args::try_parse_from(["contacts", "schedule", "--enable", "--disable"]);
        assert!(conflicting.is_err());
    }
}
