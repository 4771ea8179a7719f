use crate::calendar::YearMonth;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::report::{file_name, Report, ReportType};
use crate::tracker::Tracker;
use crate::{utils, Config, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Writes a monthly or weekly report for `period` as a CSV file into `out_dir` and returns its
/// path.
pub async fn report(
    config: Config,
    salesperson: Option<&str>,
    period: YearMonth,
    report_type: ReportType,
    out_dir: &Path,
    generated: NaiveDate,
) -> Result<Out<PathBuf>> {
    let salesperson = config.salesperson(salesperson)?;
    let tracker = Tracker::load(config.store()).await;
    let report = Report::prepare(
        report_type,
        &salesperson,
        period,
        tracker
            .ledger()
            .month(&salesperson, period.year(), period.month_index()),
        generated,
    )?;
    let csv = report.to_csv()?;

    let path = out_dir.join(file_name(&salesperson, period));
    utils::write(&path, csv)
        .await
        .pub_result(ErrorType::StorageWrite)?;
    Ok(Out::new(
        format!("Saved the {report_type} report to {}", path.display()),
        path,
    ))
}
