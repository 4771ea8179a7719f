use crate::calendar::{partition_month, WeekSegment, YearMonth};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Source;
use crate::report::{Report, ReportType};
use crate::tracker::Tracker;
use crate::{Config, Result};
use chrono::Local;

/// Lists the week segments of `period`.
pub async fn weeks(period: YearMonth) -> Result<Out<Vec<WeekSegment>>> {
    let weeks = partition_month(period.year(), period.month_index()).pub_result(ErrorType::Request)?;
    let mut message = format!("Weeks of {}:", period.display_pl());
    for week in &weeks {
        message.push_str(&format!("\n  {}", week.label));
    }
    Ok(Out::new(message, weeks))
}

/// Totals per source for `period`, either for the whole month or one block per week.
pub async fn summary(
    config: Config,
    salesperson: Option<&str>,
    period: YearMonth,
    weekly: bool,
) -> Result<Out<Report>> {
    let salesperson = config.salesperson(salesperson)?;
    let tracker = Tracker::load(config.store()).await;
    let report_type = if weekly {
        ReportType::Weekly
    } else {
        ReportType::Monthly
    };
    let report = Report::prepare(
        report_type,
        &salesperson,
        period,
        tracker
            .ledger()
            .month(&salesperson, period.year(), period.month_index()),
        Local::now().date_naive(),
    )?;

    let mut message = format!("{salesperson}, {}", report.period);
    for section in &report.sections {
        message.push_str(&format!("\n{}", section.title));
        for source in Source::ALL {
            let count = section.summary.count(source);
            if count > 0 {
                message.push_str(&format!("\n  {}: {count}", source.label()));
            }
        }
        message.push_str(&format!("\n  Łącznie: {}", section.summary.total()));
    }
    Ok(Out::new(message, report))
}
