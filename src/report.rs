//! One-way report export: monthly or weekly summaries as a CSV file.

use crate::calendar::{month_name_pl, partition_month, YearMonth};
use crate::delimited::{write_records, EOL};
use crate::model::{MonthData, Source};
use crate::summary::{aggregate_month, aggregate_week, Summary};
use crate::{utils, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Monthly,
    Weekly,
}

serde_plain::derive_display_from_serialize!(ReportType);
serde_plain::derive_fromstr_from_deserialize!(ReportType);

/// A titled summary within a report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub summary: Summary,
}

/// The content of an exported report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub salesperson: String,
    /// e.g. `Czerwiec 2025`
    pub period: String,
    /// `DD.MM.YYYY`
    pub generated: String,
    pub sections: Vec<ReportSection>,
}

impl Report {
    /// Builds a report over `month`. A monthly report has one section; a weekly report has one
    /// section per week segment of the month.
    pub fn prepare(
        report_type: ReportType,
        salesperson: &str,
        period: YearMonth,
        month: Option<&MonthData>,
        generated: NaiveDate,
    ) -> Result<Self> {
        let sections = match report_type {
            ReportType::Monthly => vec![ReportSection {
                title: format!("Podsumowanie Całkowite - {}", period.display_pl()),
                summary: aggregate_month(month),
            }],
            ReportType::Weekly => partition_month(period.year(), period.month_index())?
                .into_iter()
                .map(|week| ReportSection {
                    summary: aggregate_week(month, &week),
                    title: week.label,
                })
                .collect(),
        };
        let title = match report_type {
            ReportType::Monthly => "Raport Miesięczny",
            ReportType::Weekly => "Raport Tygodniowy",
        };
        Ok(Self {
            title: title.to_string(),
            salesperson: salesperson.to_string(),
            period: period.display_pl(),
            generated: generated.format("%d.%m.%Y").to_string(),
            sections,
        })
    }

    /// Renders the report as semicolon-delimited CSV.
    pub fn to_csv(&self) -> Result<String> {
        let mut out = write_records([
            ["Raport", self.title.as_str()],
            ["Handlowiec", self.salesperson.as_str()],
            ["Okres", self.period.as_str()],
            ["Wygenerowano", self.generated.as_str()],
        ])?;
        out.push_str(EOL);

        for section in &self.sections {
            let mut rows: Vec<Vec<String>> = vec![
                vec![section.title.clone()],
                vec!["Źródło".to_string(), "Ilość".to_string()],
            ];
            rows.extend(Source::ALL.into_iter().map(|source| {
                vec![
                    source.label().to_string(),
                    section.summary.count(source).to_string(),
                ]
            }));
            rows.push(vec![
                "Łącznie".to_string(),
                section.summary.total().to_string(),
            ]);
            out.push_str(&write_records(rows)?);
            out.push_str(EOL);
        }
        Ok(out)
    }
}

/// e.g. `Raport_Handlowiec_1_Czerwiec_2025.csv`
pub fn file_name(salesperson: &str, period: YearMonth) -> String {
    format!(
        "Raport_{}_{}_{}.csv",
        utils::sanitize_file_component(salesperson),
        utils::sanitize_file_component(month_name_pl(period.month_index())),
        period.year()
    )
}
