//! File generators for reports and the sinks that deliver them.
//!
//! Generators build the whole file in memory and hand the bytes to a [`ReportSink`].
//! An empty row set yields `Ok(false)` without touching the sink.

pub mod csv;
pub mod pdf;
pub mod xlsx;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::Row;
use crate::table::{CellValue, Column};

use super::kind::ReportKind;
use super::summary::SummaryStats;
use super::{ReportFormat, ReportType, report_filename};

/// Final destination of a generated report file.
pub trait ReportSink: Send + Sync {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes reports straight into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl ReportSink for DirectorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(filename);
        fs::write(&path, bytes)?;
        info!("Report saved to {}", path.display());
        Ok(())
    }
}

/// Asks the user where to save, starting in a default directory.
#[derive(Debug, Clone)]
pub struct DialogSink {
    start_dir: PathBuf,
}

impl DialogSink {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
        }
    }
}

impl ReportSink for DialogSink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();

        let mut dialog = rfd::FileDialog::new().set_file_name(filename);
        if self.start_dir.is_dir() {
            dialog = dialog.set_directory(&self.start_dir);
        }
        if !extension.is_empty() {
            dialog = dialog.add_filter(format!("{} files", extension.to_uppercase()), &[extension.as_str()]);
        }

        let path = dialog.save_file().ok_or(AppError::Cancelled)?;
        fs::write(&path, bytes)?;
        info!("Report saved to {}", path.display());
        Ok(())
    }
}

/// Rows and layout for one report, with the per-type rules resolved once.
pub struct ReportJob<'a> {
    pub report_type: ReportType,
    pub rows: Vec<Row>,
    pub columns: Vec<&'a Column>,
    pub summary: SummaryStats,
    pub brand: String,
    pub generated_at: NaiveDateTime,
    kind: &'static ReportKind,
}

impl<'a> ReportJob<'a> {
    pub fn new(
        report_type: ReportType,
        rows: Vec<Row>,
        columns: Vec<&'a Column>,
        brand: impl Into<String>,
        generated_at: NaiveDateTime,
    ) -> Self {
        let kind = report_type.kind();
        let summary = if rows.is_empty() {
            SummaryStats::default()
        } else {
            (kind.summarize)(&rows)
        };
        Self {
            report_type,
            rows,
            columns,
            summary,
            brand: brand.into(),
            generated_at,
            kind,
        }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn cells(&self, row: &Row) -> Vec<CellValue> {
        self.columns.iter().map(|c| self.kind.cell(c, row)).collect()
    }

    pub fn filename(&self, format: ReportFormat) -> String {
        report_filename(self.report_type, format)
    }

    pub fn title(&self) -> &'static str {
        self.report_type.title()
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Build the file for `format` and deliver it. `Ok(false)` when there is nothing to export.
pub fn generate(format: ReportFormat, job: &ReportJob<'_>, sink: &dyn ReportSink) -> Result<bool> {
    if job.rows.is_empty() {
        return Ok(false);
    }

    let bytes = match format {
        ReportFormat::Csv => csv::render(job)?,
        ReportFormat::Pdf => pdf::render(job)?,
        ReportFormat::Excel => xlsx::render(job)?,
    };
    sink.deliver(&job.filename(format), &bytes)?;
    Ok(true)
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::test_support::{RecordingSink, fixed_time, rows};
    use super::*;

    #[test]
    fn test_empty_rows_never_reach_sink() {
        let columns = vec![Column::new("status", "Status")];
        let job = ReportJob::new(ReportType::Payment, Vec::new(), columns.iter().collect(), "Brand", fixed_time());
        let sink = RecordingSink::default();

        for format in ReportFormat::ALL {
            assert!(!generate(format, &job, &sink).unwrap());
        }
        assert!(sink.files.lock().unwrap().is_empty());
        assert!(job.summary.is_empty());
    }

    #[test]
    fn test_every_format_delivers_named_file() {
        let columns = vec![Column::new("description", "Description"), Column::new("amount", "Amount")];
        let data = rows(json!([
            {"description": "Bond paper", "amount": 120, "expenseStatus": "PAID", "approvalStatus": "APPROVED"}
        ]));
        let job = ReportJob::new(ReportType::Expense, data, columns.iter().collect(), "Brand", fixed_time());
        let sink = RecordingSink::default();

        for format in ReportFormat::ALL {
            assert!(generate(format, &job, &sink).unwrap());
        }

        let files = sink.files.lock().unwrap();
        let names: Vec<_> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["expense_report.csv", "expense_report.pdf", "expense_report.xlsx"]);
        assert!(files.iter().all(|(_, bytes)| !bytes.is_empty()));
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("reports"));
        sink.deliver("student_report.csv", b"\"Name\"\n").unwrap();

        let written = fs::read_to_string(sink.path_for("student_report.csv")).unwrap();
        assert_eq!(written, "\"Name\"\n");
    }

    #[test]
    fn test_job_resolves_cells_with_type_rules() {
        let columns = vec![Column::new("fullName", "Name"), Column::new("yearSec", "Year & Section")];
        let data = rows(json!([{"lastName": "Cruz", "firstName": "Jose", "yearLevel": 1, "section": "C"}]));
        let job = ReportJob::new(ReportType::Student, data, columns.iter().collect(), "Brand", fixed_time());

        assert_eq!(job.headers(), vec!["Name", "Year & Section"]);
        assert_eq!(
            job.cells(&job.rows[0]),
            vec![CellValue::Text("Cruz, Jose".to_string()), CellValue::Text("1 - C".to_string())]
        );
        assert_eq!(job.timestamp(), "2025-03-14 09:30:00");
    }
}
