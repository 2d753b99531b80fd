//! Report export: field/filter selection, per-type cell resolution, summaries, and
//! CSV/PDF/XLSX generation over the full filtered dataset of a report endpoint.

pub mod dialog;
pub mod export;
pub mod fields;
pub mod filters;
pub mod generate;
pub mod kind;
pub mod summary;

use std::fmt;
use std::str::FromStr;

pub use dialog::ReportDialogState;
pub use export::{DialogSink, DirectorySink, ReportJob, ReportSink};
pub use fields::FieldSelection;
pub use filters::{default_report_filters, report_params};
pub use generate::{NoticeLevel, ReportError, ReportNotice, ReportOutcome, ReportRequest, ReportSource, generate_report};
pub use kind::ReportKind;
pub use summary::{SummaryStats, SummaryValue};

/// Which dataset a report covers. Selects the endpoint and the cell/summary rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    Student,
    Payment,
    Remittance,
    Expense,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Student,
        ReportType::Payment,
        ReportType::Remittance,
        ReportType::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Student => "student",
            ReportType::Payment => "payment",
            ReportType::Remittance => "remittance",
            ReportType::Expense => "expense",
        }
    }

    /// Human title, e.g. "Payment Report".
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Student => "Student Report",
            ReportType::Payment => "Payment Report",
            ReportType::Remittance => "Remittance Report",
            ReportType::Expense => "Expense Report",
        }
    }

    /// Collection whose `/report` endpoint serves this report.
    pub fn collection_path(&self) -> &'static str {
        match self {
            ReportType::Student => "/students",
            ReportType::Payment => "/payments",
            ReportType::Remittance => "/remittances",
            ReportType::Expense => "/expenses",
        }
    }

    /// Payment and remittance reports are always scoped to one fee.
    pub fn requires_fee(&self) -> bool {
        matches!(self, ReportType::Payment | ReportType::Remittance)
    }

    /// Cell and summary rules for this type.
    pub fn kind(&self) -> &'static ReportKind {
        kind::lookup(*self)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(ReportType::Student),
            "payment" => Ok(ReportType::Payment),
            "remittance" => Ok(ReportType::Remittance),
            "expense" => Ok(ReportType::Expense),
            _ => Err(ReportError::UnsupportedType(s.to_string())),
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Csv,
    Pdf,
    Excel,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Csv, ReportFormat::Pdf, ReportFormat::Excel];

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "xlsx",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "CSV",
            ReportFormat::Pdf => "PDF",
            ReportFormat::Excel => "Excel",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "pdf" => Ok(ReportFormat::Pdf),
            "excel" | "xlsx" => Ok(ReportFormat::Excel),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// `{type}_report.{ext}`.
pub fn report_filename(report_type: ReportType, format: ReportFormat) -> String {
    format!("{}_report.{}", report_type.as_str(), format.extension())
}
