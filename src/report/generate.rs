//! Report orchestration: validate, fetch the full dataset, build the file, deliver it.

use std::future::Future;

use chrono::Local;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{ApiClient, QueryParams};
use crate::error::{AppError, Result};
use crate::models::Row;
use crate::table::{Column, FilterSet};

use super::export::{self, ReportJob, ReportSink};
use super::filters::report_params;
use super::{ReportFormat, ReportType};

/// Where report rows come from.
pub trait ReportSource {
    /// Full, unpaginated rows of `report_type` matching `params`.
    fn fetch_report(&self, report_type: ReportType, params: QueryParams)
    -> impl Future<Output = Result<Vec<Row>>> + Send;
}

impl ReportSource for ApiClient {
    async fn fetch_report(&self, report_type: ReportType, params: QueryParams) -> Result<Vec<Row>> {
        self.rows(report_type.collection_path()).report(&params).await
    }
}

/// Everything needed to produce one report file.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub format: ReportFormat,
    /// Selected columns, in table order.
    pub columns: Vec<Column>,
    pub filters: FilterSet,
    pub brand: String,
}

/// A delivered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub filename: String,
    pub rows: usize,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Please select a specific fee type for the {0} report")]
    FeeTypeRequired(ReportType),

    #[error("Select at least one field to include in the report")]
    NoFieldsSelected,

    #[error("No records match the selected filters")]
    NoData,

    #[error("Unsupported report type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to fetch report data: {0}")]
    Fetch(#[source] AppError),

    #[error("Failed to generate report: {0}")]
    Generation(#[source] AppError),

    #[error("The report was not saved")]
    Cancelled,
}

impl ReportError {
    pub fn title(&self) -> &'static str {
        match self {
            ReportError::FeeTypeRequired(_) => "Fee Type Required",
            ReportError::NoFieldsSelected => "No Fields Selected",
            ReportError::NoData => "No Data",
            ReportError::UnsupportedType(_) | ReportError::UnsupportedFormat(_) => "Unsupported Report",
            ReportError::Fetch(_) => "Report Failed",
            ReportError::Generation(_) => "Report Failed",
            ReportError::Cancelled => "Report Cancelled",
        }
    }

    /// Whether the session must be dropped.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ReportError::Fetch(e) if e.is_unauthorized())
    }

    /// Dialog text. Backend failures keep the backend's own wording when it sent one.
    pub fn notice(&self) -> ReportNotice {
        let message = match self {
            ReportError::Fetch(AppError::Api { message, .. }) if !message.trim().is_empty() => message.clone(),
            ReportError::Fetch(e) => e.user_message(),
            ReportError::Generation(e) => format!("Something went wrong while building the report file: {e}"),
            other => other.to_string(),
        };
        let level = match self {
            ReportError::NoData | ReportError::Cancelled => NoticeLevel::Info,
            ReportError::FeeTypeRequired(_) | ReportError::NoFieldsSelected => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        ReportNotice {
            level,
            title: self.title().to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-facing notification for a report attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNotice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl ReportNotice {
    pub fn success(outcome: &ReportOutcome) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Report Generated".to_string(),
            message: format!("{} ({} records)", outcome.filename, outcome.rows),
        }
    }
}

/// Generate a report end to end.
///
/// Preconditions are checked before any request is made. Zero rows yield
/// [`ReportError::NoData`] and nothing is delivered.
pub async fn generate_report<S>(
    source: &S,
    request: ReportRequest,
    sink: &dyn ReportSink,
) -> std::result::Result<ReportOutcome, ReportError>
where
    S: ReportSource + Sync,
{
    let ReportRequest {
        report_type,
        format,
        columns,
        filters,
        brand,
    } = request;

    if columns.is_empty() {
        return Err(ReportError::NoFieldsSelected);
    }
    let params = report_params(report_type, &filters)?;

    info!("Fetching {} report rows ({} filters)", report_type, params.len());
    let rows = source
        .fetch_report(report_type, params)
        .await
        .map_err(|e| {
            warn!("Report fetch failed: {}", e);
            ReportError::Fetch(e)
        })?;

    let count = rows.len();
    let job = ReportJob::new(report_type, rows, columns.iter().collect(), brand, Local::now().naive_local());
    let filename = job.filename(format);

    match export::generate(format, &job, sink) {
        Ok(true) => {
            info!("Generated {} with {} records", filename, count);
            Ok(ReportOutcome { filename, rows: count })
        }
        Ok(false) => Err(ReportError::NoData),
        Err(AppError::Cancelled) => {
            info!("Saving {} cancelled", filename);
            Err(ReportError::Cancelled)
        }
        Err(e) => {
            error!("Report generation failed: {}", e);
            Err(ReportError::Generation(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::report::export::test_support::{RecordingSink, rows};
    use crate::table::FilterKey;

    struct FakeSource {
        rows: Vec<Row>,
        fail: Option<u16>,
        calls: AtomicUsize,
        last_params: Mutex<Option<QueryParams>>,
    }

    impl FakeSource {
        fn with_rows(rows: Vec<Row>) -> Self {
            Self {
                rows,
                fail: None,
                calls: AtomicUsize::new(0),
                last_params: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ReportSource for FakeSource {
        async fn fetch_report(&self, _report_type: ReportType, params: QueryParams) -> Result<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_params.lock().unwrap() = Some(params);
            match self.fail {
                Some(status) => Err(AppError::Api {
                    status,
                    message: "Fee not found".to_string(),
                }),
                None => Ok(self.rows.clone()),
            }
        }
    }

    fn payment_rows() -> Vec<Row> {
        rows(json!([
            {"status": "PAID", "amount": 100},
            {"status": "PENDING", "amount": 50}
        ]))
    }

    fn request(report_type: ReportType, filters: FilterSet) -> ReportRequest {
        ReportRequest {
            report_type,
            format: ReportFormat::Csv,
            columns: vec![Column::new("status", "Status"), Column::new("amount", "Amount")],
            filters,
            brand: "Student Council Treasury".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fee_required_blocks_fetch() {
        let source = FakeSource::with_rows(payment_rows());
        let sink = RecordingSink::default();

        for filters in [
            FilterSet::new(),
            FilterSet::from_pairs([(FilterKey::FeeType, "all")]),
        ] {
            let err = generate_report(&source, request(ReportType::Payment, filters), &sink)
                .await
                .unwrap_err();
            assert!(matches!(err, ReportError::FeeTypeRequired(ReportType::Payment)));
            assert_eq!(err.notice().title, "Fee Type Required");
        }
        assert_eq!(source.calls(), 0);
        assert!(sink.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_report_happy_path() {
        let source = FakeSource::with_rows(payment_rows());
        let sink = RecordingSink::default();
        let filters = FilterSet::from_pairs([(FilterKey::FeeType, "3"), (FilterKey::Program, "all")]);

        let outcome = generate_report(&source, request(ReportType::Payment, filters), &sink)
            .await
            .unwrap();

        assert_eq!(outcome.filename, "payment_report.csv");
        assert_eq!(outcome.rows, 2);
        assert_eq!(source.calls(), 1);
        assert_eq!(
            source.last_params.lock().unwrap().clone().unwrap(),
            vec![("feeId".to_string(), "3".to_string())]
        );

        let files = sink.files.lock().unwrap();
        let text = String::from_utf8(files[0].1.clone()).unwrap();
        assert!(text.starts_with("\"Status\",\"Amount\"\n"));
        assert!(text.contains("\nPaid Payments,1\n"));
    }

    #[tokio::test]
    async fn test_empty_result_is_no_data() {
        let source = FakeSource::with_rows(Vec::new());
        let sink = RecordingSink::default();

        let err = generate_report(&source, request(ReportType::Student, FilterSet::new()), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NoData));
        assert_eq!(err.notice().level, NoticeLevel::Info);
        assert_eq!(source.calls(), 1);
        assert!(sink.files.lock().unwrap().is_empty());
    }

    #[test]
    fn test_generation_notice_keeps_cause() {
        let notice = ReportError::Generation(AppError::export("PDF error: font table overflow")).notice();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Report Failed");
        assert!(notice.message.starts_with("Something went wrong while building the report file"));
        assert!(notice.message.contains("font table overflow"));
    }

    #[tokio::test]
    async fn test_backend_message_surfaces() {
        let mut source = FakeSource::with_rows(Vec::new());
        source.fail = Some(404);
        let sink = RecordingSink::default();

        let err = generate_report(&source, request(ReportType::Expense, FilterSet::new()), &sink)
            .await
            .unwrap_err();
        let notice = err.notice();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Fee not found");
    }

    #[tokio::test]
    async fn test_no_fields_selected() {
        let source = FakeSource::with_rows(payment_rows());
        let sink = RecordingSink::default();
        let mut req = request(ReportType::Student, FilterSet::new());
        req.columns.clear();

        let err = generate_report(&source, req, &sink).await.unwrap_err();
        assert!(matches!(err, ReportError::NoFieldsSelected));
        assert_eq!(source.calls(), 0);
    }
}
