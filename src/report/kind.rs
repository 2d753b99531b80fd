//! Per-report-type dispatch table: cell resolution and summary building.

use serde_json::Value;

use crate::models::{Row, row_number};
use crate::table::column::{enum_label, student_name, year_section, yes_no};
use crate::table::{CellValue, Column};

use super::ReportType;
use super::summary::{self, SummaryStats};

/// Rules for one report type, looked up once per export.
pub struct ReportKind {
    /// Special-cased cell for a column key; `None` defers to the column's formatter.
    pub resolve: fn(&str, &Row) -> Option<CellValue>,
    pub summarize: fn(&[Row]) -> SummaryStats,
}

static STUDENT: ReportKind = ReportKind {
    resolve: resolve_student,
    summarize: summary::student_summary,
};

static PAYMENT: ReportKind = ReportKind {
    resolve: resolve_payment,
    summarize: summary::payment_summary,
};

static REMITTANCE: ReportKind = ReportKind {
    resolve: resolve_remittance,
    summarize: summary::remittance_summary,
};

static EXPENSE: ReportKind = ReportKind {
    resolve: resolve_expense,
    summarize: summary::expense_summary,
};

pub(super) fn lookup(report_type: ReportType) -> &'static ReportKind {
    match report_type {
        ReportType::Student => &STUDENT,
        ReportType::Payment => &PAYMENT,
        ReportType::Remittance => &REMITTANCE,
        ReportType::Expense => &EXPENSE,
    }
}

impl ReportKind {
    /// Resolve one cell: type rule, then column formatter, then the raw property.
    pub fn cell(&self, column: &Column, row: &Row) -> CellValue {
        (self.resolve)(&column.key, row).unwrap_or_else(|| column.cell(row))
    }
}

const CURRENCY_KEYS: [&str; 6] = [
    "amount",
    "amountPaid",
    "totalAmount",
    "remittedAmount",
    "balance",
    "feeAmount",
];

const EXPENSE_ENUM_KEYS: [&str; 4] = ["expenseCategory", "paymentMethod", "expenseStatus", "approvalStatus"];

fn currency(key: &str, row: &Row) -> Option<CellValue> {
    if !CURRENCY_KEYS.contains(&key) {
        return None;
    }
    Some(row_number(row, key).map(CellValue::Number).unwrap_or(CellValue::Empty))
}

/// Name and year/section synthesis shared by every student-centric row shape.
fn student_fields(key: &str, row: &Row) -> Option<CellValue> {
    match key {
        "fullName" | "studentName" => Some(student_name(row).map(CellValue::text).unwrap_or(CellValue::Empty)),
        "yearSec" => Some(year_section(row).map(CellValue::text).unwrap_or(CellValue::Empty)),
        _ => None,
    }
}

fn resolve_student(key: &str, row: &Row) -> Option<CellValue> {
    student_fields(key, row)
}

fn resolve_payment(key: &str, row: &Row) -> Option<CellValue> {
    student_fields(key, row).or_else(|| currency(key, row))
}

fn resolve_remittance(key: &str, row: &Row) -> Option<CellValue> {
    student_fields(key, row).or_else(|| currency(key, row))
}

fn resolve_expense(key: &str, row: &Row) -> Option<CellValue> {
    if let Some(cell) = currency(key, row) {
        return Some(cell);
    }
    match row.get(key) {
        Some(Value::String(s)) if EXPENSE_ENUM_KEYS.contains(&key) => Some(CellValue::text(enum_label(s))),
        Some(Value::Bool(b)) => Some(CellValue::text(yes_no(*b))),
        _ => None,
    }
}
