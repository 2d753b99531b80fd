//! Summary statistics computed over an exported dataset.

use std::fmt;

use crate::models::{Row, row_number, row_text};
use crate::table::column::{enum_label, format_amount};

/// A single aggregate figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryValue {
    Count(usize),
    Amount(f64),
}

impl SummaryValue {
    /// Plain text without grouping, safe inside an unquoted CSV field.
    pub fn plain(&self) -> String {
        match self {
            SummaryValue::Count(n) => n.to_string(),
            SummaryValue::Amount(a) => format!("{a:.2}"),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            SummaryValue::Count(n) => *n as f64,
            SummaryValue::Amount(a) => *a,
        }
    }
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryValue::Count(n) => write!(f, "{n}"),
            SummaryValue::Amount(a) => f.write_str(&format_amount(*a)),
        }
    }
}

/// Ordered label -> value list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    entries: Vec<(String, SummaryValue)>,
}

impl SummaryStats {
    /// Stats every report starts with.
    pub fn with_total(rows: &[Row]) -> Self {
        let mut stats = Self::default();
        stats.push("Total Records", SummaryValue::Count(rows.len()));
        stats
    }

    pub fn push(&mut self, label: impl Into<String>, value: SummaryValue) {
        self.entries.push((label.into(), value));
    }

    pub fn get(&self, label: &str) -> Option<SummaryValue> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SummaryValue)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn sum(rows: &[Row], keys: &[&str]) -> f64 {
    rows.iter()
        .filter_map(|row| keys.iter().find_map(|k| row_number(row, k)))
        .sum()
}

fn count_eq(rows: &[Row], key: &str, expected: &str) -> usize {
    rows.iter()
        .filter(|row| row_text(row, key).is_some_and(|v| v.eq_ignore_ascii_case(expected)))
        .count()
}

/// Counts per distinct value, in first-seen order.
fn histogram(rows: &[Row], key: &str) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in rows.iter().filter_map(|row| row_text(row, key)) {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

/// `"NOT_REMITTED"` -> `"Not Remitted"`.
pub fn title_case(raw: &str) -> String {
    enum_label(raw)
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn student_summary(rows: &[Row]) -> SummaryStats {
    let mut stats = SummaryStats::with_total(rows);
    let mut levels = histogram(rows, "yearLevel");
    levels.sort();
    for (level, count) in levels {
        stats.push(format!("Year {level} Students"), SummaryValue::Count(count));
    }
    stats
}

pub fn payment_summary(rows: &[Row]) -> SummaryStats {
    let mut stats = SummaryStats::with_total(rows);
    stats.push("Total Amount", SummaryValue::Amount(sum(rows, &["amount", "amountPaid"])));
    stats.push("Paid Payments", SummaryValue::Count(count_eq(rows, "status", "PAID")));
    stats.push("Pending Payments", SummaryValue::Count(count_eq(rows, "status", "PENDING")));
    stats
}

pub fn remittance_summary(rows: &[Row]) -> SummaryStats {
    let mut stats = SummaryStats::with_total(rows);
    stats.push(
        "Total Remitted",
        SummaryValue::Amount(sum(rows, &["amount", "remittedAmount"])),
    );
    for (status, count) in histogram(rows, "status") {
        stats.push(format!("{} Remittances", title_case(&status)), SummaryValue::Count(count));
    }
    stats
}

pub fn expense_summary(rows: &[Row]) -> SummaryStats {
    let mut stats = SummaryStats::with_total(rows);
    stats.push("Total Amount", SummaryValue::Amount(sum(rows, &["amount"])));
    stats.push("Paid Expenses", SummaryValue::Count(count_eq(rows, "expenseStatus", "PAID")));
    stats.push(
        "Pending Expenses",
        SummaryValue::Count(count_eq(rows, "expenseStatus", "PENDING")),
    );
    stats.push(
        "Approved Expenses",
        SummaryValue::Count(count_eq(rows, "approvalStatus", "APPROVED")),
    );
    stats.push(
        "Rejected Expenses",
        SummaryValue::Count(count_eq(rows, "approvalStatus", "REJECTED")),
    );
    for (category, count) in histogram(rows, "expenseCategory") {
        stats.push(format!("Category: {}", title_case(&category)), SummaryValue::Count(count));
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: serde_json::Value) -> Vec<Row> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_expense_summary_aggregates() {
        let data = rows(json!([
            {"amount": 1200.0, "expenseStatus": "PAID", "approvalStatus": "APPROVED", "expenseCategory": "OFFICE_SUPPLIES"},
            {"amount": 350.5, "expenseStatus": "PENDING", "approvalStatus": "PENDING", "expenseCategory": "TRANSPORTATION"},
            {"amount": "800", "expenseStatus": "PAID", "approvalStatus": "APPROVED", "expenseCategory": "OFFICE_SUPPLIES"},
            {"amount": 99.5, "expenseStatus": "PENDING", "approvalStatus": "REJECTED", "expenseCategory": "FOOD"},
            {"amount": 50, "expenseStatus": "PENDING", "approvalStatus": "APPROVED", "expenseCategory": "FOOD"}
        ]));
        let stats = expense_summary(&data);

        assert_eq!(stats.get("Total Records"), Some(SummaryValue::Count(5)));
        assert_eq!(stats.get("Total Amount"), Some(SummaryValue::Amount(2500.0)));
        assert_eq!(stats.get("Paid Expenses"), Some(SummaryValue::Count(2)));
        assert_eq!(stats.get("Pending Expenses"), Some(SummaryValue::Count(3)));
        assert_eq!(stats.get("Approved Expenses"), Some(SummaryValue::Count(3)));
        assert_eq!(stats.get("Rejected Expenses"), Some(SummaryValue::Count(1)));
        assert_eq!(stats.get("Category: Office Supplies"), Some(SummaryValue::Count(2)));
        assert_eq!(stats.get("Category: Transportation"), Some(SummaryValue::Count(1)));
        assert_eq!(stats.get("Category: Food"), Some(SummaryValue::Count(2)));
    }

    #[test]
    fn test_payment_summary() {
        let data = rows(json!([
            {"status": "PAID", "amount": 100},
            {"status": "PENDING", "amount": 50},
            {"status": "paid", "amount": 25.25}
        ]));
        let stats = payment_summary(&data);
        assert_eq!(stats.get("Total Amount"), Some(SummaryValue::Amount(175.25)));
        assert_eq!(stats.get("Paid Payments"), Some(SummaryValue::Count(2)));
        assert_eq!(stats.get("Pending Payments"), Some(SummaryValue::Count(1)));
    }

    #[test]
    fn test_remittance_summary_counts_by_status() {
        let data = rows(json!([
            {"status": "COMPLETED", "amount": 500},
            {"status": "NOT_REMITTED", "amount": 0},
            {"status": "COMPLETED", "remittedAmount": 250}
        ]));
        let stats = remittance_summary(&data);
        let labels: Vec<_> = stats.iter().map(|(l, _)| l.to_string()).collect();
        assert_eq!(
            labels,
            vec!["Total Records", "Total Remitted", "Completed Remittances", "Not Remitted Remittances"]
        );
        assert_eq!(stats.get("Total Remitted"), Some(SummaryValue::Amount(750.0)));
    }

    #[test]
    fn test_student_summary_by_year() {
        let data = rows(json!([{"yearLevel": 2}, {"yearLevel": 1}, {"yearLevel": 2}]));
        let stats = student_summary(&data);
        assert_eq!(stats.get("Year 1 Students"), Some(SummaryValue::Count(1)));
        assert_eq!(stats.get("Year 2 Students"), Some(SummaryValue::Count(2)));
    }

    #[test]
    fn test_summary_value_rendering() {
        assert_eq!(SummaryValue::Amount(1234.5).plain(), "1234.50");
        assert_eq!(SummaryValue::Amount(1234.5).to_string(), "1,234.50");
        assert_eq!(SummaryValue::Count(3).plain(), "3");
    }
}
