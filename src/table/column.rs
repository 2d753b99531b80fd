//! Column descriptors and the cell formatting contract shared by tables and reports.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::models::{Row, row_text};

/// Key of the per-row action column; never exported.
pub const ACTIONS_KEY: &str = "actions";

/// Resolved cell content, before it is rendered for a particular output.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    /// Currency-like amount. Rendered grouped with two decimals, or as a numeric cell.
    Number(f64),
}

impl CellValue {
    /// Build from a raw JSON property.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => CellValue::Empty,
            Some(Value::String(s)) if s.is_empty() => CellValue::Empty,
            Some(Value::String(s)) => CellValue::Text(s.clone()),
            Some(Value::Bool(b)) => CellValue::Text(yes_no(*b).to_string()),
            Some(other) => CellValue::Text(other.to_string()),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() { CellValue::Empty } else { CellValue::Text(s) }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text for CSV, PDF and the on-screen table.
    pub fn display(&self, placeholder: &str) -> String {
        match self {
            CellValue::Empty => placeholder.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_amount(*n),
        }
    }
}

/// Strategy that turns a row property into a cell.
pub trait CellFormatter: Send + Sync {
    /// `value` is the property addressed by the column key, `row` the whole record.
    fn format(&self, value: Option<&Value>, row: &Row) -> CellValue;
}

pub type SharedFormatter = Arc<dyn CellFormatter>;

/// Table column descriptor.
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub hidden: bool,
    pub formatter: Option<SharedFormatter>,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            hidden: false,
            formatter: None,
        }
    }

    /// Per-row action column (edit/delete buttons).
    pub fn actions() -> Self {
        Self::new(ACTIONS_KEY, "Actions")
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_formatter(mut self, formatter: impl CellFormatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn is_actions(&self) -> bool {
        self.key == ACTIONS_KEY
    }

    /// Whether the column can be picked for a report.
    pub fn is_exportable(&self) -> bool {
        !self.hidden && !self.is_actions()
    }

    /// Cell as shown in the live table: formatter when present, else the raw property.
    pub fn cell(&self, row: &Row) -> CellValue {
        let value = row.get(&self.key);
        match &self.formatter {
            Some(formatter) => formatter.format(value, row),
            None => CellValue::from_json(value),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("hidden", &self.hidden)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

pub fn yes_no(b: bool) -> &'static str {
    if b { "Yes" } else { "No" }
}

/// Group thousands and keep two decimals: `1234.5` -> `1,234.50`.
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative && fixed != "0.00" {
        format!("-{grouped}.{frac}")
    } else {
        format!("{grouped}.{frac}")
    }
}

/// `"OFFICE_SUPPLIES"` -> `"OFFICE SUPPLIES"`.
pub fn enum_label(raw: &str) -> String {
    raw.replace('_', " ")
}

/// `"lastName, firstName middleInitial"`, tolerating missing parts.
pub fn student_name(row: &Row) -> Option<String> {
    let last = row_text(row, "lastName").unwrap_or_default();
    let first = row_text(row, "firstName").unwrap_or_default();
    let middle = row_text(row, "middleInitial").unwrap_or_default();

    if last.is_empty() && first.is_empty() {
        return None;
    }

    let given = format!("{first} {middle}");
    let given = given.trim();
    if last.is_empty() {
        Some(given.to_string())
    } else if given.is_empty() {
        Some(last)
    } else {
        Some(format!("{last}, {given}"))
    }
}

/// `"yearLevel - section"`.
pub fn year_section(row: &Row) -> Option<String> {
    match (row_text(row, "yearLevel"), row_text(row, "section")) {
        (Some(year), Some(section)) => Some(format!("{year} - {section}")),
        (Some(year), None) => Some(year),
        (None, Some(section)) => Some(section),
        (None, None) => None,
    }
}

/// Currency amount.
pub struct Amount;

impl CellFormatter for Amount {
    fn format(&self, value: Option<&Value>, _row: &Row) -> CellValue {
        match value {
            Some(Value::Number(n)) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(CellValue::Number)
                .unwrap_or_else(|_| CellValue::text(s.clone())),
            other => CellValue::from_json(other),
        }
    }
}

/// Enum-like backend value with underscores shown as spaces.
pub struct EnumText;

impl CellFormatter for EnumText {
    fn format(&self, value: Option<&Value>, _row: &Row) -> CellValue {
        match value {
            Some(Value::String(s)) => CellValue::text(enum_label(s)),
            other => CellValue::from_json(other),
        }
    }
}

/// Boolean as "Yes"/"No".
pub struct YesNo;

impl CellFormatter for YesNo {
    fn format(&self, value: Option<&Value>, _row: &Row) -> CellValue {
        match value {
            Some(Value::Bool(b)) => CellValue::text(yes_no(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => CellValue::text("Yes"),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => CellValue::text("No"),
            other => CellValue::from_json(other),
        }
    }
}

/// Full student name synthesized from the name parts.
pub struct StudentName;

impl CellFormatter for StudentName {
    fn format(&self, _value: Option<&Value>, row: &Row) -> CellValue {
        student_name(row).map(CellValue::text).unwrap_or(CellValue::Empty)
    }
}

/// Year level and section joined.
pub struct YearSection;

impl CellFormatter for YearSection {
    fn format(&self, _value: Option<&Value>, row: &Row) -> CellValue {
        year_section(row).map(CellValue::text).unwrap_or(CellValue::Empty)
    }
}

/// ISO timestamp shortened to `YYYY-MM-DD HH:MM`.
pub struct Timestamp;

impl CellFormatter for Timestamp {
    fn format(&self, value: Option<&Value>, _row: &Row) -> CellValue {
        match value {
            Some(Value::String(s)) => {
                let trimmed = s.replacen('T', " ", 1);
                CellValue::text(trimmed.chars().take(16).collect::<String>())
            }
            other => CellValue::from_json(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(150.0), "150.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-2500.0), "-2,500.00");
    }

    #[test]
    fn test_student_name_variants() {
        let full = row(json!({"lastName": "Santos", "firstName": "Maria", "middleInitial": "L."}));
        assert_eq!(student_name(&full).as_deref(), Some("Santos, Maria L."));

        let no_middle = row(json!({"lastName": "Santos", "firstName": "Maria"}));
        assert_eq!(student_name(&no_middle).as_deref(), Some("Santos, Maria"));

        let none = row(json!({"studentNumber": "2021-0001"}));
        assert_eq!(student_name(&none), None);
    }

    #[test]
    fn test_year_section() {
        let r = row(json!({"yearLevel": 2, "section": "A"}));
        assert_eq!(year_section(&r).as_deref(), Some("2 - A"));
    }

    #[test]
    fn test_column_cell_uses_formatter() {
        let r = row(json!({"expenseCategory": "OFFICE_SUPPLIES", "receipt": true, "amount": "99.5"}));
        let category = Column::new("expenseCategory", "Category").with_formatter(EnumText);
        let receipt = Column::new("receipt", "Receipt").with_formatter(YesNo);
        let amount = Column::new("amount", "Amount").with_formatter(Amount);
        let raw = Column::new("missing", "Missing");

        assert_eq!(category.cell(&r), CellValue::Text("OFFICE SUPPLIES".to_string()));
        assert_eq!(receipt.cell(&r), CellValue::Text("Yes".to_string()));
        assert_eq!(amount.cell(&r), CellValue::Number(99.5));
        assert_eq!(raw.cell(&r), CellValue::Empty);
    }

    #[test]
    fn test_exportable_columns() {
        assert!(Column::new("status", "Status").is_exportable());
        assert!(!Column::new("id", "ID").hidden().is_exportable());
        assert!(!Column::actions().is_exportable());
    }

    #[test]
    fn test_timestamp_formatter() {
        let r = row(json!({"createdAt": "2025-03-14T09:26:53.589"}));
        let col = Column::new("createdAt", "Created").with_formatter(Timestamp);
        assert_eq!(col.cell(&r), CellValue::Text("2025-03-14 09:26".to_string()));
    }
}
