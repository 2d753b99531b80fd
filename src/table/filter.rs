//! Table and report filters.
//!
//! A filter value is `Option<String>`: `None` means "no constraint" and is what the
//! "All" entry of a filter dropdown stands for. Absent and unconstrained filters are
//! dropped in one place, [`FilterSet::to_params`], before anything reaches the backend.

use std::collections::BTreeMap;

use crate::api::QueryParams;

/// Label of the unconstrained dropdown entry.
pub const ALL_LABEL: &str = "All";

/// Filters understood by list and report endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Program,
    YearLevel,
    Section,
    Status,
    FeeType,
    RemittedBy,
    ExpenseCategory,
    ApprovalStatus,
    DepartmentId,
    AcademicYear,
    Semester,
}

impl FilterKey {
    pub const COMMON: [FilterKey; 4] = [
        FilterKey::Program,
        FilterKey::YearLevel,
        FilterKey::Section,
        FilterKey::Status,
    ];

    /// Name used by the UI state.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKey::Program => "program",
            FilterKey::YearLevel => "yearLevel",
            FilterKey::Section => "section",
            FilterKey::Status => "status",
            FilterKey::FeeType => "feeType",
            FilterKey::RemittedBy => "remittedBy",
            FilterKey::ExpenseCategory => "expenseCategory",
            FilterKey::ApprovalStatus => "approvalStatus",
            FilterKey::DepartmentId => "departmentId",
            FilterKey::AcademicYear => "academicYear",
            FilterKey::Semester => "semester",
        }
    }

    /// Name of the query parameter sent to the backend.
    pub fn param_name(&self) -> &'static str {
        match self {
            FilterKey::FeeType => "feeId",
            FilterKey::RemittedBy => "accountId",
            other => other.name(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterKey::Program => "Program",
            FilterKey::YearLevel => "Year Level",
            FilterKey::Section => "Section",
            FilterKey::Status => "Status",
            FilterKey::FeeType => "Fee Type",
            FilterKey::RemittedBy => "Remitted By",
            FilterKey::ExpenseCategory => "Category",
            FilterKey::ApprovalStatus => "Approval",
            FilterKey::DepartmentId => "Department",
            FilterKey::AcademicYear => "Academic Year",
            FilterKey::Semester => "Semester",
        }
    }
}

/// Interpret a dropdown/text value: blank and the legacy `"all"` sentinel mean no constraint.
pub fn parse_filter_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Active filter values keyed by filter.
///
/// A key can be present with `None` ("All" chosen explicitly) or absent (never touched);
/// both mean no constraint on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    values: BTreeMap<FilterKey, Option<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, raw value)` pairs, parsing each value like a dropdown entry.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (FilterKey, &'a str)>) -> Self {
        let mut set = Self::new();
        for (key, raw) in pairs {
            set.set(key, parse_filter_value(raw));
        }
        set
    }

    pub fn set(&mut self, key: FilterKey, value: Option<String>) {
        self.values.insert(key, value.and_then(|v| parse_filter_value(&v)));
    }

    pub fn remove(&mut self, key: FilterKey) {
        self.values.remove(&key);
    }

    /// Concrete value of a filter, if constrained.
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).and_then(|v| v.as_deref())
    }

    /// Whether the filter was ever set, even to "All".
    pub fn contains(&self, key: FilterKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn is_constrained(&self, key: FilterKey) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, Option<&str>)> {
        self.values.iter().map(|(k, v)| (*k, v.as_deref()))
    }

    /// Query parameters for the backend: unconstrained filters dropped, keys renamed.
    pub fn to_params(&self) -> QueryParams {
        self.values
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| (key.param_name().to_string(), v.clone()))
            })
            .collect()
    }
}

/// One dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Choices available per filter, loaded from the backend or static lists.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    options: BTreeMap<FilterKey, Vec<FilterOption>>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: FilterKey, options: Vec<FilterOption>) {
        self.options.insert(key, options);
    }

    pub fn get(&self, key: FilterKey) -> &[FilterOption] {
        self.options.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether choices for `key` have arrived, even if there are none.
    pub fn has(&self, key: FilterKey) -> bool {
        self.options.contains_key(&key)
    }

    /// Whether anything has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.options.values().any(|opts| !opts.is_empty())
    }

    /// Dropdown text for the current value of a filter.
    pub fn label_for(&self, key: FilterKey, value: Option<&str>) -> String {
        match value {
            None => ALL_LABEL.to_string(),
            Some(v) => self
                .get(key)
                .iter()
                .find(|o| o.value == v)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| v.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentinel_parses_to_none() {
        assert_eq!(parse_filter_value("all"), None);
        assert_eq!(parse_filter_value("ALL"), None);
        assert_eq!(parse_filter_value("  "), None);
        assert_eq!(parse_filter_value(" 3 "), Some("3".to_string()));
    }

    #[test]
    fn test_to_params_drops_all_and_renames() {
        let filters = FilterSet::from_pairs([
            (FilterKey::FeeType, "12"),
            (FilterKey::RemittedBy, "4"),
            (FilterKey::Program, "all"),
            (FilterKey::YearLevel, "2"),
            (FilterKey::Section, "all"),
        ]);
        let params = filters.to_params();

        assert_eq!(
            params,
            vec![
                ("yearLevel".to_string(), "2".to_string()),
                ("feeId".to_string(), "12".to_string()),
                ("accountId".to_string(), "4".to_string()),
            ]
        );
        assert!(params.iter().all(|(_, v)| v != "all"));
    }

    #[test]
    fn test_contains_vs_constrained() {
        let mut filters = FilterSet::new();
        filters.set(FilterKey::Status, None);
        assert!(filters.contains(FilterKey::Status));
        assert!(!filters.is_constrained(FilterKey::Status));

        filters.set(FilterKey::Status, Some("PAID".to_string()));
        assert_eq!(filters.get(FilterKey::Status), Some("PAID"));

        filters.remove(FilterKey::Status);
        assert!(!filters.contains(FilterKey::Status));
    }

    #[test]
    fn test_options_labels() {
        let mut options = FilterOptions::new();
        assert!(!options.is_loaded());
        options.set(FilterKey::FeeType, vec![FilterOption::new("7", "Membership Fee")]);
        assert!(options.is_loaded());
        assert_eq!(options.label_for(FilterKey::FeeType, Some("7")), "Membership Fee");
        assert_eq!(options.label_for(FilterKey::FeeType, None), "All");
        assert_eq!(options.label_for(FilterKey::FeeType, Some("99")), "99");
    }
}
