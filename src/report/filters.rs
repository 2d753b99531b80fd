//! Report filter defaulting, validation and query normalization.

use crate::api::QueryParams;
use crate::table::{FilterKey, FilterOptions, FilterSet};

use super::ReportType;
use super::generate::ReportError;

/// Seed the report dialog's filters from the table's active filters.
///
/// Common filters default to unconstrained, fee-scoped reports get the first fee type
/// when none is chosen, and remittance reports get an unconstrained "remitted by".
/// Returns `None` while the options needed for defaulting are not loaded yet; the caller
/// retries on a later frame. With no fee types at all the fee stays unset and
/// [`validate_filters`] rejects the request.
pub fn default_report_filters(
    report_type: ReportType,
    active: &FilterSet,
    options: &FilterOptions,
) -> Option<FilterSet> {
    if !options.is_loaded() {
        return None;
    }

    let mut filters = active.clone();

    for key in FilterKey::COMMON {
        if !filters.contains(key) {
            filters.set(key, None);
        }
    }

    if report_type.requires_fee() && !filters.is_constrained(FilterKey::FeeType) {
        if !options.has(FilterKey::FeeType) {
            return None;
        }
        if let Some(first) = options.get(FilterKey::FeeType).first() {
            filters.set(FilterKey::FeeType, Some(first.value.clone()));
        }
    }

    if report_type == ReportType::Remittance && !filters.contains(FilterKey::RemittedBy) {
        filters.set(FilterKey::RemittedBy, None);
    }

    Some(filters)
}

/// Reject filter sets the backend cannot serve for this report type.
pub fn validate_filters(report_type: ReportType, filters: &FilterSet) -> Result<(), ReportError> {
    if report_type.requires_fee() && !filters.is_constrained(FilterKey::FeeType) {
        return Err(ReportError::FeeTypeRequired(report_type));
    }
    Ok(())
}

/// Validated backend parameters: `feeId`/`accountId` renames, unconstrained filters dropped.
pub fn report_params(report_type: ReportType, filters: &FilterSet) -> Result<QueryParams, ReportError> {
    validate_filters(report_type, filters)?;

    let mut scoped = filters.clone();
    if report_type != ReportType::Remittance {
        scoped.remove(FilterKey::RemittedBy);
    }
    Ok(scoped.to_params())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FilterOption;

    fn options() -> FilterOptions {
        let mut options = FilterOptions::new();
        options.set(
            FilterKey::FeeType,
            vec![
                FilterOption::new("5", "Membership Fee"),
                FilterOption::new("8", "Intramurals Fee"),
            ],
        );
        options.set(FilterKey::Program, vec![FilterOption::plain("BSIT")]);
        options
    }

    #[test]
    fn test_defaults_skipped_until_options_load() {
        let active = FilterSet::new();
        assert_eq!(
            default_report_filters(ReportType::Payment, &active, &FilterOptions::new()),
            None
        );
    }

    #[test]
    fn test_fee_report_waits_for_fee_types() {
        let mut options = FilterOptions::new();
        options.set(FilterKey::Program, vec![FilterOption::plain("BSIT")]);
        assert!(options.is_loaded());

        assert_eq!(default_report_filters(ReportType::Payment, &FilterSet::new(), &options), None);
        assert!(default_report_filters(ReportType::Student, &FilterSet::new(), &options).is_some());
    }

    #[test]
    fn test_no_fee_types_leaves_fee_unset() {
        let mut options = FilterOptions::new();
        options.set(FilterKey::Program, vec![FilterOption::plain("BSIT")]);
        options.set(FilterKey::FeeType, Vec::new());

        let filters = default_report_filters(ReportType::Payment, &FilterSet::new(), &options).unwrap();
        assert!(!filters.is_constrained(FilterKey::FeeType));
        assert!(filters.contains(FilterKey::Program));
        assert!(matches!(
            validate_filters(ReportType::Payment, &filters),
            Err(ReportError::FeeTypeRequired(ReportType::Payment))
        ));
    }

    #[test]
    fn test_payment_defaults_seed_first_fee() {
        let active = FilterSet::from_pairs([(FilterKey::YearLevel, "2")]);
        let filters = default_report_filters(ReportType::Payment, &active, &options()).unwrap();

        assert_eq!(filters.get(FilterKey::FeeType), Some("5"));
        assert_eq!(filters.get(FilterKey::YearLevel), Some("2"));
        for key in [FilterKey::Program, FilterKey::Section, FilterKey::Status] {
            assert!(filters.contains(key));
            assert!(!filters.is_constrained(key));
        }
        assert!(!filters.contains(FilterKey::RemittedBy));
    }

    #[test]
    fn test_defaults_keep_chosen_fee() {
        let active = FilterSet::from_pairs([(FilterKey::FeeType, "8")]);
        let filters = default_report_filters(ReportType::Remittance, &active, &options()).unwrap();
        assert_eq!(filters.get(FilterKey::FeeType), Some("8"));
        assert!(filters.contains(FilterKey::RemittedBy));
        assert_eq!(filters.get(FilterKey::RemittedBy), None);
    }

    #[test]
    fn test_expense_defaults_have_no_fee() {
        let filters = default_report_filters(ReportType::Expense, &FilterSet::new(), &options()).unwrap();
        assert!(!filters.contains(FilterKey::FeeType));
    }

    #[test]
    fn test_fee_required_for_payment_and_remittance() {
        for report_type in [ReportType::Payment, ReportType::Remittance] {
            let missing = FilterSet::new();
            let all = FilterSet::from_pairs([(FilterKey::FeeType, "all")]);
            assert!(matches!(
                report_params(report_type, &missing),
                Err(ReportError::FeeTypeRequired(t)) if t == report_type
            ));
            assert!(matches!(
                report_params(report_type, &all),
                Err(ReportError::FeeTypeRequired(_))
            ));
        }
        assert!(report_params(ReportType::Student, &FilterSet::new()).is_ok());
    }

    #[test]
    fn test_remittance_params_renamed() {
        let filters = FilterSet::from_pairs([
            (FilterKey::FeeType, "5"),
            (FilterKey::RemittedBy, "11"),
            (FilterKey::Status, "all"),
            (FilterKey::Program, "all"),
        ]);
        let params = report_params(ReportType::Remittance, &filters).unwrap();
        assert_eq!(
            params,
            vec![
                ("feeId".to_string(), "5".to_string()),
                ("accountId".to_string(), "11".to_string()),
            ]
        );
    }

    #[test]
    fn test_remitted_by_dropped_outside_remittance() {
        let filters = FilterSet::from_pairs([(FilterKey::FeeType, "5"), (FilterKey::RemittedBy, "11")]);
        let params = report_params(ReportType::Payment, &filters).unwrap();
        assert_eq!(params, vec![("feeId".to_string(), "5".to_string())]);
    }
}
