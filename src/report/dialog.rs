//! State of the "Generate Report" dialog.

use crate::table::{Column, FilterOptions, FilterSet};

use super::fields::FieldSelection;
use super::filters::{default_report_filters, validate_filters};
use super::generate::{ReportError, ReportRequest};
use super::{ReportFormat, ReportType};

#[derive(Debug, Clone, Default)]
pub struct ReportDialogState {
    pub open: bool,
    pub format: ReportFormat,
    pub fields: FieldSelection,
    /// `None` until defaults could be computed from loaded filter options.
    pub filters: Option<FilterSet>,
    /// A report is being generated; the dialog stays open but inert.
    pub busy: bool,
}

impl ReportDialogState {
    /// Show the dialog. Filters are reseeded from the table on every open.
    pub fn open(&mut self) {
        self.open = true;
        self.busy = false;
        self.filters = None;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.busy = false;
    }

    /// Keep fields and filters consistent with the table, without overriding user edits.
    pub fn sync(&mut self, report_type: ReportType, columns: &[Column], active: &FilterSet, options: &FilterOptions) {
        self.fields.reconcile(columns);
        if self.filters.is_none() {
            self.filters = default_report_filters(report_type, active, options);
        }
    }

    /// Validate the selection and build a request. No request is built while invalid.
    pub fn request(
        &self,
        report_type: ReportType,
        columns: &[Column],
        brand: &str,
    ) -> Result<ReportRequest, ReportError> {
        let selected: Vec<Column> = self.fields.selected_columns(columns).into_iter().cloned().collect();
        if selected.is_empty() {
            return Err(ReportError::NoFieldsSelected);
        }

        let filters = self.filters.clone().unwrap_or_default();
        validate_filters(report_type, &filters)?;

        Ok(ReportRequest {
            report_type,
            format: self.format,
            columns: selected,
            filters,
            brand: brand.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{FilterKey, FilterOption};

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").hidden(),
            Column::new("fullName", "Name"),
            Column::new("amount", "Amount"),
            Column::actions(),
        ]
    }

    fn options() -> FilterOptions {
        let mut options = FilterOptions::new();
        options.set(FilterKey::FeeType, vec![FilterOption::new("4", "Membership Fee")]);
        options
    }

    #[test]
    fn test_sync_waits_for_options() {
        let mut dialog = ReportDialogState::default();
        dialog.open();

        dialog.sync(ReportType::Payment, &columns(), &FilterSet::new(), &FilterOptions::new());
        assert!(dialog.filters.is_none());
        assert_eq!(dialog.fields.selected_count(), 2);

        dialog.sync(ReportType::Payment, &columns(), &FilterSet::new(), &options());
        assert_eq!(dialog.filters.as_ref().unwrap().get(FilterKey::FeeType), Some("4"));
    }

    #[test]
    fn test_sync_resolves_without_fee_types() {
        let mut options = FilterOptions::new();
        options.set(FilterKey::Program, vec![FilterOption::plain("BSIT")]);
        options.set(FilterKey::FeeType, Vec::new());

        let mut dialog = ReportDialogState::default();
        dialog.open();
        dialog.sync(ReportType::Payment, &columns(), &FilterSet::new(), &options);

        let filters = dialog.filters.as_ref().unwrap();
        assert_eq!(filters.get(FilterKey::FeeType), None);
        assert!(matches!(
            dialog.request(ReportType::Payment, &columns(), "Brand"),
            Err(ReportError::FeeTypeRequired(ReportType::Payment))
        ));
    }

    #[test]
    fn test_sync_keeps_user_edits() {
        let mut dialog = ReportDialogState::default();
        dialog.open();
        dialog.sync(ReportType::Payment, &columns(), &FilterSet::new(), &options());

        dialog.fields.toggle("amount");
        if let Some(filters) = dialog.filters.as_mut() {
            filters.set(FilterKey::Section, Some("B".to_string()));
        }
        dialog.sync(ReportType::Payment, &columns(), &FilterSet::new(), &options());

        assert!(!dialog.fields.is_selected("amount"));
        assert_eq!(dialog.filters.as_ref().unwrap().get(FilterKey::Section), Some("B"));
    }

    #[test]
    fn test_reopen_reseeds_filters() {
        let mut dialog = ReportDialogState::default();
        dialog.open();
        dialog.sync(ReportType::Student, &columns(), &FilterSet::new(), &options());
        dialog.close();

        let active = FilterSet::from_pairs([(FilterKey::YearLevel, "3")]);
        dialog.open();
        dialog.sync(ReportType::Student, &columns(), &active, &options());
        assert_eq!(dialog.filters.as_ref().unwrap().get(FilterKey::YearLevel), Some("3"));
    }

    #[test]
    fn test_request_validation() {
        let mut dialog = ReportDialogState::default();
        dialog.open();
        dialog.sync(ReportType::Remittance, &columns(), &FilterSet::new(), &options());
        dialog.format = ReportFormat::Pdf;

        let request = dialog.request(ReportType::Remittance, &columns(), "Brand").unwrap();
        assert_eq!(request.format, ReportFormat::Pdf);
        assert_eq!(request.columns.len(), 2);

        if let Some(filters) = dialog.filters.as_mut() {
            filters.set(FilterKey::FeeType, None);
        }
        assert!(matches!(
            dialog.request(ReportType::Remittance, &columns(), "Brand"),
            Err(ReportError::FeeTypeRequired(ReportType::Remittance))
        ));

        dialog.fields.set_all(false);
        assert!(matches!(
            dialog.request(ReportType::Student, &columns(), "Brand"),
            Err(ReportError::NoFieldsSelected)
        ));
    }
}
