//! Generic entity page: filterable table, report dialog and row deletion.

use std::collections::BTreeSet;

use eframe::egui::{RichText, Ui};
use egui_phosphor::regular::ENVELOPE;

use crate::api::PaymentReminder;
use crate::models::{Page, Row, row_number, row_text};
use crate::pages::Entity;
use crate::report::ReportDialogState;
use crate::table::{Column, FilterKey, FilterOptions, RequestSequence, TableEvent, TableState, TableView};

use super::app::{App, DeleteTarget};
use super::components::{back_button, panel_header, styled_button_with_icon};
use super::{data_table, report_dialog};

/// What became of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
    Applied,
    /// The current page no longer exists after the new total; fetch again.
    PageClamped,
}

/// State of one entity page. Survives navigation away and back.
pub struct EntityPage {
    pub entity: Entity,
    pub columns: Vec<Column>,
    pub table: TableState,
    pub rows: Vec<Row>,
    pub loading: bool,
    /// At least one list response (or failure) arrived.
    pub loaded: bool,
    pub options: FilterOptions,
    pub report: ReportDialogState,
    sequence: RequestSequence,
}

impl EntityPage {
    pub fn new(entity: Entity, rows_per_page: usize) -> Self {
        let mut page = Self {
            entity,
            columns: entity.columns(),
            table: TableState::new(rows_per_page),
            rows: Vec::new(),
            loading: false,
            loaded: false,
            options: FilterOptions::new(),
            report: ReportDialogState::default(),
            sequence: RequestSequence::default(),
        };
        page.rebuild_options(&FilterOptions::new());
        page
    }

    /// Merge backend-loaded choices with this page's static ones.
    pub fn rebuild_options(&mut self, backend: &FilterOptions) {
        let mut options = backend.clone();
        for key in self.entity.filter_keys() {
            let statics = self.entity.static_options(*key);
            if !statics.is_empty() {
                options.set(*key, statics);
            }
        }
        self.options = options;
    }

    /// Mark a list request as in flight and return its ticket.
    pub fn begin_fetch(&mut self) -> u64 {
        self.loading = true;
        self.sequence.next()
    }

    pub fn finish_fetch(&mut self, ticket: u64, page: Page<Row>) -> FetchOutcome {
        if !self.sequence.is_current(ticket) {
            return FetchOutcome::Stale;
        }
        self.loading = false;
        self.loaded = true;

        let requested = self.table.pagination.current_page;
        self.table.pagination.set_total(page.total_elements);
        self.rows = page.content;

        if self.table.pagination.current_page != requested {
            FetchOutcome::PageClamped
        } else {
            FetchOutcome::Applied
        }
    }

    /// Record a failed list request. Returns `false` for stale tickets.
    pub fn fail_fetch(&mut self, ticket: u64) -> bool {
        if !self.sequence.is_current(ticket) {
            return false;
        }
        self.loading = false;
        self.loaded = true;
        self.rows.clear();
        true
    }

    /// Backend id of the row at `index` on the current page.
    pub fn row_id(&self, index: usize) -> Option<i64> {
        self.rows.get(index).and_then(|row| row_number(row, "id")).map(|id| id as i64)
    }

    /// Short human description of a row for confirmations and the activity log.
    pub fn row_label(&self, index: usize) -> String {
        let Some(row) = self.rows.get(index) else {
            return String::new();
        };
        self.columns
            .iter()
            .filter(|c| !c.hidden && !c.is_actions())
            .map(|c| c.cell(row).display(""))
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| format!("record #{}", self.row_id(index).unwrap_or_default()))
    }

    /// Reminder for the students on this page who have not paid the filtered fee.
    ///
    /// Only the payments page sends reminders, and only once a fee is chosen.
    pub fn payment_reminder(&self) -> Option<PaymentReminder> {
        if self.entity != Entity::Payments {
            return None;
        }
        let fee_id: i64 = self.table.filters.get(FilterKey::FeeType)?.parse().ok()?;
        let student_ids: BTreeSet<i64> = self
            .rows
            .iter()
            .filter(|row| !row_text(row, "status").is_some_and(|s| s.eq_ignore_ascii_case("PAID")))
            .filter_map(|row| row_number(row, "studentId"))
            .map(|id| id as i64)
            .collect();

        if student_ids.is_empty() {
            return None;
        }
        Some(PaymentReminder {
            student_ids: student_ids.into_iter().collect(),
            fee_id,
        })
    }

    pub fn view(&self, can_delete: bool, can_export: bool) -> TableView<'_> {
        TableView {
            columns: &self.columns,
            rows: &self.rows,
            pagination: self.table.pagination,
            sort: &self.table.sort,
            filters: &self.table.filters,
            filter_keys: self.entity.filter_keys(),
            filter_options: &self.options,
            loading: self.loading,
            can_delete,
            can_export: can_export && self.entity.report_type().is_some(),
        }
    }
}

/// Show an entity page.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui, entity: Entity) -> bool {
    let mut go_back = false;

    if back_button(ui) {
        go_back = true;
    }

    panel_header(ui, entity.title());

    if entity == Entity::Payments && app.session.can_record_payments() {
        reminder_bar(app, ui);
    }

    let can_delete = app.can_delete(entity);
    let can_export = app.session.can_export_reports();

    let events = {
        let page = app.page_mut(entity);
        data_table::show(ui, entity.path(), &page.view(can_delete, can_export))
    };

    for event in events {
        handle_event(app, entity, event);
    }

    if app.page_mut(entity).report.open {
        report_dialog::show(app, ui.ctx(), entity);
    }

    go_back
}

fn reminder_bar(app: &mut App, ui: &mut Ui) {
    let reminder = app.page_mut(Entity::Payments).payment_reminder();
    let busy = app.reminder_busy;

    ui.horizontal(|ui| {
        let response = ui
            .add_enabled_ui(reminder.is_some() && !busy, |ui| {
                styled_button_with_icon(ui, ENVELOPE, "Send Reminders")
            })
            .inner
            .on_disabled_hover_text("Filter by a fee to remind students with unpaid balances on this page");
        if response.clicked()
            && let Some(reminder) = reminder.clone()
        {
            app.send_payment_reminder(reminder);
        }

        if busy {
            ui.spinner();
        } else if let Some(reminder) = &reminder {
            ui.label(RichText::new(format!("{} unpaid on this page", reminder.student_ids.len())).weak());
        }
    });
    ui.add_space(10.0);
}

fn handle_event(app: &mut App, entity: Entity, event: TableEvent) {
    match event {
        TableEvent::DeleteRow(index) => {
            let page = app.page_mut(entity);
            match page.row_id(index) {
                Some(id) => {
                    let label = page.row_label(index);
                    app.delete_target = Some(DeleteTarget { entity, id, label });
                    app.show_delete_confirm = true;
                }
                None => app.log_warning(format!("{}: row has no id, cannot delete", entity.title())),
            }
        }
        TableEvent::OpenReport => app.page_mut(entity).report.open(),
        other => {
            if app.page_mut(entity).table.apply(&other) {
                app.fetch_page(entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::table::{FilterKey, FilterOption, TableEvent};

    fn page_of(rows: serde_json::Value, total: u64) -> Page<Row> {
        let content = match rows {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Page {
            content,
            total_elements: total,
            total_pages: 0,
        }
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut page = EntityPage::new(Entity::Students, 10);
        let first = page.begin_fetch();
        let second = page.begin_fetch();

        let outcome = page.finish_fetch(first, page_of(json!([{"id": 1}]), 1));
        assert_eq!(outcome, FetchOutcome::Stale);
        assert!(page.loading);
        assert!(page.rows.is_empty());

        let outcome = page.finish_fetch(second, page_of(json!([{"id": 2}, {"id": 3}]), 2));
        assert_eq!(outcome, FetchOutcome::Applied);
        assert!(!page.loading);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.table.pagination.total_elements, 2);
    }

    #[test]
    fn test_page_clamped_after_shrinking_total() {
        let mut page = EntityPage::new(Entity::Payments, 10);
        let ticket = page.begin_fetch();
        page.finish_fetch(ticket, page_of(json!([]), 25));
        page.table.apply(&TableEvent::PageChanged(3));
        assert_eq!(page.table.pagination.current_page, 3);

        let ticket = page.begin_fetch();
        let outcome = page.finish_fetch(ticket, page_of(json!([]), 20));
        assert_eq!(outcome, FetchOutcome::PageClamped);
        assert_eq!(page.table.pagination.current_page, 2);
    }

    #[test]
    fn test_failed_fetch_clears_rows() {
        let mut page = EntityPage::new(Entity::Fees, 10);
        let ticket = page.begin_fetch();
        page.finish_fetch(ticket, page_of(json!([{"id": 9}]), 1));

        let stale = page.begin_fetch();
        let current = page.begin_fetch();
        assert!(!page.fail_fetch(stale));
        assert_eq!(page.rows.len(), 1);
        assert!(page.fail_fetch(current));
        assert!(page.rows.is_empty());
        assert!(!page.loading);
    }

    #[test]
    fn test_row_id_and_label() {
        let mut page = EntityPage::new(Entity::Students, 10);
        let ticket = page.begin_fetch();
        page.finish_fetch(
            ticket,
            page_of(
                json!([
                    {"id": 12, "studentNumber": "2021-0001", "lastName": "Santos", "firstName": "Maria"},
                    {"id": "13", "studentNumber": null, "lastName": "Reyes", "firstName": "Ana"},
                    {"studentNumber": null}
                ]),
                3,
            ),
        );

        assert_eq!(page.row_id(0), Some(12));
        assert_eq!(page.row_id(1), Some(13));
        assert_eq!(page.row_id(2), None);
        assert_eq!(page.row_id(9), None);
        assert_eq!(page.row_label(0), "2021-0001");
        assert_eq!(page.row_label(1), "Reyes, Ana");
    }

    #[test]
    fn test_options_merge_static_and_backend() {
        let mut backend = FilterOptions::new();
        backend.set(FilterKey::FeeType, vec![FilterOption::new("4", "Membership Fee")]);

        let mut page = EntityPage::new(Entity::Payments, 10);
        assert!(page.options.get(FilterKey::FeeType).is_empty());
        assert_eq!(page.options.get(FilterKey::Status).len(), 3);

        page.rebuild_options(&backend);
        assert_eq!(page.options.get(FilterKey::FeeType).len(), 1);
        assert_eq!(page.options.get(FilterKey::YearLevel).len(), 4);
    }

    #[test]
    fn test_payment_reminder_targets_unpaid_students() {
        let mut page = EntityPage::new(Entity::Payments, 10);
        let ticket = page.begin_fetch();
        page.finish_fetch(
            ticket,
            page_of(
                json!([
                    {"id": 1, "studentId": 30, "status": "PENDING"},
                    {"id": 2, "studentId": 31, "status": "PAID"},
                    {"id": 3, "studentId": 32, "status": null},
                    {"id": 4, "studentId": 30, "status": "PARTIAL"},
                    {"id": 5, "status": "PENDING"}
                ]),
                5,
            ),
        );
        assert!(page.payment_reminder().is_none());

        page.table.apply(&TableEvent::Filter(FilterKey::FeeType, Some("7".to_string())));
        let reminder = page.payment_reminder().unwrap();
        assert_eq!(reminder.fee_id, 7);
        assert_eq!(reminder.student_ids, vec![30, 32]);
    }

    #[test]
    fn test_payment_reminder_only_on_payments() {
        let mut page = EntityPage::new(Entity::Remittances, 10);
        page.table.apply(&TableEvent::Filter(FilterKey::FeeType, Some("7".to_string())));
        page.rows = vec![json!({"studentId": 30, "status": "PENDING"}).as_object().cloned().unwrap()];
        assert!(page.payment_reminder().is_none());
    }

    #[test]
    fn test_view_hides_report_button_without_report_type() {
        let page = EntityPage::new(Entity::Programs, 10);
        assert!(!page.view(true, true).can_export);

        let page = EntityPage::new(Entity::Remittances, 10);
        assert!(page.view(false, true).can_export);
        assert!(!page.view(false, false).can_export);
    }
}
