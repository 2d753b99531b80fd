//! Read-only view model handed to the table renderer.

use crate::models::Row;

use super::column::Column;
use super::filter::{FilterKey, FilterOptions, FilterSet};
use super::state::{Pagination, SortState};

/// What the table body shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Loading,
    Empty,
    Rows,
}

/// Everything the table renderer needs; it owns none of it.
pub struct TableView<'a> {
    pub columns: &'a [Column],
    pub rows: &'a [Row],
    pub pagination: Pagination,
    pub sort: &'a SortState,
    pub filters: &'a FilterSet,
    pub filter_keys: &'a [FilterKey],
    pub filter_options: &'a FilterOptions,
    pub loading: bool,
    /// Show the per-row delete action.
    pub can_delete: bool,
    /// Show the "Generate Report" button.
    pub can_export: bool,
}

impl TableView<'_> {
    pub fn body_state(&self) -> BodyState {
        if self.loading {
            BodyState::Loading
        } else if self.rows.is_empty() {
            BodyState::Empty
        } else {
            BodyState::Rows
        }
    }

    /// Columns drawn on screen; the actions column only when an action is allowed.
    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        let can_delete = self.can_delete;
        self.columns
            .iter()
            .filter(move |c| !c.hidden && (!c.is_actions() || can_delete))
    }
}
