//! Pagination, sorting and request sequencing for server-paginated tables.

use crate::api::QueryParams;

use super::filter::{FilterKey, FilterSet};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// Current sort column and direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub by: Option<String>,
    pub dir: SortDir,
}

impl SortState {
    /// Header click: a new column sorts ascending, the same column flips direction.
    pub fn toggle(&mut self, key: &str) {
        if self.by.as_deref() == Some(key) {
            self.dir = self.dir.flipped();
        } else {
            self.by = Some(key.to_string());
            self.dir = SortDir::Asc;
        }
    }

    /// Direction shown next to `key`, if it is the sort column.
    pub fn direction_of(&self, key: &str) -> Option<SortDir> {
        (self.by.as_deref() == Some(key)).then_some(self.dir)
    }
}

/// Page position within a server-side result set. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: usize,
    pub rows_per_page: usize,
    pub total_elements: u64,
}

impl Pagination {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            current_page: 1,
            rows_per_page: rows_per_page.max(1),
            total_elements: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        let per_page = self.rows_per_page.max(1) as u64;
        self.total_elements.div_ceil(per_page) as usize
    }

    /// 1-based index of the first row on the current page, 0 when there are no rows.
    pub fn first_row(&self) -> u64 {
        if self.total_elements == 0 {
            return 0;
        }
        let offset = (self.current_page.max(1) - 1) as u64 * self.rows_per_page as u64;
        (offset + 1).min(self.total_elements)
    }

    pub fn last_row(&self) -> u64 {
        if self.total_elements == 0 {
            return 0;
        }
        (self.current_page.max(1) as u64 * self.rows_per_page as u64).min(self.total_elements)
    }

    /// `"21-30 of 95"`.
    pub fn range_label(&self) -> String {
        format!(
            "{first}-{last} of {total}",
            first = self.first_row(),
            last = self.last_row(),
            total = self.total_elements
        )
    }

    pub fn has_prev(&self) -> bool {
        self.total_elements > 0 && self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.total_elements > 0 && self.current_page < self.total_pages()
    }

    /// Zero-based page index for the backend.
    pub fn page_index(&self) -> usize {
        self.current_page.saturating_sub(1)
    }

    /// Move to a page, clamped to the known page range.
    pub fn go_to(&mut self, page: usize) {
        let last = self.total_pages().max(1);
        self.current_page = page.clamp(1, last);
    }

    /// Record the backend's total; pulls the current page back if it fell off the end.
    pub fn set_total(&mut self, total: u64) {
        self.total_elements = total;
        let last = self.total_pages().max(1);
        if self.current_page > last {
            self.current_page = last;
        }
    }
}

/// User intent relayed from the table view to the page that owns the data.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    PageChanged(usize),
    RowsPerPageChanged(usize),
    Sort(String),
    Filter(FilterKey, Option<String>),
    /// Delete requested for the row at this index of the current page.
    DeleteRow(usize),
    OpenReport,
    Refresh,
}

/// Authoritative table state owned by a page.
#[derive(Debug, Clone)]
pub struct TableState {
    pub pagination: Pagination,
    pub sort: SortState,
    pub filters: FilterSet,
}

impl TableState {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            pagination: Pagination::new(rows_per_page),
            sort: SortState::default(),
            filters: FilterSet::new(),
        }
    }

    /// Apply a navigation/sort/filter event. Returns `true` if the page must refetch.
    pub fn apply(&mut self, event: &TableEvent) -> bool {
        match event {
            TableEvent::PageChanged(page) => {
                let before = self.pagination.current_page;
                self.pagination.go_to(*page);
                before != self.pagination.current_page
            }
            TableEvent::RowsPerPageChanged(size) => {
                self.pagination.rows_per_page = (*size).max(1);
                self.pagination.current_page = 1;
                true
            }
            TableEvent::Sort(key) => {
                self.sort.toggle(key);
                self.pagination.current_page = 1;
                true
            }
            TableEvent::Filter(key, value) => {
                self.filters.set(*key, value.clone());
                self.pagination.current_page = 1;
                true
            }
            TableEvent::Refresh => true,
            TableEvent::DeleteRow(_) | TableEvent::OpenReport => false,
        }
    }

    /// Query parameters of the list request for the current state.
    pub fn query_params(&self) -> QueryParams {
        let mut params = vec![
            ("page".to_string(), self.pagination.page_index().to_string()),
            ("size".to_string(), self.pagination.rows_per_page.to_string()),
        ];
        if let Some(by) = &self.sort.by {
            params.push(("sortBy".to_string(), by.clone()));
            params.push(("sortDir".to_string(), self.sort.dir.as_str().to_string()));
        }
        params.extend(self.filters.to_params());
        params
    }
}

/// Monotonic request tickets; only the newest list response may update a table.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    /// Ticket for a request about to be sent. Supersedes every earlier ticket.
    pub fn next(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.latest
    }
}
