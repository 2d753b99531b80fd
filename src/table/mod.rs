//! Generic server-paginated table: columns, formatting, filters and navigation state.

pub mod column;
pub mod filter;
pub mod state;
pub mod view;

pub use column::{ACTIONS_KEY, CellFormatter, CellValue, Column, format_amount};
pub use filter::{FilterKey, FilterOption, FilterOptions, FilterSet};
pub use state::{Pagination, RequestSequence, SortDir, SortState, TableEvent, TableState};
pub use view::{BodyState, TableView};
