//! Sortable table widget
//!
//! A table bound to a set of rows that re-orders itself when a sortable
//! column header is clicked. Rows are sorted in memory after a single load,
//! or re-fetched from a backend with `_sort`/`_order` query parameters on
//! every sort. Only the most recent sort request is ever rendered.

pub mod column;
pub mod controller;
pub mod error;
pub mod markup;
pub mod options;
pub mod row;
pub mod sort;
pub mod source;
pub mod view;

mod table;

pub use column::{CellRenderer, Column, RowComparator, SortType};
pub use error::{ConfigurationError, Error, LoadError};
pub use options::{BACKEND_URL, TableOptions};
pub use row::Row;
pub use sort::{SortDirection, SortState, sort_rows};
pub use source::{Fetcher, HttpFetcher, Mode};
pub use table::*;
