//! Column descriptors.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Deserialize;
use tabledom::Element;

use crate::row::Row;

/// How values in a column are compared.
///
/// Decoded from its configured name: `"number"` and `"string"` are built in,
/// any other name decodes to [`SortType::Unknown`] and is rejected when the
/// column is sorted. [`SortType::Custom`] can only be set in code.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum SortType {
    Number,
    String,
    Custom(RowComparator),
    Unknown(String),
}

impl SortType {
    pub fn parse(name: &str) -> Self {
        match name {
            "number" => Self::Number,
            "string" => Self::String,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Custom(_) => "custom",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for SortType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl std::fmt::Debug for SortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "Unknown({name:?})"),
            other => f.write_str(other.name()),
        }
    }
}

/// User-supplied row ordering for [`SortType::Custom`].
#[derive(Clone)]
pub struct RowComparator(Arc<dyn Fn(&Row, &Row) -> Ordering + Send + Sync>);

impl RowComparator {
    pub fn new(f: impl Fn(&Row, &Row) -> Ordering + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        (self.0)(a, b)
    }
}

/// Renders a complete cell for one row, replacing the default text cell.
#[derive(Clone)]
pub struct CellRenderer(Arc<dyn Fn(&Row) -> Element + Send + Sync>);

impl CellRenderer {
    pub fn new(f: impl Fn(&Row) -> Element + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn render(&self, row: &Row) -> Element {
        (self.0)(row)
    }
}

impl std::fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CellRenderer(..)")
    }
}

/// Configuration for one visible column.
///
/// # Examples
///
/// ```ignore
/// let columns = vec![
///     Column::new("images", "Image").renderer(|row| thumbnails(row)),
///     Column::new("title", "Name").sortable(SortType::String),
///     Column::new("price", "Price").sortable(SortType::Number),
/// ];
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Key of the row field this column shows.
    pub id: String,
    /// Header label.
    #[serde(default)]
    pub title: String,
    /// Whether a header click may sort by this column.
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub sort_type: Option<SortType>,
    #[serde(skip)]
    pub renderer: Option<CellRenderer>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sortable: false,
            sort_type: None,
            renderer: None,
        }
    }

    /// Make the column sortable with the given comparison.
    pub fn sortable(mut self, sort_type: SortType) -> Self {
        self.sortable = true;
        self.sort_type = Some(sort_type);
        self
    }

    /// Make the column sortable with a custom row ordering.
    pub fn custom_sort(self, f: impl Fn(&Row, &Row) -> Ordering + Send + Sync + 'static) -> Self {
        self.sortable(SortType::Custom(RowComparator::new(f)))
    }

    /// Render this column's cells with `f` instead of the field text.
    pub fn renderer(mut self, f: impl Fn(&Row) -> Element + Send + Sync + 'static) -> Self {
        self.renderer = Some(CellRenderer::new(f));
        self
    }

    /// Decode a list of columns from JSON.
    pub fn list_from_json(json: &str) -> Result<Vec<Column>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Find a column by id.
pub fn find_column<'a>(columns: &'a [Column], id: &str) -> Option<&'a Column> {
    columns.iter().find(|c| c.id == id)
}

/// The first column marked sortable, the default sort target.
pub fn first_sortable(columns: &[Column]) -> Option<&Column> {
    columns.iter().find(|c| c.sortable)
}
