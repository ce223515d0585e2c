//! Sort engine: comparator selection and stable row ordering.

use std::cmp::Ordering;
use std::str::FromStr;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::{Column, RowComparator, SortType, find_column};
use crate::error::ConfigurationError;
use crate::row::Row;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Wire name: `asc` or `desc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Scale an ascending comparison result to this direction.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// The active `{ column, direction }` pair.
///
/// Serialized as `{ "id": "price", "order": "asc" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    #[serde(rename = "id")]
    pub column_id: String,
    #[serde(rename = "order", default)]
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }

    pub fn ascending(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Ascending)
    }

    pub fn descending(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Descending)
    }
}

enum Comparator<'a> {
    Number,
    String(Collator),
    Custom(&'a RowComparator),
}

impl<'a> Comparator<'a> {
    fn select(column: &'a Column) -> Result<Self, ConfigurationError> {
        match &column.sort_type {
            Some(SortType::Number) => Ok(Self::Number),
            Some(SortType::String) => {
                // `ru` tailoring orders Cyrillic ahead of Latin.
                let locale = locale!("ru");
                let collator = Collator::try_new(&(&locale).into(), CollatorOptions::new())
                    .map_err(|e| ConfigurationError::Collation(format!("{locale}: {e}")))?;
                Ok(Self::String(collator))
            }
            Some(SortType::Custom(f)) => Ok(Self::Custom(f)),
            Some(SortType::Unknown(name)) => Err(ConfigurationError::unknown_sort_type(
                &column.id,
                Some(name),
            )),
            None => Err(ConfigurationError::unknown_sort_type(&column.id, None)),
        }
    }

    /// Ascending comparison of two rows on `field`.
    fn compare(&self, field: &str, a: &Row, b: &Row) -> Ordering {
        match self {
            Self::Number => compare_numbers(numeric(a.get(field)), numeric(b.get(field))),
            Self::String(collator) => {
                collator.compare(&a.display_value(field), &b.display_value(field))
            }
            Self::Custom(f) => f.compare(a, b),
        }
    }
}

/// Numeric view of a JSON value. Numeric strings count; NaN does not.
fn numeric(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|v| !v.is_nan())
}

/// Numbers before non-numbers; non-numbers tie with each other.
fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Return a copy of `rows` ordered by `column_id` in `direction`.
///
/// The input is never modified. Ties keep their original relative order in
/// both directions. Fails if the column does not exist or has no recognized
/// sort type.
pub fn sort_rows(
    columns: &[Column],
    rows: &[Row],
    column_id: &str,
    direction: SortDirection,
) -> Result<Vec<Row>, ConfigurationError> {
    let column = find_column(columns, column_id)
        .ok_or_else(|| ConfigurationError::UnknownColumn(column_id.to_string()))?;
    let comparator = Comparator::select(column)?;

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| direction.apply(comparator.compare(column_id, a, b)));

    log::debug!(
        "sorted {} row(s) by {} {}",
        sorted.len(),
        column_id,
        direction
    );
    Ok(sorted)
}
