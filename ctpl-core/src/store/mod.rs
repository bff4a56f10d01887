//! Table-oriented data store access.
//!
//! Handlers never talk to a database client directly. They describe each
//! round trip with a query-parameter struct and hand it to a [`DataStore`]:
//! - [`SelectQuery`] - columns, filters and ordering for a read
//! - [`InsertQuery`] - rows to insert, returned with store-assigned values
//! - [`UpdateQuery`] - column values to overwrite on every matching row
//!
//! An empty result vector is the store's "no rows" signal and is not an error.

mod error;
mod memory;
mod turso;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use turso::LibsqlStore;

use async_trait::async_trait;
use serde_json::Value;

/// A single row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Row filter applied by select and update.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq(String, Value),
    /// `column IS NULL`
    IsNull(String),
    /// `column IS NOT NULL`
    NotNull(String),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Filter::IsNull(column.into())
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Filter::NotNull(column.into())
    }

    /// The column this filter applies to
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::IsNull(column) | Filter::NotNull(column) => column,
        }
    }

    /// Whether a row satisfies this filter. A missing column reads as null.
    pub fn matches(&self, row: &Row) -> bool {
        let value = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, expected) => value == expected,
            Filter::IsNull(_) => value.is_null(),
            Filter::NotNull(_) => !value.is_null(),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Result ordering for a select
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub column: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// Column projection for a select
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Columns {
    #[default]
    All,
    Only(Vec<String>),
}

impl Columns {
    /// Reduce a full row to the selected columns
    pub fn project(&self, row: &Row) -> Row {
        match self {
            Columns::All => row.clone(),
            Columns::Only(names) => names
                .iter()
                .map(|name| {
                    (
                        name.clone(),
                        row.get(name).cloned().unwrap_or(Value::Null),
                    )
                })
                .collect(),
        }
    }
}

/// Parameters for a filtered, ordered read.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Columns,
    pub filters: Vec<Filter>,
    pub order: Option<Ordering>,
}

impl SelectQuery {
    /// Select all columns of `table` with no filters
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Columns::All,
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn columns(mut self, columns: Columns) -> Self {
        self.columns = columns;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Ordering) -> Self {
        self.order = Some(order);
        self
    }
}

/// Parameters for an insert that returns the stored rows.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    pub table: String,
    pub rows: Vec<Row>,
}

impl InsertQuery {
    pub fn new(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            rows: vec![row],
        }
    }
}

/// Parameters for an update that returns the updated rows.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub table: String,
    pub values: Row,
    pub filters: Vec<Filter>,
}

impl UpdateQuery {
    pub fn new(table: impl Into<String>, values: Row) -> Self {
        Self {
            table: table.into(),
            values,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// Narrow access interface to a table-oriented store.
///
/// Implementations must be safe for concurrent use by in-flight requests.
/// Each call is a single round trip; no transactions span calls.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Insert rows, returning them as stored (with ids and timestamps).
    async fn insert(&self, query: InsertQuery) -> Result<Vec<Row>>;

    /// Read rows matching every filter, in the requested order.
    async fn select(&self, query: SelectQuery) -> Result<Vec<Row>>;

    /// Overwrite columns on every row matching all filters, returning the updated rows.
    async fn update(&self, query: UpdateQuery) -> Result<Vec<Row>>;
}
