//! In-process implementation of the data store.
//!
//! Tables are created on first use. Ids are assigned from a per-table
//! counter that only moves forward, so an id is never handed out twice.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{DataStore, Direction, InsertQuery, Result, Row, SelectQuery, UpdateQuery};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: Vec<Row>,
}

/// Memory-backed store for tests and throwaway servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in `table`, deleted or not
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Orders values the way SQLite does: null, then numbers, then text.
fn compare_values(a: &Value, b: &Value) -> CmpOrdering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) | Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Array(_) | Value::Object(_) => 3,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    #[instrument(skip(self, query), fields(table = %query.table), level = "debug")]
    async fn insert(&self, query: InsertQuery) -> Result<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(query.table).or_default();

        let mut inserted = Vec::with_capacity(query.rows.len());
        for mut row in query.rows {
            table.next_id += 1;
            let stamp = now();
            row.insert("id".into(), Value::from(table.next_id));
            row.entry("created_at").or_insert_with(|| stamp.clone());
            row.entry("updated_at").or_insert(stamp);
            row.entry("deleted_at").or_insert(Value::Null);
            table.rows.push(row.clone());
            inserted.push(row);
        }

        debug!(count = inserted.len(), "inserted rows");
        Ok(inserted)
    }

    #[instrument(skip(self, query), fields(table = %query.table), level = "debug")]
    async fn select(&self, query: SelectQuery) -> Result<Vec<Row>> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&query.table) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<&Row> = table
            .rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| f.matches(row)))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let a = a.get(&order.column).unwrap_or(&Value::Null);
                let b = b.get(&order.column).unwrap_or(&Value::Null);
                let ord = compare_values(a, b);
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        Ok(rows.into_iter().map(|r| query.columns.project(r)).collect())
    }

    #[instrument(skip(self, query), fields(table = %query.table), level = "debug")]
    async fn update(&self, query: UpdateQuery) -> Result<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(&query.table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in table
            .rows
            .iter_mut()
            .filter(|row| query.filters.iter().all(|f| f.matches(row)))
        {
            for (column, value) in &query.values {
                if column != "id" {
                    row.insert(column.clone(), value.clone());
                }
            }
            if !query.values.contains_key("updated_at") {
                row.insert("updated_at".into(), now());
            }
            updated.push(row.clone());
        }

        debug!(count = updated.len(), "updated rows");
        Ok(updated)
    }
}
