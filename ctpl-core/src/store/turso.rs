//! Turso/libSQL implementation of the data store.
//!
//! This module provides persistent storage using Turso (libSQL).
//! It can connect to:
//! - Remote Turso database (cloud)
//! - Local embedded SQLite file
//!
//! Query structs are translated into parameterized SQL with `RETURNING *`.
//! Table and column names are validated as plain identifiers before they
//! are spliced into a statement; all values travel as bound parameters.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::params::Params;
use libsql::{Builder, Connection, Database};
use serde_json::{Number, Value};
use tracing::{debug, instrument};

use super::{
    Columns, DataStore, Filter, InsertQuery, Ordering, Result, Row, SelectQuery, StoreError,
    UpdateQuery,
};

/// SQL schema for the policies table.
const SCHEMA_POLICIES: &str = r#"
CREATE TABLE IF NOT EXISTS policies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    assured TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    coc_number TEXT NOT NULL DEFAULT '',
    or_number TEXT NOT NULL DEFAULT '',
    policy_number TEXT NOT NULL DEFAULT '',
    policy_type TEXT NOT NULL DEFAULT '',
    policy_year INTEGER,
    date_issued TEXT,
    date_received TEXT,
    insurance_from_date TEXT,
    insurance_to_date TEXT,
    model TEXT NOT NULL DEFAULT '',
    make TEXT NOT NULL DEFAULT '',
    body_type TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT '',
    mv_file_no TEXT NOT NULL DEFAULT '',
    plate_no TEXT NOT NULL DEFAULT '',
    chassis_no TEXT NOT NULL DEFAULT '',
    motor_no TEXT NOT NULL DEFAULT '',
    premium REAL NOT NULL DEFAULT 0,
    other_charges REAL NOT NULL DEFAULT 0,
    auth_fee REAL NOT NULL DEFAULT 50.40,
    doc_stamps REAL NOT NULL DEFAULT 0,
    e_vat REAL NOT NULL DEFAULT 0,
    lgt REAL NOT NULL DEFAULT 0,
    total_premium REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    deleted_at TEXT
)
"#;

/// SQL index for the active/deleted split.
const INDEX_POLICIES_DELETED_AT: &str = r#"
CREATE INDEX IF NOT EXISTS idx_policies_deleted_at
ON policies(deleted_at)
"#;

/// Store-side clock used for `updated_at` on every update.
const SQL_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Turso-backed data store.
///
/// Holds one shared connection so that in-memory databases keep their
/// contents for the lifetime of the store.
#[derive(Clone)]
pub struct LibsqlStore {
    _db: Arc<Database>,
    conn: Connection,
}

impl LibsqlStore {
    /// Open (or create) a local embedded database file.
    pub async fn new_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        Self::open(db).await
    }

    /// Connect to a remote Turso database.
    pub async fn new_remote(url: &str, token: &str) -> Result<Self> {
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await?;
        Self::open(db).await
    }

    /// Create an in-memory database (for testing).
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::open(db).await
    }

    async fn open(db: Database) -> Result<Self> {
        let conn = db.connect()?;
        let store = Self {
            _db: Arc::new(db),
            conn,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Ensure the database schema exists.
    async fn ensure_schema(&self) -> Result<()> {
        self.conn.execute(SCHEMA_POLICIES, ()).await?;
        self.conn.execute(INDEX_POLICIES_DELETED_AT, ()).await?;
        Ok(())
    }

    /// Run a statement and collect every returned row.
    async fn fetch(&self, sql: &str, params: Vec<libsql::Value>) -> Result<Vec<Row>> {
        debug!(sql, params = params.len(), "executing statement");
        let mut rows = self.conn.query(sql, Params::Positional(params)).await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(parse_row(&row)?);
        }
        Ok(out)
    }
}

#[async_trait]
impl DataStore for LibsqlStore {
    #[instrument(skip(self, query), fields(table = %query.table), level = "debug")]
    async fn insert(&self, query: InsertQuery) -> Result<Vec<Row>> {
        let table = quote_ident(&query.table)?;

        let mut inserted = Vec::with_capacity(query.rows.len());
        for row in query.rows {
            let mut columns = Vec::new();
            let mut params = Vec::new();
            for (column, value) in row {
                if column == "id" {
                    continue;
                }
                columns.push(quote_ident(&column)?);
                params.push(to_sql_value(value));
            }

            let sql = if columns.is_empty() {
                format!("INSERT INTO {table} DEFAULT VALUES RETURNING *")
            } else {
                let placeholders = vec!["?"; columns.len()].join(", ");
                format!(
                    "INSERT INTO {table} ({}) VALUES ({placeholders}) RETURNING *",
                    columns.join(", ")
                )
            };
            inserted.extend(self.fetch(&sql, params).await?);
        }

        Ok(inserted)
    }

    #[instrument(skip(self, query), fields(table = %query.table), level = "debug")]
    async fn select(&self, query: SelectQuery) -> Result<Vec<Row>> {
        let table = quote_ident(&query.table)?;
        let columns = match &query.columns {
            Columns::All => "*".to_string(),
            Columns::Only(names) => names
                .iter()
                .map(|n| quote_ident(n))
                .collect::<Result<Vec<_>>>()?
                .join(", "),
        };

        let mut params = Vec::new();
        let mut sql = format!("SELECT {columns} FROM {table}");
        sql.push_str(&where_clause(&query.filters, &mut params)?);
        if let Some(order) = &query.order {
            sql.push_str(&order_clause(order)?);
        }

        self.fetch(&sql, params).await
    }

    #[instrument(skip(self, query), fields(table = %query.table), level = "debug")]
    async fn update(&self, query: UpdateQuery) -> Result<Vec<Row>> {
        let table = quote_ident(&query.table)?;

        let mut params = Vec::new();
        let mut assignments = Vec::new();
        for (column, value) in &query.values {
            if column == "id" {
                continue;
            }
            assignments.push(format!("{} = ?", quote_ident(column)?));
            params.push(to_sql_value(value.clone()));
        }
        if !query.values.contains_key("updated_at") {
            assignments.push(format!("\"updated_at\" = {SQL_NOW}"));
        }

        let mut sql = format!("UPDATE {table} SET {}", assignments.join(", "));
        sql.push_str(&where_clause(&query.filters, &mut params)?);
        sql.push_str(" RETURNING *");

        self.fetch(&sql, params).await
    }
}

/// Quote a table or column name after checking it is a plain identifier.
fn quote_ident(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(format!("\"{name}\""))
    } else {
        Err(StoreError::InvalidColumn(name.to_string()))
    }
}

fn where_clause(filters: &[Filter], params: &mut Vec<libsql::Value>) -> Result<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }

    let mut conditions = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = quote_ident(filter.column())?;
        let condition = match filter {
            Filter::Eq(_, Value::Null) | Filter::IsNull(_) => format!("{column} IS NULL"),
            Filter::Eq(_, value) => {
                params.push(to_sql_value(value.clone()));
                format!("{column} = ?")
            }
            Filter::NotNull(_) => format!("{column} IS NOT NULL"),
        };
        conditions.push(condition);
    }

    Ok(format!(" WHERE {}", conditions.join(" AND ")))
}

fn order_clause(order: &Ordering) -> Result<String> {
    Ok(format!(
        " ORDER BY {} {}",
        quote_ident(&order.column)?,
        order.direction.as_sql()
    ))
}

fn to_sql_value(value: Value) -> libsql::Value {
    match value {
        Value::Null => libsql::Value::Null,
        Value::Bool(b) => libsql::Value::Integer(i64::from(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => libsql::Value::Integer(i),
            None => libsql::Value::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => libsql::Value::Text(s),
        other @ (Value::Array(_) | Value::Object(_)) => libsql::Value::Text(other.to_string()),
    }
}

fn from_sql_value(value: libsql::Value) -> Result<Value> {
    Ok(match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::from(i),
        libsql::Value::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        libsql::Value::Text(s) => Value::String(s),
        libsql::Value::Blob(_) => {
            return Err(StoreError::InvalidData("unexpected blob column".to_string()));
        }
    })
}

/// Convert a database row into a column-keyed map.
fn parse_row(row: &libsql::Row) -> Result<Row> {
    let mut out = Row::new();
    for idx in 0..row.column_count() {
        let name = row
            .column_name(idx)
            .ok_or_else(|| StoreError::InvalidData(format!("unnamed column at {idx}")))?
            .to_string();
        out.insert(name, from_sql_value(row.get_value(idx)?)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn create_test_store() -> (LibsqlStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LibsqlStore::new_local(&dir.path().join("ctpl.db"))
            .await
            .unwrap();
        (store, dir)
    }

    #[test]
    fn quote_ident_rejects_injection() {
        assert_eq!(quote_ident("deleted_at").unwrap(), "\"deleted_at\"");
        assert!(matches!(
            quote_ident("id; DROP TABLE policies"),
            Err(StoreError::InvalidColumn(_))
        ));
        assert!(quote_ident("1abc").is_err());
        assert!(quote_ident("").is_err());
    }

    #[test]
    fn where_clause_binds_only_eq_values() {
        let mut params = Vec::new();
        let sql = where_clause(
            &[Filter::eq("id", 7), Filter::is_null("deleted_at")],
            &mut params,
        )
        .unwrap();
        assert_eq!(sql, " WHERE \"id\" = ? AND \"deleted_at\" IS NULL");
        assert_eq!(params, vec![libsql::Value::Integer(7)]);
    }

    #[test]
    fn sql_value_conversion() {
        assert_eq!(to_sql_value(json!(3)), libsql::Value::Integer(3));
        assert_eq!(to_sql_value(json!(2.5)), libsql::Value::Real(2.5));
        assert_eq!(to_sql_value(json!(true)), libsql::Value::Integer(1));
        assert_eq!(to_sql_value(Value::Null), libsql::Value::Null);
        assert_eq!(
            from_sql_value(libsql::Value::Text("x".into())).unwrap(),
            json!("x")
        );
    }

    #[tokio::test]
    async fn insert_returns_store_assigned_fields() {
        let (store, _dir) = create_test_store().await;
        let rows = store
            .insert(InsertQuery::new(
                "policies",
                row(json!({"assured": "Maria", "premium": 1000.0, "date_issued": null})),
            ))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[0]["assured"], json!("Maria"));
        assert_eq!(rows[0]["premium"], json!(1000.0));
        assert!(rows[0]["created_at"].is_string());
        assert!(rows[0]["deleted_at"].is_null());
    }

    #[tokio::test]
    async fn select_filters_and_orders() {
        let (store, _dir) = create_test_store().await;
        for name in ["a", "b", "c"] {
            store
                .insert(InsertQuery::new("policies", row(json!({"assured": name}))))
                .await
                .unwrap();
        }
        store
            .update(
                UpdateQuery::new("policies", row(json!({"deleted_at": "2024-01-01T00:00:00Z"})))
                    .filter(Filter::eq("id", 2)),
            )
            .await
            .unwrap();

        let active = store
            .select(
                SelectQuery::from("policies")
                    .filter(Filter::is_null("deleted_at"))
                    .order(Ordering::desc("id")),
            )
            .await
            .unwrap();
        let ids: Vec<i64> = active.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![3, 1]);

        let deleted = store
            .select(SelectQuery::from("policies").filter(Filter::not_null("deleted_at")))
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0]["assured"], json!("b"));
    }

    #[tokio::test]
    async fn update_missing_row_returns_empty() {
        let (store, _dir) = create_test_store().await;
        let rows = store
            .update(
                UpdateQuery::new("policies", row(json!({"assured": "x"})))
                    .filter(Filter::eq("id", 404)),
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn select_rejects_bad_column() {
        let (store, _dir) = create_test_store().await;
        let result = store
            .select(SelectQuery::from("policies").order(Ordering::asc("id desc")))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidColumn(_))));
    }

    #[tokio::test]
    async fn reopening_file_keeps_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ctpl.db");
        {
            let store = LibsqlStore::new_local(&path).await.unwrap();
            store
                .insert(InsertQuery::new("policies", row(json!({"assured": "kept"}))))
                .await
                .unwrap();
        }
        let store = LibsqlStore::new_local(&path).await.unwrap();
        let rows = store.select(SelectQuery::from("policies")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["assured"], json!("kept"));
    }

    #[tokio::test]
    async fn policy_lifecycle_over_libsql() {
        use crate::policy::{PolicyPayload, PolicyService};
        use std::time::Duration;

        let store = LibsqlStore::new_memory().await.unwrap();
        let service = PolicyService::new(Arc::new(store));

        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let payload: PolicyPayload = serde_json::from_value(json!({
                "assured": name,
                "coc_number": "COC-1",
                "or_number": "OR-1",
                "premium": "1000",
                "other_charges": "50"
            }))
            .unwrap();
            ids.push(service.create(payload).await.unwrap().to_string());
        }

        // updated_at moves forward on every update
        let before = service.get(&ids[1]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let payload: PolicyPayload = serde_json::from_value(json!({
            "assured": "b2",
            "coc_number": "COC-2",
            "or_number": "OR-2",
            "doc_stamps": "-5"
        }))
        .unwrap();
        let updated = service.update(&ids[1], payload).await.unwrap();
        assert_eq!(updated.assured, "b2");
        assert_eq!(updated.doc_stamps, -5.0);
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(updated.created_at, before.created_at);

        // Most recently deleted first
        service.soft_delete(&ids[0]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        service.soft_delete(&ids[2]).await.unwrap();
        let deleted: Vec<String> = service
            .list_deleted()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(deleted, vec![ids[2].clone(), ids[0].clone()]);

        // Restore binds a null deleted_at
        let restored = service.restore(&ids[0]).await.unwrap();
        assert!(restored.deleted_at.is_none());

        let active: Vec<String> = service
            .list_active()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(active, vec![ids[1].clone(), ids[0].clone()]);
        assert_eq!(service.list_deleted().await.unwrap().len(), 1);
    }
}
