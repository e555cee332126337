//! Generic query execution with row mappings
//!
//! The raw repository contract: `fetch_all` returns each row as a mapping
//! from column name to JSON value, `execute` returns the affected-row
//! count. Typed repositories in [`crate::repos`] cover the application's
//! known queries; this layer backs introspection and ad-hoc diagnostics.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo};

use fleetdesk_types::Result;

use crate::connection::Db;

/// A typed query parameter, bound positionally
#[derive(Clone, Debug)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Null,
}

/// One result row, keyed by column name
pub type RowMap = serde_json::Map<String, Value>;

/// Parameterized query access over the shared handle
#[derive(Clone)]
pub struct SqlRepository {
    db: Arc<Db>,
}

impl SqlRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Run a SELECT and return every row as a column-name → value mapping
    pub fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<RowMap>> {
        let rows: Vec<PgRow> = self
            .db
            .block_on(bind_params(sqlx::query(sql), params).fetch_all(self.db.pool()))?;
        rows.iter().map(row_to_map).collect()
    }

    /// Run an INSERT/UPDATE/DELETE and return the affected-row count
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let result = self
            .db
            .block_on(bind_params(sqlx::query(sql), params).execute(self.db.pool()))?;
        Ok(result.rows_affected())
    }

    /// Close the underlying pool; later calls fail cleanly
    pub fn close(&self) {
        self.db.close();
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Float(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
            SqlValue::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

/// Decode a row into JSON by column type, falling back to text
fn row_to_map(row: &PgRow) -> Result<RowMap> {
    let mut map = RowMap::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INT2" | "INT4" | "INT8" => row
                .try_get::<Option<i64>, _>(i)?
                .map_or(Value::Null, Value::from),
            "FLOAT4" | "FLOAT8" => row
                .try_get::<Option<f64>, _>(i)?
                .map_or(Value::Null, Value::from),
            "BOOL" => row
                .try_get::<Option<bool>, _>(i)?
                .map_or(Value::Null, Value::from),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(i)?
                .map_or(Value::Null, |d| Value::from(d.to_string())),
            "TIME" => row
                .try_get::<Option<NaiveTime>, _>(i)?
                .map_or(Value::Null, |t| Value::from(t.to_string())),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(i)?
                .map_or(Value::Null, |t| Value::from(t.to_string())),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(i)?
                .map_or(Value::Null, |t| Value::from(t.to_rfc3339())),
            _ => row
                .try_get::<Option<String>, _>(i)
                .unwrap_or(None)
                .map_or(Value::Null, Value::from),
        };
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}
