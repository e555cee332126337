//! Schema introspection over information_schema
//!
//! Backs the CLI `schema` command. Uses the generic [`SqlRepository`] so the
//! queries work against whatever the managed database actually contains.

use serde::{Deserialize, Serialize};

use fleetdesk_types::Result;

use crate::sql_repository::{SqlRepository, SqlValue};

/// One column of a table
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// All base tables visible to the connection
pub fn list_tables(repo: &SqlRepository) -> Result<Vec<String>> {
    let rows = repo.fetch_all(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_type = 'BASE TABLE' AND table_schema = 'public' \
         ORDER BY table_name",
        &[],
    )?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("table_name").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect())
}

/// Columns of one table
pub fn table_columns(repo: &SqlRepository, table: &str) -> Result<Vec<ColumnInfo>> {
    let rows = repo.fetch_all(
        "SELECT column_name, data_type, is_nullable \
         FROM information_schema.columns \
         WHERE table_name = $1 AND table_schema = 'public' \
         ORDER BY ordinal_position",
        &[SqlValue::Text(table.to_string())],
    )?;
    Ok(rows
        .iter()
        .map(|row| ColumnInfo {
            name: row
                .get("column_name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            data_type: row
                .get("data_type")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            nullable: row
                .get("is_nullable")
                .and_then(|v| v.as_str())
                .map(|s| s.eq_ignore_ascii_case("yes"))
                .unwrap_or(false),
        })
        .collect())
}
