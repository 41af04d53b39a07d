//! Declarative SQLite schema machinery for the warehouse tables.
//!
//! Tables are described as const values and turned into CREATE/DROP
//! statements at runtime. `validate` compares a live database against the
//! declared tables so a mismatched or half-created schema is caught at
//! startup instead of at the first insert.

use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

/// Stamped into `PRAGMA user_version` when the schema is created. A
/// populated database carrying a different stamp was created by an
/// incompatible build and must be reset.
pub const SCHEMA_VERSION: i64 = 1;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Allow unused_mut because the variable is only mutated when
            // optional field assignments are passed to the macro
            // (e.g., `is_primary_key = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

pub struct Column<S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<&'static str>],
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!(
                "{} {}",
                column.name,
                match column.sql_type {
                    SqlType::Text => "TEXT",
                    SqlType::Integer => "INTEGER",
                    SqlType::Real => "REAL",
                }
            ));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    pub fn drop_if_exists(&self, conn: &Connection) -> Result<()> {
        // Indices on the table go with it.
        conn.execute(&format!("DROP TABLE IF EXISTS {};", self.name), params![])?;
        Ok(())
    }
}

/// Create every table in order and stamp the schema version.
pub fn create_all(conn: &Connection, tables: &[Table]) -> Result<()> {
    for table in tables {
        table.create(conn)?;
    }
    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
    Ok(())
}

/// Drop every table, facts before dimensions (reverse declaration order).
pub fn drop_all(conn: &Connection, tables: &[Table]) -> Result<()> {
    for table in tables.iter().rev() {
        table.drop_if_exists(conn)?;
    }
    Ok(())
}

pub fn stored_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}

/// Check the live database against the declared tables: column names,
/// types, nullability, primary keys, and index presence.
pub fn validate(conn: &Connection, tables: &[Table]) -> Result<()> {
    for table in tables {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
        let actual_columns: Vec<Result<Column<String>, rusqlite::Error>> = stmt
            .query_map(params![], |row| {
                let name = row.get::<usize, String>(1)?;
                let sql_type = match row.get::<_, String>(2)?.as_str() {
                    "TEXT" => &SqlType::Text,
                    "INTEGER" => &SqlType::Integer,
                    "REAL" => &SqlType::Real,
                    _ => {
                        return Err(rusqlite::Error::InvalidColumnType(
                            2,
                            "".to_string(),
                            Type::Text,
                        ))
                    }
                };

                Ok(Column {
                    name,
                    sql_type,
                    non_null: row.get::<_, i32>(3)? == 1,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                })
            })?
            .collect();

        if actual_columns.is_empty() {
            bail!("Table {} does not exist", table.name);
        }
        if actual_columns.len() != table.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found column names: {}, expected: {}",
                table.name,
                actual_columns.len(),
                table.columns.len(),
                actual_columns
                    .iter()
                    .filter_map(|c| {
                        if let Ok(column) = c {
                            Some(column.name.clone())
                        } else {
                            None
                        }
                    })
                    .collect::<Vec<String>>()
                    .join(", "),
                table
                    .columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual_column_result, expected_column) in
            actual_columns.iter().zip(table.columns.iter())
        {
            let actual_column = match actual_column_result {
                Ok(column) => column,
                Err(e) => bail!("Error reading column: {:?}", e),
            };
            if actual_column.name != expected_column.name {
                bail!(
                    "Table {} Column name mismatch: expected {}, got {}",
                    &table.name,
                    expected_column.name,
                    actual_column.name
                );
            }
            if actual_column.sql_type != expected_column.sql_type {
                bail!(
                    "Table {} Column {} type mismatch: expected {:?}, got {:?}",
                    &table.name,
                    expected_column.name,
                    expected_column.sql_type,
                    actual_column.sql_type
                );
            }
            if actual_column.non_null != expected_column.non_null {
                bail!(
                    "Table {} Column {} non-null mismatch: expected {}, got {}",
                    &table.name,
                    expected_column.name,
                    expected_column.non_null,
                    actual_column.non_null
                );
            }
            if actual_column.is_primary_key != expected_column.is_primary_key {
                bail!(
                    "Table {} Column {} primary key mismatch: expected {}, got {}",
                    &table.name,
                    expected_column.name,
                    expected_column.is_primary_key,
                    actual_column.is_primary_key
                );
            }
        }

        for (index_name, _columns) in table.indices {
            let index_exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, table.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);

            if !index_exists {
                bail!("Table {} is missing index '{}'", table.name, index_name);
            }
        }
    }
    Ok(())
}
