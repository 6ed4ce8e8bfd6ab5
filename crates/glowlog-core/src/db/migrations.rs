//! Database schema initialization and migrations.

use crate::error::{DatabaseResultExt, Result};

/// Columns added when schedules gained cycle and interval shapes. Databases
/// created before then only have `days`.
const SCHEDULE_COLUMNS: [(&str, &str); 6] = [
    ("schedule_type", "TEXT"),
    ("cycle_length", "INTEGER"),
    ("cycle_days", "TEXT"),
    ("cycle_start_date", "TEXT"),
    ("interval_days", "INTEGER"),
    ("interval_start_date", "TEXT"),
];

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Enable foreign keys for this connection
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Apply database migrations for existing databases
    fn apply_migrations(&self) -> Result<()> {
        for (column, sql_type) in SCHEDULE_COLUMNS {
            if !self.has_column("routine_steps", column)? {
                self.connection
                    .execute(
                        &format!("ALTER TABLE routine_steps ADD COLUMN {column} {sql_type}"),
                        [],
                    )
                    .db_context("Failed to add schedule column to routine_steps table")?;
            }
        }

        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        self.connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
                [table, column],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .db_context("Failed to inspect table columns")
    }
}
