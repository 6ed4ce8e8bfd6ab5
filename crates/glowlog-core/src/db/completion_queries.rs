//! Completion record queries.

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, types::Type, Row, Transaction};

use crate::{
    error::{DatabaseResultExt, GlowError, Result},
    models::{CompletionRecord, CompletionStatus, NewCompletion, StepId, UserScope},
};

const SELECT_COMPLETIONS_SQL: &str = "SELECT id, step_id, user_id, date, status, product_used, completed_at FROM step_completions WHERE user_id = ?1 ORDER BY date, step_id";
const STEP_EXISTS_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM routine_steps WHERE id = ?1 AND user_id = ?2)";
const DELETE_COMPLETION_SQL: &str =
    "DELETE FROM step_completions WHERE step_id = ?1 AND date = ?2 AND user_id = ?3";
const INSERT_COMPLETION_SQL: &str = "INSERT INTO step_completions (step_id, user_id, date, status, product_used, completed_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

fn text_column<T>(row: &Row, column: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    row.get::<_, String>(column)?.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, Type::Text, e.to_string().into())
    })
}

impl super::Database {
    fn build_completion_from_row(row: &Row) -> rusqlite::Result<CompletionRecord> {
        Ok(CompletionRecord {
            id: row.get::<_, i64>(0)? as u64,
            step_id: row.get::<_, i64>(1)? as StepId,
            user_id: UserScope::new(row.get::<_, String>(2)?),
            date: text_column::<Date>(row, 3)?,
            status: text_column::<CompletionStatus>(row, 4)?,
            product_used: row.get(5)?,
            completed_at: text_column::<Timestamp>(row, 6)?,
        })
    }

    /// Replaces whatever record exists for (step, date) inside `tx`.
    fn write_completion(
        tx: &Transaction,
        scope: &UserScope,
        record: &NewCompletion,
    ) -> Result<CompletionRecord> {
        let exists: bool = tx
            .query_row(
                STEP_EXISTS_SQL,
                params![record.step_id as i64, scope.as_str()],
                |row| row.get(0),
            )
            .db_context("Failed to check step")?;
        if !exists {
            return Err(GlowError::StepNotFound { id: record.step_id });
        }

        let date = record.date.to_string();
        tx.execute(
            DELETE_COMPLETION_SQL,
            params![record.step_id as i64, &date, scope.as_str()],
        )
        .db_context("Failed to clear completion")?;

        let product_used = match record.status {
            CompletionStatus::Completed => record.product_used.clone(),
            CompletionStatus::Skipped => None,
        };

        tx.execute(
            INSERT_COMPLETION_SQL,
            params![
                record.step_id as i64,
                scope.as_str(),
                &date,
                record.status.as_str(),
                &product_used,
                record.completed_at.to_string()
            ],
        )
        .db_context("Failed to insert completion")?;

        Ok(CompletionRecord {
            id: tx.last_insert_rowid() as u64,
            step_id: record.step_id,
            user_id: scope.clone(),
            date: record.date,
            status: record.status,
            product_used,
            completed_at: record.completed_at,
        })
    }

    /// Retrieves every completion record of a user.
    pub fn list_completions(&self, scope: &UserScope) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_COMPLETIONS_SQL)
            .db_context("Failed to prepare query")?;

        let records = stmt
            .query_map(params![scope.as_str()], Self::build_completion_from_row)
            .db_context("Failed to query completions")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch completions")?;

        Ok(records)
    }

    /// Stores a completion, replacing any record for the same (step, date).
    pub fn insert_completion(
        &mut self,
        scope: &UserScope,
        record: &NewCompletion,
    ) -> Result<CompletionRecord> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let stored = Self::write_completion(&tx, scope, record)?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(stored)
    }

    pub fn delete_completion(&self, scope: &UserScope, step_id: StepId, date: Date) -> Result<()> {
        self.connection
            .execute(
                DELETE_COMPLETION_SQL,
                params![step_id as i64, date.to_string(), scope.as_str()],
            )
            .db_context("Failed to delete completion")?;
        Ok(())
    }

    /// Stores several completions in a single transaction. Either all of them
    /// are written or none.
    pub fn bulk_insert_completions(
        &mut self,
        scope: &UserScope,
        records: &[NewCompletion],
    ) -> Result<Vec<CompletionRecord>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let stored = records
            .iter()
            .map(|record| Self::write_completion(&tx, scope, record))
            .collect::<Result<Vec<_>>>()?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(stored)
    }
}
