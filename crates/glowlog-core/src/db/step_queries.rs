//! Routine step CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row, Transaction};

use crate::{
    error::{DatabaseResultExt, GlowError, Result},
    models::{
        OrderUpdate, RoutineStep, StepCategory, StepDraft, StepId, StepPatch, TimeOfDay, UserScope,
    },
    schedule::{Schedule, ScheduleRecord},
};

const STEP_COLUMNS: &str = "id, user_id, name, product_name, category, notes, time_of_day, step_order, product_id, schedule_type, days, cycle_length, cycle_days, cycle_start_date, interval_days, interval_start_date, created_at, updated_at";
const INSERT_STEP_SQL: &str = "INSERT INTO routine_steps (user_id, name, product_name, category, notes, time_of_day, step_order, product_id, schedule_type, days, cycle_length, cycle_days, cycle_start_date, interval_days, interval_start_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";
const UPDATE_STEP_SQL: &str = "UPDATE routine_steps SET name = ?1, product_name = ?2, category = ?3, notes = ?4, time_of_day = ?5, product_id = ?6, schedule_type = ?7, days = ?8, cycle_length = ?9, cycle_days = ?10, cycle_start_date = ?11, interval_days = ?12, interval_start_date = ?13, updated_at = ?14 WHERE id = ?15 AND user_id = ?16";
const UPDATE_STEP_ORDER_SQL: &str =
    "UPDATE routine_steps SET step_order = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4";
const DELETE_STEP_COMPLETIONS_SQL: &str = "DELETE FROM step_completions WHERE step_id = ?1";
const DELETE_STEP_SQL: &str = "DELETE FROM routine_steps WHERE id = ?1 AND user_id = ?2";

fn select_steps_by_user_sql() -> String {
    format!("SELECT {STEP_COLUMNS} FROM routine_steps WHERE user_id = ?1 ORDER BY step_order, id")
}

fn select_step_by_id_sql() -> String {
    format!("SELECT {STEP_COLUMNS} FROM routine_steps WHERE id = ?1 AND user_id = ?2")
}

/// Flat column values of a schedule, lists joined with commas.
struct ScheduleColumns {
    schedule_type: Option<String>,
    days: Option<String>,
    cycle_length: Option<i64>,
    cycle_days: Option<String>,
    cycle_start_date: Option<String>,
    interval_days: Option<i64>,
    interval_start_date: Option<String>,
}

impl From<&Schedule> for ScheduleColumns {
    fn from(schedule: &Schedule) -> Self {
        let record = ScheduleRecord::from(schedule.clone());
        Self {
            schedule_type: record.schedule_type,
            days: record.days.map(|days| days.join(",")),
            cycle_length: record.cycle_length.map(i64::from),
            cycle_days: record.cycle_days.map(|days| {
                days.iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            }),
            cycle_start_date: record.cycle_start_date,
            interval_days: record.interval_days.map(i64::from),
            interval_start_date: record.interval_start_date,
        }
    }
}

fn split_list(value: Option<String>) -> Option<Vec<String>> {
    value.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()
    })
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

fn parse_timestamp(row: &Row, column: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(column)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

impl super::Database {
    /// Helper function to construct a RoutineStep from a database row
    fn build_step_from_row(row: &Row) -> rusqlite::Result<RoutineStep> {
        let category_str: String = row.get(4)?;
        let category = category_str
            .parse::<StepCategory>()
            .map_err(|e| conversion_error(4, e))?;

        let time_str: String = row.get(6)?;
        let time_of_day = time_str
            .parse::<TimeOfDay>()
            .map_err(|e| conversion_error(6, e))?;

        let record = ScheduleRecord {
            schedule_type: row.get(9)?,
            days: split_list(row.get(10)?),
            cycle_length: row
                .get::<_, Option<i64>>(11)?
                .and_then(|n| u32::try_from(n).ok()),
            cycle_days: split_list(row.get(12)?)
                .map(|days| days.iter().filter_map(|d| d.parse().ok()).collect()),
            cycle_start_date: row.get(13)?,
            interval_days: row
                .get::<_, Option<i64>>(14)?
                .and_then(|n| u32::try_from(n).ok()),
            interval_start_date: row.get(15)?,
        };

        Ok(RoutineStep {
            id: row.get::<_, i64>(0)? as StepId,
            user_id: UserScope::new(row.get::<_, String>(1)?),
            name: row.get(2)?,
            product_name: row.get(3)?,
            category,
            notes: row.get(5)?,
            time_of_day,
            order: row.get::<_, i64>(7)?.max(0) as u32,
            product_id: row.get(8)?,
            schedule: Schedule::from(record),
            created_at: parse_timestamp(row, 16)?,
            updated_at: parse_timestamp(row, 17)?,
        })
    }

    fn fetch_step(tx: &Transaction, scope: &UserScope, id: StepId) -> Result<RoutineStep> {
        tx.query_row(
            &select_step_by_id_sql(),
            params![id as i64, scope.as_str()],
            Self::build_step_from_row,
        )
        .optional()
        .db_context("Failed to get step")?
        .ok_or(GlowError::StepNotFound { id })
    }

    /// Retrieves all steps of a user in routine order.
    pub fn list_steps(&self, scope: &UserScope) -> Result<Vec<RoutineStep>> {
        let mut stmt = self
            .connection
            .prepare(&select_steps_by_user_sql())
            .db_context("Failed to prepare query")?;

        let steps = stmt
            .query_map(params![scope.as_str()], Self::build_step_from_row)
            .db_context("Failed to query steps")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch steps")?;

        Ok(steps)
    }

    /// Retrieves a single step by its ID.
    pub fn get_step(&self, scope: &UserScope, id: StepId) -> Result<Option<RoutineStep>> {
        self.connection
            .query_row(
                &select_step_by_id_sql(),
                params![id as i64, scope.as_str()],
                Self::build_step_from_row,
            )
            .optional()
            .db_context("Failed to get step")
    }

    /// Inserts a new step at the given order.
    pub fn insert_step(
        &mut self,
        scope: &UserScope,
        draft: &StepDraft,
        order: u32,
    ) -> Result<RoutineStep> {
        let now = Timestamp::now();
        let now_str = now.to_string();
        let columns = ScheduleColumns::from(&draft.schedule);

        self.connection
            .execute(
                INSERT_STEP_SQL,
                params![
                    scope.as_str(),
                    &draft.name,
                    &draft.product_name,
                    draft.category.as_str(),
                    &draft.notes,
                    draft.time_of_day.as_str(),
                    i64::from(order),
                    &draft.product_id,
                    &columns.schedule_type,
                    &columns.days,
                    columns.cycle_length,
                    &columns.cycle_days,
                    &columns.cycle_start_date,
                    columns.interval_days,
                    &columns.interval_start_date,
                    &now_str,
                    &now_str
                ],
            )
            .db_context("Failed to insert step")?;

        let id = self.connection.last_insert_rowid() as StepId;

        Ok(RoutineStep {
            id,
            user_id: scope.clone(),
            name: draft.name.clone(),
            product_name: draft.product_name.clone(),
            category: draft.category,
            notes: draft.notes.clone(),
            time_of_day: draft.time_of_day,
            order,
            product_id: draft.product_id.clone(),
            schedule: draft.schedule.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges a patch into a stored step and returns the result.
    pub fn update_step(
        &mut self,
        scope: &UserScope,
        id: StepId,
        patch: &StepPatch,
    ) -> Result<RoutineStep> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let mut step = Self::fetch_step(&tx, scope, id)?;
        patch.apply_to(&mut step, Timestamp::now());
        let columns = ScheduleColumns::from(&step.schedule);

        tx.execute(
            UPDATE_STEP_SQL,
            params![
                &step.name,
                &step.product_name,
                step.category.as_str(),
                &step.notes,
                step.time_of_day.as_str(),
                &step.product_id,
                &columns.schedule_type,
                &columns.days,
                columns.cycle_length,
                &columns.cycle_days,
                &columns.cycle_start_date,
                columns.interval_days,
                &columns.interval_start_date,
                step.updated_at.to_string(),
                id as i64,
                scope.as_str()
            ],
        )
        .db_context("Failed to update step")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(step)
    }

    /// Removes a step together with its completion records.
    pub fn delete_step(&mut self, scope: &UserScope, id: StepId) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        Self::fetch_step(&tx, scope, id)?;

        tx.execute(DELETE_STEP_COMPLETIONS_SQL, params![id as i64])
            .db_context("Failed to delete step completions")?;

        tx.execute(DELETE_STEP_SQL, params![id as i64, scope.as_str()])
            .db_context("Failed to delete step")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(())
    }

    /// Rewrites the order of several steps in one transaction. Unknown ids
    /// are skipped.
    pub fn update_orders(&mut self, scope: &UserScope, orders: &[OrderUpdate]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now_str = Timestamp::now().to_string();
        {
            let mut stmt = tx
                .prepare(UPDATE_STEP_ORDER_SQL)
                .db_context("Failed to prepare order update")?;
            for update in orders {
                stmt.execute(params![
                    i64::from(update.order),
                    &now_str,
                    update.id as i64,
                    scope.as_str()
                ])
                .db_context("Failed to update step order")?;
            }
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(())
    }
}
