//! Diesel row models for task record persistence.

use super::schema::task_records;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRecordRow {
    /// Insertion-ordered surrogate key.
    pub id: i64,
    /// Backend task identifier.
    pub task_id: String,
    /// Owner type tag.
    pub owner_kind: String,
    /// Owner record identifier.
    pub owner_id: i64,
    /// Registered job name.
    pub task_name: String,
    /// Lifecycle state code.
    pub state: i16,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state change timestamp.
    pub updated_at: DateTime<Utc>,
    /// UI-blocking flag.
    pub ui_block: bool,
}

/// Insert and full-update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = task_records)]
pub struct NewTaskRecordRow {
    /// Backend task identifier.
    pub task_id: String,
    /// Owner type tag.
    pub owner_kind: String,
    /// Owner record identifier.
    pub owner_id: i64,
    /// Registered job name.
    pub task_name: String,
    /// Lifecycle state code.
    pub state: i16,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state change timestamp.
    pub updated_at: DateTime<Utc>,
    /// UI-blocking flag.
    pub ui_block: bool,
}
