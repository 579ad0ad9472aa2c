//! Diesel row models for task-resource persistence.

use super::schema::task_resources;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task-resource records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskResourceRow {
    /// Row identifier.
    pub id: i64,
    /// Owning task identifier.
    pub task_id: i64,
    /// Referenced resource identifier.
    pub resource_id: i64,
    /// Association kind code.
    pub resource_type: i16,
    /// Owning tenant identifier.
    pub tenant_id: i64,
    /// Logical deletion marker.
    pub is_deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task-resource records; `id` comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_resources)]
pub struct NewTaskResourceRow {
    /// Owning task identifier.
    pub task_id: i64,
    /// Referenced resource identifier.
    pub resource_id: i64,
    /// Association kind code.
    pub resource_type: i16,
    /// Owning tenant identifier.
    pub tenant_id: i64,
    /// Logical deletion marker.
    pub is_deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
