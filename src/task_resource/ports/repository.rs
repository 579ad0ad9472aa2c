//! Repository port for task-resource association persistence.

use crate::task_resource::domain::{
    NewTaskResource, ResourceId, ResourceRefType, ResourceTypeFilter, TaskId, TaskResource,
    TaskResourceId, TenantId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task-resource repository operations.
pub type TaskResourceRepositoryResult<T> = Result<T, TaskResourceRepositoryError>;

/// Persistence contract for task-resource associations.
///
/// Each method maps onto a single storage statement. Lookups only see live
/// rows unless stated otherwise; misses are reported as `None` or an empty
/// vector rather than as errors.
#[async_trait]
pub trait TaskResourceRepository: Send + Sync {
    /// Lists live associations of a task in ascending identifier order.
    async fn list_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceRepositoryResult<Vec<TaskResource>>;

    /// Finds the live association matching all three keys.
    async fn find_by_task_and_resource(
        &self,
        task_id: TaskId,
        resource_id: ResourceId,
        resource_type: ResourceRefType,
    ) -> TaskResourceRepositoryResult<Option<TaskResource>>;

    /// Finds an association by identifier, including logically deleted rows.
    async fn find_by_id(
        &self,
        id: TaskResourceId,
    ) -> TaskResourceRepositoryResult<Option<TaskResource>>;

    /// Physically removes a task's associations, live or logically deleted.
    ///
    /// Returns the number of removed rows.
    async fn delete_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceRepositoryResult<u64>;

    /// Logically deletes a task's live associations, stamping `deleted_at` as
    /// their modification time.
    ///
    /// Returns the number of rows that changed from live to deleted.
    async fn logic_delete_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
        deleted_at: DateTime<Utc>,
    ) -> TaskResourceRepositoryResult<u64>;

    /// Lists live associations referencing a resource across all tasks and
    /// tenants, in ascending identifier order.
    async fn list_by_resource_id(
        &self,
        resource_id: ResourceId,
    ) -> TaskResourceRepositoryResult<Vec<TaskResource>>;

    /// Stores a new association and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceRepositoryError::ConstraintViolation`] when a live
    /// association with the same task, resource, and type already exists.
    async fn insert(&self, resource: &NewTaskResource)
    -> TaskResourceRepositoryResult<TaskResource>;

    /// Overwrites the mutable fields of a live association.
    ///
    /// Returns `1` when the row was updated and `0` when no live row has the
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceRepositoryError::ConstraintViolation`] when the
    /// new key collides with another live association.
    async fn update(&self, resource: &TaskResource) -> TaskResourceRepositoryResult<u64>;

    /// Physically removes every association owned by a tenant.
    ///
    /// Returns the number of removed rows.
    async fn delete_by_tenant_id(&self, tenant_id: TenantId) -> TaskResourceRepositoryResult<u64>;
}

/// Errors returned by task-resource repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskResourceRepositoryError {
    /// A live association with the same key already exists.
    #[error(
        "live association already exists for task {task_id}, resource {resource_id}, type {resource_type}"
    )]
    ConstraintViolation {
        /// Owning task of the conflicting key.
        task_id: TaskId,
        /// Referenced resource of the conflicting key.
        resource_id: ResourceId,
        /// Association kind of the conflicting key.
        resource_type: ResourceRefType,
    },

    /// Stored data could not be reconstructed into domain types.
    #[error("invalid persisted task resource data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// The backing store could not be reached or rejected the statement.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskResourceRepositoryError {
    /// Builds a constraint violation for the given association key.
    #[must_use]
    pub const fn conflict(
        task_id: TaskId,
        resource_id: ResourceId,
        resource_type: ResourceRefType,
    ) -> Self {
        Self::ConstraintViolation {
            task_id,
            resource_id,
            resource_type,
        }
    }

    /// Wraps persisted-data decoding failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a storage-layer failure.
    pub fn storage_unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::StorageUnavailable(Arc::new(err))
    }
}
