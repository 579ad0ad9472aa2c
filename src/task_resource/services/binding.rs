//! Service layer for binding resources to batch tasks.

use crate::task_resource::{
    domain::{
        NewTaskResource, ResourceId, ResourceRefType, ResourceTypeFilter, TaskId, TaskResource,
        TenantId, storage_timestamp,
    },
    ports::{TaskResourceRepository, TaskResourceRepositoryError},
};
use mockable::Clock;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for task-resource operations.
#[derive(Debug, Error)]
pub enum TaskResourceServiceError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskResourceRepositoryError),

    /// The resource is still referenced by live task associations.
    #[error("resource {resource_id} is still referenced by tasks {task_ids:?}")]
    ResourceInUse {
        /// Resource that was checked.
        resource_id: ResourceId,
        /// Tasks holding live associations to the resource.
        task_ids: Vec<TaskId>,
    },
}

/// Result type for task-resource service operations.
pub type TaskResourceServiceResult<T> = Result<T, TaskResourceServiceError>;

/// Orchestrates task-resource bindings on behalf of the batch task engine.
#[derive(Clone)]
pub struct TaskResourceService<R, C>
where
    R: TaskResourceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskResourceService<R, C>
where
    R: TaskResourceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task-resource service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Replaces the task's associations of `resource_type` with
    /// `resource_ids`.
    ///
    /// Existing rows of that type are physically removed first. Duplicate ids
    /// in the input are bound once, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when removal or any
    /// insert fails. Rows inserted before the failure are kept.
    pub async fn bind_resources(
        &self,
        task_id: TaskId,
        tenant_id: TenantId,
        resource_type: ResourceRefType,
        resource_ids: impl IntoIterator<Item = ResourceId> + Send,
    ) -> TaskResourceServiceResult<Vec<TaskResource>> {
        let mut seen = HashSet::new();
        let distinct: Vec<ResourceId> = resource_ids
            .into_iter()
            .filter(|resource_id| seen.insert(*resource_id))
            .collect();

        let removed = self
            .repository
            .delete_by_task_id(task_id, resource_type.into())
            .await?;

        let mut bound = Vec::with_capacity(distinct.len());
        for resource_id in distinct {
            let new_resource =
                NewTaskResource::new(task_id, resource_id, resource_type, tenant_id, &*self.clock);
            bound.push(self.repository.insert(&new_resource).await?);
        }

        debug!(
            %task_id,
            %resource_type,
            removed,
            bound = bound.len(),
            "rebound task resources"
        );
        Ok(bound)
    }

    /// Lists the live associations of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when the lookup fails.
    pub async fn resources_for_task(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceServiceResult<Vec<TaskResource>> {
        Ok(self.repository.list_by_task_id(task_id, filter).await?)
    }

    /// Finds the live association for a task, resource, and type.
    ///
    /// Returns `Ok(None)` when the task does not reference the resource.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when the lookup fails.
    pub async fn find_binding(
        &self,
        task_id: TaskId,
        resource_id: ResourceId,
        resource_type: ResourceRefType,
    ) -> TaskResourceServiceResult<Option<TaskResource>> {
        Ok(self
            .repository
            .find_by_task_and_resource(task_id, resource_id, resource_type)
            .await?)
    }

    /// Returns the distinct tasks holding live associations to a resource, in
    /// ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when the lookup fails.
    pub async fn referencing_tasks(
        &self,
        resource_id: ResourceId,
    ) -> TaskResourceServiceResult<Vec<TaskId>> {
        let rows = self.repository.list_by_resource_id(resource_id).await?;
        let task_ids: BTreeSet<TaskId> = rows.iter().map(TaskResource::task_id).collect();
        Ok(task_ids.into_iter().collect())
    }

    /// Verifies that no live association references the resource.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::ResourceInUse`] when at least one
    /// task still references the resource.
    pub async fn ensure_resource_unreferenced(
        &self,
        resource_id: ResourceId,
    ) -> TaskResourceServiceResult<()> {
        let task_ids = self.referencing_tasks(resource_id).await?;
        if task_ids.is_empty() {
            return Ok(());
        }
        Err(TaskResourceServiceError::ResourceInUse {
            resource_id,
            task_ids,
        })
    }

    /// Logically deletes a task's associations.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when the update fails.
    pub async fn unbind_task(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceServiceResult<u64> {
        Ok(self
            .repository
            .logic_delete_by_task_id(task_id, filter, storage_timestamp(&*self.clock))
            .await?)
    }

    /// Physically removes a task's associations.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when the delete fails.
    pub async fn purge_task(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceServiceResult<u64> {
        Ok(self.repository.delete_by_task_id(task_id, filter).await?)
    }

    /// Physically removes every association owned by a decommissioned tenant.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when the delete fails.
    pub async fn purge_tenant(&self, tenant_id: TenantId) -> TaskResourceServiceResult<u64> {
        let removed = self.repository.delete_by_tenant_id(tenant_id).await?;
        info!(%tenant_id, removed, "purged tenant task resources");
        Ok(removed)
    }

    /// Points an existing association at a different resource.
    ///
    /// Returns `Ok(false)` when the association no longer exists or has been
    /// logically deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResourceServiceError::Repository`] when the new key
    /// collides with another live association or the update fails.
    pub async fn rebind(
        &self,
        resource: &TaskResource,
        new_resource_id: ResourceId,
    ) -> TaskResourceServiceResult<bool> {
        let mut updated = resource.clone();
        updated.set_resource_id(new_resource_id, &*self.clock);
        let count = self.repository.update(&updated).await?;
        Ok(count == 1)
    }
}
