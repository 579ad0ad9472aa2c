//! In-memory repository for task-resource associations.

use crate::task_resource::{
    domain::{
        NewTaskResource, PersistedTaskResourceData, ResourceId, ResourceRefType,
        ResourceTypeFilter, TaskId, TaskResource, TaskResourceId, TenantId,
    },
    ports::{TaskResourceRepository, TaskResourceRepositoryError, TaskResourceRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Thread-safe in-memory task-resource repository.
///
/// Rows are kept in identifier order so list operations match the ordering
/// of the `PostgreSQL` adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskResourceRepository {
    state: Arc<RwLock<InMemoryTaskResourceState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskResourceState {
    rows: BTreeMap<TaskResourceId, TaskResource>,
    last_id: i64,
}

impl InMemoryTaskResourceState {
    fn live(&self) -> impl Iterator<Item = &TaskResource> {
        self.rows.values().filter(|row| !row.is_deleted())
    }

    fn live_key_holder(
        &self,
        task_id: TaskId,
        resource_id: ResourceId,
        resource_type: ResourceRefType,
    ) -> Option<TaskResourceId> {
        self.live()
            .find(|row| {
                row.task_id() == task_id
                    && row.resource_id() == resource_id
                    && row.resource_type() == resource_type
            })
            .map(TaskResource::id)
    }

    fn remove_where(&mut self, predicate: impl Fn(&TaskResource) -> bool) -> u64 {
        let before = self.rows.len();
        self.rows.retain(|_, row| !predicate(row));
        count_as_u64(before - self.rows.len())
    }
}

impl InMemoryTaskResourceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskResourceRepositoryResult<RwLockReadGuard<'_, InMemoryTaskResourceState>> {
        self.state.read().map_err(|err| {
            TaskResourceRepositoryError::storage_unavailable(std::io::Error::other(
                err.to_string(),
            ))
        })
    }

    fn write(
        &self,
    ) -> TaskResourceRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskResourceState>> {
        self.state.write().map_err(|err| {
            TaskResourceRepositoryError::storage_unavailable(std::io::Error::other(
                err.to_string(),
            ))
        })
    }
}

fn count_as_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[async_trait]
impl TaskResourceRepository for InMemoryTaskResourceRepository {
    async fn list_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceRepositoryResult<Vec<TaskResource>> {
        let state = self.read()?;
        Ok(state
            .live()
            .filter(|row| row.task_id() == task_id && filter.matches(row.resource_type()))
            .cloned()
            .collect())
    }

    async fn find_by_task_and_resource(
        &self,
        task_id: TaskId,
        resource_id: ResourceId,
        resource_type: ResourceRefType,
    ) -> TaskResourceRepositoryResult<Option<TaskResource>> {
        let state = self.read()?;
        let row = state
            .live_key_holder(task_id, resource_id, resource_type)
            .and_then(|id| state.rows.get(&id))
            .cloned();
        Ok(row)
    }

    async fn find_by_id(
        &self,
        id: TaskResourceId,
    ) -> TaskResourceRepositoryResult<Option<TaskResource>> {
        let state = self.read()?;
        Ok(state.rows.get(&id).cloned())
    }

    async fn delete_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceRepositoryResult<u64> {
        let mut state = self.write()?;
        let removed = state
            .remove_where(|row| row.task_id() == task_id && filter.matches(row.resource_type()));
        debug!(%task_id, ?filter, removed, "deleted task resources");
        Ok(removed)
    }

    async fn logic_delete_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
        deleted_at: DateTime<Utc>,
    ) -> TaskResourceRepositoryResult<u64> {
        let mut state = self.write()?;
        let mut marked = 0_u64;
        for row in state.rows.values_mut() {
            if row.task_id() == task_id
                && filter.matches(row.resource_type())
                && row.mark_deleted(deleted_at)
            {
                marked += 1;
            }
        }
        debug!(%task_id, ?filter, marked, "logically deleted task resources");
        Ok(marked)
    }

    async fn list_by_resource_id(
        &self,
        resource_id: ResourceId,
    ) -> TaskResourceRepositoryResult<Vec<TaskResource>> {
        let state = self.read()?;
        Ok(state
            .live()
            .filter(|row| row.resource_id() == resource_id)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        resource: &NewTaskResource,
    ) -> TaskResourceRepositoryResult<TaskResource> {
        let mut state = self.write()?;
        let (task_id, resource_id, resource_type) = (
            resource.task_id(),
            resource.resource_id(),
            resource.resource_type(),
        );
        if state
            .live_key_holder(task_id, resource_id, resource_type)
            .is_some()
        {
            warn!(%task_id, %resource_id, %resource_type, "rejected duplicate task resource");
            return Err(TaskResourceRepositoryError::conflict(
                task_id,
                resource_id,
                resource_type,
            ));
        }

        state.last_id += 1;
        let stored = resource.clone().into_persisted(TaskResourceId::new(state.last_id));
        state.rows.insert(stored.id(), stored.clone());
        debug!(id = %stored.id(), %task_id, %resource_id, "inserted task resource");
        Ok(stored)
    }

    async fn update(&self, resource: &TaskResource) -> TaskResourceRepositoryResult<u64> {
        let mut state = self.write()?;
        let is_live = state
            .rows
            .get(&resource.id())
            .is_some_and(|row| !row.is_deleted());
        if !is_live {
            return Ok(0);
        }

        let (task_id, resource_id, resource_type) = (
            resource.task_id(),
            resource.resource_id(),
            resource.resource_type(),
        );
        if let Some(holder) = state.live_key_holder(task_id, resource_id, resource_type)
            && holder != resource.id()
        {
            warn!(%task_id, %resource_id, %resource_type, "rejected conflicting task resource update");
            return Err(TaskResourceRepositoryError::conflict(
                task_id,
                resource_id,
                resource_type,
            ));
        }

        let Some(stored) = state.rows.get_mut(&resource.id()) else {
            return Ok(0);
        };
        // Creation time and the deletion marker are not writable through update.
        *stored = TaskResource::from_persisted(PersistedTaskResourceData {
            id: resource.id(),
            task_id,
            resource_id,
            resource_type,
            tenant_id: resource.tenant_id(),
            is_deleted: false,
            created_at: stored.created_at(),
            updated_at: resource.updated_at(),
        });
        debug!(id = %resource.id(), "updated task resource");
        Ok(1)
    }

    async fn delete_by_tenant_id(&self, tenant_id: TenantId) -> TaskResourceRepositoryResult<u64> {
        let mut state = self.write()?;
        let removed = state.remove_where(|row| row.tenant_id() == tenant_id);
        debug!(%tenant_id, removed, "deleted tenant task resources");
        Ok(removed)
    }
}
