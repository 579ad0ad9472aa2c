//! `PostgreSQL` repository implementation for task-resource associations.

use super::{
    models::{NewTaskResourceRow, TaskResourceRow},
    schema::task_resources,
};
use crate::task_resource::{
    domain::{
        NewTaskResource, PersistedTaskResourceData, ResourceId, ResourceRefType,
        ResourceTypeFilter, TaskId, TaskResource, TaskResourceId, TenantId, to_storage_precision,
    },
    ports::{TaskResourceRepository, TaskResourceRepositoryError, TaskResourceRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

/// `PostgreSQL` connection pool type used by task-resource adapters.
pub type TaskResourcePgPool = Pool<ConnectionManager<PgConnection>>;

/// Name of the partial unique index guarding live association keys.
const LIVE_KEY_UNIQUE_INDEX: &str = "idx_task_resources_live_unique";

/// `PostgreSQL`-backed task-resource repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskResourceRepository {
    pool: TaskResourcePgPool,
}

impl PostgresTaskResourceRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskResourcePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> TaskResourceRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskResourceRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(TaskResourceRepositoryError::storage_unavailable)?;
            operation(&mut connection)
        })
        .await
        .map_err(TaskResourceRepositoryError::storage_unavailable)?
    }
}

#[async_trait]
impl TaskResourceRepository for PostgresTaskResourceRepository {
    async fn list_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceRepositoryResult<Vec<TaskResource>> {
        self.run_blocking(move |connection| {
            let mut query = task_resources::table
                .filter(task_resources::task_id.eq(task_id.into_inner()))
                .filter(task_resources::is_deleted.eq(false))
                .order(task_resources::id.asc())
                .select(TaskResourceRow::as_select())
                .into_boxed();
            if let Some(resource_type) = filter.resource_type() {
                query = query.filter(task_resources::resource_type.eq(resource_type.code()));
            }
            let rows = query
                .load::<TaskResourceRow>(connection)
                .map_err(TaskResourceRepositoryError::storage_unavailable)?;
            rows.into_iter().map(row_to_resource).collect()
        })
        .await
    }

    async fn find_by_task_and_resource(
        &self,
        task_id: TaskId,
        resource_id: ResourceId,
        resource_type: ResourceRefType,
    ) -> TaskResourceRepositoryResult<Option<TaskResource>> {
        self.run_blocking(move |connection| {
            let row = task_resources::table
                .filter(task_resources::task_id.eq(task_id.into_inner()))
                .filter(task_resources::resource_id.eq(resource_id.into_inner()))
                .filter(task_resources::resource_type.eq(resource_type.code()))
                .filter(task_resources::is_deleted.eq(false))
                .select(TaskResourceRow::as_select())
                .first::<TaskResourceRow>(connection)
                .optional()
                .map_err(TaskResourceRepositoryError::storage_unavailable)?;
            row.map(row_to_resource).transpose()
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: TaskResourceId,
    ) -> TaskResourceRepositoryResult<Option<TaskResource>> {
        self.run_blocking(move |connection| {
            let row = task_resources::table
                .filter(task_resources::id.eq(id.into_inner()))
                .select(TaskResourceRow::as_select())
                .first::<TaskResourceRow>(connection)
                .optional()
                .map_err(TaskResourceRepositoryError::storage_unavailable)?;
            row.map(row_to_resource).transpose()
        })
        .await
    }

    async fn delete_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
    ) -> TaskResourceRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let by_task =
                task_resources::table.filter(task_resources::task_id.eq(task_id.into_inner()));
            let deleted = match filter.resource_type() {
                Some(resource_type) => diesel::delete(
                    by_task.filter(task_resources::resource_type.eq(resource_type.code())),
                )
                .execute(connection),
                None => diesel::delete(by_task).execute(connection),
            }
            .map_err(TaskResourceRepositoryError::storage_unavailable)?;

            let removed = affected_rows(deleted)?;
            debug!(%task_id, ?filter, removed, "deleted task resources");
            Ok(removed)
        })
        .await
    }

    async fn logic_delete_by_task_id(
        &self,
        task_id: TaskId,
        filter: ResourceTypeFilter,
        deleted_at: DateTime<Utc>,
    ) -> TaskResourceRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let live_by_task = task_resources::table
                .filter(task_resources::task_id.eq(task_id.into_inner()))
                .filter(task_resources::is_deleted.eq(false));
            let changes = (
                task_resources::is_deleted.eq(true),
                task_resources::updated_at.eq(to_storage_precision(deleted_at)),
            );
            let changed = match filter.resource_type() {
                Some(resource_type) => diesel::update(
                    live_by_task.filter(task_resources::resource_type.eq(resource_type.code())),
                )
                .set(changes)
                .execute(connection),
                None => diesel::update(live_by_task).set(changes).execute(connection),
            }
            .map_err(TaskResourceRepositoryError::storage_unavailable)?;

            let marked = affected_rows(changed)?;
            debug!(%task_id, ?filter, marked, "logically deleted task resources");
            Ok(marked)
        })
        .await
    }

    async fn list_by_resource_id(
        &self,
        resource_id: ResourceId,
    ) -> TaskResourceRepositoryResult<Vec<TaskResource>> {
        self.run_blocking(move |connection| {
            let rows = task_resources::table
                .filter(task_resources::resource_id.eq(resource_id.into_inner()))
                .filter(task_resources::is_deleted.eq(false))
                .order(task_resources::id.asc())
                .select(TaskResourceRow::as_select())
                .load::<TaskResourceRow>(connection)
                .map_err(TaskResourceRepositoryError::storage_unavailable)?;
            rows.into_iter().map(row_to_resource).collect()
        })
        .await
    }

    async fn insert(
        &self,
        resource: &NewTaskResource,
    ) -> TaskResourceRepositoryResult<TaskResource> {
        let (task_id, resource_id, resource_type) = (
            resource.task_id(),
            resource.resource_id(),
            resource.resource_type(),
        );
        let new_row = to_new_row(resource);

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(task_resources::table)
                .values(&new_row)
                .returning(TaskResourceRow::as_returning())
                .get_result::<TaskResourceRow>(connection)
                .map_err(|err| map_write_error(err, task_id, resource_id, resource_type))?;

            debug!(id = row.id, %task_id, %resource_id, "inserted task resource");
            row_to_resource(row)
        })
        .await
    }

    async fn update(&self, resource: &TaskResource) -> TaskResourceRepositoryResult<u64> {
        let id = resource.id();
        let (task_id, resource_id, resource_type) = (
            resource.task_id(),
            resource.resource_id(),
            resource.resource_type(),
        );
        let tenant_id = resource.tenant_id();
        let updated_at = resource.updated_at();

        self.run_blocking(move |connection| {
            let changed = diesel::update(
                task_resources::table
                    .filter(task_resources::id.eq(id.into_inner()))
                    .filter(task_resources::is_deleted.eq(false)),
            )
            .set((
                task_resources::task_id.eq(task_id.into_inner()),
                task_resources::resource_id.eq(resource_id.into_inner()),
                task_resources::resource_type.eq(resource_type.code()),
                task_resources::tenant_id.eq(tenant_id.into_inner()),
                task_resources::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(|err| map_write_error(err, task_id, resource_id, resource_type))?;

            let updated = affected_rows(changed)?;
            debug!(%id, updated, "updated task resource");
            Ok(updated)
        })
        .await
    }

    async fn delete_by_tenant_id(&self, tenant_id: TenantId) -> TaskResourceRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                task_resources::table
                    .filter(task_resources::tenant_id.eq(tenant_id.into_inner())),
            )
            .execute(connection)
            .map_err(TaskResourceRepositoryError::storage_unavailable)?;

            let removed = affected_rows(deleted)?;
            debug!(%tenant_id, removed, "deleted tenant task resources");
            Ok(removed)
        })
        .await
    }
}

fn to_new_row(resource: &NewTaskResource) -> NewTaskResourceRow {
    NewTaskResourceRow {
        task_id: resource.task_id().into_inner(),
        resource_id: resource.resource_id().into_inner(),
        resource_type: resource.resource_type().code(),
        tenant_id: resource.tenant_id().into_inner(),
        is_deleted: false,
        created_at: resource.created_at(),
        updated_at: resource.created_at(),
    }
}

fn row_to_resource(row: TaskResourceRow) -> TaskResourceRepositoryResult<TaskResource> {
    let TaskResourceRow {
        id,
        task_id,
        resource_id,
        resource_type,
        tenant_id,
        is_deleted,
        created_at,
        updated_at,
    } = row;

    let parsed_type = ResourceRefType::try_from(resource_type)
        .map_err(TaskResourceRepositoryError::invalid_persisted_data)?;

    Ok(TaskResource::from_persisted(PersistedTaskResourceData {
        id: TaskResourceId::new(id),
        task_id: TaskId::new(task_id),
        resource_id: ResourceId::new(resource_id),
        resource_type: parsed_type,
        tenant_id: TenantId::new(tenant_id),
        is_deleted,
        created_at,
        updated_at,
    }))
}

fn affected_rows(count: usize) -> TaskResourceRepositoryResult<u64> {
    u64::try_from(count).map_err(TaskResourceRepositoryError::storage_unavailable)
}

fn map_write_error(
    err: DieselError,
    task_id: TaskId,
    resource_id: ResourceId,
    resource_type: ResourceRefType,
) -> TaskResourceRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_live_key_unique_violation(info.as_ref()) =>
        {
            warn!(%task_id, %resource_id, %resource_type, "live task resource key already taken");
            TaskResourceRepositoryError::conflict(task_id, resource_id, resource_type)
        }
        _ => TaskResourceRepositoryError::storage_unavailable(err),
    }
}

fn is_live_key_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == LIVE_KEY_UNIQUE_INDEX)
}
