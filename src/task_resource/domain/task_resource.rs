//! Task-resource association records.

use super::{ResourceId, ResourceRefType, TaskId, TaskResourceId, TenantId};
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Sub-second digits kept in stored timestamps; `TIMESTAMPTZ` holds
/// microseconds.
const STORED_SUBSEC_DIGITS: u16 = 6;

/// Truncates an instant to the precision storage keeps.
///
/// Timestamps passed through this compare equal before and after a round
/// trip through either adapter.
#[must_use]
pub fn to_storage_precision(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// Reads the clock at storage precision.
#[must_use]
pub fn storage_timestamp(clock: &impl Clock) -> DateTime<Utc> {
    to_storage_precision(clock.utc())
}

/// Association that has not been persisted yet and so has no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaskResource {
    task_id: TaskId,
    resource_id: ResourceId,
    resource_type: ResourceRefType,
    tenant_id: TenantId,
    created_at: DateTime<Utc>,
}

impl NewTaskResource {
    /// Creates a live association stamped with the clock's current time.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        resource_id: ResourceId,
        resource_type: ResourceRefType,
        tenant_id: TenantId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            task_id,
            resource_id,
            resource_type,
            tenant_id,
            created_at: storage_timestamp(clock),
        }
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the referenced resource.
    #[must_use]
    pub const fn resource_id(&self) -> ResourceId {
        self.resource_id
    }

    /// Returns the association kind.
    #[must_use]
    pub const fn resource_type(&self) -> ResourceRefType {
        self.resource_type
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Converts into a stored record once storage has assigned `id`.
    #[must_use]
    pub const fn into_persisted(self, id: TaskResourceId) -> TaskResource {
        TaskResource {
            id,
            task_id: self.task_id,
            resource_id: self.resource_id,
            resource_type: self.resource_type,
            tenant_id: self.tenant_id,
            is_deleted: false,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Stored association between a batch task and a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResource {
    id: TaskResourceId,
    task_id: TaskId,
    resource_id: ResourceId,
    resource_type: ResourceRefType,
    tenant_id: TenantId,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a stored association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskResourceData {
    /// Row identifier.
    pub id: TaskResourceId,
    /// Owning task.
    pub task_id: TaskId,
    /// Referenced resource.
    pub resource_id: ResourceId,
    /// Association kind.
    pub resource_type: ResourceRefType,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Logical deletion marker.
    pub is_deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskResource {
    /// Reconstructs an association from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedTaskResourceData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            resource_id: data.resource_id,
            resource_type: data.resource_type,
            tenant_id: data.tenant_id,
            is_deleted: data.is_deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub const fn id(&self) -> TaskResourceId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the referenced resource.
    #[must_use]
    pub const fn resource_id(&self) -> ResourceId {
        self.resource_id
    }

    /// Returns the association kind.
    #[must_use]
    pub const fn resource_type(&self) -> ResourceRefType {
        self.resource_type
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns `true` once the association has been logically deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the association to another task.
    pub fn set_task_id(&mut self, task_id: TaskId, clock: &impl Clock) {
        self.task_id = task_id;
        self.updated_at = storage_timestamp(clock);
    }

    /// Points the association at another resource.
    pub fn set_resource_id(&mut self, resource_id: ResourceId, clock: &impl Clock) {
        self.resource_id = resource_id;
        self.updated_at = storage_timestamp(clock);
    }

    /// Changes the association kind.
    pub fn set_resource_type(&mut self, resource_type: ResourceRefType, clock: &impl Clock) {
        self.resource_type = resource_type;
        self.updated_at = storage_timestamp(clock);
    }

    /// Transfers the association to another tenant.
    pub fn set_tenant_id(&mut self, tenant_id: TenantId, clock: &impl Clock) {
        self.tenant_id = tenant_id;
        self.updated_at = storage_timestamp(clock);
    }

    /// Marks the association as logically deleted at `deleted_at`, truncated
    /// to storage precision.
    ///
    /// Returns `false` when it was already deleted; the timestamp is then left
    /// untouched.
    pub fn mark_deleted(&mut self, deleted_at: DateTime<Utc>) -> bool {
        if self.is_deleted {
            return false;
        }
        self.is_deleted = true;
        self.updated_at = to_storage_precision(deleted_at);
        true
    }
}
