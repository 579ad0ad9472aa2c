//! Domain model for task-resource associations.
//!
//! An association links one batch task to one resource artifact under a
//! tenant. Rows are either live or logically deleted; the flag lives on the
//! record itself rather than in a separate archive.

mod error;
mod ids;
mod resource_type;
mod task_resource;

pub use error::ParseResourceRefTypeError;
pub use ids::{ResourceId, TaskId, TaskResourceId, TenantId};
pub use resource_type::{ResourceRefType, ResourceTypeFilter};
pub use task_resource::{
    NewTaskResource, PersistedTaskResourceData, TaskResource, storage_timestamp,
    to_storage_precision,
};
