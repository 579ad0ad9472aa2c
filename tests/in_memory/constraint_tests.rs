//! Live-key uniqueness tests for [`InMemoryTaskResourceRepository`].

use crate::in_memory::helpers::{association, repo, runtime};
use chrono::Utc;
use mockable::DefaultClock;
use rstest::rstest;
use std::io;
use tasklink::task_resource::{
    adapters::memory::InMemoryTaskResourceRepository,
    domain::{
        PersistedTaskResourceData, ResourceId, ResourceRefType, ResourceTypeFilter, TaskId,
        TaskResource, TaskResourceId, TenantId,
    },
    ports::{TaskResourceRepository, TaskResourceRepositoryError},
};
use tokio::runtime::Runtime;

#[rstest]
fn duplicate_live_key_is_rejected(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Dependency, 9)))
        .expect("first insert");

    let result = rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Dependency, 9)));

    assert!(
        matches!(
            result,
            Err(TaskResourceRepositoryError::ConstraintViolation {
                task_id,
                resource_id,
                resource_type: ResourceRefType::Dependency,
            }) if task_id == TaskId::new(1) && resource_id == ResourceId::new(100)
        ),
        "Expected ConstraintViolation, got: {result:?}"
    );
    let rows = rt
        .block_on(repo.list_by_task_id(TaskId::new(1), ResourceTypeFilter::Any))
        .expect("list");
    assert_eq!(rows.len(), 1);
}

#[rstest]
fn same_resource_under_other_type_is_allowed(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("main insert");
    rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Dependency, 9)))
        .expect("dependency insert");
}

#[rstest]
fn update_overwrites_mutable_fields(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    let mut stored = rt
        .block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("insert");
    stored.set_resource_id(ResourceId::new(200), &DefaultClock);
    stored.set_tenant_id(TenantId::new(10), &DefaultClock);

    let updated = rt.block_on(repo.update(&stored)).expect("update");

    assert_eq!(updated, 1);
    let found = rt
        .block_on(repo.find_by_id(stored.id()))
        .expect("inspect");
    assert_eq!(found, Some(stored));
}

#[rstest]
fn update_of_unknown_id_changes_nothing(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    let existing = rt
        .block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("insert");
    let now = Utc::now();
    let phantom = TaskResource::from_persisted(PersistedTaskResourceData {
        id: TaskResourceId::new(9_999),
        task_id: TaskId::new(1),
        resource_id: ResourceId::new(300),
        resource_type: ResourceRefType::Main,
        tenant_id: TenantId::new(9),
        is_deleted: false,
        created_at: now,
        updated_at: now,
    });

    let updated = rt.block_on(repo.update(&phantom)).expect("update");

    assert_eq!(updated, 0);
    let rows = rt
        .block_on(repo.list_by_task_id(TaskId::new(1), ResourceTypeFilter::Any))
        .expect("list");
    assert_eq!(rows, vec![existing]);
    let missing = rt
        .block_on(repo.find_by_id(TaskResourceId::new(9_999)))
        .expect("inspect");
    assert!(missing.is_none());
}

#[rstest]
fn update_of_soft_deleted_row_returns_zero(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    let mut stored = rt
        .block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("insert");
    rt.block_on(repo.logic_delete_by_task_id(
        TaskId::new(1),
        ResourceTypeFilter::Any,
        Utc::now(),
    ))
    .expect("logic delete");
    stored.set_resource_id(ResourceId::new(200), &DefaultClock);

    let updated = rt.block_on(repo.update(&stored)).expect("update");

    assert_eq!(updated, 0);
    let inspected = rt
        .block_on(repo.find_by_id(stored.id()))
        .expect("inspect")
        .expect("row still stored");
    assert_eq!(inspected.resource_id(), ResourceId::new(100));
}

#[rstest]
fn update_into_taken_key_is_rejected(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("insert");
    let mut other = rt
        .block_on(repo.insert(&association(1, 101, ResourceRefType::Main, 9)))
        .expect("insert");
    other.set_resource_id(ResourceId::new(100), &DefaultClock);

    let result = rt.block_on(repo.update(&other));

    assert!(matches!(
        result,
        Err(TaskResourceRepositoryError::ConstraintViolation { .. })
    ));
}
