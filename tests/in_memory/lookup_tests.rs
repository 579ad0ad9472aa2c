//! Insert and lookup tests for [`InMemoryTaskResourceRepository`].

use crate::in_memory::helpers::{association, repo, runtime};
use rstest::rstest;
use std::io;
use tasklink::task_resource::{
    adapters::memory::InMemoryTaskResourceRepository,
    domain::{ResourceId, ResourceRefType, ResourceTypeFilter, TaskId, TaskResourceId},
    ports::TaskResourceRepository,
};
use tokio::runtime::Runtime;

#[rstest]
fn insert_assigns_increasing_ids(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");

    let first = rt
        .block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("first insert");
    let second = rt
        .block_on(repo.insert(&association(1, 101, ResourceRefType::Dependency, 9)))
        .expect("second insert");

    assert!(second.id() > first.id());
    assert!(!first.is_deleted());
}

#[rstest]
fn inserted_row_is_found_by_all_three_keys(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    let stored = rt
        .block_on(repo.insert(&association(1, 100, ResourceRefType::Dependency, 9)))
        .expect("insert");

    let found = rt
        .block_on(repo.find_by_task_and_resource(
            TaskId::new(1),
            ResourceId::new(100),
            ResourceRefType::Dependency,
        ))
        .expect("lookup");

    assert_eq!(found, Some(stored));
}

#[rstest]
#[case::other_type(1, 100, ResourceRefType::Main)]
#[case::other_resource(1, 101, ResourceRefType::Dependency)]
#[case::other_task(2, 100, ResourceRefType::Dependency)]
fn partial_key_match_is_not_found(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
    #[case] task: i64,
    #[case] resource: i64,
    #[case] resource_type: ResourceRefType,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Dependency, 9)))
        .expect("insert");

    let found = rt
        .block_on(repo.find_by_task_and_resource(
            TaskId::new(task),
            ResourceId::new(resource),
            resource_type,
        ))
        .expect("lookup");

    assert!(found.is_none());
}

#[rstest]
fn list_by_task_id_filters_by_type_and_keeps_id_order(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    let dep_a = rt
        .block_on(repo.insert(&association(1, 300, ResourceRefType::Dependency, 9)))
        .expect("insert");
    let main = rt
        .block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("insert");
    let dep_b = rt
        .block_on(repo.insert(&association(1, 200, ResourceRefType::Dependency, 9)))
        .expect("insert");
    rt.block_on(repo.insert(&association(2, 200, ResourceRefType::Dependency, 9)))
        .expect("insert for other task");

    let dependencies = rt
        .block_on(repo.list_by_task_id(
            TaskId::new(1),
            ResourceTypeFilter::Only(ResourceRefType::Dependency),
        ))
        .expect("list dependencies");
    let all = rt
        .block_on(repo.list_by_task_id(TaskId::new(1), ResourceTypeFilter::Any))
        .expect("list all");

    assert_eq!(dependencies, vec![dep_a.clone(), dep_b.clone()]);
    assert_eq!(all, vec![dep_a, main, dep_b]);
}

#[rstest]
fn list_by_resource_id_spans_tasks_and_tenants(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");
    let first = rt
        .block_on(repo.insert(&association(1, 500, ResourceRefType::Main, 9)))
        .expect("insert");
    let second = rt
        .block_on(repo.insert(&association(2, 500, ResourceRefType::Dependency, 10)))
        .expect("insert");
    rt.block_on(repo.insert(&association(3, 501, ResourceRefType::Dependency, 9)))
        .expect("insert unrelated");

    let rows = rt
        .block_on(repo.list_by_resource_id(ResourceId::new(500)))
        .expect("list by resource");

    assert_eq!(rows, vec![first, second]);
}

#[rstest]
fn lookups_on_empty_store_report_absence(
    runtime: io::Result<Runtime>,
    repo: InMemoryTaskResourceRepository,
) {
    let rt = runtime.expect("runtime creation");

    let by_task = rt
        .block_on(repo.list_by_task_id(TaskId::new(1), ResourceTypeFilter::Any))
        .expect("list by task");
    let by_resource = rt
        .block_on(repo.list_by_resource_id(ResourceId::new(1)))
        .expect("list by resource");
    let by_id = rt
        .block_on(repo.find_by_id(TaskResourceId::new(1)))
        .expect("find by id");

    assert!(by_task.is_empty());
    assert!(by_resource.is_empty());
    assert!(by_id.is_none());
}
