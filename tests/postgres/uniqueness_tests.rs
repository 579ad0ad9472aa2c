//! Live-key constraint tests for `PostgresTaskResourceRepository`.

use crate::postgres::helpers::{association, prepare_repo, test_runtime};
use mockable::DefaultClock;
use rstest::rstest;
use tasklink::task_resource::{
    domain::{ResourceId, ResourceRefType, TaskId},
    ports::{TaskResourceRepository, TaskResourceRepositoryError},
};

#[rstest]
#[ignore = "requires TASKLINK_TEST_DATABASE_URL"]
fn insert_rejects_duplicate_live_key() {
    let prepared = prepare_repo().expect("repository setup");
    let repo = &prepared.repo;
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("first insert");

    let result = rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)));

    assert!(
        matches!(
            result,
            Err(TaskResourceRepositoryError::ConstraintViolation {
                task_id,
                resource_id,
                resource_type: ResourceRefType::Main,
            }) if task_id == TaskId::new(1) && resource_id == ResourceId::new(100)
        ),
        "Expected ConstraintViolation, got: {result:?}"
    );

    prepared.cleanup().expect("cleanup database");
}

#[rstest]
#[ignore = "requires TASKLINK_TEST_DATABASE_URL"]
fn update_rejects_collision_with_other_live_row() {
    let prepared = prepare_repo().expect("repository setup");
    let repo = &prepared.repo;
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(repo.insert(&association(1, 100, ResourceRefType::Main, 9)))
        .expect("insert");
    let mut other = rt
        .block_on(repo.insert(&association(1, 101, ResourceRefType::Main, 9)))
        .expect("insert");
    other.set_resource_id(ResourceId::new(100), &DefaultClock);

    let result = rt.block_on(repo.update(&other));

    assert!(
        matches!(
            result,
            Err(TaskResourceRepositoryError::ConstraintViolation { .. })
        ),
        "Expected ConstraintViolation, got: {result:?}"
    );

    prepared.cleanup().expect("cleanup database");
}
