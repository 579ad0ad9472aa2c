//! Tests for the temporary-database fixture itself.

use crate::postgres::helpers::{TEST_DATABASE_URL_ENV, prepare_repo, prepare_repo_with};
use diesel::prelude::*;
use rstest::rstest;

#[rstest]
fn missing_server_url_fails_setup() {
    let result = prepare_repo_with(None);

    let message = result.err().map(|err| err.to_string()).unwrap_or_default();
    assert!(
        message.contains(TEST_DATABASE_URL_ENV),
        "Expected setup to name {TEST_DATABASE_URL_ENV}, got: {message:?}"
    );
}

#[rstest]
#[ignore = "requires TASKLINK_TEST_DATABASE_URL"]
fn cleanup_drops_the_temporary_database() {
    let prepared = prepare_repo().expect("repository setup");
    let url = prepared.database.url().to_owned();
    PgConnection::establish(&url).expect("database reachable before cleanup");

    prepared.cleanup().expect("cleanup database");

    assert!(PgConnection::establish(&url).is_err());
}
