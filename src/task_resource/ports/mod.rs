//! Port contracts for task-resource persistence.

mod repository;

pub use repository::{
    TaskResourceRepository, TaskResourceRepositoryError, TaskResourceRepositoryResult,
};
