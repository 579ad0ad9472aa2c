//! `PostgreSQL` adapters for task-resource persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskResourceRepository, TaskResourcePgPool};
