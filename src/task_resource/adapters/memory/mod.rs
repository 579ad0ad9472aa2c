//! In-memory adapters for task-resource persistence.

mod repository;

pub use repository::InMemoryTaskResourceRepository;
