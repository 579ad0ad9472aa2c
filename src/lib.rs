//! Tasklink: task-resource association storage for the batch engine.
//!
//! Batch tasks run resource artifacts (scripts, jars, dependency bundles)
//! uploaded separately from the task definition. This crate records which
//! resources each task references, per tenant, with logical and physical
//! removal, and exposes the contract the task engine programs against.
//!
//! # Architecture
//!
//! Tasklink follows hexagonal architecture principles:
//!
//! - **Domain**: Association records and identifiers with no infrastructure
//!   dependencies
//! - **Ports**: The repository trait the task engine depends on
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the port
//!
//! # Modules
//!
//! - [`task_resource`]: Association domain, repository port, adapters, and
//!   binding service
//! - [`settings`]: Backend selection and repository construction

pub mod settings;
pub mod task_resource;
