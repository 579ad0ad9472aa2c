//! Task-resource association storage.
//!
//! Batch tasks reference resource artifacts (the main script or jar they run
//! and any dependencies shipped with them). This module persists those
//! references per tenant, supports logical and physical removal, and offers
//! a service for rebinding a task's resources. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
