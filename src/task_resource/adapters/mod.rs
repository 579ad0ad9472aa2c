//! Adapter implementations for the task-resource repository port.

pub mod memory;
pub mod postgres;
