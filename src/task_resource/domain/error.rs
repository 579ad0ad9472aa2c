//! Error types for task-resource domain parsing.

use thiserror::Error;

/// Error returned when a stored resource type code is not recognised.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("unknown resource reference type code: {0}")]
pub struct ParseResourceRefTypeError(pub i16);
