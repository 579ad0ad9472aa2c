//! Resource reference kinds and the explicit type filter used by bulk
//! operations.

use super::ParseResourceRefTypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of association between a task and a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRefType {
    /// The primary resource the task executes (for example its script or jar).
    Main,
    /// An additional artifact shipped alongside the task.
    Dependency,
}

impl ResourceRefType {
    /// Returns the `SMALLINT` code used in storage.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Main => 1,
            Self::Dependency => 2,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Dependency => "dependency",
        }
    }
}

impl TryFrom<i16> for ResourceRefType {
    type Error = ParseResourceRefTypeError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Main),
            2 => Ok(Self::Dependency),
            _ => Err(ParseResourceRefTypeError(value)),
        }
    }
}

impl fmt::Display for ResourceRefType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Resource type selector for task-scoped list and delete operations.
///
/// Callers must name a variant explicitly; the type has no `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceTypeFilter {
    /// Restrict the operation to one resource type.
    Only(ResourceRefType),
    /// Apply the operation to every resource type.
    Any,
}

impl ResourceTypeFilter {
    /// Returns `true` when `resource_type` is selected by this filter.
    #[must_use]
    pub fn matches(self, resource_type: ResourceRefType) -> bool {
        match self {
            Self::Only(selected) => selected == resource_type,
            Self::Any => true,
        }
    }

    /// Returns the selected type, or `None` for [`Self::Any`].
    #[must_use]
    pub const fn resource_type(self) -> Option<ResourceRefType> {
        match self {
            Self::Only(selected) => Some(selected),
            Self::Any => None,
        }
    }
}

impl From<ResourceRefType> for ResourceTypeFilter {
    fn from(value: ResourceRefType) -> Self {
        Self::Only(value)
    }
}
