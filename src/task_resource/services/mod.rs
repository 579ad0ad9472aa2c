//! Application services for task-resource bindings.

mod binding;

pub use binding::{TaskResourceService, TaskResourceServiceError, TaskResourceServiceResult};
