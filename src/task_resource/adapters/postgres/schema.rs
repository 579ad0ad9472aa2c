//! Diesel schema for task-resource persistence.

diesel::table! {
    /// Associations between batch tasks and resource artifacts.
    task_resources (id) {
        /// Storage-assigned row identifier.
        id -> Int8,
        /// Owning task identifier.
        task_id -> Int8,
        /// Referenced resource identifier.
        resource_id -> Int8,
        /// Association kind code (`1` main, `2` dependency).
        resource_type -> Int2,
        /// Owning tenant identifier.
        tenant_id -> Int8,
        /// Logical deletion marker.
        is_deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}
