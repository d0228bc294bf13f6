//! Instrumentation component identifiers for batch and store operations.

/// Component identifiers for tracing spans.
pub mod components {
    /// Batch commit and release. Fields: ops, remaining.
    pub const DB_BATCH_COMMIT: &str = "db:batch:commit";

    /// Store lifecycle.
    pub const DB_STORE: &str = "db:store";
}
