//! Timestamp assignment strategy for `created_at` / `updated_at`.

use chrono::{DateTime, Utc};

use super::DatabaseBackend;

/// Which clock stamps rows. Chosen once at startup and handed to every store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStrategy {
    /// The database clock (`now()` on PostgreSQL).
    Database,
    /// The application clock, bound as a query parameter.
    Application,
}

impl TimestampStrategy {
    /// PostgreSQL stamps rows itself; SQLite rows are stamped by the server.
    pub fn default_for(backend: DatabaseBackend) -> Self {
        match backend {
            DatabaseBackend::Postgres => Self::Database,
            DatabaseBackend::Sqlite => Self::Application,
        }
    }

    /// Value to bind for a new stamp. `None` means the SQL falls back to the
    /// database clock via `COALESCE`.
    pub fn stamp(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Database => None,
            Self::Application => Some(Utc::now()),
        }
    }
}
