//! SQLite stores
//!
//! Timestamps are stored as ISO-8601 text. When the database clock is used
//! the fallback is `strftime` with millisecond precision in UTC, so a
//! refreshed `updated_at` is bumped 1ms past the stored one when the clock
//! has not moved on since the last write.

mod dishes;
mod tokens;
mod users;

pub use dishes::SqliteDishStore;
pub use tokens::SqliteAccessTokenStore;
pub use users::SqliteUserStore;

pub(crate) const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Database-clock value for `updated_at` in an `UPDATE ... SET`, strictly
/// after the current column value.
pub(crate) const NEXT_UPDATED_AT: &str = "CASE WHEN julianday('now') > julianday(updated_at) \
     THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
     ELSE strftime('%Y-%m-%dT%H:%M:%fZ', julianday(updated_at) + 0.001 / 86400.0) END";
