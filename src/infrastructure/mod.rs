use std::time::Duration;

pub mod postgres_repo;
pub mod sqlite_repo;

/// How long a request waits for a pooled connection. sqlx needs a bound; a
/// day stands in for waiting until one frees up.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
