//! Scheduled cleanup of stale sessions and users
//!
//! Sessions and users are both swept one day after creation regardless of
//! activity; accounts in this system are intentionally ephemeral. The job is
//! idempotent, so the advisory lock only has to prevent the common case of
//! overlapping scheduled runs.

use chrono::{Duration, Utc};

use crate::session::SessionManager;
use crate::storage::StorageError;

pub const CLEANUP_LOCK_NAME: &str = "crons-cleanup";

const CLEANUP_LOCK_TTL_SECONDS: usize = 300;

/// What a cleanup run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    /// True when another run held the lock and nothing was deleted
    pub skipped: bool,
    pub sessions_deleted: u64,
    pub users_deleted: u64,
}

/// Delete `user_sessions` and `users` rows created more than one day ago.
///
/// Each sweep is best-effort: a failed delete is logged and leaves its rows
/// for the next run. Lock operations themselves propagate, since without the
/// lock the job must not run at all.
pub async fn cleanup_sessions_and_users(
    manager: &SessionManager,
) -> Result<CleanupOutcome, StorageError> {
    let lock = manager.lock();

    if lock.has(CLEANUP_LOCK_NAME).await? {
        tracing::info!("Cleanup job locked, skipping");
        return Ok(CleanupOutcome {
            skipped: true,
            sessions_deleted: 0,
            users_deleted: 0,
        });
    }

    lock.set(CLEANUP_LOCK_NAME, CLEANUP_LOCK_TTL_SECONDS).await?;

    let yesterday = Utc::now() - Duration::days(1);

    let sessions_deleted = match manager.sessions().delete_created_before(yesterday).await {
        Ok(count) => {
            tracing::info!("Deleted {count} user sessions");
            count
        }
        Err(e) => {
            tracing::error!("Failed to delete stale sessions: {e}");
            0
        }
    };

    let users_deleted = match manager.users().delete_created_before(yesterday).await {
        Ok(count) => {
            tracing::info!("Deleted {count} users");
            count
        }
        Err(e) => {
            tracing::error!("Failed to delete stale users: {e}");
            0
        }
    };

    lock.clear(CLEANUP_LOCK_NAME).await?;

    Ok(CleanupOutcome {
        skipped: false,
        sessions_deleted,
        users_deleted,
    })
}
