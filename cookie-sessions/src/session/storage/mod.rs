mod postgres;
mod sqlite;

use chrono::{DateTime, Utc};

use crate::session::errors::SessionError;
use crate::session::types::Session;
use crate::storage::DataStore;
use crate::utils::gen_random_string;

use postgres::*;
use sqlite::*;

/// Store for session rows.
///
/// Every lookup and mutation is scoped by `(session_id, user_id)` together;
/// a session id alone never authenticates, so a colliding or guessed id is
/// useless across users.
#[derive(Clone)]
pub struct SessionStore {
    store: DataStore,
}

impl SessionStore {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Initialize the user sessions table
    pub async fn init(&self) -> Result<(), SessionError> {
        match &self.store {
            DataStore::Sqlite(pool) => create_tables_sqlite(pool).await,
            DataStore::Postgres(pool) => create_tables_postgres(pool).await,
        }
    }

    /// Create a session row with a fresh random id.
    pub async fn create_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
        last_seen_at: DateTime<Utc>,
    ) -> Result<Session, SessionError> {
        let session = Session {
            id: gen_random_string(32)?,
            user_id: user_id.to_string(),
            expires_at,
            last_seen_at,
            created_at: Utc::now(),
        };

        match &self.store {
            DataStore::Sqlite(pool) => insert_session_sqlite(pool, &session).await?,
            DataStore::Postgres(pool) => insert_session_postgres(pool, &session).await?,
        }

        Ok(session)
    }

    pub async fn get_session(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<Session>, SessionError> {
        match &self.store {
            DataStore::Sqlite(pool) => get_session_sqlite(pool, session_id, user_id).await,
            DataStore::Postgres(pool) => get_session_postgres(pool, session_id, user_id).await,
        }
    }

    /// Update `last_seen_at`. Concurrent touches race; last writer wins,
    /// which is fine since nothing depends on the field beyond
    /// "approximately recent".
    pub async fn touch_session(
        &self,
        session_id: &str,
        user_id: &str,
        last_seen_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        match &self.store {
            DataStore::Sqlite(pool) => {
                touch_session_sqlite(pool, session_id, user_id, last_seen_at).await
            }
            DataStore::Postgres(pool) => {
                touch_session_postgres(pool, session_id, user_id, last_seen_at).await
            }
        }
    }

    pub async fn delete_session(&self, session_id: &str, user_id: &str) -> Result<(), SessionError> {
        match &self.store {
            DataStore::Sqlite(pool) => delete_session_sqlite(pool, session_id, user_id).await,
            DataStore::Postgres(pool) => delete_session_postgres(pool, session_id, user_id).await,
        }
    }

    /// Delete sessions created at or before `cutoff`, returning the count.
    pub async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionError> {
        match &self.store {
            DataStore::Sqlite(pool) => delete_sessions_created_before_sqlite(pool, cutoff).await,
            DataStore::Postgres(pool) => delete_sessions_created_before_postgres(pool, cutoff).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn test_store() -> SessionStore {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("sqlite memory pool");
        let store = SessionStore::new(DataStore::Sqlite(pool));
        store.init().await.expect("init tables");
        store
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        // Given a store and a created session
        let store = test_store().await;
        let now = Utc::now();
        let session = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");

        // When fetching it with the matching user id
        let fetched = store
            .get_session(&session.id, "user-1")
            .await
            .expect("get session");

        // Then the row comes back
        assert_eq!(fetched, Some(session));
    }

    #[tokio::test]
    async fn test_get_session_scoped_by_user() {
        let store = test_store().await;
        let now = Utc::now();
        let session = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");

        // A correct session id with the wrong user id must never resolve
        let fetched = store
            .get_session(&session.id, "user-2")
            .await
            .expect("get session");

        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_touch_session_updates_last_seen() {
        let store = test_store().await;
        let now = Utc::now();
        let session = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");

        let later = now + Duration::minutes(5);
        store
            .touch_session(&session.id, "user-1", later)
            .await
            .expect("touch");

        let fetched = store
            .get_session(&session.id, "user-1")
            .await
            .expect("get session")
            .expect("session exists");
        assert_eq!(fetched.last_seen_at, later);
    }

    #[tokio::test]
    async fn test_touch_session_wrong_user_is_noop() {
        let store = test_store().await;
        let now = Utc::now();
        let session = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");

        store
            .touch_session(&session.id, "user-2", now + Duration::hours(1))
            .await
            .expect("touch");

        let fetched = store
            .get_session(&session.id, "user-1")
            .await
            .expect("get session")
            .expect("session exists");
        assert_eq!(fetched.last_seen_at, session.last_seen_at);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let store = test_store().await;
        let now = Utc::now();
        let session = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");

        store
            .delete_session(&session.id, "user-1")
            .await
            .expect("delete");

        let fetched = store
            .get_session(&session.id, "user-1")
            .await
            .expect("get session");
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_delete_created_before() {
        let store = test_store().await;
        let now = Utc::now();
        let session = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");

        let deleted = store
            .delete_created_before(session.created_at - Duration::hours(1))
            .await
            .expect("delete");
        assert_eq!(deleted, 0);

        let deleted = store
            .delete_created_before(session.created_at + Duration::hours(1))
            .await
            .expect("delete");
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let store = test_store().await;
        let now = Utc::now();

        let a = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");
        let b = store
            .create_session("user-1", now + Duration::days(30), now)
            .await
            .expect("create session");

        assert_ne!(a.id, b.id);
    }
}
