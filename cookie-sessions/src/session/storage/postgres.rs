use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::session::errors::SessionError;
use crate::session::types::Session;
use crate::storage::DB_TABLE_USER_SESSIONS;

// PostgreSQL implementations
pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), SessionError> {
    let table_name = DB_TABLE_USER_SESSIONS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            last_seen_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn insert_session_postgres(
    pool: &Pool<Postgres>,
    session: &Session,
) -> Result<(), SessionError> {
    let table_name = DB_TABLE_USER_SESSIONS.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (id, user_id, expires_at, last_seen_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#
    ))
    .bind(&session.id)
    .bind(&session.user_id)
    .bind(session.expires_at)
    .bind(session.last_seen_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_session_postgres(
    pool: &Pool<Postgres>,
    session_id: &str,
    user_id: &str,
) -> Result<Option<Session>, SessionError> {
    let table_name = DB_TABLE_USER_SESSIONS.as_str();

    sqlx::query_as::<_, Session>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = $1 AND user_id = $2 LIMIT 1
        "#
    ))
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))
}

pub(super) async fn touch_session_postgres(
    pool: &Pool<Postgres>,
    session_id: &str,
    user_id: &str,
    last_seen_at: DateTime<Utc>,
) -> Result<(), SessionError> {
    let table_name = DB_TABLE_USER_SESSIONS.as_str();

    sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET last_seen_at = $1 WHERE id = $2 AND user_id = $3
        "#
    ))
    .bind(last_seen_at)
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn delete_session_postgres(
    pool: &Pool<Postgres>,
    session_id: &str,
    user_id: &str,
) -> Result<(), SessionError> {
    let table_name = DB_TABLE_USER_SESSIONS.as_str();

    sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = $1 AND user_id = $2
        "#
    ))
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn delete_sessions_created_before_postgres(
    pool: &Pool<Postgres>,
    cutoff: DateTime<Utc>,
) -> Result<u64, SessionError> {
    let table_name = DB_TABLE_USER_SESSIONS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE created_at <= $1
        "#
    ))
    .bind(cutoff)
    .execute(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))?;

    Ok(result.rows_affected())
}
