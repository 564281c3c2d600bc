//! Database table configuration

use std::env;
use std::sync::LazyLock;

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_default());

/// Users table name
pub(crate) static DB_TABLE_USERS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_USERS").unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "users"))
});

/// User sessions table name
pub(crate) static DB_TABLE_USER_SESSIONS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_USER_SESSIONS")
        .unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "user_sessions"))
});

#[cfg(test)]
mod tests {
    use std::env;

    #[test]
    fn test_db_table_prefix_default() {
        // The statics may already be initialized, so test the parsing logic
        // they use directly.
        if env::var("DB_TABLE_PREFIX").is_err() {
            let prefix = env::var("DB_TABLE_PREFIX").unwrap_or_default();
            assert_eq!(prefix, "");
        }
    }

    #[test]
    fn test_table_names_compose_prefix() {
        let prefix = "demo_";
        let users = format!("{}{}", prefix, "users");
        let sessions = format!("{}{}", prefix, "user_sessions");

        assert_eq!(users, "demo_users");
        assert_eq!(sessions, "demo_user_sessions");
    }
}
