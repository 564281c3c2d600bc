mod postgres;
mod sqlite;

use chrono::{DateTime, Utc};

use crate::storage::DataStore;
use crate::userdb::{User, UserError, normalize_email};

use postgres::*;
use sqlite::*;

/// Store for user rows, constructed with an explicit [`DataStore`] handle.
#[derive(Clone)]
pub struct UserStore {
    store: DataStore,
}

impl UserStore {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Initialize the users table
    pub async fn init(&self) -> Result<(), UserError> {
        match &self.store {
            DataStore::Sqlite(pool) => create_tables_sqlite(pool).await,
            DataStore::Postgres(pool) => create_tables_postgres(pool).await,
        }
    }

    /// Get a user by their ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        match &self.store {
            DataStore::Sqlite(pool) => get_user_sqlite(pool, id).await,
            DataStore::Postgres(pool) => get_user_postgres(pool, id).await,
        }
    }

    /// Get a user by email. The lookup normalizes the email the same way
    /// creation does.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let email = normalize_email(email);

        match &self.store {
            DataStore::Sqlite(pool) => get_user_by_email_sqlite(pool, &email).await,
            DataStore::Postgres(pool) => get_user_by_email_postgres(pool, &email).await,
        }
    }

    /// Create a new user. Fails on a duplicate email (unique column).
    pub async fn create_user(&self, email: &str, name: &str) -> Result<User, UserError> {
        let email = normalize_email(email);

        if email.is_empty() {
            return Err(UserError::InvalidData("Email cannot be empty".to_string()));
        }

        let user = User::new(email, name.to_string());

        match &self.store {
            DataStore::Sqlite(pool) => insert_user_sqlite(pool, &user).await?,
            DataStore::Postgres(pool) => insert_user_postgres(pool, &user).await?,
        }

        Ok(user)
    }

    /// Delete users created at or before `cutoff`, returning the count.
    pub async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, UserError> {
        match &self.store {
            DataStore::Sqlite(pool) => delete_users_created_before_sqlite(pool, cutoff).await,
            DataStore::Postgres(pool) => delete_users_created_before_postgres(pool, cutoff).await,
        }
    }
}
