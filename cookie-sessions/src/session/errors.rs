use thiserror::Error;

use crate::session::main::TokenError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors surfaced by session mutations.
///
/// Authentication *checks* never produce these: a bad cookie resolves to
/// [`AuthState::Rejected`](crate::AuthState::Rejected) so public pages keep
/// working for logged-out visitors and nothing leaks why a cookie was
/// refused. Mutations (login, logout) fail loudly instead, since silently
/// half-succeeding there leaves the browser and the store disagreeing.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Raised by `logout` when no authenticated session exists
    #[error("Invalid session")]
    InvalidSession,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Header error: {0}")]
    Header(String),

    /// Error signing or verifying a token
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Error from user database operations
    #[error("User error: {0}")]
    User(#[from] UserError),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_converts() {
        let err: SessionError = TokenError::Malformed.into();
        assert!(matches!(err, SessionError::Token(TokenError::Malformed)));
    }

    #[test]
    fn test_user_error_converts() {
        let err: SessionError = UserError::Storage("down".to_string()).into();
        assert!(matches!(err, SessionError::User(_)));
    }

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<SessionError>();
    }
}
