use std::sync::Arc;

use chrono::{Duration, Utc};
use http::HeaderMap;

use crate::config::AuthConfig;
use crate::lock::Lock;
use crate::session::errors::SessionError;
use crate::session::storage::SessionStore;
use crate::session::types::{
    AuthState, AuthenticatedSession, Identity, Login, LoginOptions, Logout, RejectionReason,
    Session, TokenData,
};
use crate::storage::{CacheStore, DataStore, SharedCacheStore, shared_cache_store};
use crate::userdb::{User, UserStore};

use super::cookie::{CookieDescriptor, build_expired_cookie, build_session_cookie, extract_token};
use super::token::{sign_token, verify_token};

const DEFAULT_LOGIN_REDIRECT: &str = "/dashboard";
const LOGOUT_REDIRECT: &str = "/";

/// Session lifecycle controller.
///
/// Holds the config and store handles it was constructed with; there is no
/// process-wide state, so tests and embedders wire their own stores.
pub struct SessionManager {
    config: AuthConfig,
    users: UserStore,
    sessions: SessionStore,
    cache: SharedCacheStore,
}

impl SessionManager {
    pub fn new(config: AuthConfig, data_store: DataStore, cache_store: Box<dyn CacheStore>) -> Self {
        Self {
            users: UserStore::new(data_store.clone()),
            sessions: SessionStore::new(data_store),
            cache: shared_cache_store(cache_store),
            config,
        }
    }

    /// Initialize the underlying stores (tables, cache connectivity).
    pub async fn init(&self) -> Result<(), SessionError> {
        self.users.init().await?;
        self.sessions.init().await?;
        self.cache
            .lock()
            .await
            .init()
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Advisory lock over the shared cache store.
    pub fn lock(&self) -> Lock {
        Lock::new(Arc::clone(&self.cache))
    }

    /// Resolve the authentication state for a request, opportunistically
    /// updating the session's last-seen timestamp.
    pub async fn authenticate(&self, headers: &HeaderMap) -> AuthState {
        self.resolve(headers, true).await
    }

    /// Resolve the authentication state without the last-seen update. Used
    /// by logout, where re-touching a session about to be deleted is wasted
    /// work.
    pub async fn authenticate_without_touch(&self, headers: &HeaderMap) -> AuthState {
        self.resolve(headers, false).await
    }

    async fn resolve(&self, headers: &HeaderMap, touch: bool) -> AuthState {
        let cookie_value = match extract_token(headers, &self.config.cookie_name) {
            Ok(Some(value)) => value,
            Ok(None) => return AuthState::Anonymous,
            Err(e) => {
                tracing::debug!("Unreadable cookie header: {e}");
                return AuthState::Rejected(RejectionReason::InvalidToken);
            }
        };

        self.resolve_cookie(&cookie_value, touch).await
    }

    /// Resolve a bare cookie value. Every failure collapses to `Rejected`;
    /// nothing here tells the caller (or an attacker) why.
    async fn resolve_cookie(&self, cookie_value: &str, touch: bool) -> AuthState {
        let token = match verify_token(&self.config.secret, cookie_value) {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!("Token verification failed: {e}");
                return AuthState::Rejected(RejectionReason::InvalidToken);
            }
        };

        let user = match self.users.get_user(&token.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!("Token references unknown user {}", token.user_id);
                return AuthState::Rejected(RejectionReason::UserNotFound);
            }
            Err(e) => {
                tracing::warn!("User lookup failed during authentication: {e}");
                return AuthState::Rejected(RejectionReason::StoreUnavailable);
            }
        };

        let mut session = match self
            .sessions
            .get_session(&token.session_id, &token.user_id)
            .await
        {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::debug!("Session {} not found", token.session_id);
                return AuthState::Rejected(RejectionReason::SessionNotFound);
            }
            Err(e) => {
                tracing::warn!("Session lookup failed during authentication: {e}");
                return AuthState::Rejected(RejectionReason::StoreUnavailable);
            }
        };

        let now = Utc::now();

        if session.is_expired_at(now) {
            tracing::debug!("Session expired at {}", session.expires_at);
            return AuthState::Rejected(RejectionReason::SessionExpired);
        }

        if touch {
            // Freshness tracking is best-effort; a failed touch never
            // rejects an otherwise valid request.
            match self.sessions.touch_session(&session.id, &user.id, now).await {
                Ok(()) => session.last_seen_at = now,
                Err(e) => {
                    tracing::warn!("Failed to update last_seen_at for session {}: {e}", session.id);
                }
            }
        }

        AuthState::Authenticated(Box::new(AuthenticatedSession {
            user,
            session,
            token,
        }))
    }

    /// Create a session for `user` and describe the cookie and redirect for
    /// it. Store failures propagate; a login must fail visibly rather than
    /// leave the browser and the store disagreeing.
    pub async fn login(&self, user: &User, options: LoginOptions) -> Result<Login, SessionError> {
        let now = Utc::now();
        let expires_at = options
            .expires_at
            .unwrap_or_else(|| now + Duration::seconds(self.config.session_max_age as i64));

        let session = self.sessions.create_session(&user.id, expires_at, now).await?;

        let token = sign_token(
            &self.config.secret,
            &TokenData {
                user_id: user.id.clone(),
                session_id: session.id.clone(),
            },
        )?;

        tracing::debug!("Created session {} for user {}", session.id, user.id);

        Ok(Login {
            cookie: build_session_cookie(&self.config, &token, expires_at),
            redirect_to: options
                .redirect_to
                .unwrap_or_else(|| DEFAULT_LOGIN_REDIRECT.to_string()),
            session,
        })
    }

    /// Log in from an identity-provider tuple: look the user up by
    /// normalized email, creating one on first sight, then run `login`.
    pub async fn login_with_identity(
        &self,
        identity: &Identity,
        options: LoginOptions,
    ) -> Result<Login, SessionError> {
        let user = match self.users.get_user_by_email(&identity.email).await? {
            Some(user) => user,
            None => {
                let user = self.users.create_user(&identity.email, &identity.name).await?;
                tracing::info!("Created user {} on first login", user.id);
                user
            }
        };

        self.login(&user, options).await
    }

    /// Delete the current session and describe the expiring cookie.
    ///
    /// Fails with `InvalidSession` when the request carries no
    /// authenticated session; store failures during the delete propagate.
    pub async fn logout(&self, headers: &HeaderMap) -> Result<Logout, SessionError> {
        let state = self.authenticate_without_touch(headers).await;

        let AuthState::Authenticated(auth) = state else {
            return Err(SessionError::InvalidSession);
        };

        self.sessions
            .delete_session(&auth.session.id, &auth.user.id)
            .await?;

        tracing::debug!("Deleted session {} for user {}", auth.session.id, auth.user.id);

        Ok(Logout {
            cookie: build_expired_cookie(&self.config),
            redirect_to: LOGOUT_REDIRECT.to_string(),
        })
    }

    /// Re-sign a token and rebuild its cookie without touching the store.
    /// Used when session metadata changes without a full re-login.
    pub fn renew_cookie(
        &self,
        session: &Session,
        data: &TokenData,
    ) -> Result<CookieDescriptor, SessionError> {
        let token = sign_token(&self.config.secret, data)?;
        Ok(build_session_cookie(&self.config, &token, session.expires_at))
    }
}
