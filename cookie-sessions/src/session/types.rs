use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::session::main::CookieDescriptor;
use crate::userdb::User;

/// Server-side session record granting continued access until `expires_at`.
///
/// Expiry is fixed at creation and checked lazily at read time; a row past
/// `expires_at` authenticates nothing even while it still exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Claims carried by the signed token: just enough to locate the session.
/// No expiry is embedded; revocation works by deleting the session row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenData {
    pub user_id: String,
    pub session_id: String,
}

/// Identity tuple produced by an external OAuth exchange (Google, GitHub).
/// The provider protocol itself is not this crate's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub name: String,
}

/// Why an authentication check was refused.
///
/// Never surfaced to the end user; callers treat every rejection the same as
/// [`AuthState::Anonymous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Malformed structure, bad signature, or unsupported algorithm
    InvalidToken,
    /// Token references a user that no longer exists (stale cookie)
    UserNotFound,
    SessionNotFound,
    SessionExpired,
    /// The relational store failed mid-check
    StoreUnavailable,
}

/// A fully verified request identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub user: User,
    pub session: Session,
    pub token: TokenData,
}

/// Outcome of resolving a request's cookie.
///
/// There is no partial-trust state: any verification failure lands in
/// `Rejected`, and `Rejected` grants exactly what `Anonymous` grants.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// No session cookie on the request
    Anonymous,
    /// A cookie was present but did not verify
    Rejected(RejectionReason),
    Authenticated(Box<AuthenticatedSession>),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(auth) => Some(&auth.user),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(auth) => Some(&auth.session),
            _ => None,
        }
    }

    pub fn into_authenticated(self) -> Option<AuthenticatedSession> {
        match self {
            Self::Authenticated(auth) => Some(*auth),
            _ => None,
        }
    }
}

/// Caller-supplied login knobs; both default per the original flow.
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    /// Where to send the browser after login; defaults to `/dashboard`
    pub redirect_to: Option<String>,
    /// Session expiry override; defaults to now + the configured max age
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a successful login: the cookie to set and where to redirect.
/// Applying these to an HTTP response is the caller's concern.
#[derive(Debug, Clone)]
pub struct Login {
    pub cookie: CookieDescriptor,
    pub redirect_to: String,
    pub session: Session,
}

/// Result of a successful logout.
#[derive(Debug, Clone)]
pub struct Logout {
    pub cookie: CookieDescriptor,
    pub redirect_to: String,
}
