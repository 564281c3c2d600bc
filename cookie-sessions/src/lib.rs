//! cookie-sessions - Cookie-based session authentication
//!
//! This crate provides the session half of a web login flow: a signed,
//! stateless token carried in a cookie, backed by server-side session rows
//! with fixed expiry, plus the advisory lock that keeps the periodic
//! session/user cleanup from overlapping itself. OAuth providers, HTML
//! rendering and the HTTP response itself stay outside: callers hand in an
//! identity tuple and get back cookie descriptors and redirect targets.

mod config;
mod lock;
mod maintenance;
mod session;
mod storage;
mod userdb;
mod utils;

pub use config::{AuthConfig, ConfigError, SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};

pub use session::{
    AuthState, AuthenticatedSession, CookieDescriptor, Identity, Login, LoginOptions, Logout,
    RejectionReason, Session, SessionError, SessionManager, SessionStore, TokenData, TokenError,
    build_expired_cookie, build_session_cookie, extract_token, sign_token, verify_token,
};

pub use lock::Lock;
pub use maintenance::{CLEANUP_LOCK_NAME, CleanupOutcome, cleanup_sessions_and_users};

pub use storage::{
    CacheData, CacheStore, DataStore, InMemoryCacheStore, RedisCacheStore, SharedCacheStore,
    StorageError, connect_cache_store, shared_cache_store,
};

pub use userdb::{User, UserError, UserStore};

pub use utils::{UtilError, gen_random_string};
