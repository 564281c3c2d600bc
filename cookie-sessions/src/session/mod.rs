mod errors;
mod main;
mod storage;
mod types;

pub use errors::SessionError;
pub use main::{
    CookieDescriptor, SessionManager, TokenError, build_expired_cookie, build_session_cookie,
    extract_token, sign_token, verify_token,
};
pub use storage::SessionStore;
pub use types::{
    AuthState, AuthenticatedSession, Identity, Login, LoginOptions, Logout, RejectionReason,
    Session, TokenData,
};
