//! Cookie binding
//!
//! These functions only ever *describe* cookies; attaching a descriptor to
//! an HTTP response stays at the caller's boundary.

use chrono::{DateTime, Duration, Utc};
use http::HeaderMap;
use http::header::{COOKIE, SET_COOKIE};

use crate::config::AuthConfig;
use crate::session::errors::SessionError;

/// Value form of a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDescriptor {
    pub name: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
}

impl CookieDescriptor {
    /// Render the `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; Domain={}; Path={}; Expires={}; SameSite={}",
            self.name,
            self.value,
            self.domain,
            self.path,
            self.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.same_site,
        );

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }

        cookie
    }

    /// Convenience for callers that hold a `HeaderMap`: append this
    /// descriptor as a `Set-Cookie` header.
    pub fn append_to(&self, headers: &mut HeaderMap) -> Result<(), SessionError> {
        let value = self
            .to_header_value()
            .parse()
            .map_err(|_| SessionError::Cookie("Failed to parse cookie header".to_string()))?;
        headers.append(SET_COOKIE, value);
        Ok(())
    }
}

/// Describe the session cookie carrying `token`.
///
/// `HttpOnly` and `SameSite=Lax` always; `Secure` everywhere except local
/// runs, where the domain also collapses to `localhost`.
pub fn build_session_cookie(
    config: &AuthConfig,
    token: &str,
    expires_at: DateTime<Utc>,
) -> CookieDescriptor {
    CookieDescriptor {
        name: config.cookie_name.clone(),
        value: token.to_string(),
        expires_at,
        domain: config.cookie_domain().to_string(),
        path: "/".to_string(),
        secure: !config.is_local,
        http_only: true,
        same_site: "Lax".to_string(),
    }
}

/// Describe an empty cookie with an expiry one day in the past, forcing the
/// browser to delete it. The value is irrelevant once expired.
pub fn build_expired_cookie(config: &AuthConfig) -> CookieDescriptor {
    build_session_cookie(config, "", Utc::now() - Duration::days(1))
}

/// Read the named session cookie out of a request's headers.
pub fn extract_token(
    headers: &HeaderMap,
    cookie_name: &str,
) -> Result<Option<String>, SessionError> {
    let Some(cookie_header) = headers.get(COOKIE) else {
        tracing::debug!("No cookie header found");
        return Ok(None);
    };

    let cookie_str = cookie_header.to_str().map_err(|e| {
        tracing::debug!("Invalid cookie header: {}", e);
        SessionError::Header("Invalid cookie header".to_string())
    })?;

    let token = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == cookie_name => Some(v.to_string()),
            _ => None,
        }
    });

    if token.is_none() {
        tracing::debug!("No session cookie '{}' found in cookies", cookie_name);
    }

    Ok(token)
}
