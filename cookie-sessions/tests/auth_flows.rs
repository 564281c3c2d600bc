//! End-to-end session lifecycle flows against an in-memory SQLite store and
//! the in-memory cache.

use chrono::{Duration, Utc};
use http::HeaderMap;
use http::header::COOKIE;

use cookie_sessions::{
    AuthConfig, AuthState, DataStore, Identity, InMemoryCacheStore, LoginOptions, SessionError,
    SessionManager, cleanup_sessions_and_users,
};

async fn test_manager() -> (SessionManager, DataStore) {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("sqlite memory pool");
    let data_store = DataStore::Sqlite(pool);

    let config = AuthConfig {
        secret: b"integration-test-secret".to_vec(),
        cookie_name: "test-session".to_string(),
        session_max_age: 3600,
        host: "app.example.com".to_string(),
        is_local: true,
    };

    let manager = SessionManager::new(
        config,
        data_store.clone(),
        Box::new(InMemoryCacheStore::new()),
    );
    manager.init().await.expect("init");

    (manager, data_store)
}

fn headers_with_cookie(manager: &SessionManager, token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        format!("{}={}", manager.config().cookie_name, token)
            .parse()
            .expect("header value"),
    );
    headers
}

#[tokio::test]
async fn login_then_authenticate_resolves_to_the_same_user() {
    let (manager, _) = test_manager().await;
    let user = manager
        .users()
        .create_user("flow@example.com", "Flow")
        .await
        .expect("create user");

    // Given a login and the cookie it issued
    let login = manager
        .login(&user, LoginOptions::default())
        .await
        .expect("login");
    let headers = headers_with_cookie(&manager, &login.cookie.value);

    // When the next request carries that cookie
    let state = manager.authenticate(&headers).await;

    // Then it authenticates as the same user against a real session row
    let auth = state.into_authenticated().expect("should be authenticated");
    assert_eq!(auth.user.id, user.id);
    assert_eq!(auth.session.id, login.session.id);
    assert_eq!(auth.token.user_id, user.id);

    let row = manager
        .sessions()
        .get_session(&login.session.id, &user.id)
        .await
        .expect("get session");
    assert!(row.is_some());
}

#[tokio::test]
async fn login_with_identity_creates_user_once() {
    let (manager, _) = test_manager().await;
    let identity = Identity {
        email: " New.Person@Example.COM ".to_string(),
        name: "New Person".to_string(),
    };

    // First identity login creates the user with a normalized email
    let first = manager
        .login_with_identity(&identity, LoginOptions::default())
        .await
        .expect("first login");
    let user = manager
        .users()
        .get_user_by_email("new.person@example.com")
        .await
        .expect("lookup")
        .expect("user exists");

    // A second login with equivalent spelling reuses the same user
    let second = manager
        .login_with_identity(
            &Identity {
                email: "new.person@example.com".to_string(),
                name: "Ignored On Reuse".to_string(),
            },
            LoginOptions {
                redirect_to: Some("/dashboard/files".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("second login");

    assert_eq!(first.session.user_id, user.id);
    assert_eq!(second.session.user_id, user.id);
    assert_eq!(second.redirect_to, "/dashboard/files");
    assert_ne!(first.session.id, second.session.id);
}

#[tokio::test]
async fn logout_deletes_the_session_and_expires_the_cookie() {
    let (manager, _) = test_manager().await;
    let user = manager
        .users()
        .create_user("leaver@example.com", "Leaver")
        .await
        .expect("create user");
    let login = manager
        .login(&user, LoginOptions::default())
        .await
        .expect("login");
    let headers = headers_with_cookie(&manager, &login.cookie.value);

    // When logging out
    let logout = manager.logout(&headers).await.expect("logout");

    // Then the response cookie is the expiring one
    assert_eq!(logout.redirect_to, "/");
    assert_eq!(logout.cookie.value, "");
    assert!(logout.cookie.expires_at < Utc::now());

    // And the old cookie no longer authenticates
    let state = manager.authenticate(&headers).await;
    assert!(!state.is_authenticated());

    let row = manager
        .sessions()
        .get_session(&login.session.id, &user.id)
        .await
        .expect("get session");
    assert!(row.is_none());
}

#[tokio::test]
async fn logout_twice_fails_with_invalid_session() {
    let (manager, _) = test_manager().await;
    let user = manager
        .users()
        .create_user("twice@example.com", "Twice")
        .await
        .expect("create user");
    let login = manager
        .login(&user, LoginOptions::default())
        .await
        .expect("login");
    let headers = headers_with_cookie(&manager, &login.cookie.value);

    manager.logout(&headers).await.expect("first logout");

    let result = manager.logout(&headers).await;
    assert!(matches!(result, Err(SessionError::InvalidSession)));
}

#[tokio::test]
async fn authenticate_touches_last_seen() {
    let (manager, _) = test_manager().await;
    let user = manager
        .users()
        .create_user("seen@example.com", "Seen")
        .await
        .expect("create user");

    // Given a session whose last_seen_at is well in the past
    let stale = Utc::now() - Duration::hours(2);
    let session = manager
        .sessions()
        .create_session(&user.id, Utc::now() + Duration::days(30), stale)
        .await
        .expect("create session");
    let token = cookie_sessions::sign_token(
        &manager.config().secret,
        &cookie_sessions::TokenData {
            user_id: user.id.clone(),
            session_id: session.id.clone(),
        },
    )
    .expect("sign");
    let headers = headers_with_cookie(&manager, &token);

    // When authenticating
    let state = manager.authenticate(&headers).await;
    assert!(state.is_authenticated());

    // Then the stored row's last_seen_at moved forward
    let row = manager
        .sessions()
        .get_session(&session.id, &user.id)
        .await
        .expect("get session")
        .expect("session exists");
    assert!(row.last_seen_at > stale);
}

#[tokio::test]
async fn concurrent_touches_do_not_corrupt_the_row() {
    let (manager, _) = test_manager().await;
    let user = manager
        .users()
        .create_user("racer@example.com", "Racer")
        .await
        .expect("create user");
    let login = manager
        .login(&user, LoginOptions::default())
        .await
        .expect("login");
    let headers_a = headers_with_cookie(&manager, &login.cookie.value);
    let headers_b = headers_with_cookie(&manager, &login.cookie.value);

    // Two requests from the same browser race their touches
    let (state_a, state_b) = tokio::join!(
        manager.authenticate(&headers_a),
        manager.authenticate(&headers_b),
    );

    // Both authenticate; last writer wins on last_seen_at
    assert!(state_a.is_authenticated());
    assert!(state_b.is_authenticated());

    let row = manager
        .sessions()
        .get_session(&login.session.id, &user.id)
        .await
        .expect("get session")
        .expect("session exists");
    assert_eq!(row.user_id, user.id);
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_logged_out() {
    let (manager, _) = test_manager().await;
    let user = manager
        .users()
        .create_user("victim@example.com", "Victim")
        .await
        .expect("create user");
    let login = manager
        .login(&user, LoginOptions::default())
        .await
        .expect("login");

    // Flip a character in the payload segment of the issued token
    let mut parts: Vec<String> = login.cookie.value.split('.').map(String::from).collect();
    let flipped = if parts[1].starts_with('A') { "B" } else { "A" };
    parts[1].replace_range(0..1, flipped);
    let headers = headers_with_cookie(&manager, &parts.join("."));

    let state = manager.authenticate(&headers).await;

    assert!(!state.is_authenticated());
    assert!(state.user().is_none());
}

#[tokio::test]
async fn cleanup_sweeps_day_old_sessions_and_users() {
    let (manager, data_store) = test_manager().await;
    let user = manager
        .users()
        .create_user("ephemeral@example.com", "Ephemeral")
        .await
        .expect("create user");
    let session = manager
        .sessions()
        .create_session(&user.id, Utc::now() + Duration::days(30), Utc::now())
        .await
        .expect("create session");

    // Backdate both rows past the one-day retention window
    let two_days_ago = Utc::now() - Duration::days(2);
    let pool = data_store.as_sqlite().expect("sqlite pool");
    sqlx::query("UPDATE user_sessions SET created_at = ? WHERE id = ?")
        .bind(two_days_ago)
        .bind(&session.id)
        .execute(pool)
        .await
        .expect("backdate session");
    sqlx::query("UPDATE users SET created_at = ? WHERE id = ?")
        .bind(two_days_ago)
        .bind(&user.id)
        .execute(pool)
        .await
        .expect("backdate user");

    // When the cleanup job runs
    let outcome = cleanup_sessions_and_users(&manager).await.expect("cleanup");

    // Then both rows are gone, users included
    assert!(!outcome.skipped);
    assert_eq!(outcome.sessions_deleted, 1);
    assert_eq!(outcome.users_deleted, 1);
    assert!(
        manager
            .users()
            .get_user(&user.id)
            .await
            .expect("get user")
            .is_none()
    );

    // And the stale cookie from the deleted account is simply anonymous
    let token = cookie_sessions::sign_token(
        &manager.config().secret,
        &cookie_sessions::TokenData {
            user_id: user.id.clone(),
            session_id: session.id.clone(),
        },
    )
    .expect("sign");
    let headers = headers_with_cookie(&manager, &token);
    let state = manager.authenticate(&headers).await;
    assert!(!state.is_authenticated());

    // A rerun finds nothing left to do
    let outcome = cleanup_sessions_and_users(&manager).await.expect("cleanup");
    assert_eq!(outcome.sessions_deleted, 0);
    assert_eq!(outcome.users_deleted, 0);
}

#[tokio::test]
async fn authenticated_state_carries_renewable_token() {
    let (manager, _) = test_manager().await;
    let user = manager
        .users()
        .create_user("renewer@example.com", "Renewer")
        .await
        .expect("create user");
    let login = manager
        .login(&user, LoginOptions::default())
        .await
        .expect("login");
    let headers = headers_with_cookie(&manager, &login.cookie.value);

    let auth = manager
        .authenticate(&headers)
        .await
        .into_authenticated()
        .expect("authenticated");

    // Renewing from the resolved state yields a cookie that authenticates
    let cookie = manager
        .renew_cookie(&auth.session, &auth.token)
        .expect("renew");
    let headers = headers_with_cookie(&manager, &cookie.value);
    let state = manager.authenticate(&headers).await;

    assert_eq!(state.user().map(|u| u.id.as_str()), Some(user.id.as_str()));
}
