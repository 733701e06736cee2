use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::json;

use foodshare_db::Database;
use foodshare_types::api::{Claims, IssueSessionRequest};

use crate::error::{ApiError, ApiResult};

pub const SESSION_COOKIE: &str = "session";

/// Sessions are valid for 10 hours from issuance.
const SESSION_TTL_HOURS: i64 = 10;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Issue a session for whatever identity the caller submits. There is
/// no credential check here: the identity provider in front of the
/// frontend is trusted to have verified the email.
pub async fn issue_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<IssueSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let token = issue_token(&state.jwt_secret, &req.email)?;
    let jar = jar.add(session_cookie(token));
    Ok((jar, Json(json!({ "success": true }))))
}

/// Clear the session cookie. Revoking an absent session is not an error.
pub async fn revoke_session(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(clear_cookie());
    (jar, Json(json!({ "success": true })))
}

/// Extract and validate the session JWT from the cookie jar. Absent
/// cookie and bad token are distinct failures: 401 vs 403.
/// Verification uses the same injected secret that issuance signs with.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&jar, &state.jwt_secret)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn authenticate(jar: &CookieJar, secret: &str) -> Result<Claims, ApiError> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(ApiError::Unauthenticated)?;
    verify_token(secret, cookie.value()).map_err(|_| ApiError::Forbidden)
}

pub fn issue_token(secret: &str, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(SESSION_TTL_HOURS)).timestamp()
            as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn session_cookie(value: String) -> Cookie<'static> {
    let production = std::env::var("FOODSHARE_ENV").is_ok_and(|v| v == "production");
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .secure(production)
        .same_site(if production { SameSite::None } else { SameSite::Strict })
        .path("/")
        .build()
}

/// Removal cookie with the same attributes the session was set with.
fn clear_cookie() -> Cookie<'static> {
    session_cookie(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_verifies_with_full_window() {
        let token = issue_token(SECRET, "d@x.com").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, "d@x.com");

        let expected = (chrono::Utc::now() + chrono::Duration::hours(10)).timestamp() as usize;
        // Allow a couple of seconds of slack between issue and assert.
        assert!(claims.exp <= expected && claims.exp >= expected - 5);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = issue_token(SECRET, "d@x.com").unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token(SECRET, &tampered).is_err());

        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Two minutes past expiry clears the default validation leeway.
        let claims = Claims {
            sub: "d@x.com".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::minutes(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verify_token(SECRET, &token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[tokio::test]
    async fn revoke_succeeds_without_a_session() {
        let resp = revoke_session(CookieJar::new()).await.into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("session="));
        assert!(set_cookie.contains("Max-Age=0"));
        assert!(set_cookie.contains("HttpOnly"));

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"success":true}"#);
    }

    #[tokio::test]
    async fn revoke_clears_an_existing_session() {
        let token = issue_token(SECRET, "d@x.com").unwrap();
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            format!("{SESSION_COOKIE}={token}").parse().unwrap(),
        );
        let jar = CookieJar::from_headers(&headers);

        let resp = revoke_session(jar).await.into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("Max-Age=0"));

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"success":true}"#);
    }

    #[test]
    fn authenticate_distinguishes_missing_and_invalid() {
        let empty = CookieJar::new();
        assert!(matches!(
            authenticate(&empty, SECRET),
            Err(ApiError::Unauthenticated)
        ));

        let bad = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not-a-jwt"));
        assert!(matches!(authenticate(&bad, SECRET), Err(ApiError::Forbidden)));

        let token = issue_token(SECRET, "d@x.com").unwrap();
        let good = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        let claims = authenticate(&good, SECRET).unwrap();
        assert_eq!(claims.sub, "d@x.com");
    }
}
