//! Session cookie handling and auth endpoints
//!
//! The browser holds an opaque session token in an HttpOnly cookie. Protected
//! routes run behind [`require_session`], which resolves the token through
//! the [`SessionContext`](crate::session::SessionContext) and attaches the
//! caller as a [`CurrentUser`] extension.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use moodtunes_common::{Entitlement, Identity};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::services::SessionToken;
use crate::AppState;

/// Caller of a protected route
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: SessionToken,
    pub identity: Identity,
}

/// Extract the session token from the `Cookie` header
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| SessionToken::from(value))
}

/// Resolve the signed-in user, if any
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = session_token(headers, &state.config.session.cookie_name)?;
    let identity = state.session.current_user(&token).await?;
    Some(CurrentUser { token, identity })
}

fn session_cookie(name: &str, token: &SessionToken) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, token.as_str())
}

fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

fn set_cookie(response: &mut Response, cookie: String) -> ApiResult<()> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie header: {}", e)))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(())
}

/// Session middleware for protected routes
///
/// Returns 401 when the cookie is missing or the session has ended.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = current_user(&state, request.headers()).await else {
        debug!("Rejected {} {}: no session", request.method(), request.uri().path());
        return Err(ApiError::not_signed_in());
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// ============================================================================
// Endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<Identity>,
    pub entitlement: Option<Entitlement>,
    pub variant: String,
}

/// POST /api/auth/sign-up
///
/// Registers the account without opening a session.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = state
        .session
        .sign_up(&request.email, &request.password, request.display_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            message: "Please check your email to verify your account.",
        }),
    ))
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Response> {
    let (token, user) = state
        .session
        .sign_in(&request.email, &request.password)
        .await?;

    let mut response = Json(AuthResponse {
        user,
        message: "You have been signed in successfully.",
    })
    .into_response();
    set_cookie(
        &mut response,
        session_cookie(&state.config.session.cookie_name, &token),
    )?;

    Ok(response)
}

/// POST /api/auth/sign-out
///
/// Always clears the cookie, even when the session had already ended.
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let cookie_name = &state.config.session.cookie_name;
    if let Some(token) = session_token(&headers, cookie_name) {
        state.session.sign_out(&token).await;
    }

    let mut response = Json(json!({
        "message": "You have been signed out successfully."
    }))
    .into_response();
    set_cookie(&mut response, expired_cookie(cookie_name))?;

    Ok(response)
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    let variant = state.config.variant.to_string();

    match current_user(&state, &headers).await {
        Some(CurrentUser { identity, .. }) => {
            let entitlement = state.session.entitlement(&identity).await;
            Json(SessionResponse {
                user: Some(identity),
                entitlement: Some(entitlement),
                variant,
            })
        }
        None => Json(SessionResponse {
            user: None,
            entitlement: None,
            variant,
        }),
    }
}

/// GET /api/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Entitlement> {
    Json(state.session.entitlement(&user.identity).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_token_from_cookie_header() {
        let token = session_token(&headers("theme=dark; mt_session=abc123; lang=en"), "mt_session");
        assert_eq!(token.unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_session_token_missing_or_empty() {
        assert!(session_token(&HeaderMap::new(), "mt_session").is_none());
        assert!(session_token(&headers("mt_session="), "mt_session").is_none());
        assert!(session_token(&headers("other=abc"), "mt_session").is_none());
    }

    #[test]
    fn test_cookie_formats() {
        let token = SessionToken::from("abc");
        assert_eq!(
            session_cookie("mt_session", &token),
            "mt_session=abc; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(expired_cookie("mt_session").ends_with("Max-Age=0"));
    }
}
