//! Page routes
//!
//! Serves the embedded HTML pages and static assets. Pages are thin shells;
//! `app.js` drives them through the JSON API.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use moodtunes_common::config::ProductVariant;
use std::time::Duration;
use tracing::debug;

use super::auth::current_user;
use crate::AppState;

const INDEX_GUIDED_HTML: &str = include_str!("../../ui/index_guided.html");
const INDEX_CLASSIC_HTML: &str = include_str!("../../ui/index_classic.html");
const WELCOME_HTML: &str = include_str!("../../ui/welcome.html");
const AUTH_HTML: &str = include_str!("../../ui/auth.html");
const PRICING_HTML: &str = include_str!("../../ui/pricing.html");
const SUBSCRIPTION_SUCCESS_HTML: &str = include_str!("../../ui/subscription_success.html");
const NOT_FOUND_HTML: &str = include_str!("../../ui/not_found.html");
const APP_JS: &str = include_str!("../../ui/app.js");
const MOODTUNES_CSS: &str = include_str!("../../ui/moodtunes.css");

/// Delay before re-checking entitlement after a checkout redirect
pub const ENTITLEMENT_RECHECK_DELAY: Duration = Duration::from_secs(2);

/// GET /
///
/// Guided: the flow page, or a redirect to `/auth` without a session.
/// Every page load starts the session's flow over at the mood step.
/// Classic: the open recommendations page.
pub async fn serve_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.config.variant {
        ProductVariant::Classic => Html(INDEX_CLASSIC_HTML).into_response(),
        ProductVariant::Guided => match current_user(&state, &headers).await {
            Some(user) => {
                if state.flows.remove(&user.token).await {
                    debug!("Discarded previous flow for user {}", user.identity.id);
                }
                Html(INDEX_GUIDED_HTML).into_response()
            }
            None => Redirect::to("/auth").into_response(),
        },
    }
}

/// GET /welcome
pub async fn serve_welcome() -> Html<&'static str> {
    Html(WELCOME_HTML)
}

/// GET /auth
///
/// Already signed-in visitors go straight to the flow.
pub async fn serve_auth(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if current_user(&state, &headers).await.is_some() {
        Redirect::to("/").into_response()
    } else {
        Html(AUTH_HTML).into_response()
    }
}

/// GET /pricing
pub async fn serve_pricing() -> Html<&'static str> {
    Html(PRICING_HTML)
}

/// GET /subscription-success
///
/// Schedules an entitlement re-check so the user menu picks up the new tier
/// once the billing backend has processed the payment.
pub async fn serve_subscription_success(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Html<&'static str> {
    if let Some(user) = current_user(&state, &headers).await {
        let session = state.session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ENTITLEMENT_RECHECK_DELAY).await;
            debug!("Re-checking entitlement for {}", user.identity.id);
            session.refresh_entitlement(&user.identity).await;
        });
    }
    Html(SUBSCRIPTION_SUCCESS_HTML)
}

/// Catch-all for unknown paths
pub async fn serve_not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_HTML)).into_response()
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// GET /static/moodtunes.css
pub async fn serve_moodtunes_css() -> Response {
    (StatusCode::OK, [("content-type", "text/css")], MOODTUNES_CSS).into_response()
}
