//! Checkout and customer portal endpoints
//!
//! Both return a URL the page opens in a new tab.

use axum::{extract::State, http::HeaderMap, Extension, Json};
use moodtunes_common::Error;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::{current_user, CurrentUser};
use crate::catalog::find_plan;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Plan id or display name ("standard", "Premium", ...)
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub url: String,
}

/// POST /api/billing/checkout
///
/// Public route so a signed-out visitor on the pricing page gets an
/// explanatory message instead of a bare 401.
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<RedirectResponse>> {
    let Some(user) = current_user(&state, &headers).await else {
        return Err(Error::Auth("You need to be signed in to subscribe to a plan.".to_string()).into());
    };

    let plan = find_plan(&request.plan)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown plan: {}", request.plan)))?;

    let url = state
        .session
        .create_checkout_session(&user.identity, plan)
        .await?;

    info!("Checkout for user {} ({} plan) created", user.identity.id, plan.name);
    Ok(Json(RedirectResponse { url }))
}

/// POST /api/billing/portal
pub async fn open_portal(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<RedirectResponse>> {
    let url = state.session.open_customer_portal(&user.identity).await?;
    Ok(Json(RedirectResponse { url }))
}
