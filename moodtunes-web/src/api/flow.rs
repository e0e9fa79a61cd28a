//! Flow endpoints
//!
//! All routes here sit behind the session middleware and act on the
//! caller's own flow. Every successful call returns the resulting snapshot.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::auth::CurrentUser;
use crate::catalog::ChatMessage;
use crate::error::{ApiError, ApiResult};
use crate::flow::{FlowDriver, FlowError, FlowSnapshot};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MoodRequest {
    pub mood: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtistRequest {
    pub artist: String,
}

#[derive(Debug, Serialize)]
pub struct FlowResponse {
    #[serde(flatten)]
    pub flow: FlowSnapshot,
    pub chat: Vec<ChatMessage>,
}

async fn respond(flow: &FlowDriver, snapshot: FlowSnapshot) -> Json<FlowResponse> {
    Json(FlowResponse {
        flow: snapshot,
        chat: flow.chat_messages().await,
    })
}

/// Blank moods do not advance the flow and are not reported as errors
async fn ignore_empty_mood(
    flow: &FlowDriver,
    result: Result<FlowSnapshot, FlowError>,
) -> ApiResult<FlowSnapshot> {
    match result {
        Ok(snapshot) => Ok(snapshot),
        Err(FlowError::EmptyMood) => {
            debug!("Ignored blank mood from user {}", flow.user_id());
            Ok(flow.snapshot().await)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/flow
pub async fn get_flow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<FlowResponse> {
    let flow = state.flows.flow_for(&user.token, user.identity.id).await;
    let snapshot = flow.snapshot().await;
    respond(&flow, snapshot).await
}

/// POST /api/flow/mood
pub async fn select_mood(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<MoodRequest>,
) -> ApiResult<Json<FlowResponse>> {
    let flow = state.flows.flow_for(&user.token, user.identity.id).await;
    let result = flow.select_mood(&request.mood).await;
    let snapshot = ignore_empty_mood(&flow, result).await?;
    Ok(respond(&flow, snapshot).await)
}

/// POST /api/chat/mood
pub async fn chat_mood(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<FlowResponse>> {
    let flow = state.flows.flow_for(&user.token, user.identity.id).await;
    let result = flow.chat_mood(&request.message).await;
    let snapshot = ignore_empty_mood(&flow, result).await?;
    Ok(respond(&flow, snapshot).await)
}

/// POST /api/flow/artist
///
/// Only catalog artists are accepted.
pub async fn select_artist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ArtistRequest>,
) -> ApiResult<Json<FlowResponse>> {
    let artist = state
        .artists
        .select(&request.artist)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown artist: {}", request.artist)))?;

    let flow = state.flows.flow_for(&user.token, user.identity.id).await;
    let snapshot = flow.select_artist(artist).await?;
    Ok(respond(&flow, snapshot).await)
}

/// POST /api/flow/back
pub async fn go_back(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<FlowResponse> {
    let flow = state.flows.flow_for(&user.token, user.identity.id).await;
    let snapshot = flow.go_back().await;
    respond(&flow, snapshot).await
}

/// POST /api/flow/reset
pub async fn reset(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<FlowResponse> {
    let flow = state.flows.flow_for(&user.token, user.identity.id).await;
    let snapshot = flow.reset().await;
    respond(&flow, snapshot).await
}

/// POST /api/flow/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<FlowResponse>> {
    let flow = state.flows.flow_for(&user.token, user.identity.id).await;
    let snapshot = flow.refresh().await?;
    Ok(respond(&flow, snapshot).await)
}
