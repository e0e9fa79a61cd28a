//! Server-Sent Events
//!
//! `/api/events` streams the signed-in user's flow and session events; the
//! page uses `LookupCompleted` to know when to re-fetch its flow.
//! `/api/events/status` is a heartbeat-only stream for pages without a
//! session (connection indicator).

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Extension,
};
use futures::stream::Stream;
use std::convert::Infallible;

use super::auth::CurrentUser;
use crate::AppState;

/// GET /api/events
pub async fn event_stream(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    moodtunes_common::sse::create_user_event_stream(user.identity.id, state.events.subscribe())
}

/// GET /api/events/status
pub async fn status_stream() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    moodtunes_common::sse::create_heartbeat_sse_stream("moodtunes-web")
}
