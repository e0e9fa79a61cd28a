//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE implementations for MoodTunes HTTP handlers.

use crate::events::MoodTunesEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Create a simple heartbeat-only SSE stream for connection status monitoring
///
/// Used by pages that have no domain events to follow but still show a
/// connection indicator.
pub fn create_heartbeat_sse_stream(
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} heartbeat stream", service_name);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            tokio::time::sleep(HEARTBEAT_INTERVAL).await;
            debug!("SSE: Sending heartbeat");
            yield Ok(Event::default().comment("heartbeat"));
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}

/// Create an SSE stream of one user's events
///
/// Forwards every event from `rx` whose `user_id` matches, serialized as
/// JSON with the event name set to the event type. Lagging receivers skip
/// the dropped events and keep going; the stream ends when the bus closes.
pub fn create_user_event_stream(
    user_id: Uuid,
    mut rx: broadcast::Receiver<MoodTunesEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected for user {}", user_id);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) if event.user_id() == user_id => {
                    match serde_json::to_string(&event) {
                        Ok(json) => yield Ok(Event::default().event(event.event_type()).data(json)),
                        Err(e) => warn!("SSE: failed to serialize {}: {}", event.event_type(), e),
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("SSE: client for user {} lagged, skipped {} events", user_id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("SSE: event bus closed, ending stream for user {}", user_id);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
