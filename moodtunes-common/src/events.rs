//! Event types for the MoodTunes event system
//!
//! Provides shared event definitions and the EventBus used to fan flow and
//! session changes out to SSE clients.

use crate::models::{Entitlement, FlowStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// MoodTunes event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// Every event names the user it concerns so a per-user stream can filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MoodTunesEvent {
    /// User submitted a mood and moved on to artist selection
    MoodSelected {
        user_id: Uuid,
        mood: String,
        timestamp: DateTime<Utc>,
    },

    /// User picked an artist; a lookup follows
    ArtistSelected {
        user_id: Uuid,
        artist: String,
        timestamp: DateTime<Utc>,
    },

    /// Flow moved between steps (forward, back or reset)
    FlowStepChanged {
        user_id: Uuid,
        old_step: FlowStep,
        new_step: FlowStep,
        timestamp: DateTime<Utc>,
    },

    /// Song lookup issued
    LookupStarted {
        user_id: Uuid,
        seq: u64,
        mood: String,
        artist: String,
        timestamp: DateTime<Utc>,
    },

    /// Song lookup finished and its results were applied
    ///
    /// `result_count` is 0 for a "no results" outcome.
    LookupCompleted {
        user_id: Uuid,
        seq: u64,
        result_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Song lookup finished after a newer one superseded it; results dropped
    LookupDiscarded {
        user_id: Uuid,
        seq: u64,
        timestamp: DateTime<Utc>,
    },

    /// Song lookup failed; the message is shown in place of results
    LookupFailed {
        user_id: Uuid,
        seq: u64,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// User signed in or out
    SessionChanged {
        user_id: Uuid,
        signed_in: bool,
        timestamp: DateTime<Utc>,
    },

    /// Subscription status re-checked
    EntitlementChanged {
        user_id: Uuid,
        entitlement: Entitlement,
        timestamp: DateTime<Utc>,
    },
}

impl MoodTunesEvent {
    /// User this event concerns
    pub fn user_id(&self) -> Uuid {
        match self {
            MoodTunesEvent::MoodSelected { user_id, .. }
            | MoodTunesEvent::ArtistSelected { user_id, .. }
            | MoodTunesEvent::FlowStepChanged { user_id, .. }
            | MoodTunesEvent::LookupStarted { user_id, .. }
            | MoodTunesEvent::LookupCompleted { user_id, .. }
            | MoodTunesEvent::LookupDiscarded { user_id, .. }
            | MoodTunesEvent::LookupFailed { user_id, .. }
            | MoodTunesEvent::SessionChanged { user_id, .. }
            | MoodTunesEvent::EntitlementChanged { user_id, .. } => *user_id,
        }
    }

    /// SSE event name (matches the serde tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            MoodTunesEvent::MoodSelected { .. } => "MoodSelected",
            MoodTunesEvent::ArtistSelected { .. } => "ArtistSelected",
            MoodTunesEvent::FlowStepChanged { .. } => "FlowStepChanged",
            MoodTunesEvent::LookupStarted { .. } => "LookupStarted",
            MoodTunesEvent::LookupCompleted { .. } => "LookupCompleted",
            MoodTunesEvent::LookupDiscarded { .. } => "LookupDiscarded",
            MoodTunesEvent::LookupFailed { .. } => "LookupFailed",
            MoodTunesEvent::SessionChanged { .. } => "SessionChanged",
            MoodTunesEvent::EntitlementChanged { .. } => "EntitlementChanged",
        }
    }
}

/// Central event distribution bus
///
/// Thin wrapper over a tokio broadcast channel. Slow subscribers lose the
/// oldest events once `capacity` is exceeded.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<MoodTunesEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use moodtunes_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MoodTunesEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MoodTunesEvent,
    ) -> Result<usize, broadcast::error::SendError<MoodTunesEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Flow events are informational: nobody listening is the normal case
    /// when the page has no open SSE connection.
    pub fn emit_lossy(&self, event: MoodTunesEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_started(user_id: Uuid, seq: u64) -> MoodTunesEvent {
        MoodTunesEvent::LookupStarted {
            user_id,
            seq,
            mood: "Happy".to_string(),
            artist: "A.R. Rahman".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let user_id = Uuid::new_v4();
        let json = serde_json::to_value(lookup_started(user_id, 7)).unwrap();

        assert_eq!(json["type"], "LookupStarted");
        assert_eq!(json["seq"], 7);
        assert_eq!(json["user_id"], user_id.to_string());
    }

    #[test]
    fn test_event_type_matches_serde_tag() {
        let event = MoodTunesEvent::FlowStepChanged {
            user_id: Uuid::new_v4(),
            old_step: FlowStep::Songs,
            new_step: FlowStep::Artist,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert_eq!(json["new_step"], "artist");
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let user_id = Uuid::new_v4();

        let delivered = bus.emit(lookup_started(user_id, 1)).unwrap();
        assert_eq!(delivered, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.user_id(), user_id);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.emit(lookup_started(Uuid::new_v4(), 1)).is_err());

        // Lossy emit never fails
        bus.emit_lossy(lookup_started(Uuid::new_v4(), 2));
    }
}
