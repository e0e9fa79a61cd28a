//! Async driver for one user's flow
//!
//! Wraps a [`FlowController`] and runs the lookups it requests on the tokio
//! runtime. A superseded lookup runs to completion and its result is dropped
//! by the controller's sequence check; only dropping the driver aborts one.

use chrono::Utc;
use moodtunes_common::{ArtistSelection, EventBus, FlowStep, MoodTunesEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::controller::{FlowController, FlowError, FlowSnapshot, LookupTicket};
use crate::catalog::{ChatMessage, ChatTranscript};
use crate::services::SongLookup;

pub struct FlowDriver {
    user_id: Uuid,
    controller: Arc<Mutex<FlowController>>,
    chat: Mutex<ChatTranscript>,
    lookup: Arc<dyn SongLookup>,
    events: Arc<EventBus>,
    /// Most recently spawned lookup task
    in_flight: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl FlowDriver {
    pub fn new(user_id: Uuid, lookup: Arc<dyn SongLookup>, events: Arc<EventBus>) -> Self {
        Self {
            user_id,
            controller: Arc::new(Mutex::new(FlowController::new())),
            chat: Mutex::new(ChatTranscript::new()),
            lookup,
            events,
            in_flight: std::sync::Mutex::new(None),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        self.controller.lock().await.snapshot()
    }

    pub async fn chat_messages(&self) -> Vec<ChatMessage> {
        self.chat.lock().await.messages().to_vec()
    }

    fn step_changed(&self, old_step: FlowStep, new_step: FlowStep) {
        if old_step != new_step {
            self.events.emit_lossy(MoodTunesEvent::FlowStepChanged {
                user_id: self.user_id,
                old_step,
                new_step,
                timestamp: Utc::now(),
            });
        }
    }

    pub async fn select_mood(&self, label: &str) -> Result<FlowSnapshot, FlowError> {
        let mut controller = self.controller.lock().await;
        let mood = controller.select_mood(label)?.clone();

        info!("User {} selected mood '{}'", self.user_id, mood);
        self.events.emit_lossy(MoodTunesEvent::MoodSelected {
            user_id: self.user_id,
            mood: mood.to_string(),
            timestamp: Utc::now(),
        });
        self.step_changed(FlowStep::Mood, FlowStep::Artist);

        Ok(controller.snapshot())
    }

    /// Submit a mood through the conversational input
    ///
    /// The reply is only recorded when the flow is waiting for a mood.
    pub async fn chat_mood(&self, text: &str) -> Result<FlowSnapshot, FlowError> {
        {
            let controller = self.controller.lock().await;
            if controller.step() != FlowStep::Mood {
                return Err(FlowError::StepOutOfOrder {
                    action: "select a mood",
                    expected: FlowStep::Mood,
                    actual: controller.step(),
                });
            }
        }

        let mood = self
            .chat
            .lock()
            .await
            .submit(text)
            .ok_or(FlowError::EmptyMood)?;

        self.select_mood(mood.as_str()).await
    }

    pub async fn select_artist(&self, artist: ArtistSelection) -> Result<FlowSnapshot, FlowError> {
        let mut controller = self.controller.lock().await;
        let ticket = controller.select_artist(artist)?;

        info!(
            "User {} selected artist '{}' ({})",
            self.user_id, ticket.artist.name, ticket.artist.group
        );
        self.events.emit_lossy(MoodTunesEvent::ArtistSelected {
            user_id: self.user_id,
            artist: ticket.artist.name.clone(),
            timestamp: Utc::now(),
        });
        self.step_changed(FlowStep::Artist, FlowStep::Songs);

        let snapshot = controller.snapshot();
        drop(controller);

        self.spawn_lookup(ticket);
        Ok(snapshot)
    }

    pub async fn go_back(&self) -> FlowSnapshot {
        let mut controller = self.controller.lock().await;
        let old_step = controller.step();
        let new_step = controller.go_back();

        if new_step == FlowStep::Mood && old_step != FlowStep::Mood {
            *self.chat.lock().await = ChatTranscript::new();
        }
        debug!("User {} went back: {} -> {}", self.user_id, old_step, new_step);
        self.step_changed(old_step, new_step);

        controller.snapshot()
    }

    pub async fn reset(&self) -> FlowSnapshot {
        let mut controller = self.controller.lock().await;
        let old_step = controller.step();
        controller.reset();
        *self.chat.lock().await = ChatTranscript::new();

        debug!("User {} reset flow from {}", self.user_id, old_step);
        self.step_changed(old_step, FlowStep::Mood);

        controller.snapshot()
    }

    /// New lookup for the same (mood, artist)
    pub async fn refresh(&self) -> Result<FlowSnapshot, FlowError> {
        let mut controller = self.controller.lock().await;
        let ticket = controller.refresh()?;
        let snapshot = controller.snapshot();
        drop(controller);

        info!("User {} refreshed songs (lookup #{})", self.user_id, ticket.seq);
        self.spawn_lookup(ticket);
        Ok(snapshot)
    }

    fn spawn_lookup(&self, ticket: LookupTicket) {
        self.events.emit_lossy(MoodTunesEvent::LookupStarted {
            user_id: self.user_id,
            seq: ticket.seq,
            mood: ticket.mood.to_string(),
            artist: ticket.artist.name.clone(),
            timestamp: Utc::now(),
        });

        let user_id = self.user_id;
        let controller = Arc::clone(&self.controller);
        let lookup = Arc::clone(&self.lookup);
        let events = Arc::clone(&self.events);

        let handle = tokio::spawn(async move {
            let result = lookup
                .search(&ticket.mood, &ticket.artist)
                .await
                .map_err(|e| e.to_string());

            let failure = result.as_ref().err().cloned();
            let result_count = result.as_ref().map(|o| o.songs().len()).unwrap_or(0);
            let applied = controller.lock().await.complete_lookup(ticket.seq, result);

            let event = match (applied, failure) {
                (false, _) => {
                    debug!("Discarded stale lookup #{} for user {}", ticket.seq, user_id);
                    MoodTunesEvent::LookupDiscarded {
                        user_id,
                        seq: ticket.seq,
                        timestamp: Utc::now(),
                    }
                }
                (true, Some(message)) => {
                    warn!("Lookup #{} for user {} failed: {}", ticket.seq, user_id, message);
                    MoodTunesEvent::LookupFailed {
                        user_id,
                        seq: ticket.seq,
                        message,
                        timestamp: Utc::now(),
                    }
                }
                (true, None) => {
                    debug!(
                        "Lookup #{} for user {} returned {} results",
                        ticket.seq, user_id, result_count
                    );
                    MoodTunesEvent::LookupCompleted {
                        user_id,
                        seq: ticket.seq,
                        result_count,
                        timestamp: Utc::now(),
                    }
                }
            };
            events.emit_lossy(event);
        });

        if let Ok(mut in_flight) = self.in_flight.lock() {
            *in_flight = Some(handle);
        }
    }
}

impl Drop for FlowDriver {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            if let Some(handle) = in_flight.take() {
                handle.abort();
            }
        }
    }
}
