//! Mood capture
//!
//! Turns free text or a preset button into a [`MoodSelection`]. Both paths
//! end up in the flow controller's `select_mood`; blank input never does.

use chrono::{DateTime, Utc};
use moodtunes_common::config::ProductVariant;
use moodtunes_common::MoodSelection;
use serde::Serialize;
use uuid::Uuid;

/// Preset moods offered by the guided (mood -> artist -> songs) variant
pub const GUIDED_PRESETS: [&str; 6] = ["Happy", "Sad", "Romantic", "Party", "Chill", "Workout"];

/// Preset moods offered by the classic (curated recommendations) variant
pub const CLASSIC_PRESETS: [&str; 8] = [
    "Happy",
    "Sad",
    "Energetic",
    "Calm",
    "Romantic",
    "Nostalgic",
    "Motivated",
    "Relaxed",
];

/// Mood input for one product variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodCapture {
    variant: ProductVariant,
}

impl MoodCapture {
    pub fn new(variant: ProductVariant) -> Self {
        Self { variant }
    }

    /// Suggestion buttons for this variant
    pub fn presets(&self) -> &'static [&'static str] {
        match self.variant {
            ProductVariant::Guided => &GUIDED_PRESETS,
            ProductVariant::Classic => &CLASSIC_PRESETS,
        }
    }

    /// Free-text submission; `None` for blank input
    pub fn submit(&self, text: &str) -> Option<MoodSelection> {
        MoodSelection::new(text)
    }
}

// ============================================================================
// Conversational mood input
// ============================================================================

const GREETING: &str = "Hey there! How's your mood today? I'd love to help you find the \
perfect music that matches how you're feeling right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Chat-style mood capture: a bot greeting, the user's reply, an acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(ChatRole::Bot, GREETING)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Record a user reply and the bot's acknowledgement
    ///
    /// Blank replies leave the transcript untouched and return `None`.
    pub fn submit(&mut self, text: &str) -> Option<MoodSelection> {
        let mood = MoodSelection::new(text)?;

        self.messages
            .push(ChatMessage::new(ChatRole::User, mood.as_str()));
        self.messages.push(ChatMessage::new(
            ChatRole::Bot,
            format!(
                "Great! I can feel the {} vibes! Now, let me help you choose some amazing \
                 artists to match your mood.",
                mood.lookup_key()
            ),
        ));

        Some(mood)
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}
