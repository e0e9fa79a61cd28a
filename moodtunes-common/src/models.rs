//! Shared domain models
//!
//! Selections, search results and identities passed between the flow
//! controller, the search backends and the HTTP layer. Everything here lives
//! for the duration of a browser session only; nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Flow steps
// ============================================================================

/// Current stage of the linear selection sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStep {
    Mood,
    Artist,
    Songs,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStep::Mood => "mood",
            FlowStep::Artist => "artist",
            FlowStep::Songs => "songs",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Selections
// ============================================================================

/// A mood label submitted by the user (free text or preset)
///
/// Trimmed on creation and never empty. Case is preserved for display;
/// [`MoodSelection::lookup_key`] gives the lower-cased form used for table
/// lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MoodSelection(String);

impl MoodSelection {
    /// Create a selection from raw user input
    ///
    /// Returns `None` for empty or whitespace-only input. No length limit.
    pub fn new(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased key for lookup tables
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl TryFrom<String> for MoodSelection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MoodSelection::new(&value).ok_or_else(|| "mood must not be empty".to_string())
    }
}

impl From<MoodSelection> for String {
    fn from(mood: MoodSelection) -> Self {
        mood.0
    }
}

impl fmt::Display for MoodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An artist picked from the fixed catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistSelection {
    /// Display name as listed in the catalog
    pub name: String,
    /// Catalog group the artist was picked from (e.g. "Tamil")
    pub group: String,
}

impl ArtistSelection {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for ArtistSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Search results
// ============================================================================

/// One song/video entry returned by a song lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongResult {
    /// Identifier, unique within one lookup response
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Thumbnail image URL
    pub thumbnail: String,
    /// External playback URL (opened in a new tab)
    pub url: String,
    /// Display duration such as "3:45"; empty when the backend does not report it
    pub duration: String,
}

/// Kind of a curated recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Song,
    Video,
}

/// Curated recommendation shown by the classic (single-step) variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub kind: RecommendationKind,
    /// Why this entry fits the mood
    pub reason: String,
    /// Playback link; entries without one render as "Coming Soon"
    pub link: Option<String>,
    pub thumbnail: Option<String>,
}

// ============================================================================
// Identity and entitlement
// ============================================================================

/// Signed-in user as reported by the authentication provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

impl Identity {
    /// Build an identity, defaulting the display name to the e-mail local part
    pub fn new(id: Uuid, email: impl Into<String>, display_name: Option<String>) -> Self {
        let email = email.into();
        let display_name = display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_display_name(&email));

        Self {
            id,
            email,
            display_name,
        }
    }
}

fn default_display_name(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => "User".to_string(),
    }
}

/// Billing-derived access flags
///
/// Displayed in the user menu; the service does not enforce tier limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub subscribed: bool,
    pub tier: Option<String>,
    pub subscription_end: Option<DateTime<Utc>>,
}

impl Entitlement {
    pub fn subscribed(tier: impl Into<String>, subscription_end: Option<DateTime<Utc>>) -> Self {
        Self {
            subscribed: true,
            tier: Some(tier.into()),
            subscription_end,
        }
    }
}
