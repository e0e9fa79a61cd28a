//! # MoodTunes Common Library
//!
//! Shared code for the MoodTunes crates including:
//! - Domain models (mood/artist selections, song results, identities)
//! - Event types (MoodTunesEvent enum) and the event bus
//! - Configuration loading
//! - Server-Sent Events helpers

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;

pub use error::{Error, Result};
pub use events::{EventBus, MoodTunesEvent};
pub use models::{
    ArtistSelection, Entitlement, FlowStep, Identity, MoodSelection, Recommendation,
    RecommendationKind, SongResult,
};
