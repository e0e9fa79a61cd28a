//! Curated recommendations for the classic variant
//!
//! A static table keyed by lower-cased mood. Unknown moods get a generic
//! list whose first reason mentions the mood. Responses are delayed by the
//! configured latency so the page shows its loading state.

use moodtunes_common::{MoodSelection, Recommendation, RecommendationKind};
use std::time::Duration;
use tracing::debug;

fn entry(
    id: &str,
    title: &str,
    artist: &str,
    kind: RecommendationKind,
    reason: &str,
    link: Option<&str>,
) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        kind,
        reason: reason.to_string(),
        link: link.map(str::to_string),
        thumbnail: None,
    }
}

/// Recommendations for `mood`, always non-empty
pub fn curated_recommendations(mood: &MoodSelection) -> Vec<Recommendation> {
    use RecommendationKind::{Song, Video};

    match mood.lookup_key().as_str() {
        "happy" => vec![
            entry(
                "1",
                "Happy",
                "Pharrell Williams",
                Song,
                "This uplifting anthem perfectly captures pure joy and positivity.",
                Some("https://www.youtube.com/watch?v=ZbZSe6N_BXs"),
            ),
            entry(
                "2",
                "Can't Stop the Feeling!",
                "Justin Timberlake",
                Song,
                "An infectious feel-good track that will boost your mood instantly.",
                Some("https://www.youtube.com/watch?v=ru0K8uYEZWw"),
            ),
            entry(
                "3",
                "Good Vibes",
                "Various Artists",
                Video,
                "A compilation of feel-good moments to match your happy energy.",
                None,
            ),
        ],
        "sad" => vec![
            entry(
                "4",
                "Someone Like You",
                "Adele",
                Song,
                "A beautifully melancholic song that validates your emotions.",
                Some("https://www.youtube.com/watch?v=hLQl3WQQoQ0"),
            ),
            entry(
                "5",
                "Mad World",
                "Gary Jules",
                Song,
                "A hauntingly beautiful cover that resonates with deeper feelings.",
                None,
            ),
            entry(
                "6",
                "The Night We Met",
                "Lord Huron",
                Song,
                "Perfect for reflecting on memories and processing emotions.",
                None,
            ),
        ],
        "energetic" => vec![
            entry(
                "7",
                "Uptown Funk",
                "Mark Ronson ft. Bruno Mars",
                Song,
                "High-energy funk that will get you moving and grooving.",
                Some("https://www.youtube.com/watch?v=OPf0YbXqDm0"),
            ),
            entry(
                "8",
                "Thunder",
                "Imagine Dragons",
                Song,
                "Powerful beats and inspiring lyrics to fuel your energy.",
                None,
            ),
            entry(
                "9",
                "Workout Motivation",
                "Various Artists",
                Video,
                "High-energy compilation perfect for channeling your enthusiasm.",
                None,
            ),
        ],
        _ => vec![
            entry(
                "default-1",
                "Perfect",
                "Ed Sheeran",
                Song,
                &format!(
                    "A versatile track that complements your {} mood beautifully.",
                    mood.as_str()
                ),
                None,
            ),
            entry(
                "default-2",
                "Bohemian Rhapsody",
                "Queen",
                Song,
                "A timeless classic that takes you on an emotional journey.",
                Some("https://www.youtube.com/watch?v=fJ9rUzIMcZQ"),
            ),
            entry(
                "default-3",
                "Imagine",
                "John Lennon",
                Song,
                "A peaceful, reflective song that matches your current state of mind.",
                None,
            ),
        ],
    }
}

/// Serves curated recommendations after a simulated delay
#[derive(Debug, Clone)]
pub struct RecommendationService {
    latency: Duration,
}

impl RecommendationService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub async fn recommend(&self, mood: &MoodSelection) -> Vec<Recommendation> {
        debug!("Curated recommendations requested for mood '{}'", mood);
        tokio::time::sleep(self.latency).await;
        curated_recommendations(mood)
    }
}
