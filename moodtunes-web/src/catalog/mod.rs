//! Static catalogs: moods, artists, curated recommendations, plans

pub mod artists;
pub mod moods;
pub mod plans;
pub mod recommendations;

pub use artists::{ArtistCatalog, ArtistGroup};
pub use moods::{ChatMessage, ChatRole, ChatTranscript, MoodCapture};
pub use plans::{find_plan, Plan, PLANS};
pub use recommendations::{curated_recommendations, RecommendationService};
