//! External collaborators: song search, authentication, billing

pub mod auth_provider;
pub mod billing_client;
pub mod song_lookup;
pub mod youtube_client;

pub use auth_provider::{AuthProvider, InMemoryAuthProvider, SessionToken};
pub use billing_client::{
    build_billing_provider, BillingProvider, DemoBillingProvider, FunctionsBillingClient,
};
pub use song_lookup::{build_song_lookup, LookupOutcome, MockSongLookup, SongLookup};
pub use youtube_client::YouTubeSongLookup;
