//! moodtunes-web library
//!
//! Mood-based music recommendation service: HTTP pages and JSON API over the
//! mood -> artist -> songs flow, the session gate and the billing
//! collaborator.

use axum::Router;
use moodtunes_common::config::{ProductVariant, TomlConfig};
use moodtunes_common::EventBus;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod error;
pub mod flow;
pub mod services;
pub mod session;

use catalog::{ArtistCatalog, MoodCapture, RecommendationService};
use flow::FlowRegistry;
use services::{build_billing_provider, build_song_lookup, InMemoryAuthProvider, SongLookup};
use session::SessionContext;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TomlConfig>,
    pub session: Arc<SessionContext>,
    pub flows: Arc<FlowRegistry>,
    pub events: Arc<EventBus>,
    pub recommendations: RecommendationService,
    pub moods: MoodCapture,
    pub artists: Arc<ArtistCatalog>,
}

impl AppState {
    /// Assemble state from explicit collaborators
    ///
    /// Must be called from within a tokio runtime (the flow registry starts
    /// its session watcher here).
    pub fn new(
        config: TomlConfig,
        session: Arc<SessionContext>,
        lookup: Arc<dyn SongLookup>,
        events: Arc<EventBus>,
    ) -> Self {
        let flows = Arc::new(FlowRegistry::new(&session, lookup, Arc::clone(&events)));

        Self {
            recommendations: RecommendationService::new(config.lookup.latency()),
            moods: MoodCapture::new(config.variant),
            artists: Arc::new(ArtistCatalog::new()),
            config: Arc::new(config),
            session,
            flows,
            events,
        }
    }

    /// Build state with the collaborators selected by `config`
    pub fn from_config(config: TomlConfig) -> Self {
        let events = Arc::new(EventBus::default());
        let session = Arc::new(SessionContext::new(
            Arc::new(InMemoryAuthProvider::new()),
            build_billing_provider(&config.billing),
            Arc::clone(&events),
        ));
        let lookup = build_song_lookup(&config.lookup);

        Self::new(config, session, lookup, events)
    }
}

/// Build application router
///
/// Flow, billing-portal, subscription and event routes require a session;
/// pages, auth, catalogs, checkout and health do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require a session)
    let protected = Router::new()
        .route("/api/flow", get(api::get_flow))
        .route("/api/flow/mood", post(api::select_mood))
        .route("/api/flow/artist", post(api::select_artist))
        .route("/api/flow/back", post(api::go_back))
        .route("/api/flow/reset", post(api::reset))
        .route("/api/flow/refresh", post(api::refresh))
        .route("/api/chat/mood", post(api::chat_mood))
        .route("/api/events", get(api::event_stream))
        .route("/api/billing/portal", post(api::open_portal))
        .route("/api/subscription", get(api::get_subscription))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public routes
    let mut public = Router::new()
        .route("/", get(api::serve_index))
        .route("/welcome", get(api::serve_welcome))
        .route("/auth", get(api::serve_auth))
        .route("/pricing", get(api::serve_pricing))
        .route("/subscription-success", get(api::serve_subscription_success))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/moodtunes.css", get(api::serve_moodtunes_css))
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/auth/sign-up", post(api::sign_up))
        .route("/api/auth/sign-in", post(api::sign_in))
        .route("/api/auth/sign-out", post(api::sign_out))
        .route("/api/session", get(api::get_session))
        .route("/api/catalog/moods", get(api::get_moods))
        .route("/api/catalog/artists", get(api::get_artists))
        .route("/api/billing/plans", get(api::get_plans))
        .route("/api/billing/checkout", post(api::create_checkout))
        .route("/api/events/status", get(api::status_stream))
        .merge(api::health_routes());

    if state.config.variant == ProductVariant::Classic {
        public = public.route("/api/recommendations", post(api::recommend));
    }

    Router::new()
        .merge(protected)
        .merge(public)
        .fallback(api::serve_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
