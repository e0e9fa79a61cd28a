//! HTTP API handlers for moodtunes-web

pub mod auth;
pub mod billing;
pub mod buildinfo;
pub mod catalog;
pub mod flow;
pub mod health;
pub mod recommendations;
pub mod sse;
pub mod ui;

pub use auth::{get_session, get_subscription, require_session, sign_in, sign_out, sign_up};
pub use billing::{create_checkout, open_portal};
pub use buildinfo::get_build_info;
pub use catalog::{get_artists, get_moods, get_plans};
pub use flow::{chat_mood, get_flow, go_back, refresh, reset, select_artist, select_mood};
pub use health::health_routes;
pub use recommendations::recommend;
pub use sse::{event_stream, status_stream};
pub use ui::{
    serve_app_js, serve_auth, serve_index, serve_moodtunes_css, serve_not_found, serve_pricing,
    serve_subscription_success, serve_welcome,
};
