//! Public catalog endpoints: mood presets, artists, plans

use axum::{extract::State, Json};
use serde::Serialize;

use crate::catalog::plans::TRIAL_NOTE;
use crate::catalog::{ArtistGroup, Plan, PLANS};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MoodsResponse {
    pub variant: String,
    pub presets: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: &'static [Plan],
    pub note: &'static str,
}

/// GET /api/catalog/moods
pub async fn get_moods(State(state): State<AppState>) -> Json<MoodsResponse> {
    Json(MoodsResponse {
        variant: state.config.variant.to_string(),
        presets: state.moods.presets(),
    })
}

/// GET /api/catalog/artists
pub async fn get_artists(State(state): State<AppState>) -> Json<Vec<ArtistGroup>> {
    Json(state.artists.groups().to_vec())
}

/// GET /api/billing/plans
pub async fn get_plans() -> Json<PlansResponse> {
    Json(PlansResponse {
        plans: &PLANS,
        note: TRIAL_NOTE,
    })
}
