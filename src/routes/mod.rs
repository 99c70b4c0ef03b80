use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::WatchStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{
        mood::{MoodTable, SimilarityLexicon},
        providers::CatalogProvider,
        radar::RadarCache,
    },
};

pub mod progress;
pub mod recommendations;
pub mod shows;
pub mod users;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CatalogProvider>,
    pub store: WatchStore,
    pub radar: Arc<RadarCache>,
    pub moods: Arc<MoodTable>,
    pub lexicon: Arc<SimilarityLexicon>,
    /// Preferred catalog locale; fallback handling lives in the provider
    pub locale: String,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/shows/search", get(shows::search))
        .route("/shows/:show_id", get(shows::detail))
        .route("/shows/:show_id/seasons/:season_number", get(shows::season))
        .route(
            "/shows/:show_id/seasons/:season_number/episodes/:episode_number",
            get(shows::episode),
        )
        // Watch progress
        .route("/shows/:show_id/progress", get(progress::get_show_progress))
        .route(
            "/watched",
            post(progress::mark_watched).delete(progress::unmark_watched),
        )
        .route("/users/:user_id/progress", get(progress::get_bulk_progress))
        // Membership
        .route(
            "/users/:user_id/watchlist",
            get(users::get_watchlist).post(users::add_to_watchlist),
        )
        .route(
            "/users/:user_id/watchlist/:show_id",
            delete(users::remove_from_watchlist),
        )
        .route(
            "/users/:user_id/favorites",
            get(users::get_favorites).post(users::add_favorite),
        )
        .route(
            "/users/:user_id/favorites/:show_id",
            delete(users::remove_favorite),
        )
        // Feeds
        .route("/users/:user_id/radar", get(users::radar))
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
