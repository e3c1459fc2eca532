use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod cors;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;


use db::Connector;

/// Builds the API router over `store`.
pub fn app<C: Connector>(store: C) -> Router {
    Router::new()
        // Root and health
        .route("/", get(|| async { "Kora API - v1.0" }))
        .route("/health", get(routes::health::health_check))

        // League endpoints
        .route(
            "/league-details",
            post(routes::league::get_league_details::<C>).options(cors::preflight),
        )

        // Match endpoints
        .route(
            "/match-details",
            post(routes::matches::get_match_details::<C>).options(cors::preflight),
        )
        .route(
            "/live-match-update",
            post(routes::live::update_live_match::<C>).options(cors::preflight),
        )

        .layer(middleware::map_response(cors::apply_cors_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
