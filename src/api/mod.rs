//! HTTP interface.
//!
//! [`build_router`] wires the handlers to their paths and adds request tracing.
//! The same router is used by `main.rs` and by the tests below.

/// Role extraction from the upstream identity header
pub mod auth;
/// Handler error type and its JSON rendering
pub mod error;
/// Request handlers
pub mod handlers;
/// Shared handler state
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/api/donors", post(handlers::donors::create_donor))
        .route("/api/donors/{id}", delete(handlers::donors::delete_donor))
        .route(
            "/api/donors/{id}/insight",
            get(handlers::donors::get_insight),
        )
        .route(
            "/api/donors/{id}/insight/summary",
            get(handlers::donors::get_insight_summary),
        )
        .route(
            "/api/donations",
            post(handlers::donations::create_donation),
        )
        .route(
            "/api/donations/{id}",
            delete(handlers::donations::delete_donation),
        )
        .route(
            "/api/donations/{id}/status",
            put(handlers::donations::update_status),
        )
        .route("/api/campaigns", post(handlers::campaigns::create_campaign))
        .route("/api/events", post(handlers::events::create_event))
        .route(
            "/api/events/{id}/attendance",
            put(handlers::events::record_attendance),
        )
        .route(
            "/api/projections/recalculate",
            post(handlers::projections::recalculate),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
