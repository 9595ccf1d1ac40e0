// rest/mod.rs — Public REST API server.
//
// Axum HTTP server; JSON endpoints under /api/v1.
//
// Endpoints:
//   GET  /api/v1/health
//   POST /api/v1/users
//   GET  /api/v1/users/{id}/profile
//   GET  /api/v1/locations
//   GET  /api/v1/locations/{id}
//   GET  /api/v1/locations/{id}/reviews
//   POST /api/v1/locations/{id}/reviews
//   POST /api/v1/locations/{id}/reports
//   POST /api/v1/locations/{id}/check-ins
//   POST /api/v1/requests
//   GET  /api/v1/requests                    (moderation)
//   POST /api/v1/requests/{id}/approve       (moderation)
//   POST /api/v1/requests/{id}/reject        (moderation)
//   POST /api/v1/reviews/{id}/approve        (moderation)
//   POST /api/v1/reviews/{id}/reject         (moderation)

pub mod auth;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(routes::health::health))
        // Users
        .route("/api/v1/users", post(routes::users::create_user))
        .route(
            "/api/v1/users/{id}/profile",
            get(routes::profile::get_profile),
        )
        // Locations
        .route("/api/v1/locations", get(routes::locations::list_locations))
        .route(
            "/api/v1/locations/{id}",
            get(routes::locations::get_location),
        )
        .route(
            "/api/v1/locations/{id}/reviews",
            get(routes::reviews::list_reviews).post(routes::reviews::create_review),
        )
        .route(
            "/api/v1/locations/{id}/reports",
            post(routes::reports::create_report),
        )
        .route(
            "/api/v1/locations/{id}/check-ins",
            post(routes::checkins::create_check_in),
        )
        // Facility requests
        .route(
            "/api/v1/requests",
            get(routes::requests::list_requests).post(routes::requests::create_request),
        )
        .route(
            "/api/v1/requests/{id}/approve",
            post(routes::requests::approve_request),
        )
        .route(
            "/api/v1/requests/{id}/reject",
            post(routes::requests::reject_request),
        )
        // Review moderation
        .route(
            "/api/v1/reviews/{id}/approve",
            post(routes::reviews::approve_review),
        )
        .route(
            "/api/v1/reviews/{id}/reject",
            post(routes::reviews::reject_review),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
