//! # pn-api
//!
//! The web routing and orchestration layer for Pigeon Board.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod realtime;

use actix_web::web;
use pn_core::AppError;

use crate::error::ApiError;

/// Configures the routes for the board.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and queries are validation failures, not 500s
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError(AppError::ValidationError(format!("invalid request body: {err}"))).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError(AppError::ValidationError(format!("invalid query: {err}"))).into()
    }));

    cfg.service(
        web::scope("")
            .route("/health", web::get().to(handlers::health))
            // The Posting Endpoint
            .route("/posts", web::post().to(handlers::create_post))
            // The Feed (?tab=stroll|leaderboard)
            .route("/posts", web::get().to(handlers::list_feed))
            // Must come before /posts/{id}
            .route("/posts/by-number", web::get().to(handlers::post_by_number))
            // The "Thread View"
            .route("/posts/{id}", web::get().to(handlers::view_thread))
            .route("/votes", web::post().to(handlers::submit_vote))
            .route("/reports", web::post().to(handlers::submit_report)),
    );
}
