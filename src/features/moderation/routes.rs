use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::moderation::handlers::moderation_handler;
use crate::features::moderation::services::ModerationService;

/// Create routes for the moderation feature
///
/// Note: these endpoints are for the admin surface; the gateway forwards
/// the authenticated admin id in the X-Admin-Id header.
pub fn routes(service: Arc<ModerationService>) -> Router {
    Router::new()
        .route(
            "/api/admin/moderation/flagged",
            get(moderation_handler::list_flagged),
        )
        .route(
            "/api/admin/moderation/images/{id}/review",
            post(moderation_handler::review_image),
        )
        .route(
            "/api/admin/moderation/images/{id}/re-moderate",
            post(moderation_handler::re_moderate_image),
        )
        .route(
            "/api/admin/moderation/images/{id}/logs",
            get(moderation_handler::list_logs),
        )
        .with_state(service)
}
