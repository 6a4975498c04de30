use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AdminActor, AppJson};
use crate::features::moderation::dtos::{
    FlaggedQuery, ManualReviewDto, ModeratedImageDto, ModerationLogDto,
};
use crate::features::moderation::models::ModerationResult;
use crate::features::moderation::services::ModerationService;
use crate::shared::types::{ApiResponse, Meta};

/// List images flagged for human review
#[utoipa::path(
    get,
    path = "/api/admin/moderation/flagged",
    params(FlaggedQuery),
    responses(
        (status = 200, description = "Images awaiting review", body = ApiResponse<Vec<ModeratedImageDto>>),
    ),
    security(("admin_id" = [])),
    tag = "moderation"
)]
pub async fn list_flagged(
    _admin: AdminActor,
    State(service): State<Arc<ModerationService>>,
    Query(query): Query<FlaggedQuery>,
) -> Result<Json<ApiResponse<Vec<ModeratedImageDto>>>> {
    let images = service.list_flagged(query.limit).await?;
    let total = images.len() as i64;
    let items = images.into_iter().map(ModeratedImageDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Record a manual approve/reject decision for an image
#[utoipa::path(
    post,
    path = "/api/admin/moderation/images/{id}/review",
    params(
        ("id" = Uuid, Path, description = "Listing image ID")
    ),
    request_body = ManualReviewDto,
    responses(
        (status = 200, description = "Review recorded", body = ApiResponse<ModeratedImageDto>),
        (status = 404, description = "Image not found")
    ),
    security(("admin_id" = [])),
    tag = "moderation"
)]
pub async fn review_image(
    admin: AdminActor,
    State(service): State<Arc<ModerationService>>,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<ManualReviewDto>,
) -> Result<Json<ApiResponse<ModeratedImageDto>>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let image = service
        .manual_review(id, body.action, &admin.admin_id, body.reason.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(ModeratedImageDto::from(image)),
        Some("Review recorded".to_string()),
        None,
    )))
}

/// Reset an image to pending and rerun the moderation pipeline
#[utoipa::path(
    post,
    path = "/api/admin/moderation/images/{id}/re-moderate",
    params(
        ("id" = Uuid, Path, description = "Listing image ID")
    ),
    responses(
        (status = 200, description = "Pipeline rerun, new verdict returned", body = ApiResponse<ModerationResult>),
        (status = 404, description = "Image not found")
    ),
    security(("admin_id" = [])),
    tag = "moderation"
)]
pub async fn re_moderate_image(
    _admin: AdminActor,
    State(service): State<Arc<ModerationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ModerationResult>>> {
    let result = service.re_moderate(id).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

/// Full moderation history for an image
#[utoipa::path(
    get,
    path = "/api/admin/moderation/images/{id}/logs",
    params(
        ("id" = Uuid, Path, description = "Listing image ID")
    ),
    responses(
        (status = 200, description = "Audit trail, oldest first", body = ApiResponse<Vec<ModerationLogDto>>),
        (status = 404, description = "Image not found")
    ),
    security(("admin_id" = [])),
    tag = "moderation"
)]
pub async fn list_logs(
    _admin: AdminActor,
    State(service): State<Arc<ModerationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ModerationLogDto>>>> {
    let logs = service.list_logs(id).await?;
    let total = logs.len() as i64;
    let items = logs.into_iter().map(ModerationLogDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}
