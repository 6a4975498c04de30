use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::listings::models::ModerationStatus;
use crate::features::moderation::{dtos as moderation_dtos, handlers, models as moderation_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::moderation_handler::list_flagged,
        handlers::moderation_handler::review_image,
        handlers::moderation_handler::re_moderate_image,
        handlers::moderation_handler::list_logs,
    ),
    components(schemas(
        Meta,
        ModerationStatus,
        moderation_models::ModerationResult,
        moderation_models::ReviewAction,
        moderation_dtos::ManualReviewDto,
        moderation_dtos::ModeratedImageDto,
        moderation_dtos::ModerationLogDto,
        ApiResponse<Vec<moderation_dtos::ModeratedImageDto>>,
        ApiResponse<moderation_dtos::ModeratedImageDto>,
        ApiResponse<moderation_models::ModerationResult>,
        ApiResponse<Vec<moderation_dtos::ModerationLogDto>>,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "moderation", description = "Image moderation and review endpoints")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Admin-Id"))),
            );
        }
    }
}

pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
