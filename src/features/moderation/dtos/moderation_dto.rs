use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::listings::models::{ListingImage, ModerationStatus};
use crate::features::moderation::models::{ModerationLog, ReviewAction};
use crate::shared::constants::DEFAULT_FLAGGED_LIMIT;

/// Request body for a manual review decision
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ManualReviewDto {
    /// The decision: "approve" or "reject"
    pub action: ReviewAction,
    /// Optional free-text justification shown in the audit trail
    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Query parameters for the flagged-images review queue
#[derive(Debug, Deserialize, IntoParams)]
pub struct FlaggedQuery {
    /// Maximum number of images to return (default: 20, max: 100)
    #[serde(default = "default_flagged_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_flagged_limit() -> i64 {
    DEFAULT_FLAGGED_LIMIT
}

/// Listing image together with its current moderation state
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModeratedImageDto {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub url: String,
    pub original_filename: String,
    pub content_type: String,
    pub moderation_status: ModerationStatus,
    pub moderation_score: Option<f64>,
    pub moderation_reason: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderated_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ListingImage> for ModeratedImageDto {
    fn from(image: ListingImage) -> Self {
        Self {
            id: image.id,
            listing_id: image.listing_id,
            url: image.url,
            original_filename: image.original_filename,
            content_type: image.content_type,
            moderation_status: image.moderation_status,
            moderation_score: image.moderation_score,
            moderation_reason: image.moderation_reason,
            moderated_at: image.moderated_at,
            moderated_by: image.moderated_by,
            created_at: image.created_at,
        }
    }
}

/// One entry of the moderation audit trail
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModerationLogDto {
    pub id: Uuid,
    pub moderation_type: String,
    pub score: f64,
    pub action: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl From<ModerationLog> for ModerationLogDto {
    fn from(log: ModerationLog) -> Self {
        Self {
            id: log.id,
            moderation_type: log.moderation_type,
            score: log.score,
            action: log.action,
            actor: log.actor,
            created_at: log.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_review_dto_reason_length() {
        let ok = ManualReviewDto {
            action: ReviewAction::Approve,
            reason: Some("false positive".to_string()),
        };
        assert!(ok.validate().is_ok());

        let too_long = ManualReviewDto {
            action: ReviewAction::Reject,
            reason: Some("x".repeat(501)),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_manual_review_dto_deserializes() {
        let dto: ManualReviewDto =
            serde_json::from_str(r#"{"action": "approve", "reason": "false positive"}"#).unwrap();
        assert_eq!(dto.action, ReviewAction::Approve);
        assert_eq!(dto.reason.as_deref(), Some("false positive"));
    }
}
