use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Moderation status enum matching database enum
///
/// Lifecycle: `pending` on upload, then exactly one of `approved`,
/// `rejected` or `flagged` once a pipeline run or a manual review lands.
/// `flagged` waits for a human decision; re-moderation moves any terminal
/// state back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "moderation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationStatus::Pending => write!(f, "pending"),
            ModerationStatus::Approved => write!(f, "approved"),
            ModerationStatus::Rejected => write!(f, "rejected"),
            ModerationStatus::Flagged => write!(f, "flagged"),
        }
    }
}

/// Database model for an uploaded listing image.
///
/// The listings CRUD service creates these rows on upload; the moderation
/// subsystem is the sole writer of the `moderation_*` columns.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct ListingImage {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub file_path: String,
    pub url: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub moderation_status: ModerationStatus,
    pub moderation_score: Option<f64>,
    pub moderation_reason: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_status_display_matches_db_enum() {
        assert_eq!(ModerationStatus::Pending.to_string(), "pending");
        assert_eq!(ModerationStatus::Approved.to_string(), "approved");
        assert_eq!(ModerationStatus::Rejected.to_string(), "rejected");
        assert_eq!(ModerationStatus::Flagged.to_string(), "flagged");
    }

    #[test]
    fn test_moderation_status_serde_snake_case() {
        let json = serde_json::to_string(&ModerationStatus::Flagged).unwrap();
        assert_eq!(json, "\"flagged\"");
        let back: ModerationStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(back, ModerationStatus::Rejected);
    }
}
