use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for one moderation attempt, automated or manual.
///
/// Rows are append-only: the current verdict on a listing image can be
/// overwritten by re-moderation or manual review, but the log keeps the
/// full history.
#[derive(Debug, Clone, FromRow)]
pub struct ModerationLog {
    pub id: Uuid,
    pub image_id: Uuid,
    pub moderation_type: String,
    pub score: f64,
    pub action: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

/// Data for appending a new audit entry
#[derive(Debug, Clone)]
pub struct NewModerationLog {
    pub image_id: Uuid,
    pub moderation_type: String,
    pub score: f64,
    pub action: String,
    pub actor: String,
}
