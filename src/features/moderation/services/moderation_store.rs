use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::listings::models::{ListingImage, ModerationStatus};
use crate::features::moderation::models::{ModerationLog, NewModerationLog};
use crate::shared::constants::MAX_FLAGGED_LIMIT;

/// The single write path for moderation state.
///
/// Every writer (automated pipeline, manual review, re-moderation) goes
/// through this store so the status/score/timestamp coupling holds: a
/// verdict is one UPDATE on the listing image plus one append-only audit
/// row, committed together.
pub struct ModerationStore {
    pool: PgPool,
}

impl ModerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_image(&self, image_id: Uuid) -> Result<ListingImage> {
        let image = sqlx::query_as::<_, ListingImage>(
            r#"SELECT * FROM listing_images WHERE id = $1"#,
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get listing image: {:?}", e);
            AppError::Database(e)
        })?;

        image.ok_or_else(|| AppError::NotFound(format!("Image '{}' not found", image_id)))
    }

    /// Persist one moderation decision: status transition + audit log row
    pub async fn apply_verdict(
        &self,
        image_id: Uuid,
        status: ModerationStatus,
        score: f64,
        reason: Option<&str>,
        actor: &str,
    ) -> Result<ListingImage> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let image = sqlx::query_as::<_, ListingImage>(
            r#"
            UPDATE listing_images
            SET moderation_status = $2,
                moderation_score = $3,
                moderation_reason = $4,
                moderated_at = NOW(),
                moderated_by = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(image_id)
        .bind(status)
        .bind(score)
        .bind(reason)
        .bind(actor)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to apply moderation verdict: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Image '{}' not found", image_id)))?;

        let log = NewModerationLog {
            image_id,
            moderation_type: crate::shared::constants::MODERATION_TYPE_NSFW.to_string(),
            score,
            action: status.to_string(),
            actor: actor.to_string(),
        };

        sqlx::query(
            r#"
            INSERT INTO moderation_logs (image_id, moderation_type, score, action, actor)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(log.image_id)
        .bind(&log.moderation_type)
        .bind(log.score)
        .bind(&log.action)
        .bind(&log.actor)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append moderation log: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Moderation verdict applied: image={}, status={}, score={:.2}, actor={}",
            image_id,
            status,
            score,
            actor
        );

        Ok(image)
    }

    /// Clear moderation fields back to the pending baseline before a rerun
    pub async fn reset_to_pending(&self, image_id: Uuid) -> Result<ListingImage> {
        let image = sqlx::query_as::<_, ListingImage>(
            r#"
            UPDATE listing_images
            SET moderation_status = 'pending',
                moderation_score = NULL,
                moderation_reason = NULL,
                moderated_at = NULL,
                moderated_by = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reset moderation state: {:?}", e);
            AppError::Database(e)
        })?;

        image.ok_or_else(|| AppError::NotFound(format!("Image '{}' not found", image_id)))
    }

    /// Images awaiting human review, most recently flagged first
    pub async fn list_flagged(&self, limit: i64) -> Result<Vec<ListingImage>> {
        let limit = limit.clamp(1, MAX_FLAGGED_LIMIT);

        let images = sqlx::query_as::<_, ListingImage>(
            r#"
            SELECT * FROM listing_images
            WHERE moderation_status = 'flagged'
            ORDER BY moderated_at DESC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list flagged images: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(images)
    }

    /// Images still waiting for their first pipeline run, oldest first
    pub async fn list_pending(&self, limit: i64) -> Result<Vec<ListingImage>> {
        let images = sqlx::query_as::<_, ListingImage>(
            r#"
            SELECT * FROM listing_images
            WHERE moderation_status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list pending images: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(images)
    }

    /// Full audit trail for one image, oldest attempt first
    pub async fn list_logs(&self, image_id: Uuid) -> Result<Vec<ModerationLog>> {
        let logs = sqlx::query_as::<_, ModerationLog>(
            r#"
            SELECT * FROM moderation_logs
            WHERE image_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(image_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list moderation logs: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(logs)
    }
}
