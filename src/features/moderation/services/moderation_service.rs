use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::config::ModerationConfig;
use crate::core::error::{AppError, Result};
use crate::features::listings::models::{ListingImage, ModerationStatus};
use crate::features::moderation::models::{ModerationLog, ModerationResult, ReviewAction};
use crate::features::moderation::services::combiner::combine_results;
use crate::features::moderation::services::image_validator::ValidationFailure;
use crate::features::moderation::services::{
    ContentAnalyzer, ExternalClassifier, ImageValidator, ModerationStore,
};
use crate::shared::constants::SYSTEM_ACTOR;

/// Orchestrates the moderation pipeline and the human-review workflow.
///
/// Runs for a single image are serialized through a per-image mutex so an
/// automated verdict and a manual decision can never interleave their
/// writes.
pub struct ModerationService {
    store: Arc<ModerationStore>,
    validator: Arc<ImageValidator>,
    analyzer: Arc<ContentAnalyzer>,
    classifier: Arc<ExternalClassifier>,
    config: ModerationConfig,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ModerationService {
    pub fn new(
        store: Arc<ModerationStore>,
        validator: Arc<ImageValidator>,
        analyzer: Arc<ContentAnalyzer>,
        classifier: Arc<ExternalClassifier>,
        config: ModerationConfig,
    ) -> Self {
        Self {
            store,
            validator,
            analyzer,
            classifier,
            config,
            locks: DashMap::new(),
        }
    }

    /// Run the full pipeline against a pending image and persist the verdict.
    ///
    /// The record is re-read under the per-image lock and skipped unless it
    /// is still pending: a manual decision that lands between a sweep
    /// listing the image and processing it stays authoritative.
    ///
    /// Fail-closed: validation failures and unexpected pipeline errors both
    /// end in a rejecting verdict with score 1.0; unprocessable input is
    /// never silently approved.
    pub async fn moderate_image(&self, image_id: Uuid) -> Result<Option<ModerationResult>> {
        let lock = self.image_lock(image_id);
        let _guard = lock.lock().await;

        let image = self.store.get_image(image_id).await?;
        if !eligible_for_sweep(image.moderation_status) {
            tracing::debug!(
                "Skipping image {}: status changed to {} while queued",
                image_id,
                image.moderation_status
            );
            return Ok(None);
        }

        let result = self.run_and_persist(&image.file_path, image_id).await?;
        Ok(Some(result))
    }

    /// Reset a previously moderated image and rerun the pipeline.
    ///
    /// Used after policy updates or disputed automated verdicts. Fails with
    /// NotFound when the image does not exist.
    pub async fn re_moderate(&self, image_id: Uuid) -> Result<ModerationResult> {
        let lock = self.image_lock(image_id);
        let _guard = lock.lock().await;

        let image = self.store.get_image(image_id).await?;
        self.store.reset_to_pending(image_id).await?;

        tracing::info!(
            "Re-moderating image {} (previous status: {})",
            image_id,
            image.moderation_status
        );

        self.run_and_persist(&image.file_path, image_id).await
    }

    /// Record a manual decision, overriding whatever the pipeline concluded.
    pub async fn manual_review(
        &self,
        image_id: Uuid,
        action: ReviewAction,
        admin_id: &str,
        reason: Option<&str>,
    ) -> Result<ListingImage> {
        let lock = self.image_lock(image_id);
        let _guard = lock.lock().await;

        let image = self.store.get_image(image_id).await?;
        let (status, score) = review_verdict(action, image.moderation_score);

        let updated = self
            .store
            .apply_verdict(image_id, status, score, reason, admin_id)
            .await?;

        tracing::info!(
            "Manual review: image={}, action={:?}, admin={}",
            image_id,
            action,
            admin_id
        );

        Ok(updated)
    }

    pub async fn list_flagged(&self, limit: i64) -> Result<Vec<ListingImage>> {
        self.store.list_flagged(limit).await
    }

    pub async fn list_logs(&self, image_id: Uuid) -> Result<Vec<ModerationLog>> {
        // Surface NotFound for unknown ids instead of an empty history
        self.store.get_image(image_id).await?;
        self.store.list_logs(image_id).await
    }

    async fn run_and_persist(&self, file_path: &str, image_id: Uuid) -> Result<ModerationResult> {
        let result = match self.run_pipeline(file_path).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Moderation pipeline failed for image {}: {:?}", image_id, e);
                fail_closed_verdict(&e.to_string())
            }
        };

        let status = decide_status(&result, self.config.flag_threshold, self.config.nsfw_threshold);

        self.store
            .apply_verdict(
                image_id,
                status,
                result.score,
                result.reason.as_deref(),
                SYSTEM_ACTOR,
            )
            .await?;

        Ok(result)
    }

    async fn run_pipeline(&self, file_path: &str) -> Result<ModerationResult> {
        let bytes = match tokio::fs::read(file_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                // Unreadable input follows the validation-failure path
                return Ok(validation_failure_verdict(&ValidationFailure {
                    issues: vec![format!("Failed to read image file: {}", e)],
                }));
            }
        };

        let validator = Arc::clone(&self.validator);
        let analyzer = Arc::clone(&self.analyzer);
        let data = bytes.clone();

        // Decode and pixel statistics are CPU-bound; keep them off the async pool
        let analysis = tokio::task::spawn_blocking(move || {
            let valid = validator.validate_bytes(&data)?;
            tracing::debug!(
                "Image validated: {}x{} ({:?})",
                valid.width,
                valid.height,
                valid.format
            );
            Ok(analyzer.analyze(&valid.image))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Analysis task failed: {}", e)))?;

        let analysis = match analysis {
            Ok(analysis) => analysis,
            Err(failure) => return Ok(validation_failure_verdict(&failure)),
        };

        let external = self.classifier.classify(&bytes).await;

        Ok(combine_results(&analysis, external.as_ref()))
    }

    fn image_lock(&self, image_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(image_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Sweep eligibility: only still-pending images get an automated run
fn eligible_for_sweep(status: ModerationStatus) -> bool {
    status == ModerationStatus::Pending
}

/// Map a manual decision onto the status to set and the score to record.
///
/// A review can land before any pipeline run; when the record carries no
/// score yet the decision itself supplies one, so non-pending rows always
/// hold status, score and timestamp together.
fn review_verdict(action: ReviewAction, existing_score: Option<f64>) -> (ModerationStatus, f64) {
    let status = match action {
        ReviewAction::Approve => ModerationStatus::Approved,
        ReviewAction::Reject => ModerationStatus::Rejected,
    };
    let score = existing_score.unwrap_or(match action {
        ReviewAction::Approve => 0.0,
        ReviewAction::Reject => 1.0,
    });

    (status, score)
}

/// Map a combined verdict onto the status lifecycle.
///
/// Inappropriate results are rejected outright at or above the NSFW
/// threshold and flagged for review below it; clean results whose score
/// still reaches the flag threshold also go to review.
fn decide_status(
    result: &ModerationResult,
    flag_threshold: f64,
    nsfw_threshold: f64,
) -> ModerationStatus {
    if !result.is_appropriate {
        if result.score >= nsfw_threshold {
            ModerationStatus::Rejected
        } else {
            ModerationStatus::Flagged
        }
    } else if result.score >= flag_threshold {
        ModerationStatus::Flagged
    } else {
        ModerationStatus::Approved
    }
}

/// Verdict for input that failed format or dimension validation
fn validation_failure_verdict(failure: &ValidationFailure) -> ModerationResult {
    ModerationResult {
        is_appropriate: false,
        score: 1.0,
        reason: Some(format!(
            "Invalid image format or corrupted file: {}",
            failure.summary()
        )),
        categories: vec!["invalid_image".to_string()],
    }
}

/// Verdict for unexpected pipeline errors: never silently approve
fn fail_closed_verdict(message: &str) -> ModerationResult {
    ModerationResult {
        is_appropriate: false,
        score: 1.0,
        reason: Some(format!("Moderation error: {}", message)),
        categories: vec!["technical_error".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(is_appropriate: bool, score: f64) -> ModerationResult {
        ModerationResult {
            is_appropriate,
            score,
            reason: None,
            categories: vec![],
        }
    }

    #[test]
    fn test_decide_status_inappropriate_bands() {
        // at or above the NSFW threshold: rejected
        assert_eq!(
            decide_status(&result(false, 0.9), 0.5, 0.7),
            ModerationStatus::Rejected
        );
        assert_eq!(
            decide_status(&result(false, 0.7), 0.5, 0.7),
            ModerationStatus::Rejected
        );
        // below it: human review
        assert_eq!(
            decide_status(&result(false, 0.6), 0.5, 0.7),
            ModerationStatus::Flagged
        );
    }

    #[test]
    fn test_decide_status_clean_bands() {
        assert_eq!(
            decide_status(&result(true, 0.3), 0.5, 0.7),
            ModerationStatus::Approved
        );
        // clean verdicts with a high residual score still get a second look
        assert_eq!(
            decide_status(&result(true, 0.6), 0.5, 0.7),
            ModerationStatus::Flagged
        );
    }

    #[test]
    fn test_validation_failure_verdict_is_fail_closed() {
        let failure = ValidationFailure {
            issues: vec!["Image too small: 20x20 (minimum 50x50)".to_string()],
        };
        let verdict = validation_failure_verdict(&failure);

        assert!(!verdict.is_appropriate);
        assert_eq!(verdict.score, 1.0);
        let reason = verdict.reason.unwrap();
        assert!(reason.contains("Invalid image format or corrupted file"));
        assert!(reason.contains("too small"));
        assert_eq!(
            decide_status(&validation_failure_verdict(&failure), 0.5, 0.7),
            ModerationStatus::Rejected
        );
    }

    #[test]
    fn test_only_pending_images_are_swept() {
        assert!(eligible_for_sweep(ModerationStatus::Pending));
        // a decision already on record must not be overwritten by the sweep
        assert!(!eligible_for_sweep(ModerationStatus::Approved));
        assert!(!eligible_for_sweep(ModerationStatus::Rejected));
        assert!(!eligible_for_sweep(ModerationStatus::Flagged));
    }

    #[test]
    fn test_review_verdict_defaults_score_for_unscored_records() {
        assert_eq!(
            review_verdict(ReviewAction::Approve, None),
            (ModerationStatus::Approved, 0.0)
        );
        assert_eq!(
            review_verdict(ReviewAction::Reject, None),
            (ModerationStatus::Rejected, 1.0)
        );
    }

    #[test]
    fn test_review_verdict_keeps_existing_pipeline_score() {
        assert_eq!(
            review_verdict(ReviewAction::Approve, Some(0.85)),
            (ModerationStatus::Approved, 0.85)
        );
        assert_eq!(
            review_verdict(ReviewAction::Reject, Some(0.55)),
            (ModerationStatus::Rejected, 0.55)
        );
    }

    #[test]
    fn test_rerun_on_same_input_yields_same_verdict() {
        use image::{DynamicImage, Rgb, RgbImage};

        let analyzer = ContentAnalyzer::new(10);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([200, 120, 80])));

        let first = combine_results(&analyzer.analyze(&image), None);
        let second = combine_results(&analyzer.analyze(&image), None);

        assert_eq!(first.is_appropriate, second.is_appropriate);
        assert_eq!(first.score, second.score);
        assert_eq!(
            decide_status(&first, 0.5, 0.7),
            decide_status(&second, 0.5, 0.7)
        );
    }

    #[test]
    fn test_fail_closed_verdict_rejects() {
        let verdict = fail_closed_verdict("database exploded");

        assert!(!verdict.is_appropriate);
        assert_eq!(verdict.score, 1.0);
        assert_eq!(verdict.categories, vec!["technical_error".to_string()]);
        assert!(verdict.reason.unwrap().starts_with("Moderation error: "));
    }
}
