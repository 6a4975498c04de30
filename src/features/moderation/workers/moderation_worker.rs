use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::core::error::Result;
use crate::features::moderation::services::{ModerationService, ModerationStore};

/// Background worker that sweeps pending listing images through the
/// moderation pipeline.
///
/// Uploads are acknowledged immediately with a `pending` record; this
/// worker picks them up in batches so moderation never blocks the
/// user-facing upload response.
pub struct ModerationWorker {
    store: Arc<ModerationStore>,
    service: Arc<ModerationService>,
    poll_interval: Duration,
    batch_size: i64,
}

impl ModerationWorker {
    pub fn new(
        store: Arc<ModerationStore>,
        service: Arc<ModerationService>,
        poll_interval_secs: u64,
        batch_size: i64,
    ) -> Self {
        Self {
            store,
            service,
            poll_interval: Duration::from_secs(poll_interval_secs),
            batch_size,
        }
    }

    /// Run the worker in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting moderation worker (interval: {:?}, batch: {})",
            self.poll_interval,
            self.batch_size
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.process_batch().await {
                tracing::error!("Error processing moderation batch: {:?}", e);
            }
        }
    }

    /// Moderate one batch of pending images
    async fn process_batch(&self) -> Result<()> {
        let images = self.store.list_pending(self.batch_size).await?;

        if images.is_empty() {
            return Ok(());
        }

        tracing::info!("Moderating {} pending images", images.len());

        for image in images {
            match self.service.moderate_image(image.id).await {
                Ok(Some(result)) => {
                    tracing::debug!(
                        "Moderated image {}: appropriate={}, score={:.2}",
                        image.id,
                        result.is_appropriate,
                        result.score
                    );
                }
                Ok(None) => {
                    // reviewed or re-moderated while queued in this batch
                    tracing::debug!("Image {} no longer pending, skipped", image.id);
                }
                Err(e) => {
                    tracing::error!("Failed to moderate image {}: {:?}", image.id, e);
                }
            }
        }

        Ok(())
    }
}
