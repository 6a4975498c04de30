use base64::prelude::*;
use serde_json::Value;

use crate::core::config::ModerationConfig;
use crate::features::moderation::models::ModerationResult;

/// Adapter for the third-party explicit-content detection API.
///
/// The integration is strictly optional: without an API key `classify`
/// returns `None` immediately, and any transport, HTTP or payload error
/// degrades to `None` as well, so an external outage never fails the
/// moderation pipeline.
pub struct ExternalClassifier {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    nsfw_threshold: f64,
}

impl ExternalClassifier {
    pub fn new(config: &ModerationConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("AdboardCore/1.0 (image-moderation)")
                .timeout(config.nsfw_api_timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key: config.nsfw_api_key.clone(),
            api_url: config.nsfw_api_url.clone(),
            nsfw_threshold: config.nsfw_threshold,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Classify an image, returning `None` when the service is unconfigured
    /// or unavailable.
    pub async fn classify(&self, image_bytes: &[u8]) -> Option<ModerationResult> {
        let api_key = self.api_key.as_deref()?;

        let payload = serde_json::json!({
            "image_base64": BASE64_STANDARD.encode(image_bytes),
        });

        let response = match self
            .client
            .post(&self.api_url)
            .header("api-key", api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("NSFW classifier request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("NSFW classifier returned status: {}", response.status());
            return None;
        }

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Failed to parse NSFW classifier response: {}", e);
                return None;
            }
        };

        let result = self.result_from_body(&body);
        if result.is_none() {
            tracing::warn!("NSFW classifier response missing numeric output.nsfw_score");
        }
        result
    }

    fn result_from_body(&self, body: &Value) -> Option<ModerationResult> {
        let score = parse_nsfw_score(body)?.clamp(0.0, 1.0);
        let is_appropriate = score < self.nsfw_threshold;

        Some(ModerationResult {
            is_appropriate,
            score,
            reason: (!is_appropriate).then(|| {
                format!("Explicit content score {:.2} from external classifier", score)
            }),
            categories: if is_appropriate {
                Vec::new()
            } else {
                vec!["nsfw".to_string()]
            },
        })
    }
}

/// Extract `output.nsfw_score` from the provider payload.
///
/// A missing or non-numeric field is an adapter failure, never a 0.0 score:
/// "service returned garbage" must not read as "service verified clean".
fn parse_nsfw_score(body: &Value) -> Option<f64> {
    body.get("output")?.get("nsfw_score")?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn test_config(api_key: Option<&str>) -> ModerationConfig {
        ModerationConfig {
            flag_threshold: 0.5,
            nsfw_threshold: 0.7,
            min_dimension: 50,
            max_dimension: 10000,
            sample_stride: 10,
            poll_interval_secs: 15,
            batch_size: 20,
            nsfw_api_key: api_key.map(str::to_string),
            nsfw_api_url: "http://localhost:9/nsfw".to_string(),
            nsfw_api_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_parse_nsfw_score_strict() {
        assert_eq!(
            parse_nsfw_score(&json!({"output": {"nsfw_score": 0.42}})),
            Some(0.42)
        );
        assert_eq!(parse_nsfw_score(&json!({"output": {}})), None);
        assert_eq!(
            parse_nsfw_score(&json!({"output": {"nsfw_score": "high"}})),
            None
        );
        assert_eq!(parse_nsfw_score(&json!({"nsfw_score": 0.9})), None);
        assert_eq!(parse_nsfw_score(&json!(null)), None);
    }

    #[test]
    fn test_result_from_body_threshold_mapping() {
        let classifier = ExternalClassifier::new(&test_config(Some("key")));

        let clean = classifier
            .result_from_body(&json!({"output": {"nsfw_score": 0.2}}))
            .unwrap();
        assert!(clean.is_appropriate);
        assert_eq!(clean.score, 0.2);
        assert!(clean.reason.is_none());
        assert!(clean.categories.is_empty());

        let explicit = classifier
            .result_from_body(&json!({"output": {"nsfw_score": 0.95}}))
            .unwrap();
        assert!(!explicit.is_appropriate);
        assert_eq!(explicit.score, 0.95);
        assert_eq!(explicit.categories, vec!["nsfw".to_string()]);
    }

    #[test]
    fn test_result_from_body_clamps_out_of_range_scores() {
        let classifier = ExternalClassifier::new(&test_config(Some("key")));

        let result = classifier
            .result_from_body(&json!({"output": {"nsfw_score": 3.7}}))
            .unwrap();
        assert_eq!(result.score, 1.0);
    }

    #[tokio::test]
    async fn test_unconfigured_classifier_is_a_no_op() {
        let classifier = ExternalClassifier::new(&test_config(None));
        assert!(!classifier.is_configured());
        assert!(classifier.classify(b"image bytes").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades_to_none() {
        // Port 9 (discard) is not listening; the request errors out fast
        let classifier = ExternalClassifier::new(&test_config(Some("key")));
        assert!(classifier.classify(b"image bytes").await.is_none());
    }
}
