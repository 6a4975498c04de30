use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of the heuristic pixel analysis.
///
/// The heuristic is a coarse first line of defense with a known
/// false-positive rate; its verdict alone never triggers an irreversible
/// action, only an auto-flag for human review.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct ImageAnalysis {
    pub has_nudity: bool,
    pub has_violence: bool,
    pub has_inappropriate_content: bool,
    pub confidence: f64,
    pub details: Vec<String>,
}

impl ImageAnalysis {
    /// Neutral result used when the analyzer cannot process the buffer.
    /// A neutral result means "no positive signal", not "verified clean".
    pub fn neutral(detail: impl Into<String>) -> Self {
        Self {
            has_nudity: false,
            has_violence: false,
            has_inappropriate_content: false,
            confidence: 0.0,
            details: vec![detail.into()],
        }
    }
}

/// Combined verdict of one moderation pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModerationResult {
    pub is_appropriate: bool,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<String>,
}

/// Manual review decision taken by an admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_analysis_carries_no_positive_signal() {
        let analysis = ImageAnalysis::neutral("decode failed");
        assert!(!analysis.has_inappropriate_content);
        assert_eq!(analysis.confidence, 0.0);
        assert_eq!(analysis.details, vec!["decode failed".to_string()]);
    }

    #[test]
    fn test_review_action_serde_lowercase() {
        let action: ReviewAction = serde_json::from_str("\"approve\"").unwrap();
        assert_eq!(action, ReviewAction::Approve);
        assert_eq!(
            serde_json::to_string(&ReviewAction::Reject).unwrap(),
            "\"reject\""
        );
    }
}
