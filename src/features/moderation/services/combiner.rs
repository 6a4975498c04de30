use crate::features::moderation::models::{ImageAnalysis, ModerationResult};

/// Merge the heuristic analysis with the optional external verdict.
///
/// Worst-case policy: either positive signal flags the image, and the final
/// score is the maximum of the contributing scores. In the clean case the
/// maximum of heuristic confidence and external score is kept as a
/// cleanliness confidence. A missed violation costs more than a false
/// positive that a human reviewer can dismiss.
pub fn combine_results(
    analysis: &ImageAnalysis,
    external: Option<&ModerationResult>,
) -> ModerationResult {
    let heuristic_positive = analysis.has_inappropriate_content;
    let external_positive = external.map(|r| !r.is_appropriate).unwrap_or(false);

    let mut reasons: Vec<String> = Vec::new();
    let mut categories: Vec<String> = Vec::new();

    if heuristic_positive {
        reasons.push("Potential inappropriate content detected".to_string());
        categories.push("suspicious_content".to_string());
    }

    if external_positive {
        if let Some(r) = external {
            if let Some(reason) = &r.reason {
                reasons.push(reason.clone());
            }
            for category in &r.categories {
                if !categories.contains(category) {
                    categories.push(category.clone());
                }
            }
        }
    }

    let is_appropriate = !(heuristic_positive || external_positive);

    let score = if is_appropriate {
        external
            .map(|r| analysis.confidence.max(r.score))
            .unwrap_or(analysis.confidence)
    } else {
        let mut score: f64 = 0.0;
        if heuristic_positive {
            score = score.max(analysis.confidence);
        }
        if external_positive {
            if let Some(r) = external {
                score = score.max(r.score);
            }
        }
        score
    };

    ModerationResult {
        is_appropriate,
        score: score.clamp(0.0, 1.0),
        reason: if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        },
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_analysis() -> ImageAnalysis {
        ImageAnalysis {
            has_nudity: false,
            has_violence: false,
            has_inappropriate_content: false,
            confidence: 0.3,
            details: vec![],
        }
    }

    fn flagged_analysis() -> ImageAnalysis {
        ImageAnalysis {
            has_nudity: true,
            has_violence: false,
            has_inappropriate_content: true,
            confidence: 0.6,
            details: vec![],
        }
    }

    fn external(is_appropriate: bool, score: f64) -> ModerationResult {
        ModerationResult {
            is_appropriate,
            score,
            reason: (!is_appropriate).then(|| "Explicit content".to_string()),
            categories: if is_appropriate {
                vec![]
            } else {
                vec!["nsfw".to_string()]
            },
        }
    }

    #[test]
    fn test_both_clean_is_appropriate() {
        let result = combine_results(&clean_analysis(), Some(&external(true, 0.1)));
        assert!(result.is_appropriate);
        assert_eq!(result.score, 0.3);
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_heuristic_positive_flags_result() {
        let result = combine_results(&flagged_analysis(), Some(&external(true, 0.1)));
        assert!(!result.is_appropriate);
        assert_eq!(result.score, 0.6);
        assert!(result
            .reason
            .as_deref()
            .unwrap()
            .contains("Potential inappropriate content detected"));
        assert_eq!(result.categories, vec!["suspicious_content".to_string()]);
    }

    #[test]
    fn test_external_positive_flags_result() {
        let result = combine_results(&clean_analysis(), Some(&external(false, 0.9)));
        assert!(!result.is_appropriate);
        assert_eq!(result.score, 0.9);
        assert_eq!(result.categories, vec!["nsfw".to_string()]);
    }

    #[test]
    fn test_both_positive_takes_max_score_and_merges() {
        let result = combine_results(&flagged_analysis(), Some(&external(false, 0.85)));
        assert!(!result.is_appropriate);
        assert_eq!(result.score, 0.85);
        let reason = result.reason.unwrap();
        assert!(reason.contains("Potential inappropriate content detected"));
        assert!(reason.contains("Explicit content"));
        assert_eq!(
            result.categories,
            vec!["suspicious_content".to_string(), "nsfw".to_string()]
        );
    }

    #[test]
    fn test_duplicate_categories_are_deduplicated() {
        let mut ext = external(false, 0.8);
        ext.categories = vec!["suspicious_content".to_string(), "nsfw".to_string()];

        let result = combine_results(&flagged_analysis(), Some(&ext));
        assert_eq!(
            result.categories,
            vec!["suspicious_content".to_string(), "nsfw".to_string()]
        );
    }

    #[test]
    fn test_missing_external_signal_uses_heuristic_only() {
        let clean = combine_results(&clean_analysis(), None);
        assert!(clean.is_appropriate);
        assert_eq!(clean.score, 0.3);

        let flagged = combine_results(&flagged_analysis(), None);
        assert!(!flagged.is_appropriate);
        assert_eq!(flagged.score, 0.6);
    }

    #[test]
    fn test_clean_case_keeps_max_as_cleanliness_confidence() {
        let result = combine_results(&clean_analysis(), Some(&external(true, 0.55)));
        assert!(result.is_appropriate);
        assert_eq!(result.score, 0.55);
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let mut ext = external(false, 1.0);
        ext.score = 1.0;
        let result = combine_results(&flagged_analysis(), Some(&ext));
        assert!(result.score >= 0.0 && result.score <= 1.0);
    }
}
