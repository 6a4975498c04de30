use image::DynamicImage;

use crate::features::moderation::models::ImageAnalysis;

/// Skin ratio above which the image counts as predominantly skin-toned
const SKIN_RATIO_THRESHOLD: f64 = 0.3;

/// Dark or bright pixel ratio above which contrast counts as extreme
const EXTREME_CONTRAST_RATIO: f64 = 0.4;

/// Mean channel value below which a pixel counts as dark
const DARK_MEAN: f64 = 50.0;

/// Mean channel value above which a pixel counts as bright
const BRIGHT_MEAN: f64 = 200.0;

/// Rule-based pixel statistics scorer for explicit content.
///
/// Not a trained classifier: it measures the fraction of skin-toned pixels
/// and the brightness distribution over a strided sample, and flags the
/// combination of a high skin ratio with extreme contrast. False positives
/// are expected and are routed to human review rather than auto-rejection.
pub struct ContentAnalyzer {
    sample_stride: usize,
}

impl ContentAnalyzer {
    pub fn new(sample_stride: usize) -> Self {
        Self {
            sample_stride: sample_stride.max(1),
        }
    }

    pub fn analyze(&self, image: &DynamicImage) -> ImageAnalysis {
        let rgba = image.to_rgba8();

        let mut sampled: u64 = 0;
        let mut skin: u64 = 0;
        let mut dark: u64 = 0;
        let mut bright: u64 = 0;

        for (i, pixel) in rgba.pixels().enumerate() {
            if i % self.sample_stride != 0 {
                continue;
            }
            sampled += 1;

            let [r, g, b, _] = pixel.0;
            if is_skin_tone(r, g, b) {
                skin += 1;
            }

            let mean = (r as f64 + g as f64 + b as f64) / 3.0;
            if mean < DARK_MEAN {
                dark += 1;
            } else if mean > BRIGHT_MEAN {
                bright += 1;
            }
        }

        if sampled == 0 {
            return ImageAnalysis::neutral("No pixels sampled; skipping heuristic analysis");
        }

        let skin_ratio = skin as f64 / sampled as f64;
        let dark_ratio = dark as f64 / sampled as f64;
        let bright_ratio = bright as f64 / sampled as f64;

        let has_high_skin_tone = skin_ratio > SKIN_RATIO_THRESHOLD;
        let has_extreme_contrast =
            dark_ratio > EXTREME_CONTRAST_RATIO || bright_ratio > EXTREME_CONTRAST_RATIO;
        let has_inappropriate_content = has_high_skin_tone && has_extreme_contrast;

        let confidence = if has_high_skin_tone { 0.6 } else { 0.3 };

        let mut details = vec![format!(
            "skin_ratio={:.3} dark_ratio={:.3} bright_ratio={:.3} sampled={}",
            skin_ratio, dark_ratio, bright_ratio, sampled
        )];
        if has_inappropriate_content {
            details.push("High skin-tone coverage combined with extreme contrast".to_string());
        }

        ImageAnalysis {
            has_nudity: has_inappropriate_content,
            has_violence: false,
            has_inappropriate_content,
            confidence,
            details,
        }
    }
}

/// RGB skin-tone predicate over one pixel
fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    r > 95 && g > 40 && b > 20 && (max - min) > 15 && (r - g).abs() > 15 && r > g && r > b
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const SKIN: Rgb<u8> = Rgb([200, 120, 80]);
    const DARK: Rgb<u8> = Rgb([10, 10, 10]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    fn uniform_image(width: u32, height: u32, color: Rgb<u8>) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
    }

    /// Even rows one color, odd rows another; stride sampling hits both evenly
    fn striped_image(width: u32, height: u32, even: Rgb<u8>, odd: Rgb<u8>) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, y| {
            if y % 2 == 0 {
                even
            } else {
                odd
            }
        }))
    }

    #[test]
    fn test_skin_tone_predicate() {
        assert!(is_skin_tone(150, 80, 60));
        assert!(is_skin_tone(200, 120, 80));
        // grayscale has no channel spread
        assert!(!is_skin_tone(80, 80, 80));
        // blue-dominant
        assert!(!is_skin_tone(50, 60, 200));
        // too dark
        assert!(!is_skin_tone(90, 40, 20));
    }

    #[test]
    fn test_mostly_blue_image_is_clean() {
        let analyzer = ContentAnalyzer::new(10);
        let analysis = analyzer.analyze(&uniform_image(100, 100, BLUE));

        assert!(!analysis.has_inappropriate_content);
        assert_eq!(analysis.confidence, 0.3);
    }

    #[test]
    fn test_skin_with_dark_contrast_is_flagged() {
        let analyzer = ContentAnalyzer::new(10);
        let analysis = analyzer.analyze(&striped_image(100, 100, SKIN, DARK));

        // skin_ratio = 0.5 > 0.3 and dark_ratio = 0.5 > 0.4
        assert!(analysis.has_inappropriate_content);
        assert!(analysis.has_nudity);
        assert_eq!(analysis.confidence, 0.6);
    }

    #[test]
    fn test_skin_without_contrast_is_suspicious_but_not_flagged() {
        let analyzer = ContentAnalyzer::new(10);
        let analysis = analyzer.analyze(&uniform_image(100, 100, SKIN));

        // skin everywhere but no dark/bright pixels
        assert!(!analysis.has_inappropriate_content);
        assert_eq!(analysis.confidence, 0.6);
    }

    #[test]
    fn test_bright_contrast_also_counts_as_extreme() {
        let analyzer = ContentAnalyzer::new(10);
        let bright = Rgb([230, 230, 230]);
        let analysis = analyzer.analyze(&striped_image(100, 100, SKIN, bright));

        assert!(analysis.has_inappropriate_content);
    }

    #[test]
    fn test_stride_one_samples_every_pixel() {
        let analyzer = ContentAnalyzer::new(1);
        let analysis = analyzer.analyze(&uniform_image(60, 60, BLUE));

        assert!(analysis.details[0].contains("sampled=3600"));
    }
}
