use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Formats the upload surface accepts for listing photos
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Successfully decoded and bounds-checked image, ready for analysis
#[derive(Debug)]
pub struct ValidatedImage {
    pub image: DynamicImage,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// Diagnostics collected for an image that failed validation
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub issues: Vec<String>,
}

impl ValidationFailure {
    fn new(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }

    pub fn summary(&self) -> String {
        self.issues.join("; ")
    }
}

/// Validates format, integrity and dimensions of uploaded images.
///
/// The dimension window bounds analysis cost and catches corrupted files and
/// decompression bombs before any pixels are inspected.
pub struct ImageValidator {
    min_dimension: u32,
    max_dimension: u32,
}

impl ImageValidator {
    pub fn new(min_dimension: u32, max_dimension: u32) -> Self {
        Self {
            min_dimension,
            max_dimension,
        }
    }

    pub fn validate_bytes(&self, bytes: &[u8]) -> Result<ValidatedImage, ValidationFailure> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ValidationFailure::new(format!("Failed to probe image format: {}", e)))?;

        let format = reader
            .format()
            .ok_or_else(|| ValidationFailure::new("Unrecognized image format".to_string()))?;

        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(ValidationFailure::new(format!(
                "Unsupported image format: {:?}",
                format
            )));
        }

        let image = reader
            .decode()
            .map_err(|e| ValidationFailure::new(format!("Failed to decode image: {}", e)))?;

        let (width, height) = (image.width(), image.height());
        let mut issues = Vec::new();

        if width < self.min_dimension || height < self.min_dimension {
            issues.push(format!(
                "Image too small: {}x{} (minimum {}x{})",
                width, height, self.min_dimension, self.min_dimension
            ));
        }
        if width > self.max_dimension || height > self.max_dimension {
            issues.push(format!(
                "Image too large: {}x{} (maximum {}x{})",
                width, height, self.max_dimension, self.max_dimension
            ));
        }

        if !issues.is_empty() {
            return Err(ValidationFailure { issues });
        }

        Ok(ValidatedImage {
            image,
            width,
            height,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut buf, format)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_valid_png_passes() {
        let validator = ImageValidator::new(50, 10000);
        let bytes = encode(&RgbImage::new(100, 80), ImageFormat::Png);

        let valid = validator.validate_bytes(&bytes).unwrap();
        assert_eq!(valid.width, 100);
        assert_eq!(valid.height, 80);
        assert_eq!(valid.format, ImageFormat::Png);
    }

    #[test]
    fn test_valid_jpeg_passes() {
        let validator = ImageValidator::new(50, 10000);
        let bytes = encode(&RgbImage::new(800, 600), ImageFormat::Jpeg);

        let valid = validator.validate_bytes(&bytes).unwrap();
        assert_eq!(valid.format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_undersized_image_fails_with_too_small() {
        let validator = ImageValidator::new(50, 10000);
        let bytes = encode(&RgbImage::new(20, 20), ImageFormat::Png);

        let failure = validator.validate_bytes(&bytes).unwrap_err();
        assert!(failure.summary().contains("too small"));
    }

    #[test]
    fn test_oversized_image_fails_with_too_large() {
        let validator = ImageValidator::new(50, 200);
        let bytes = encode(&RgbImage::new(300, 100), ImageFormat::Png);

        let failure = validator.validate_bytes(&bytes).unwrap_err();
        assert!(failure.summary().contains("too large"));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let validator = ImageValidator::new(50, 10000);
        let failure = validator
            .validate_bytes(b"definitely not an image")
            .unwrap_err();
        assert!(!failure.issues.is_empty());
    }

    #[test]
    fn test_empty_input_fails() {
        let validator = ImageValidator::new(50, 10000);
        let failure = validator.validate_bytes(&[]).unwrap_err();
        assert!(!failure.issues.is_empty());
    }
}
