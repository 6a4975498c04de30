pub mod combiner;
pub mod content_analyzer;
pub mod external_classifier;
pub mod image_validator;
pub mod moderation_service;
pub mod moderation_store;

pub use content_analyzer::ContentAnalyzer;
pub use external_classifier::ExternalClassifier;
pub use image_validator::ImageValidator;
pub use moderation_service::ModerationService;
pub use moderation_store::ModerationStore;
