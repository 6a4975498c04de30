pub mod moderation_dto;

pub use moderation_dto::{FlaggedQuery, ManualReviewDto, ModeratedImageDto, ModerationLogDto};
