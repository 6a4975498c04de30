pub mod listings;
pub mod moderation;
