pub mod moderation_worker;

pub use moderation_worker::ModerationWorker;
