pub mod moderation_log;
pub mod verdict;

pub use moderation_log::{ModerationLog, NewModerationLog};
pub use verdict::{ImageAnalysis, ModerationResult, ReviewAction};
