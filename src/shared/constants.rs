/// Default number of flagged images returned to the review queue
pub const DEFAULT_FLAGGED_LIMIT: i64 = 20;

/// Maximum number of flagged images returned in one request
pub const MAX_FLAGGED_LIMIT: i64 = 100;

/// Actor recorded for automated moderation decisions
pub const SYSTEM_ACTOR: &str = "system";

/// Moderation type tag recorded in the audit log
pub const MODERATION_TYPE_NSFW: &str = "nsfw";
