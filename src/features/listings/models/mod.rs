pub mod listing_image;

pub use listing_image::{ListingImage, ModerationStatus};
