pub mod moderation_handler;
