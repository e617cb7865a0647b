//! Infrastructure layer - external adapters (HTTP, database, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod emoji_api;
pub mod token_store;

pub use config::{config_file_path, ensure_config_exists, load_config, save_config};
pub use emoji_api::{EmojiApi, HttpEmojiApi};
pub use token_store::TokenStore;
