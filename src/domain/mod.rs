//! Domain layer - core types and error definitions.
//!
//! This layer contains pure domain models and error types
//! without any I/O (HTTP, database, filesystem).

pub mod error;
pub mod models;
pub mod settings;

pub use error::{AppError, Result};
pub use models::{
    AddEmojiRequest, Emoji, EmojiCatalog, EmojisResponse, ImportLogEntry, ImportOutcome,
    TokenRecord, TransferConfig,
};
pub use settings::{AppConfig, HttpSettings};
