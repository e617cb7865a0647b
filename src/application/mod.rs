//! Application layer - use cases and orchestration.
//!
//! This layer contains the transfer workflow and the helpers
//! used to present its results.

pub mod formatter;
pub mod presentation;
pub mod transfer_service;

pub use formatter::{
    format_emojis_json, format_emojis_table, format_summary, format_token_record, OutputFormat,
};
pub use presentation::{scroll_to_latest, LogView};
pub use transfer_service::{Notifier, TransferService};
