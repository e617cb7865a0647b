//! Output formatting for emoji catalogs.
//!
//! Supports a table view and JSON.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{Emoji, TokenRecord};

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Compact table listing.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

/// Formats a table listing of emojis.
pub fn format_emojis_table(emojis: &[&Emoji]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Name", "Category", "Aliases", "URL"]);

    for (i, emoji) in emojis.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            emoji.name.clone(),
            emoji.category.clone().unwrap_or_else(|| "-".to_string()),
            truncate(&emoji.aliases.join(", "), 30),
            truncate(&emoji.url, 50),
        ]);
    }

    table.to_string()
}

/// Formats emojis as JSON in the `/api/emojis` entry shape.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_emojis_json(emojis: &[&Emoji]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(emojis)
}

/// One-line catalog summary.
pub fn format_summary(shown: usize, total: usize, search_term: &str) -> String {
    if search_term.trim().is_empty() {
        format!("{} {} emojis", "📦".bold(), total.to_string().cyan())
    } else {
        format!(
            "{} {} of {} emojis match \"{}\"",
            "🔍".bold(),
            shown.to_string().cyan(),
            total.to_string().cyan(),
            search_term
        )
    }
}

/// Formats a stored token record with secrets masked.
pub fn format_token_record(domain: &str, record: &TokenRecord) -> String {
    format!(
        "{}\n  Emoji API token: {}\n  Drive API token: {}",
        domain.bold(),
        mask(&record.emoji_api_token),
        mask(&record.drive_api_token)
    )
}

/// Keeps the last four characters of a secret visible.
///
/// Secrets of eight characters or fewer are masked entirely.
fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }

    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().skip(count.saturating_sub(4)).collect();
    format!("{}{visible}", "*".repeat(count.saturating_sub(4)))
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
