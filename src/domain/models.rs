//! Domain models for emoji transfer.
//!
//! These models mirror the JSON shapes exchanged with Misskey-style servers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named custom image asset as exposed by `/api/emojis`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emoji {
    /// Shortcode (e.g. "blobcat" for :blobcat:).
    pub name: String,
    /// Image URL on the source instance.
    pub url: String,
    /// Category, `null` on servers where it was never set.
    #[serde(default)]
    pub category: Option<String>,
    /// Alternative shortcodes, in server order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub aliases: Vec<String>,
}

/// Reads a JSON `null` list as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Emoji {
    /// Whether this emoji matches a free-text search term.
    ///
    /// Case-insensitive substring match on name, category and aliases.
    /// An empty (or whitespace) term matches everything.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&term)
            || self
                .category
                .as_ref()
                .is_some_and(|c| c.to_lowercase().contains(&term))
            || self
                .aliases
                .iter()
                .any(|a| a.to_lowercase().contains(&term))
    }
}

/// Response body of `GET /api/emojis`.
///
/// `emojis` is required: a 2xx body without it is a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct EmojisResponse {
    pub emojis: Vec<Emoji>,
}

/// Request body of `POST /api/admin/emoji/add`.
///
/// The API token travels in the body as `i`, not in a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddEmojiRequest {
    pub i: String,
    pub name: String,
    pub url: String,
    pub category: Option<String>,
    pub aliases: Vec<String>,
}

impl AddEmojiRequest {
    /// Build the payload for one emoji.
    #[must_use]
    pub fn new(token: &str, emoji: &Emoji) -> Self {
        Self {
            i: token.to_string(),
            name: emoji.name.clone(),
            url: emoji.url.clone(),
            category: emoji.category.clone(),
            aliases: emoji.aliases.clone(),
        }
    }
}

/// Ordered emoji catalog with no two structurally identical entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmojiCatalog {
    emojis: Vec<Emoji>,
}

impl EmojiCatalog {
    /// Build a catalog, dropping later duplicates.
    ///
    /// Entries are compared through their canonical JSON encoding, so the
    /// key order of the server response never matters. First occurrences
    /// keep their relative order.
    #[must_use]
    pub fn from_emojis(emojis: Vec<Emoji>) -> Self {
        let mut seen = HashSet::with_capacity(emojis.len());
        let emojis = emojis
            .into_iter()
            .filter(|emoji| {
                // Typed struct serializes fields in declaration order.
                let key = serde_json::to_string(emoji).unwrap_or_else(|_| format!("{emoji:?}"));
                seen.insert(key)
            })
            .collect();

        Self { emojis }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Emoji] {
        &self.emojis
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emojis.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }

    /// Find an emoji by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.name == name)
    }

    /// Emojis matching a search term, in catalog order.
    pub fn matching<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Emoji> + 'a {
        self.emojis.iter().filter(move |e| e.matches(term))
    }
}

/// Per-domain persisted token pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default)]
    pub emoji_api_token: String,
    #[serde(default)]
    pub drive_api_token: String,
}

impl TokenRecord {
    #[must_use]
    pub fn new(emoji_api_token: impl Into<String>, drive_api_token: impl Into<String>) -> Self {
        Self {
            emoji_api_token: emoji_api_token.into(),
            drive_api_token: drive_api_token.into(),
        }
    }
}

/// Source, destination and credential for one transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferConfig {
    pub source_domain: String,
    pub destination_domain: String,
    pub api_token: String,
}

impl TransferConfig {
    /// Source base URL with `https://` added when no scheme is present.
    ///
    /// The destination is deliberately left as typed.
    #[must_use]
    pub fn source_base_url(&self) -> String {
        with_default_scheme(&self.source_domain)
    }
}

/// Prefix `https://` unless the value already starts with `http://` or `https://`.
#[must_use]
pub fn with_default_scheme(domain: &str) -> String {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// One POST attempt recorded during an import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportLogEntry {
    pub at: DateTime<Utc>,
    pub name: String,
    /// HTTP status, or `None` when no response arrived.
    pub status: Option<u16>,
}

impl ImportLogEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            at: Utc::now(),
            name: name.into(),
            status,
        }
    }
}

/// Result of an import action, carrying the acknowledgment shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every selected emoji was posted.
    AllImported { count: usize },
    /// The first selected emoji was posted.
    SelectedImported { name: String },
    /// Bulk import aborted at the first failure.
    AllFailed,
    /// Single import failed (or nothing was selected).
    SelectedFailed,
}

impl ImportOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::AllImported { .. } | Self::SelectedImported { .. })
    }
}

impl std::fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllImported { .. } => write!(f, "All emojis imported successfully!"),
            Self::SelectedImported { name } => write!(f, "Emoji \"{name}\" imported successfully!"),
            Self::AllFailed => write!(f, "Failed to import some or all emojis."),
            Self::SelectedFailed => write!(f, "Failed to import the selected emoji."),
        }
    }
}
