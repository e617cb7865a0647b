//! Presentation helpers for request logs.

use colored::{ColoredString, Colorize};

use crate::domain::ImportLogEntry;

/// Display class derived from an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Warning,
    Danger,
}

impl StatusClass {
    /// Apply the class color to a piece of text.
    #[must_use]
    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            Self::Success => text.green(),
            Self::Warning => text.yellow(),
            Self::Danger => text.red(),
        }
    }
}

/// Classify a status code: 2xx success, 4xx warning, anything else danger.
#[must_use]
pub const fn status_class(code: i64) -> StatusClass {
    match code {
        200..=299 => StatusClass::Success,
        400..=499 => StatusClass::Warning,
        _ => StatusClass::Danger,
    }
}

/// Fixed-height scrollable window over log lines.
#[derive(Debug, Clone)]
pub struct LogView {
    lines: Vec<String>,
    height: usize,
    offset: usize,
}

impl LogView {
    #[must_use]
    pub const fn new(height: usize) -> Self {
        Self {
            lines: Vec::new(),
            height,
            offset: 0,
        }
    }

    /// Build a view from request log entries, one colored line each.
    #[must_use]
    pub fn from_entries(entries: &[ImportLogEntry], height: usize) -> Self {
        let mut view = Self::new(height);
        for entry in entries {
            view.push(format_entry(entry));
        }
        view
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Largest offset that still fills the window.
    #[must_use]
    pub fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    /// Lines currently inside the window.
    #[must_use]
    pub fn visible(&self) -> &[String] {
        let start = self.offset.min(self.lines.len());
        let end = (start + self.height).min(self.lines.len());
        &self.lines[start..end]
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.visible().join("\n")
    }
}

/// Scroll a log view to its newest entry. No-op without a view.
pub fn scroll_to_latest(view: Option<&mut LogView>) {
    if let Some(view) = view {
        view.offset = view.max_offset();
    }
}

fn format_entry(entry: &ImportLogEntry) -> String {
    let (label, class) = entry.status.map_or_else(
        || ("ERR".to_string(), StatusClass::Danger),
        |code| (code.to_string(), status_class(i64::from(code))),
    );

    format!(
        "{} [{}] {}",
        entry.at.format("%H:%M:%S"),
        class.paint(&label),
        entry.name
    )
}
