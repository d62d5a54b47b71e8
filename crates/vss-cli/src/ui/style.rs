//! Message styling for CLI output.
//!
//! Provides consistent prefixes and colors for all CLI messages.
//!
//! | Prefix | Meaning | Color |
//! |--------|---------|-------|
//! | `[ok]` | Success | Green |
//! | `[err]` | Error | Red |
//! | `[info]` | Information | Blue |
//! | `[hint]` | Suggestion | Cyan |

use owo_colors::OwoColorize;

use super::color::ColorMode;

/// Message severity/type for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Success - operation completed
    Ok,
    /// Error - operation failed
    Err,
    /// Information - neutral status
    Info,
    /// Hint - actionable next step
    Hint,
}

impl MessageType {
    /// Returns the prefix text for this message type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ok => "[ok]",
            Self::Err => "[err]",
            Self::Info => "[info]",
            Self::Hint => "[hint]",
        }
    }
}

/// Main styling interface for CLI output.
#[derive(Debug, Clone)]
pub struct Style {
    color_mode: ColorMode,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

impl Style {
    /// Create a Style with an explicit color mode.
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// Format a message with a type prefix.
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if self.colors_enabled() {
            let colored_prefix = match msg_type {
                MessageType::Ok => prefix.green().to_string(),
                MessageType::Err => prefix.red().to_string(),
                MessageType::Info => prefix.blue().to_string(),
                MessageType::Hint => prefix.cyan().to_string(),
            };
            format!("{} {}", colored_prefix, text)
        } else {
            format!("{} {}", prefix, text)
        }
    }

    /// Format an error with optional detail and hint lines.
    pub fn error_with_context(
        &self,
        summary: &str,
        detail: Option<&str>,
        hint: Option<&str>,
    ) -> String {
        let mut out = self.message(MessageType::Err, summary);
        if let Some(detail) = detail {
            out.push_str(&format!("\n      {}", detail));
        }
        if let Some(hint) = hint {
            out.push('\n');
            out.push_str(&self.message(MessageType::Hint, hint));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_without_color() {
        let style = Style::new(ColorMode::Never);
        assert_eq!(style.message(MessageType::Ok, "Done"), "[ok] Done");
        assert_eq!(style.message(MessageType::Err, "Nope"), "[err] Nope");
    }

    #[test]
    fn test_error_with_context() {
        let style = Style::new(ColorMode::Never);
        let out = style.error_with_context("Failed", Some("because"), Some("try --force"));
        assert!(out.contains("[err] Failed"));
        assert!(out.contains("because"));
        assert!(out.contains("[hint] try --force"));
    }
}
