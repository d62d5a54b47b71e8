//! Color mode detection for terminal output.

use std::io::IsTerminal;
use std::str::FromStr;

/// Color output mode, settable via `--color` or detected from the
/// environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Always emit color codes.
    Always,
    /// Never emit color codes.
    Never,
    /// Detect: color when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
}

impl ColorMode {
    /// Detect the effective mode from the environment.
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            Self::Never
        } else if std::io::stdout().is_terminal() {
            Self::Always
        } else {
            Self::Never
        }
    }

    /// Whether colors should be emitted under this mode.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => Self::detect().is_enabled(),
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "auto" => Ok(Self::Auto),
            other => Err(format!("Invalid color mode: {}", other)),
        }
    }
}
