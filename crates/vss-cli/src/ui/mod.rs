//! # CLI UI Module
//!
//! Consistent styling and formatting for VSS CLI output.
//!
//! ## Design Principles
//!
//! 1. **Scannable**: success/failure identifiable at a glance
//! 2. **Accessible**: works without colors (respects `NO_COLOR`)
//! 3. **Scriptable**: machine-parseable with `--json` flags
//!
//! ## Module Structure
//!
//! - `color`: color mode detection
//! - `style`: message types, prefixes, and styling
//! - `table`: table rendering with comfy-table

pub mod color;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use style::{MessageType, Style};
pub use table::{render_indexes_table, render_results_table};
