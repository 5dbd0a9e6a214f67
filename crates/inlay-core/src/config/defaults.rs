//! Default implementations for configuration types.

use crate::config::types::CellConfig;

/// Returns the default fallback cell width in pixels (8).
///
/// Matches a common bitmap font width; only used when the terminal does not
/// report pixel sizes through `TIOCGWINSZ`.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_cell_width() -> u32 {
    8
}

/// Returns the default fallback cell height in pixels (16).
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_cell_height() -> u32 {
    16
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            fallback_width: default_cell_width(),
            fallback_height: default_cell_height(),
        }
    }
}
