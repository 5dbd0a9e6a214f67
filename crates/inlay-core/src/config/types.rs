//! Configuration type definitions for inlay.
//!
//! These types are deserialized from the optional TOML config file.
//!
//! # Example Configuration
//!
//! ```toml
//! [cell]
//! fallback_width = 10
//! fallback_height = 20
//!
//! [overlay]
//! origin_x = 0
//! origin_y = 0
//! ```

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Main configuration loaded from `~/.inlay/config.toml`.
///
/// A missing config file is not an error; every field has a built-in
/// default. A config file that exists but fails to parse is an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct InlayConfig {
    /// Font cell fallbacks used when the terminal reports no pixel sizes
    #[serde(default)]
    pub cell: CellConfig,

    /// Overlay placement fallbacks used when window correlation finds nothing
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Fallback font cell dimensions in pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellConfig {
    #[serde(default = "defaults::default_cell_width")]
    pub fallback_width: u32,

    #[serde(default = "defaults::default_cell_height")]
    pub fallback_height: u32,
}

/// Pixel origin applied to overlay geometry when no terminal window
/// could be correlated.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OverlayConfig {
    #[serde(default)]
    pub origin_x: i32,

    #[serde(default)]
    pub origin_y: i32,
}
