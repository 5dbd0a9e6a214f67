use serde::{Deserialize, Serialize};

/// Font cell dimensions of the hosting terminal, in pixels.
///
/// Commands address the screen in character cells; these metrics convert
/// cell units into the pixel units the window server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMetrics {
    pub width: u32,
    pub height: u32,
}

impl CellMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
