use serde::{Deserialize, Serialize};

/// Window handle assigned by the X server, unique within one connection.
pub type WindowId = u32;

/// Overlay window placement and size in pixels, relative to the screen root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Pixel offset applied to command geometry, normally the top-left corner
/// of the correlated terminal window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelOrigin {
    pub x: i32,
    pub y: i32,
}

impl PixelOrigin {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Lifecycle of the single overlay window.
///
/// `Hidden` is created-but-unmapped. Exactly one overlay window id is live
/// at a time; `Destroyed` means the previous id was released back to the
/// server and a new `create` starts the cycle over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Unset,
    Hidden,
    Mapped,
    Destroyed,
}
