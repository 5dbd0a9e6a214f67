//! inlay-core: Core library for terminal image overlays
//!
//! This library locates the X11 window that hosts a terminal process,
//! manages a single overlay window stacked above it, and keeps the image
//! shown inside that overlay synchronized with JSON add/remove commands.
//! It is used by the `inlay` CLI.
//!
//! # Main Entry Points
//!
//! - [`display`] - X server connection, window correlation, overlay, event loop
//! - [`commands`] - Parse and execute add/remove commands
//! - [`process`] - Process ancestry chains
//! - [`mux`] - Terminal multiplexer client enumeration
//! - [`term`] - Terminal font cell metrics
//! - [`render`] - Image loading and scaling
//! - [`config`] - Configuration management

pub mod commands;
pub mod config;
pub mod display;
pub mod errors;
pub mod events;
pub mod logging;
pub mod mux;
pub mod process;
pub mod render;
pub mod term;

// Re-export commonly used types at crate root for convenience
pub use commands::types::Command;
pub use config::InlayConfig;
pub use display::correlate::{CorrelationOutcome, WindowTree};
pub use display::event_loop::Dispatch;
pub use display::overlay::{Overlay, OverlaySlot, Surface};
pub use display::server::DisplayServer;
pub use display::types::{PixelGeometry, WindowId};
pub use process::types::Pid;
pub use term::types::CellMetrics;

// Re-export logging initialization
pub use logging::init_logging;
