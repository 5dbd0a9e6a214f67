pub mod defaults;
pub mod loading;
pub mod types;

pub use loading::load_config;
pub use types::{CellConfig, InlayConfig, OverlayConfig};
