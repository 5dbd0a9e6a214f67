//! Command parsing and execution.
//!
//! One JSON object per line arrives on the control channel. Rejected input
//! (malformed payload, unknown action, failed image load) is logged and
//! dropped without touching overlay state; the loop that feeds this module
//! never aborts on a bad command.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::commands::errors::CommandError;
use crate::commands::types::Command;
use crate::display::overlay::{Overlay, Surface};
use crate::display::types::{PixelGeometry, PixelOrigin};
use crate::errors::InlayError;
use crate::render;
use crate::term::types::CellMetrics;

/// Actions this executor recognizes; anything else is rejected before the
/// typed parse so the warning can name the action.
const KNOWN_ACTIONS: [&str; 2] = ["add", "remove"];

/// Parse one command line, distinguishing a malformed payload from a
/// payload that is valid JSON but names an action we do not support.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| CommandError::MalformedPayload {
            message: e.to_string(),
        })?;

    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| CommandError::MalformedPayload {
            message: "missing 'action' field".to_string(),
        })?;

    if !KNOWN_ACTIONS.contains(&action) {
        return Err(CommandError::UnknownAction {
            action: action.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| CommandError::MalformedPayload {
        message: e.to_string(),
    })
}

/// Convert a cell-unit command rectangle into the overlay's pixel geometry,
/// offset by the correlated terminal window's origin.
pub fn pixel_geometry(
    x: i32,
    y: i32,
    max_width: u32,
    max_height: u32,
    metrics: CellMetrics,
    origin: PixelOrigin,
) -> PixelGeometry {
    PixelGeometry {
        x: origin.x + x * metrics.width as i32,
        y: origin.y + y * metrics.height as i32,
        width: max_width * metrics.width,
        height: max_height * metrics.height,
    }
}

/// Execute a parsed command against the overlay.
pub fn execute<S: Surface + ?Sized>(
    command: &Command,
    surface: &S,
    overlay: &mut Overlay,
    metrics: CellMetrics,
    origin: PixelOrigin,
) -> Result<(), CommandError> {
    match command {
        Command::Add {
            path,
            x,
            y,
            max_width,
            max_height,
        } => {
            let geometry = pixel_geometry(*x, *y, *max_width, *max_height, metrics, origin);
            overlay.create(surface, &geometry)?;
            let image = render::load(Path::new(path), geometry.width, geometry.height)?;
            overlay.draw(surface, image)?;
            info!(
                event = "core.commands.add_completed",
                path = %path,
                width = geometry.width,
                height = geometry.height
            );
        }
        Command::Remove => {
            overlay.clear(surface)?;
            info!(event = "core.commands.remove_completed");
        }
    }
    Ok(())
}

/// Parse and execute one command line, absorbing every failure into a log
/// line. Returns whether the command took effect.
pub fn handle_line<S: Surface + ?Sized>(
    line: &str,
    surface: &S,
    overlay: &mut Overlay,
    metrics: CellMetrics,
    origin: PixelOrigin,
) -> bool {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(e) => {
            warn!(
                event = "core.commands.rejected",
                error_code = e.error_code(),
                error = %e
            );
            return false;
        }
    };

    match execute(&command, surface, overlay, metrics, origin) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                event = "core.commands.failed",
                error_code = e.error_code(),
                error = %e
            );
            false
        }
    }
}
