//! Terminal font cell metrics from the kernel's window size record.
//!
//! `TIOCGWINSZ` reports the terminal size both in character cells and in
//! pixels; dividing the two yields the font cell size. Many terminals leave
//! the pixel fields at zero, in which case the configured fallback applies.

use nix::libc;
use tracing::{debug, warn};

use crate::term::errors::TermError;
use crate::term::types::CellMetrics;

/// Font cell size of the terminal on stdout, falling back to `fallback`
/// when the terminal does not report pixel dimensions.
pub fn cell_metrics(fallback: CellMetrics) -> Result<CellMetrics, TermError> {
    let ws = query_winsize()?;

    match metrics_from_winsize(ws.ws_col, ws.ws_row, ws.ws_xpixel, ws.ws_ypixel) {
        Some(metrics) => {
            debug!(
                event = "core.term.cell_metrics_resolved",
                cell_width = metrics.width,
                cell_height = metrics.height
            );
            Ok(metrics)
        }
        None => {
            warn!(
                event = "core.term.no_pixel_metrics_using_fallback",
                fallback_width = fallback.width,
                fallback_height = fallback.height
            );
            Ok(fallback)
        }
    }
}

fn query_winsize() -> Result<libc::winsize, TermError> {
    unsafe {
        let mut winsize: libc::winsize = std::mem::zeroed();
        if libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut winsize) == 0 {
            Ok(winsize)
        } else {
            Err(TermError::WinsizeQueryFailed {
                message: std::io::Error::last_os_error().to_string(),
            })
        }
    }
}

/// Derive cell metrics from a winsize record, or `None` when the terminal
/// reports no usable pixel dimensions.
fn metrics_from_winsize(cols: u16, rows: u16, xpixel: u16, ypixel: u16) -> Option<CellMetrics> {
    if cols == 0 || rows == 0 || xpixel == 0 || ypixel == 0 {
        return None;
    }

    Some(CellMetrics::new(
        u32::from(xpixel) / u32::from(cols),
        u32::from(ypixel) / u32::from(rows),
    ))
}
