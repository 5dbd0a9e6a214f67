//! The single X server connection.
//!
//! Every other component issues requests through this wrapper instead of
//! holding the wire connection itself. The handle is `Sync`; the command
//! thread and the event-loop thread share it behind an `Arc`, each issuing
//! independent requests.

use tracing::{debug, info};
use x11rb::{COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, CLIENT_MESSAGE_EVENT, ClientMessageEvent, ConnectionExt, CreateGCAux,
    CreateWindowAux, EXPOSE_EVENT, EventMask, ExposeEvent, ImageFormat, WindowClass,
};
use x11rb::rust_connection::RustConnection;

use crate::display::correlate::WindowTree;
use crate::display::errors::DisplayError;
use crate::display::overlay::Surface;
use crate::display::types::{PixelGeometry, PixelOrigin, WindowId};
use crate::process::types::Pid;
use crate::render::types::RenderedImage;

/// Name of the per-window property that well-behaved clients set to the pid
/// of the process that created the window.
const WM_PID_PROPERTY: &str = "_NET_WM_PID";

/// Private atom carried by the shutdown client message.
const SHUTDOWN_MESSAGE: &str = "INLAY_SHUTDOWN";

/// Bytes of fixed header in a PutImage request.
const PUT_IMAGE_HEADER: usize = 24;

pub struct DisplayServer {
    conn: RustConnection,
    root: WindowId,
    root_depth: u8,
    root_visual: u32,
    black_pixel: u32,
    wm_pid_atom: Atom,
    shutdown_atom: Atom,
    /// Never-mapped mailbox window the shutdown message is delivered to.
    control_window: WindowId,
}

impl DisplayServer {
    /// Connect to the display named by the environment and select the screen
    /// the display configuration points at.
    ///
    /// An unreachable server is fatal to the caller; there is no retry.
    pub fn connect() -> Result<Self, DisplayError> {
        let (conn, screen_num) = x11rb::connect(None).map_err(|e| {
            DisplayError::ConnectionFailed {
                message: e.to_string(),
            }
        })?;

        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let root_depth = screen.root_depth;
        let root_visual = screen.root_visual;
        let black_pixel = screen.black_pixel;

        let wm_pid_atom = intern_atom(&conn, WM_PID_PROPERTY)?;
        let shutdown_atom = intern_atom(&conn, SHUTDOWN_MESSAGE)?;
        let control_window = create_control_window(&conn, root)?;

        conn.flush()
            .map_err(|e| request_failed("flush", &e))?;

        info!(
            event = "core.display.connected",
            screen = screen_num,
            root = root
        );

        Ok(Self {
            conn,
            root,
            root_depth,
            root_visual,
            black_pixel,
            wm_pid_atom,
            shutdown_atom,
            control_window,
        })
    }

    /// Root window of the selected screen.
    pub fn root(&self) -> WindowId {
        self.root
    }

    /// Atom carried by the shutdown client message.
    pub fn shutdown_atom(&self) -> Atom {
        self.shutdown_atom
    }

    /// Block until the server delivers the next event.
    pub fn wait_for_event(&self) -> Result<Event, DisplayError> {
        self.conn
            .wait_for_event()
            .map_err(|e| request_failed("wait_for_event", &e))
    }

    /// Create the unmapped overlay window at the given geometry, selecting
    /// exposure events only.
    pub fn create_overlay_window(
        &self,
        geometry: &PixelGeometry,
    ) -> Result<WindowId, DisplayError> {
        let window = self
            .conn
            .generate_id()
            .map_err(|e| request_failed("generate_id", &e))?;

        let aux = CreateWindowAux::new()
            .background_pixel(self.black_pixel)
            .border_pixel(self.black_pixel)
            .event_mask(EventMask::EXPOSURE);

        self.conn
            .create_window(
                self.root_depth,
                window,
                self.root,
                clamp_pos(geometry.x),
                clamp_pos(geometry.y),
                clamp_dim(geometry.width),
                clamp_dim(geometry.height),
                0,
                WindowClass::INPUT_OUTPUT,
                self.root_visual,
                &aux,
            )
            .map_err(|e| request_failed("create_window", &e))?;

        debug!(
            event = "core.display.overlay_window_created",
            window = window,
            x = geometry.x,
            y = geometry.y,
            width = geometry.width,
            height = geometry.height
        );
        Ok(window)
    }

    pub fn map(&self, window: WindowId) -> Result<(), DisplayError> {
        self.conn
            .map_window(window)
            .map_err(|e| request_failed("map_window", &e))?;
        Ok(())
    }

    pub fn unmap(&self, window: WindowId) -> Result<(), DisplayError> {
        self.conn
            .unmap_window(window)
            .map_err(|e| request_failed("unmap_window", &e))?;
        Ok(())
    }

    pub fn destroy(&self, window: WindowId) -> Result<(), DisplayError> {
        self.conn
            .destroy_window(window)
            .map_err(|e| request_failed("destroy_window", &e))?;
        Ok(())
    }

    /// Erase the window's pixels without destroying the window.
    pub fn clear_area(&self, window: WindowId) -> Result<(), DisplayError> {
        self.conn
            .clear_area(false, window, 0, 0, 0, 0)
            .map_err(|e| request_failed("clear_area", &e))?;
        Ok(())
    }

    /// Inject a synthetic exposure event to trigger a repaint of `window`
    /// on the event-loop thread.
    pub fn send_redraw(&self, window: WindowId) -> Result<(), DisplayError> {
        let expose = ExposeEvent {
            response_type: EXPOSE_EVENT,
            sequence: 0,
            window,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            count: 0,
        };
        self.conn
            .send_event(false, window, EventMask::EXPOSURE, expose)
            .map_err(|e| request_failed("send_event", &e))?;
        Ok(())
    }

    /// Deliver the shutdown client message to the control window, ending the
    /// event loop.
    ///
    /// Once the loop has exited nothing waits on the control window any
    /// more, so a redundant shutdown is dropped by the server rather than
    /// crashing anything.
    pub fn send_shutdown(&self) -> Result<(), DisplayError> {
        let message = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: self.control_window,
            type_: self.shutdown_atom,
            data: [0u32, 0, 0, 0, 0].into(),
        };
        self.conn
            .send_event(false, self.control_window, EventMask::NO_EVENT, message)
            .map_err(|e| request_failed("send_event", &e))?;
        self.flush()
    }

    /// Blit a rendered image into `window`, chunked by rows so no single
    /// request exceeds the server's maximum request length.
    pub fn put_image(&self, window: WindowId, image: &RenderedImage) -> Result<(), DisplayError> {
        let gc = self
            .conn
            .generate_id()
            .map_err(|e| request_failed("generate_id", &e))?;
        self.conn
            .create_gc(gc, window, &CreateGCAux::new())
            .map_err(|e| request_failed("create_gc", &e))?;

        let stride = image.stride();
        let max_data_bytes = self
            .conn
            .maximum_request_bytes()
            .saturating_sub(PUT_IMAGE_HEADER);
        let rows_per_chunk = (max_data_bytes / stride.max(1)).max(1) as u32;

        let mut y = 0u32;
        while y < image.height {
            let rows = rows_per_chunk.min(image.height - y);
            let start = y as usize * stride;
            let end = (y + rows) as usize * stride;
            self.conn
                .put_image(
                    ImageFormat::Z_PIXMAP,
                    window,
                    gc,
                    clamp_dim(image.width),
                    clamp_dim(rows),
                    0,
                    clamp_pos(y as i32),
                    0,
                    self.root_depth,
                    &image.data[start..end],
                )
                .map_err(|e| request_failed("put_image", &e))?;
            y += rows;
        }

        self.conn
            .free_gc(gc)
            .map_err(|e| request_failed("free_gc", &e))?;
        self.flush()
    }

    /// Best-effort absolute position of a window on the screen, used to
    /// place the overlay relative to the correlated terminal window.
    pub fn window_origin(&self, window: WindowId) -> Option<PixelOrigin> {
        let reply = self
            .conn
            .translate_coordinates(window, self.root, 0, 0)
            .ok()?
            .reply()
            .ok()?;
        Some(PixelOrigin::new(
            i32::from(reply.dst_x),
            i32::from(reply.dst_y),
        ))
    }

    pub fn flush(&self) -> Result<(), DisplayError> {
        self.conn
            .flush()
            .map_err(|e| request_failed("flush", &e))
    }
}

impl WindowTree for DisplayServer {
    /// Children of `window`, or `None` when the subtree query fails (the
    /// window may have vanished mid-enumeration; the subtree is skipped).
    fn child_windows(&self, window: WindowId) -> Option<Vec<WindowId>> {
        let reply = match self.conn.query_tree(window) {
            Ok(cookie) => cookie.reply(),
            Err(e) => {
                debug!(event = "core.display.subtree_query_failed", window = window, error = %e);
                return None;
            }
        };
        match reply {
            Ok(tree) => Some(tree.children),
            Err(e) => {
                debug!(event = "core.display.subtree_query_failed", window = window, error = %e);
                None
            }
        }
    }

    /// Owning pid recorded in the window's `_NET_WM_PID` property, or `None`
    /// when the property is absent, malformed, or the window is gone.
    fn window_pid(&self, window: WindowId) -> Option<Pid> {
        let reply = self
            .conn
            .get_property(false, window, self.wm_pid_atom, AtomEnum::CARDINAL, 0, 1)
            .ok()?
            .reply()
            .ok()?;

        if reply.format != 32 {
            return None;
        }
        reply
            .value32()?
            .next()
            .filter(|&pid| pid != 0)
            .map(Pid::from_raw)
    }
}

impl Surface for DisplayServer {
    fn create_overlay_window(&self, geometry: &PixelGeometry) -> Result<WindowId, DisplayError> {
        DisplayServer::create_overlay_window(self, geometry)
    }

    fn map(&self, window: WindowId) -> Result<(), DisplayError> {
        DisplayServer::map(self, window)
    }

    fn unmap(&self, window: WindowId) -> Result<(), DisplayError> {
        DisplayServer::unmap(self, window)
    }

    fn destroy(&self, window: WindowId) -> Result<(), DisplayError> {
        DisplayServer::destroy(self, window)
    }

    fn clear_area(&self, window: WindowId) -> Result<(), DisplayError> {
        DisplayServer::clear_area(self, window)
    }

    fn send_redraw(&self, window: WindowId) -> Result<(), DisplayError> {
        DisplayServer::send_redraw(self, window)
    }

    fn flush(&self) -> Result<(), DisplayError> {
        DisplayServer::flush(self)
    }
}

fn intern_atom(conn: &RustConnection, name: &str) -> Result<Atom, DisplayError> {
    let reply = conn
        .intern_atom(false, name.as_bytes())
        .map_err(|e| DisplayError::ConnectionFailed {
            message: e.to_string(),
        })?
        .reply()
        .map_err(|e| DisplayError::ConnectionFailed {
            message: e.to_string(),
        })?;
    Ok(reply.atom)
}

/// Create the 1x1 input-only window that serves as the shutdown mailbox.
/// It is never mapped; a client message sent to it with an empty event mask
/// is delivered to us as its creator.
fn create_control_window(
    conn: &RustConnection,
    root: WindowId,
) -> Result<WindowId, DisplayError> {
    let window = conn.generate_id().map_err(|e| DisplayError::ConnectionFailed {
        message: e.to_string(),
    })?;

    conn.create_window(
        COPY_DEPTH_FROM_PARENT,
        window,
        root,
        -1,
        -1,
        1,
        1,
        0,
        WindowClass::INPUT_ONLY,
        COPY_FROM_PARENT,
        &CreateWindowAux::new(),
    )
    .map_err(|e| DisplayError::ConnectionFailed {
        message: e.to_string(),
    })?;

    Ok(window)
}

fn request_failed(operation: &'static str, error: &dyn std::fmt::Display) -> DisplayError {
    DisplayError::RequestFailed {
        operation,
        message: error.to_string(),
    }
}

fn clamp_dim(value: u32) -> u16 {
    value.min(u32::from(u16::MAX)) as u16
}

fn clamp_pos(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_dim_saturates() {
        assert_eq!(clamp_dim(80), 80);
        assert_eq!(clamp_dim(100_000), u16::MAX);
    }

    #[test]
    fn test_clamp_pos_saturates_both_ends() {
        assert_eq!(clamp_pos(16), 16);
        assert_eq!(clamp_pos(100_000), i16::MAX);
        assert_eq!(clamp_pos(-100_000), i16::MIN);
    }
}
