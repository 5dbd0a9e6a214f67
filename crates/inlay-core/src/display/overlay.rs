//! Overlay window lifecycle.
//!
//! Exactly one overlay window exists at a time. The lifecycle component owns
//! its window id and state machine; the mutex-guarded [`OverlaySlot`] is the
//! single synchronized access point for "which window and image are current",
//! shared with the event-loop thread that repaints on exposure. A `remove`
//! on the command thread and a redraw dispatch on the event-loop thread
//! serialize on that mutex.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::display::errors::{DisplayError, OverlayError};
use crate::display::types::{OverlayState, PixelGeometry, WindowId};
use crate::render::types::RenderedImage;

/// The window-server operations the lifecycle needs. The live connection
/// implements it; lifecycle tests use a recording fake.
pub trait Surface {
    fn create_overlay_window(&self, geometry: &PixelGeometry) -> Result<WindowId, DisplayError>;
    fn map(&self, window: WindowId) -> Result<(), DisplayError>;
    fn unmap(&self, window: WindowId) -> Result<(), DisplayError>;
    fn destroy(&self, window: WindowId) -> Result<(), DisplayError>;
    fn clear_area(&self, window: WindowId) -> Result<(), DisplayError>;
    fn send_redraw(&self, window: WindowId) -> Result<(), DisplayError>;
    fn flush(&self) -> Result<(), DisplayError>;
}

/// Contents of the shared slot: the live overlay window (if any) and the
/// image it should show (if any).
#[derive(Debug, Default)]
pub struct OverlayContent {
    pub window: Option<WindowId>,
    pub image: Option<RenderedImage>,
}

/// Shared handle to the current overlay content. All mutation of "which
/// image is current" goes through this mutex.
pub type OverlaySlot = Arc<Mutex<OverlayContent>>;

/// The single overlay window resource.
pub struct Overlay {
    state: OverlayState,
    window: Option<WindowId>,
    slot: OverlaySlot,
}

impl Overlay {
    pub fn new() -> Self {
        Self {
            state: OverlayState::Unset,
            window: None,
            slot: Arc::new(Mutex::new(OverlayContent::default())),
        }
    }

    /// Handle to the shared content slot, for the event-loop thread.
    pub fn slot(&self) -> OverlaySlot {
        Arc::clone(&self.slot)
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    /// Create and map the overlay window at `geometry`.
    ///
    /// Recreating over a live overlay implicitly tears the old window down
    /// first so window ids never leak.
    pub fn create<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        geometry: &PixelGeometry,
    ) -> Result<WindowId, OverlayError> {
        if self.window.is_some() {
            debug!(event = "core.overlay.recreate_tears_down_previous");
            self.teardown(surface)?;
        }

        let window = surface.create_overlay_window(geometry)?;
        self.window = Some(window);
        self.state = OverlayState::Hidden;

        surface.map(window)?;
        self.state = OverlayState::Mapped;

        {
            let mut content = self.slot.lock().unwrap();
            content.window = Some(window);
            content.image = None;
        }

        surface.flush()?;
        info!(
            event = "core.overlay.created",
            window = window,
            x = geometry.x,
            y = geometry.y,
            width = geometry.width,
            height = geometry.height
        );
        Ok(window)
    }

    /// Replace the current image and request an asynchronous repaint.
    ///
    /// Returns without waiting for the repaint; the event-loop thread blits
    /// the image when the synthetic exposure arrives.
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        image: RenderedImage,
    ) -> Result<(), OverlayError> {
        let window = self.window.ok_or(OverlayError::NotCreated)?;

        {
            let mut content = self.slot.lock().unwrap();
            content.image = Some(image);
        }

        surface.send_redraw(window)?;
        surface.flush()?;
        debug!(event = "core.overlay.draw_requested", window = window);
        Ok(())
    }

    /// Release the current image and erase the window's pixels. The window
    /// stays mapped. Clearing an absent overlay is a no-op.
    pub fn clear<S: Surface + ?Sized>(&mut self, surface: &S) -> Result<(), OverlayError> {
        let Some(window) = self.window else {
            debug!(event = "core.overlay.clear_without_window");
            return Ok(());
        };

        {
            let mut content = self.slot.lock().unwrap();
            content.image = None;
        }

        surface.clear_area(window)?;
        surface.flush()?;
        debug!(event = "core.overlay.cleared", window = window);
        Ok(())
    }

    /// Unmap then destroy the overlay window, releasing its id back to the
    /// server. Performed at most once per window; repeated teardown is a
    /// no-op.
    pub fn teardown<S: Surface + ?Sized>(&mut self, surface: &S) -> Result<(), OverlayError> {
        let Some(window) = self.window.take() else {
            return Ok(());
        };

        {
            let mut content = self.slot.lock().unwrap();
            content.window = None;
            content.image = None;
        }

        if self.state == OverlayState::Mapped {
            surface.unmap(window)?;
        }
        surface.destroy(window)?;
        surface.flush()?;

        self.state = OverlayState::Destroyed;
        info!(event = "core.overlay.destroyed", window = window);
        Ok(())
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every server operation and hands out sequential window ids.
    #[derive(Default)]
    struct RecordingSurface {
        ops: RefCell<Vec<String>>,
        next_window: RefCell<WindowId>,
    }

    impl RecordingSurface {
        fn ops(&self) -> Vec<String> {
            self.ops.borrow().clone()
        }
    }

    impl Surface for RecordingSurface {
        fn create_overlay_window(
            &self,
            _geometry: &PixelGeometry,
        ) -> Result<WindowId, DisplayError> {
            *self.next_window.borrow_mut() += 1;
            let window = *self.next_window.borrow();
            self.ops.borrow_mut().push(format!("create {window}"));
            Ok(window)
        }

        fn map(&self, window: WindowId) -> Result<(), DisplayError> {
            self.ops.borrow_mut().push(format!("map {window}"));
            Ok(())
        }

        fn unmap(&self, window: WindowId) -> Result<(), DisplayError> {
            self.ops.borrow_mut().push(format!("unmap {window}"));
            Ok(())
        }

        fn destroy(&self, window: WindowId) -> Result<(), DisplayError> {
            self.ops.borrow_mut().push(format!("destroy {window}"));
            Ok(())
        }

        fn clear_area(&self, window: WindowId) -> Result<(), DisplayError> {
            self.ops.borrow_mut().push(format!("clear {window}"));
            Ok(())
        }

        fn send_redraw(&self, window: WindowId) -> Result<(), DisplayError> {
            self.ops.borrow_mut().push(format!("redraw {window}"));
            Ok(())
        }

        fn flush(&self) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    fn geometry() -> PixelGeometry {
        PixelGeometry {
            x: 16,
            y: 16,
            width: 80,
            height: 80,
        }
    }

    fn image() -> RenderedImage {
        RenderedImage {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 0],
        }
    }

    #[test]
    fn test_create_maps_window_and_publishes_it() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        let window = overlay.create(&surface, &geometry()).expect("create");

        assert_eq!(overlay.state(), OverlayState::Mapped);
        assert_eq!(overlay.window(), Some(window));
        assert_eq!(surface.ops(), vec!["create 1", "map 1"]);
        assert_eq!(overlay.slot().lock().unwrap().window, Some(window));
    }

    #[test]
    fn test_recreate_tears_down_previous_window_first() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        overlay.create(&surface, &geometry()).expect("first create");
        overlay.create(&surface, &geometry()).expect("second create");

        assert_eq!(
            surface.ops(),
            vec!["create 1", "map 1", "unmap 1", "destroy 1", "create 2", "map 2"]
        );
        assert_eq!(overlay.window(), Some(2));
    }

    #[test]
    fn test_draw_requires_window() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        let err = overlay.draw(&surface, image()).expect_err("no window yet");
        assert!(matches!(err, OverlayError::NotCreated));
    }

    #[test]
    fn test_draw_sets_image_and_requests_redraw() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        overlay.create(&surface, &geometry()).expect("create");
        overlay.draw(&surface, image()).expect("draw");

        assert!(overlay.slot().lock().unwrap().image.is_some());
        assert!(surface.ops().contains(&"redraw 1".to_string()));
    }

    #[test]
    fn test_clear_releases_image_but_keeps_window_mapped() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        overlay.create(&surface, &geometry()).expect("create");
        overlay.draw(&surface, image()).expect("draw");
        overlay.clear(&surface).expect("clear");

        let content = overlay.slot();
        let content = content.lock().unwrap();
        assert!(content.image.is_none());
        assert_eq!(content.window, Some(1));
        assert_eq!(overlay.state(), OverlayState::Mapped);
    }

    #[test]
    fn test_clear_twice_is_idempotent() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        overlay.create(&surface, &geometry()).expect("create");
        overlay.clear(&surface).expect("first clear");
        overlay.clear(&surface).expect("second clear");

        assert_eq!(
            surface.ops(),
            vec!["create 1", "map 1", "clear 1", "clear 1"]
        );
    }

    #[test]
    fn test_clear_without_overlay_is_noop() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        overlay.clear(&surface).expect("clear on empty overlay");
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_teardown_unmaps_then_destroys_once() {
        let surface = RecordingSurface::default();
        let mut overlay = Overlay::new();

        overlay.create(&surface, &geometry()).expect("create");
        overlay.teardown(&surface).expect("first teardown");
        overlay.teardown(&surface).expect("second teardown");

        assert_eq!(
            surface.ops(),
            vec!["create 1", "map 1", "unmap 1", "destroy 1"]
        );
        assert_eq!(overlay.state(), OverlayState::Destroyed);
        assert_eq!(overlay.window(), None);
        assert_eq!(overlay.slot().lock().unwrap().window, None);
    }
}
