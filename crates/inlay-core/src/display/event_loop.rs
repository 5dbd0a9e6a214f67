//! The dedicated event-loop thread.
//!
//! One background thread blocks on the server's event stream; there is no
//! polling. Exposure events repaint the overlay from the shared slot; the
//! dedicated shutdown client message (private atom, sent to the control
//! window) ends the loop. Nothing else can stop it — cancellation is
//! cooperative and single-shot.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};
use x11rb::protocol::Event;
use x11rb::protocol::xproto::Atom;

use crate::display::overlay::OverlaySlot;
use crate::display::server::DisplayServer;

/// What one decoded event means to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Repaint the overlay if a window and image are current.
    Redraw,
    /// Leave the loop and end the thread.
    Stop,
    /// Not ours; drop it.
    Ignore,
}

/// Classify a decoded event. Pure so the dispatch rules are testable
/// without a server.
pub fn classify(event: &Event, shutdown_atom: Atom) -> Dispatch {
    match event {
        Event::ClientMessage(message) if message.type_ == shutdown_atom => Dispatch::Stop,
        Event::Expose(_) => Dispatch::Redraw,
        _ => Dispatch::Ignore,
    }
}

/// Start the event loop on its own thread. Joined at shutdown after
/// [`DisplayServer::send_shutdown`].
pub fn spawn(server: Arc<DisplayServer>, slot: OverlaySlot) -> JoinHandle<()> {
    thread::spawn(move || run(&server, &slot))
}

fn run(server: &DisplayServer, slot: &OverlaySlot) {
    info!(event = "core.event_loop.started");

    loop {
        let event = match server.wait_for_event() {
            Ok(event) => event,
            Err(e) => {
                // A dead connection can never deliver the shutdown message;
                // ending the loop here keeps the thread joinable.
                error!(event = "core.event_loop.wait_failed", error = %e);
                break;
            }
        };

        match classify(&event, server.shutdown_atom()) {
            Dispatch::Stop => {
                info!(event = "core.event_loop.stopped");
                break;
            }
            Dispatch::Redraw => redraw(server, slot),
            Dispatch::Ignore => {}
        }
    }
}

/// Blit the current image into the current window, if both exist.
///
/// The slot lock is held across the blit so a concurrent `remove` cannot
/// interleave between reading the image and drawing it.
fn redraw(server: &DisplayServer, slot: &OverlaySlot) {
    let content = slot.lock().unwrap();
    let (Some(window), Some(image)) = (content.window, content.image.as_ref()) else {
        return;
    };

    if let Err(e) = server.put_image(window, image) {
        warn!(event = "core.event_loop.redraw_failed", window = window, error = %e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x11rb::protocol::xproto::{
        CLIENT_MESSAGE_EVENT, ClientMessageEvent, EXPOSE_EVENT, ExposeEvent, MAP_NOTIFY_EVENT,
        MapNotifyEvent,
    };

    const SHUTDOWN: Atom = 400;

    fn expose(window: u32) -> Event {
        Event::Expose(ExposeEvent {
            response_type: EXPOSE_EVENT,
            sequence: 0,
            window,
            x: 0,
            y: 0,
            width: 10,
            height: 10,
            count: 0,
        })
    }

    fn client_message(atom: Atom) -> Event {
        Event::ClientMessage(ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: 7,
            type_: atom,
            data: [0u32, 0, 0, 0, 0].into(),
        })
    }

    #[test]
    fn test_shutdown_message_stops() {
        assert_eq!(classify(&client_message(SHUTDOWN), SHUTDOWN), Dispatch::Stop);
    }

    #[test]
    fn test_foreign_client_message_is_ignored() {
        assert_eq!(classify(&client_message(SHUTDOWN + 1), SHUTDOWN), Dispatch::Ignore);
    }

    #[test]
    fn test_exposure_redraws() {
        assert_eq!(classify(&expose(5), SHUTDOWN), Dispatch::Redraw);
    }

    #[test]
    fn test_unrelated_event_is_ignored() {
        let event = Event::MapNotify(MapNotifyEvent {
            response_type: MAP_NOTIFY_EVENT,
            sequence: 0,
            event: 5,
            window: 5,
            override_redirect: false,
        });
        assert_eq!(classify(&event, SHUTDOWN), Dispatch::Ignore);
    }
}
