use std::time::Duration;

use crossterm::event::Event;
use log::warn;
use tokio::sync::mpsc;

/// Forwards terminal events from a blocking reader thread. The thread
/// exits once the receiver is dropped.
pub fn start_event_thread(poll_interval: Duration) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match crossterm::event::poll(poll_interval) {
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Ok(true) => match crossterm::event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("terminal read failed: {err}"),
                },
                Err(err) => {
                    warn!("terminal poll failed: {err}");
                    break;
                }
            }
        }
    });
    rx
}
