//! Host read loop
//!
//! Reads frames one at a time and hands each recognised event to its own
//! task, so a slow appliance call never holds up the next frame. Appear and
//! disappear only touch the session store, so they are applied inline and
//! always take effect in frame order.

use std::sync::Arc;

use futures_util::Stream;

use mcdeck_core::prelude::*;
use mcdeck_core::HostEvent;
use mcdeck_device::PowerControl;
use mcdeck_host::{next_text_frame, parse_host_message, HostMessage, WsError, WsMessage};

use crate::handler::EventHandler;

/// Run the read loop until the host closes the connection.
///
/// # Errors
///
/// A malformed frame ([`Error::Json`]) or a transport read error
/// ([`Error::Host`]) ends the loop. Handler errors are logged and never end
/// it.
pub async fn run_event_loop<S, C>(frames: &mut S, handler: Arc<EventHandler<C>>) -> Result<()>
where
    S: Stream<Item = std::result::Result<WsMessage, WsError>> + Unpin,
    C: PowerControl + Send + 'static,
{
    while let Some(text) = next_text_frame(frames).await? {
        trace!("Received from host: {}", text);

        // Errors end the loop and are logged once by the caller.
        match parse_host_message(&text)? {
            HostMessage::Event(HostEvent::WillAppear(event)) => {
                let context = event.context.clone();
                if let Err(e) = handler.will_appear(event) {
                    log_handler_error("willAppear", Some(&context), &e);
                }
            }
            HostMessage::Event(HostEvent::WillDisappear(event)) => {
                handler.will_disappear(&event);
            }
            HostMessage::Event(event) => {
                dispatch(&handler, event);
            }
            HostMessage::Unknown(name) => {
                debug!("Ignoring unhandled host event: {}", name);
            }
        }
    }

    info!("Host connection closed");
    Ok(())
}

/// Spawn the handler for `event`.
fn dispatch<C>(handler: &Arc<EventHandler<C>>, event: HostEvent)
where
    C: PowerControl + Send + 'static,
{
    let handler = Arc::clone(handler);
    let name = event.name();
    let context = event.context().map(str::to_string);

    tokio::spawn(async move {
        if let Err(e) = handler.handle(event).await {
            log_handler_error(name, context.as_deref(), &e);
        }
    });
}

fn log_handler_error(name: &str, context: Option<&str>, e: &Error) {
    let context = context.unwrap_or("-");
    if e.is_recoverable() {
        warn!("{} handler for {} failed: {}", name, context, e);
    } else {
        error!("{} handler for {} failed: {}", name, context, e);
    }
}
