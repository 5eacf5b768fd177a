//! # mcdeck-host - Host Connection
//!
//! The plugin's side of the host's WebSocket protocol: connecting and
//! registering, reading and classifying inbound frames, and writing
//! outbound commands.
//!
//! Depends on [`mcdeck_core`] for the event/command types and error handling.
//!
//! ## Public API
//!
//! ### Connection
//! - [`connect()`] - Dial the host and send the registration frame
//! - [`next_text_frame()`] - Pull the next text frame, skipping control frames
//!
//! ### Protocol Parsing
//! - [`parse_host_message()`] - Discriminator-first parse of one frame
//! - [`HostMessage`] - A typed event or an unknown discriminator
//!
//! ### Outbound
//! - [`HostSender`] - Clonable, frame-atomic command writer

pub mod connection;
pub mod protocol;
pub mod sender;

pub use connection::{connect, host_url, next_text_frame, FrameStream};
pub use protocol::{parse_host_message, HostMessage};
#[cfg(any(test, feature = "test-helpers"))]
pub use sender::SentFrames;
pub use sender::{FrameSink, HostSender};

/// Re-exported WebSocket frame types for callers that feed the read loop.
pub use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
