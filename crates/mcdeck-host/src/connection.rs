//! WebSocket connection to the host application.
//!
//! The plugin is the client: it dials the port handed over at launch, writes
//! the registration frame, and then owns the read half for the rest of the
//! process lifetime.

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use mcdeck_core::prelude::*;
use mcdeck_core::Registration;

use crate::sender::HostSender;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Read half of the host connection.
pub type FrameStream = SplitStream<WsStream>;

/// Address of the host's WebSocket listener.
pub fn host_url(port: u16) -> String {
    format!("ws://127.0.0.1:{port}")
}

/// Connect to the host and register the plugin.
///
/// # Errors
///
/// [`Error::Host`] if the connection cannot be established or the
/// registration frame cannot be written.
pub async fn connect(port: u16, registration: &Registration) -> Result<(HostSender, FrameStream)> {
    let url = host_url(port);
    info!("Connecting to host at {}", url);

    let (ws_stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| Error::host(format!("Failed to connect to {url}: {e}")))?;

    let (ws_sink, frames) = ws_stream.split();
    let sender = HostSender::new(
        ws_sink.sink_map_err(|e| Error::host(format!("WebSocket write failed: {e}"))),
    );

    sender.register(registration).await?;
    info!("Registered with host as {}", registration.uuid);

    Ok((sender, frames))
}

/// Wait for the next text frame.
///
/// Ping, pong and binary frames are skipped. Returns `Ok(None)` when the host
/// closes the connection or the stream ends.
///
/// # Errors
///
/// [`Error::Host`] on a transport read error.
pub async fn next_text_frame<S>(frames: &mut S) -> Result<Option<String>>
where
    S: Stream<Item = std::result::Result<WsMessage, WsError>> + Unpin,
{
    loop {
        match frames.next().await {
            Some(Ok(WsMessage::Text(text))) => return Ok(Some(text.as_str().to_string())),
            Some(Ok(WsMessage::Close(frame))) => {
                debug!("Host sent Close frame: {:?}", frame);
                return Ok(None);
            }
            Some(Ok(_)) => {
                // Ping/Pong/Binary: ignored
            }
            Some(Err(err)) => {
                return Err(Error::host(format!("WebSocket read error: {err}")));
            }
            None => {
                debug!("Host stream ended");
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[test]
    fn test_host_url() {
        assert_eq!(host_url(28196), "ws://127.0.0.1:28196");
    }

    #[tokio::test]
    async fn test_next_text_frame_skips_control_frames() {
        let mut frames = stream::iter(vec![
            Ok(WsMessage::Ping(Vec::new().into())),
            Ok(WsMessage::Binary(vec![1, 2, 3].into())),
            Ok(WsMessage::Text("{\"event\":\"keyUp\"}".into())),
        ]);
        assert_eq!(
            next_text_frame(&mut frames).await.unwrap().as_deref(),
            Some("{\"event\":\"keyUp\"}")
        );
        assert!(next_text_frame(&mut frames).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_frame_ends_stream() {
        let mut frames = stream::iter(vec![
            Ok(WsMessage::Close(None)),
            Ok(WsMessage::Text("{}".into())),
        ]);
        assert!(next_text_frame(&mut frames).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_error_is_host_error() {
        let mut frames = stream::iter(vec![Err(WsError::ConnectionClosed)]);
        let err = next_text_frame(&mut frames).await.unwrap_err();
        assert!(matches!(err, Error::Host { .. }));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let registration = Registration {
            event: "registerPlugin".to_string(),
            uuid: "UUID".to_string(),
        };
        let err = connect(port, &registration).await.unwrap_err();
        assert!(matches!(err, Error::Host { .. }));
    }
}
