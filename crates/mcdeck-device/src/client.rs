//! HTTP client for the receiver's extended control API.
//!
//! Every call is a single `GET` bounded by the configured timeout, so a
//! handler or poller waiting on an unreachable receiver is released after at
//! most [`DEFAULT_REQUEST_TIMEOUT`] (unless configured otherwise).

use std::time::Duration;

use tracing::debug;

use mcdeck_core::prelude::*;
use mcdeck_core::PowerState;

use crate::status::parse_status;

/// Upper bound for one appliance request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Path prefix of the control API on the receiver.
pub const DEFAULT_API_PATH: &str = "YamahaExtendedControl/v1";

/// Power operations the plugin needs from an appliance.
///
/// Implemented by [`MusicCastClient`] for real receivers and by
/// `FakeAppliance` (feature `test-helpers`) in tests.
#[trait_variant::make(Send)]
pub trait PowerControl: Sync {
    /// Query whether the appliance is on (anything but standby).
    async fn query_power(&self, address: &str) -> Result<bool>;

    /// Switch the appliance on or into standby.
    async fn set_power(&self, address: &str, desired: PowerState) -> Result<()>;

    /// Ask the appliance to flip its own power state.
    async fn toggle_power(&self, address: &str) -> Result<()>;
}

/// Connection options for [`MusicCastClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub api_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            api_path: DEFAULT_API_PATH.to_string(),
        }
    }
}

/// Appliance client speaking the receiver's HTTP control API
#[derive(Debug, Clone)]
pub struct MusicCastClient {
    http: reqwest::Client,
    api_path: String,
}

impl MusicCastClient {
    /// Build a client whose requests all share `options.timeout`.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_path: options.api_path.trim_matches('/').to_string(),
        })
    }

    fn endpoint(&self, address: &str, path_and_query: &str) -> Result<String> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::transport("No appliance address configured"));
        }
        Ok(format!(
            "http://{}/{}/{}",
            address, self.api_path, path_and_query
        ))
    }

    /// Issue a GET and require a success status.
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("Appliance request: GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::protocol(format!(
                "GET {url} returned HTTP {status}"
            )));
        }

        Ok(response)
    }

    async fn request_power(&self, address: &str, power: PowerState) -> Result<()> {
        let url = self.endpoint(
            address,
            &format!("main/setPower?power={}", power.as_query()),
        )?;
        self.get(&url).await?;
        Ok(())
    }
}

impl PowerControl for MusicCastClient {
    async fn query_power(&self, address: &str) -> Result<bool> {
        let url = self.endpoint(address, "main/getStatus")?;
        let response = self.get(&url).await?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Reading getStatus body failed: {e}")))?;

        parse_status(&body)?.is_on()
    }

    async fn set_power(&self, address: &str, desired: PowerState) -> Result<()> {
        self.request_power(address, desired).await
    }

    async fn toggle_power(&self, address: &str) -> Result<()> {
        self.request_power(address, PowerState::Toggle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response and hand back the request head.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&head).to_string()
        });

        (address, handle)
    }

    fn client() -> MusicCastClient {
        MusicCastClient::new(ClientOptions {
            timeout: Duration::from_millis(500),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_query_power_on() {
        let (address, server) = serve_once("200 OK", r#"{"response_code":0,"power":"on"}"#).await;
        assert!(client().query_power(&address).await.unwrap());

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /YamahaExtendedControl/v1/main/getStatus "));
    }

    #[tokio::test]
    async fn test_query_power_standby() {
        let (address, _server) =
            serve_once("200 OK", r#"{"response_code":0,"power":"standby"}"#).await;
        assert!(!client().query_power(&address).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_power_device_error() {
        let (address, _server) = serve_once("200 OK", r#"{"response_code":5}"#).await;
        let err = client().query_power(&address).await.unwrap_err();
        assert!(matches!(err, Error::Device { code: 5 }));
    }

    #[tokio::test]
    async fn test_http_failure_is_protocol_error() {
        let (address, _server) = serve_once("500 Internal Server Error", "{}").await;
        let err = client().toggle_power(&address).await.unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_toggle_and_set_use_power_query() {
        let (address, server) = serve_once("200 OK", r#"{"response_code":0}"#).await;
        client().toggle_power(&address).await.unwrap();
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /YamahaExtendedControl/v1/main/setPower?power=toggle "));

        let (address, server) = serve_once("200 OK", r#"{"response_code":0}"#).await;
        client()
            .set_power(&address, PowerState::Standby)
            .await
            .unwrap();
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /YamahaExtendedControl/v1/main/setPower?power=standby "));
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = client().query_power(&address).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_silent_appliance_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let _hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let started = std::time::Instant::now();
        let err = client().query_power(&address).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_empty_address_is_rejected_without_request() {
        let err = client().query_power("  ").await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[test]
    fn test_api_path_slashes_are_trimmed() {
        let client = MusicCastClient::new(ClientOptions {
            api_path: "/custom/v2/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint("10.0.0.5", "main/getStatus").unwrap(),
            "http://10.0.0.5/custom/v2/main/getStatus"
        );
    }
}
