//! Ingestion sink client
//!
//! Posts forwarded detections to the HTTP ingestion endpoint. Only
//! `201 Created` counts as acceptance; the response body is ignored.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;
use vigil_core::dto::envelope::ForwardEnvelope;

use crate::error::{ClientError, Result};

/// Default request timeout for sink deliveries
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the ingestion endpoint
#[derive(Debug, Clone)]
pub struct SinkClient {
    /// Full URL records are posted to (e.g., "http://127.0.0.1:5000/api/receive")
    endpoint: String,
    /// HTTP client instance
    client: Client,
}

impl SinkClient {
    /// Create a sink client whose requests time out after `timeout`
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use vigil_client::SinkClient;
    ///
    /// let sink = SinkClient::new("http://127.0.0.1:5000/api/receive", Duration::from_secs(5))
    ///     .unwrap();
    /// assert_eq!(sink.endpoint(), "http://127.0.0.1:5000/api/receive");
    /// ```
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(endpoint, client))
    }

    /// Create a sink client with a custom HTTP client
    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Get the ingestion endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver one envelope
    ///
    /// Performs no retries; a failed delivery is simply reported.
    ///
    /// # Errors
    /// - [`ClientError::RequestFailed`] on timeout or connection failure
    /// - [`ClientError::SinkRejected`] for any status other than 201
    pub async fn deliver(&self, envelope: &ForwardEnvelope) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(envelope)
            .send()
            .await?;

        self.handle_created(response).await
    }

    /// Accept only `201 Created`
    async fn handle_created(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if status != StatusCode::CREATED {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::sink_rejected(status.as_u16(), error_text));
        }

        debug!("Sink accepted record ({})", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, extract::State, http::StatusCode as AxumStatus, routing::post};
    use serde_json::Value;
    use tokio::net::TcpListener;
    use tokio::time::Instant;
    use vigil_core::domain::record::LogRecord;

    use crate::testing::serve_stalled;

    #[derive(Clone)]
    struct MockSink {
        status: AxumStatus,
        received: Arc<Mutex<Vec<Value>>>,
    }

    async fn receive(State(sink): State<MockSink>, Json(body): Json<Value>) -> AxumStatus {
        sink.received.lock().unwrap().push(body);
        sink.status
    }

    async fn spawn_sink(status: AxumStatus) -> (String, Arc<Mutex<Vec<Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/api/receive", post(receive))
            .with_state(MockSink {
                status,
                received: Arc::clone(&received),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/api/receive", addr), received)
    }

    fn envelope(image: &[u8]) -> ForwardEnvelope {
        ForwardEnvelope::new(&LogRecord::new("a.jpg", "Persona", 0.95), image)
    }

    #[tokio::test]
    async fn test_deliver_created_is_success() {
        let (url, received) = spawn_sink(AxumStatus::CREATED).await;
        let sink = SinkClient::new(url, DEFAULT_SINK_TIMEOUT).unwrap();

        let image = vec![0xff, 0xd8, 0x00, b'\n', 0x7f];
        sink.deliver(&envelope(&image)).await.unwrap();

        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["object"], "Persona");
        assert_eq!(bodies[0]["confidence"], 0.95);

        let posted: ForwardEnvelope = serde_json::from_value(bodies[0].clone()).unwrap();
        assert_eq!(posted.decode_image().unwrap(), image);
    }

    #[tokio::test]
    async fn test_deliver_ok_is_not_created() {
        let (url, received) = spawn_sink(AxumStatus::OK).await;
        let sink = SinkClient::new(url, DEFAULT_SINK_TIMEOUT).unwrap();

        let err = sink.deliver(&envelope(b"x")).await.unwrap_err();

        assert!(matches!(err, ClientError::SinkRejected { status: 200, .. }));
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deliver_server_error() {
        let (url, _received) = spawn_sink(AxumStatus::INTERNAL_SERVER_ERROR).await;
        let sink = SinkClient::new(url, DEFAULT_SINK_TIMEOUT).unwrap();

        let err = sink.deliver(&envelope(b"x")).await.unwrap_err();
        assert!(matches!(err, ClientError::SinkRejected { status: 500, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_deliver_unreachable_sink() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = SinkClient::new(
            format!("http://{}/api/receive", addr),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = sink.deliver(&envelope(b"x")).await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_deliver_stalled_sink_times_out() {
        let addr = serve_stalled().await;
        let sink = SinkClient::new(
            format!("http://{}/api/receive", addr),
            Duration::from_millis(300),
        )
        .unwrap();

        let started = Instant::now();
        let err = sink.deliver(&envelope(b"x")).await.unwrap_err();

        assert!(matches!(err, ClientError::RequestFailed(ref e) if e.is_timeout()));
        assert!(err.is_transient());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
