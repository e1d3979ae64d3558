//! Sink repository
//!
//! Delivers forward envelopes to the ingestion endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use vigil_client::{ForwardEnvelope, SinkClient};

/// Repository trait for the ingestion sink
#[async_trait]
pub trait SinkRepository: Send + Sync {
    /// Delivers one envelope; `Ok` means the sink confirmed acceptance
    async fn deliver(&self, envelope: &ForwardEnvelope) -> Result<()>;
}

/// HTTP implementation of SinkRepository
pub struct HttpSinkRepository {
    client: SinkClient,
}

impl HttpSinkRepository {
    /// Creates a new HTTP sink repository
    ///
    /// # Arguments
    /// * `client` - Sink client bound to the ingestion endpoint
    pub fn new(client: SinkClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SinkRepository for HttpSinkRepository {
    async fn deliver(&self, envelope: &ForwardEnvelope) -> Result<()> {
        self.client
            .deliver(envelope)
            .await
            .with_context(|| format!("Failed to deliver to {}", self.client.endpoint()))
    }
}
