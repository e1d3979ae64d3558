//! Images repository
//!
//! Fetches image payloads from the source's image service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use vigil_client::SourceClient;

/// Repository trait for image retrieval
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Fetches the complete payload of one image
    ///
    /// Partial transfers are errors; no partial payload is ever returned.
    async fn fetch_image(&self, image_name: &str) -> Result<Vec<u8>>;
}

/// TCP implementation of ImageRepository
pub struct TcpImageRepository {
    client: SourceClient,
}

impl TcpImageRepository {
    /// Creates a new TCP image repository
    ///
    /// # Arguments
    /// * `client` - Source client configured with the image service address
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageRepository for TcpImageRepository {
    async fn fetch_image(&self, image_name: &str) -> Result<Vec<u8>> {
        self.client
            .fetch_image(image_name)
            .await
            .with_context(|| format!("Failed to fetch image {}", image_name))
    }
}
