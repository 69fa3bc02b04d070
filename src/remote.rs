//! Optional remote mirror of the inventory snapshot.
//!
//! The mirror is best-effort: the engine never retries a failed call and
//! never lets a remote failure block local persistence. [`HttpRemote`] talks
//! to a sheet-backed web endpoint that answers `GET` with the stored JSON
//! array and accepts a replacement array via `POST`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::{InventoryError, Result};
use crate::models::InventoryData;

/// A store the engine mirrors snapshots into.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the full snapshot held remotely.
    async fn read(&self) -> Result<InventoryData>;

    /// Replace the remote snapshot with `data`.
    async fn write(&self, data: &InventoryData) -> Result<()>;

    /// Short human-readable label for logs.
    fn describe(&self) -> String {
        "remote".to_string()
    }
}

// ---------------------------------------------------------------------------
// HttpRemote
// ---------------------------------------------------------------------------

/// [`RemoteStore`] over a single HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    endpoint: Url,
    client: Client,
}

impl HttpRemote {
    /// Create an adapter for `endpoint`.
    ///
    /// `timeout` bounds each request. Redirects are followed, which web-app
    /// script endpoints rely on for `POST`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| {
            InventoryError::InvalidArgument(format!("invalid remote endpoint {:?}: {}", endpoint, e))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn read(&self) -> Result<InventoryData> {
        tracing::debug!(endpoint = %self.endpoint, "fetching remote inventory");
        let resp = self.client.get(self.endpoint.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InventoryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| InventoryError::Parse(format!("remote payload is not a product array: {}", e)))
    }

    async fn write(&self, data: &InventoryData) -> Result<()> {
        tracing::debug!(endpoint = %self.endpoint, products = data.len(), "pushing inventory to remote");
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(data)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InventoryError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}
