//! Descriptor fetching and caching.

use crate::descriptor::ApiDescriptor;
use crate::error::{ClientError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

struct CachedDescriptor {
    url: String,
    descriptor: Arc<ApiDescriptor>,
}

/// Fetches and caches the parsed API descriptor.
///
/// The cache holds the last successfully loaded descriptor, keyed by
/// URL. The store owns the descriptor; callers get an `Arc` borrowable
/// for the duration of a call. There is no retry policy: a failed load
/// surfaces immediately and the caller decides whether to try again.
///
/// Two calls racing before anything is cached may both fetch; the last
/// writer wins. Call volume is low enough that coalescing is not worth
/// the extra lifecycle states.
pub struct DescriptorStore {
    client: reqwest::Client,
    cache: Mutex<Option<CachedDescriptor>>,
}

impl DescriptorStore {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cache: Mutex::new(None),
        }
    }

    /// Load the descriptor at `url`, returning the cached value when a
    /// previous load of the same URL succeeded and no `invalidate()`
    /// happened since.
    pub async fn load(&self, url: &str) -> Result<Arc<ApiDescriptor>> {
        if let Some(cached) = self.cache.lock().await.as_ref() {
            if cached.url == url {
                debug!("Descriptor cache hit for {}", url);
                return Ok(Arc::clone(&cached.descriptor));
            }
        }

        info!("Loading API descriptor from {}", url);
        let descriptor = Arc::new(self.fetch(url).await?);

        *self.cache.lock().await = Some(CachedDescriptor {
            url: url.to_string(),
            descriptor: Arc::clone(&descriptor),
        });

        Ok(descriptor)
    }

    /// Drop the cached descriptor unconditionally. Idempotent.
    ///
    /// The next `load` performs a fresh fetch; configuration changes
    /// (descriptor URL or auth) go through here.
    pub async fn invalidate(&self) {
        debug!("Invalidating descriptor cache");
        *self.cache.lock().await = None;
    }

    async fn fetch(&self, url: &str) -> Result<ApiDescriptor> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::DescriptorFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClientError::DescriptorFetch(e.to_string()))?;

        let payload = response
            .text()
            .await
            .map_err(|e| ClientError::DescriptorFetch(e.to_string()))?;

        ApiDescriptor::parse(&payload, url)
    }
}
