//! Background task that keeps the signing key cache fresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::keys::{KeySetError, SigningKeyCache, SigningKeySet};
use super::source::KeySetSource;
use crate::config::IapAuthnConfig;

/// Periodically re-fetches the key set and swaps it into the cache.
///
/// A failed fetch keeps the previous set. Until the first fetch succeeds the
/// refresher retries on the shorter `retry_interval`. Early refreshes
/// requested through [`SigningKeyCache::request_refresh`] are spaced by at
/// least `min_refresh_gap`.
pub struct KeyRefresher {
    cache: Arc<SigningKeyCache>,
    source: Arc<dyn KeySetSource>,
    refresh_interval: Duration,
    retry_interval: Duration,
    min_refresh_gap: Duration,
}

impl KeyRefresher {
    #[must_use]
    pub fn new(
        cache: Arc<SigningKeyCache>,
        source: Arc<dyn KeySetSource>,
        cfg: &IapAuthnConfig,
    ) -> Self {
        Self {
            cache,
            source,
            refresh_interval: cfg.refresh_interval,
            retry_interval: cfg.retry_interval,
            min_refresh_gap: cfg.min_refresh_gap,
        }
    }

    /// Fetch the key set once and replace the cached one on success.
    ///
    /// Returns the number of usable keys now cached.
    ///
    /// # Errors
    ///
    /// Returns [`KeySetError`] if the fetch fails or yields no usable key;
    /// the cache is left untouched in that case.
    pub async fn refresh_once(&self) -> Result<usize, KeySetError> {
        let result = match self.source.fetch().await {
            Ok(jwks) => SigningKeySet::from_jwk_set(&jwks),
            Err(e) => Err(e),
        };

        match result {
            Ok(set) => {
                let count = set.len();
                self.cache.replace(set);
                tracing::info!(keys = count, "Signing keys refreshed");
                Ok(count)
            }
            Err(e) => {
                let cached = self.cache.current().map_or(0, |set| set.len());
                tracing::warn!(
                    error = %e,
                    cached_keys = cached,
                    "Signing key refresh failed; keeping current keys"
                );
                Err(e)
            }
        }
    }

    /// Run the refresh loop until `cancel` fires.
    ///
    /// The first fetch happens immediately.
    #[must_use]
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    async fn run(self, cancel: CancellationToken) {
        let mut last_attempt = Instant::now();
        self.refresh_once().await.ok();

        loop {
            let delay = if self.cache.current().is_some() {
                self.refresh_interval
            } else {
                self.retry_interval
            };

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
                () = self.cache.refresh_requested() => {
                    let remaining = self.min_refresh_gap.saturating_sub(last_attempt.elapsed());
                    if !remaining.is_zero() {
                        tracing::debug!(
                            wait_secs = remaining.as_secs(),
                            "Early key refresh requested; waiting for refresh gap"
                        );
                        tokio::select! {
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(remaining) => {}
                        }
                    }
                }
            }

            last_attempt = Instant::now();
            self.refresh_once().await.ok();
        }

        tracing::debug!("Signing key refresher stopped");
    }
}
