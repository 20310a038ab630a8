//! Where signing keys come from.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;

use super::keys::KeySetError;

/// Source of the issuer's published JWK set.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetch the currently published key set.
    ///
    /// # Errors
    ///
    /// Returns [`KeySetError`] if the set cannot be retrieved or decoded.
    async fn fetch(&self) -> Result<JwkSet, KeySetError>;
}

/// Fetches the JWK set over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySetSource {
    /// # Errors
    ///
    /// Returns [`KeySetError::Fetch`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySetError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    #[tracing::instrument(skip_all, fields(url = %self.url))]
    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| KeySetError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::Fetch(format!("HTTP {status}")));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeySetError::Decode(e.to_string()))
    }
}
