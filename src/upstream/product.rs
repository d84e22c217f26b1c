//! Product service client.
//!
//! # Responsibilities
//! - Fetch a single product by id over HTTP
//! - Classify every non-success outcome as one attempt failure
//!
//! A transport error, a non-2xx status and an undecodable body are all
//! equally retryable; the variants exist for logging only.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// A product as served by the product service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// One failed attempt against the product service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid product URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("HTTP error! Status: {status} - {reason}")]
    Status { status: u16, reason: String },

    #[error("undecodable product body: {0}")]
    Decode(reqwest::Error),
}

/// HTTP client for the product service.
#[derive(Debug, Clone)]
pub struct ProductClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ProductClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("user-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self { client, base_url })
    }

    /// URL of `/products/{id}` on the configured origin.
    pub fn product_url(&self, id: u32) -> Result<Url, FetchError> {
        Ok(self.base_url.join(&format!("/products/{id}"))?)
    }

    /// Perform exactly one GET for the product.
    pub async fn fetch_product(&self, id: u32) -> Result<Product, FetchError> {
        let url = self.product_url(id)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                component = "http-call",
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or(""),
                "Product service response was not OK."
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response.json::<Product>().await.map_err(FetchError::Decode)
    }
}
