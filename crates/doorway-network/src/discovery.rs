//! Startup lookup of the authority address.
//!
//! The authority's base URL is published in a small JSON document at a
//! well-known URL, e.g.
//!
//! ```json
//! { "ip_server": "http://10.0.0.2:8000/" }
//! ```
//!
//! It is fetched exactly once, before any source starts. Failure is fatal to
//! startup; the controller never runs without an authority.

use crate::client::{VerificationError, normalize_base_url};
use doorway_core::config::DiscoveryConfig;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info};

/// Errors while resolving the authority address
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The document could not be fetched or was not JSON
    #[error("Discovery request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The document server answered with a non-success status
    #[error("Discovery document at {url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// The document lacks the configured field, or it is not a string
    #[error("Discovery document has no string field '{field}'")]
    MissingField { field: String },

    /// The published address is not a usable URL
    #[error(transparent)]
    InvalidUrl(#[from] VerificationError),
}

/// Fetch the discovery document and return the authority base URL.
///
/// # Errors
///
/// See [`DiscoveryError`].
pub async fn resolve_authority(config: &DiscoveryConfig) -> Result<Url, DiscoveryError> {
    let url = config.url.trim();
    let request_error = |source| DiscoveryError::Request {
        url: url.to_string(),
        source,
    };

    debug!(url, field = %config.field, "Fetching discovery document");

    let http = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(request_error)?;

    let response = http.get(url).send().await.map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::Status {
            url: url.to_string(),
            status,
        });
    }

    let document: serde_json::Value = response.json().await.map_err(request_error)?;

    let raw = document
        .get(&config.field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| DiscoveryError::MissingField {
            field: config.field.clone(),
        })?;

    let base = normalize_base_url(raw)?;
    info!(authority = %base, "Authority address resolved");
    Ok(base)
}
