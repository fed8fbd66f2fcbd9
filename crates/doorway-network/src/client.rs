//! HTTP client for the remote verification authority.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//!     │
//!     └─> VerificationClient ───(HTTP POST, JSON)───> Authority
//!                                   │
//!                                   ├─ verify-rfid-id-access/   {"rfid_id": ...}
//!                                   └─ verify-qr-code-access/   {"user_jwt_token": ...}
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use doorway_core::TagId;
//! use doorway_network::{VerificationClient, VerificationClientConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VerificationClientConfig {
//!     base_url: "http://10.0.0.2:8000/".to_string(),
//!     timeout: Duration::from_millis(3000),
//! };
//!
//! let client = VerificationClient::new(config)?;
//! let verification = client.verify_tag(&TagId::new("584190912345")).await;
//! println!("{verification}");
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: one request per attempt; a retry would delay the
//!   person at the door and the debounce gate already rate-limits attempts.
//! - **Never errors after construction**: every failure is folded into a
//!   [`Verification`] so callers cannot accidentally fail open.
//! - **Connection pooling**: the inner `reqwest::Client` is cheap to clone
//!   and reused across both credential sources.

use doorway_core::address::{self, InvalidUrl};
use doorway_core::constants::{VERIFY_TAG_PATH, VERIFY_TOKEN_PATH};
use doorway_core::{TagId, VerificationOutcome};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration for the verification client
///
/// # Example
///
/// ```
/// use doorway_network::VerificationClientConfig;
/// use std::time::Duration;
///
/// let config = VerificationClientConfig {
///     base_url: "http://127.0.0.1:8000/".to_string(),
///     timeout: Duration::from_millis(1500),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct VerificationClientConfig {
    /// Authority base URL; the endpoint paths are appended to it
    pub base_url: String,

    /// Timeout for a whole request (connect, send, receive)
    pub timeout: Duration,
}

impl Default for VerificationClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            timeout: Duration::from_millis(doorway_core::constants::DEFAULT_VERIFY_TIMEOUT_MS),
        }
    }
}

/// Errors that can occur while setting up or performing a request
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Base URL could not be parsed
    #[error("Invalid authority URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request did not complete in time
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Connection refused, reset, DNS failure and the like
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// What happened to a verification request.
///
/// Only [`Verification::Accepted`] opens the door; both other variants map
/// to [`VerificationOutcome::Denied`]. They are kept apart so that an
/// unreachable authority shows up differently in the logs than a credential
/// the authority refused.
#[derive(Debug)]
pub enum Verification {
    /// Authority answered 200.
    Accepted,

    /// Authority answered with any other status.
    Rejected { status: StatusCode },

    /// No usable answer from the authority.
    Unavailable(VerificationError),
}

impl Verification {
    /// Collapse into the outcome the actuator acts on.
    pub fn outcome(&self) -> VerificationOutcome {
        match self {
            Self::Accepted => VerificationOutcome::Accepted,
            Self::Rejected { .. } | Self::Unavailable(_) => VerificationOutcome::Denied,
        }
    }

    /// Returns `true` if the authority could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected { status } => write!(f, "rejected by authority ({status})"),
            Self::Unavailable(e) => write!(f, "authority unavailable: {e}"),
        }
    }
}

/// Parse an authority address into a base URL that endpoint paths can be
/// joined onto.
///
/// A missing scheme defaults to `http://` and a trailing `/` is added; see
/// [`doorway_core::address::normalize_base_url`].
///
/// # Errors
///
/// Returns `VerificationError::InvalidUrl` if the address does not parse,
/// uses a scheme other than `http` or `https`, or cannot carry a path.
///
/// # Example
///
/// ```
/// use doorway_network::normalize_base_url;
///
/// let url = normalize_base_url("10.0.0.2:8000/api").unwrap();
/// assert_eq!(url.as_str(), "http://10.0.0.2:8000/api/");
/// ```
pub fn normalize_base_url(raw: &str) -> Result<Url, VerificationError> {
    address::normalize_base_url(raw).map_err(|InvalidUrl { url, message }| {
        VerificationError::InvalidUrl { url, message }
    })
}

/// Body of a tag lookup.
#[derive(Debug, Serialize)]
struct TagRequest<'a> {
    rfid_id: &'a str,
}

/// Body of a token verification.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    user_jwt_token: &'a str,
}

/// Client for the remote verification authority
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct VerificationClient {
    http: reqwest::Client,
    tag_url: Url,
    token_url: Url,
    timeout: Duration,
}

impl VerificationClient {
    /// Create a client for the authority at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::InvalidUrl` for an unusable base URL and
    /// `VerificationError::Client` if the TLS backend fails to initialise.
    pub fn new(config: VerificationClientConfig) -> Result<Self, VerificationError> {
        let base = normalize_base_url(&config.base_url)?;
        let join = |path: &str| {
            base.join(path).map_err(|e| VerificationError::InvalidUrl {
                url: config.base_url.clone(),
                message: e.to_string(),
            })
        };
        let tag_url = join(VERIFY_TAG_PATH)?;
        let token_url = join(VERIFY_TOKEN_PATH)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(VerificationError::Client)?;

        debug!(%tag_url, %token_url, "Verification client ready");

        Ok(Self {
            http,
            tag_url,
            token_url,
            timeout: config.timeout,
        })
    }

    /// Ask the authority whether the tag `id` may enter.
    pub async fn verify_tag(&self, id: &TagId) -> Verification {
        self.post(&self.tag_url, &TagRequest { rfid_id: id.as_str() })
            .await
    }

    /// Ask the authority whether the signed `token` may enter.
    pub async fn verify_token(&self, token: &str) -> Verification {
        self.post(&self.token_url, &TokenRequest { user_jwt_token: token })
            .await
    }

    /// Endpoint used for tag lookups.
    pub fn tag_url(&self) -> &Url {
        &self.tag_url
    }

    /// Endpoint used for token verification.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    async fn post<B: Serialize + Sync>(&self, url: &Url, body: &B) -> Verification {
        let response = match self.http.post(url.clone()).json(body).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(%url, timeout_ms = ms, "Verification request timed out");
                return Verification::Unavailable(VerificationError::Timeout(ms));
            }
            Err(e) => {
                warn!(%url, error = %e, "Verification request failed");
                return Verification::Unavailable(VerificationError::Transport(e));
            }
        };

        let status = response.status();
        debug!(%url, %status, "Verification response");

        if status == StatusCode::OK {
            Verification::Accepted
        } else {
            Verification::Rejected { status }
        }
    }
}
