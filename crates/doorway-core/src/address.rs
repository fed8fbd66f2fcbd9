//! Parsing of the HTTP addresses named in the configuration.
//!
//! Shared by config validation and the verification client so that an
//! address accepted at startup is exactly the one the client will use.

use url::Url;

/// An address that cannot be used as an HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid URL '{url}': {message}")]
pub struct InvalidUrl {
    pub url: String,
    pub message: String,
}

impl InvalidUrl {
    fn new(url: &str, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Parse an absolute `http` or `https` URL with a host.
///
/// # Errors
///
/// Returns [`InvalidUrl`] for relative addresses, other schemes and URLs
/// without a host.
pub fn http_url(raw: &str) -> Result<Url, InvalidUrl> {
    let url = Url::parse(raw.trim()).map_err(|e| InvalidUrl::new(raw, e.to_string()))?;
    check_http(raw, &url)?;
    Ok(url)
}

/// Parse an authority address into a base URL that endpoint paths can be
/// joined onto.
///
/// A missing scheme defaults to `http://` (discovery documents often carry a
/// bare `host:port`), and a trailing `/` is added so that
/// `http://host/api` + `verify-rfid-id-access/` keeps the `api` segment.
///
/// # Errors
///
/// Returns [`InvalidUrl`] if the address does not parse, uses a scheme other
/// than `http` or `https`, or cannot carry a path.
///
/// # Example
///
/// ```
/// use doorway_core::address::normalize_base_url;
///
/// let url = normalize_base_url("10.0.0.2:8000/api").unwrap();
/// assert_eq!(url.as_str(), "http://10.0.0.2:8000/api/");
/// assert!(normalize_base_url("ftp://10.0.0.2/").is_err());
/// ```
pub fn normalize_base_url(raw: &str) -> Result<Url, InvalidUrl> {
    let trimmed = raw.trim();

    let with_scheme = match Url::parse(trimmed) {
        // `auth.local:8000` parses as scheme `auth.local` with path `8000`.
        Ok(url) if !trimmed.contains("://") && is_port_path(url.path()) => {
            format!("http://{trimmed}")
        }
        Ok(_) => trimmed.to_string(),
        Err(_) if !trimmed.contains("://") => format!("http://{trimmed}"),
        Err(e) => return Err(InvalidUrl::new(raw, e.to_string())),
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| InvalidUrl::new(raw, e.to_string()))?;
    check_http(raw, &url)?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn check_http(raw: &str, url: &Url) -> Result<(), InvalidUrl> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(InvalidUrl::new(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(InvalidUrl::new(raw, "not a hierarchical http(s) URL"));
    }
    Ok(())
}

/// `8000` or `8000/api`: what follows the colon of a bare `host:port`.
fn is_port_path(path: &str) -> bool {
    let port = path.split('/').next().unwrap_or_default();
    !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
}
