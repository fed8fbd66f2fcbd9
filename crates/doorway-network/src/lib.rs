//! Network layer for the doorway access-control gate.
//!
//! This crate talks to the remote verification authority:
//!
//! - **Discovery**: [`resolve_authority`] fetches the authority base URL
//!   once at startup from a JSON discovery document.
//! - **Verification**: [`VerificationClient`] posts tag identifiers and
//!   signed tokens to the authority and reports a [`Verification`].
//!
//! # Fail-closed
//!
//! Only an HTTP 200 answer counts as acceptance. Any other status, a
//! timeout or a transport failure yields a non-accepted [`Verification`]
//! whose [`outcome`](Verification::outcome) is `Denied`. The variant still
//! tells the two failure families apart for logging.

pub mod client;
pub mod discovery;

pub use client::{
    Verification, VerificationClient, VerificationClientConfig, VerificationError,
    normalize_base_url,
};
pub use discovery::{DiscoveryError, resolve_authority};
pub use reqwest::{StatusCode, Url};
