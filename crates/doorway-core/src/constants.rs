//! Default values for the door controller.
//!
//! These constants seed [`Config`](crate::Config) when a key is absent from
//! the configuration file. Pin numbers use the BCM numbering of the
//! Raspberry Pi header the controller was built for.
//!
//! # Usage
//!
//! ```
//! use doorway_core::constants::*;
//! use std::time::Duration;
//!
//! let quiet = Duration::from_secs(DEFAULT_QUIET_PERIOD_SECS);
//! assert_eq!(quiet.as_secs(), 10);
//! ```

// ============================================================================
// Debounce
// ============================================================================

/// Minimum time between two gate-passes (seconds).
///
/// Applies system-wide: an attempt from the camera three seconds after a
/// tag attempt is dropped just like a repeated tag read would be.
///
/// # Value: 10 seconds
pub const DEFAULT_QUIET_PERIOD_SECS: u64 = 10;

// ============================================================================
// Lock
// ============================================================================

/// GPIO pin driving the lock relay.
pub const DEFAULT_LOCK_PIN: u8 = 26;

/// How long the lock stays energized (open) after an accepted credential.
///
/// # Value: 2 seconds
pub const DEFAULT_LOCK_OPEN_SECS: u64 = 2;

// ============================================================================
// Buzzer
// ============================================================================

/// GPIO pin driving the buzzer.
pub const DEFAULT_BUZZER_PIN: u8 = 16;

/// Number of pulses sounded for an accepted credential.
pub const APPROVED_PULSES: u32 = 3;

/// On-time of each approved pulse (milliseconds).
pub const APPROVED_ON_MS: u64 = 100;

/// Silence after each approved pulse (milliseconds).
pub const APPROVED_OFF_MS: u64 = 50;

/// Number of pulses sounded for a denied credential.
pub const DENIED_PULSES: u32 = 1;

/// On-time of the denied pulse (milliseconds).
pub const DENIED_ON_MS: u64 = 1000;

/// Silence after the denied pulse (milliseconds).
pub const DENIED_OFF_MS: u64 = 0;

// ============================================================================
// Remote authority
// ============================================================================

/// Discovery document holding the authority address.
pub const DEFAULT_DISCOVERY_URL: &str = "https://api.jsonbin.io/b/5f526b43993a2e110d3e53d6/4";

/// JSON field of the discovery document that carries the authority base URL.
pub const DEFAULT_DISCOVERY_FIELD: &str = "ip_server";

/// Timeout for the startup discovery request (milliseconds).
pub const DEFAULT_DISCOVERY_TIMEOUT_MS: u64 = 5000;

/// Timeout for each verification request (milliseconds).
///
/// A request that does not complete within this window is treated as a
/// denial.
pub const DEFAULT_VERIFY_TIMEOUT_MS: u64 = 3000;

/// Lowest accepted request timeout (milliseconds).
pub const MIN_TIMEOUT_MS: u64 = 100;

/// Highest accepted request timeout (milliseconds).
pub const MAX_TIMEOUT_MS: u64 = 60_000;

/// Path of the tag verification endpoint, relative to the authority base URL.
pub const VERIFY_TAG_PATH: &str = "verify-rfid-id-access/";

/// Path of the token verification endpoint, relative to the authority base URL.
pub const VERIFY_TOKEN_PATH: &str = "verify-qr-code-access/";

// ============================================================================
// Configuration lookup
// ============================================================================

/// Environment variable pointing at a configuration file.
pub const CONFIG_ENV_VAR: &str = "DOORWAY_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "doorway.toml";

// ============================================================================
// Source loops
// ============================================================================

/// Minimum time between two iterations of a source loop (milliseconds).
///
/// Keeps a device that fails immediately on every read from spinning a core.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
