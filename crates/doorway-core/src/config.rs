//! Static controller configuration.
//!
//! Loaded once at startup from a TOML file and never mutated afterwards.
//!
//! ## Loading Order
//!
//! 1. An explicit path (the CLI `--config` flag)
//! 2. The `DOORWAY_CONFIG` environment variable
//! 3. `doorway.toml` in the current working directory
//! 4. Built-in defaults
//!
//! A file that is found but cannot be parsed or fails validation is an
//! error; the controller must not start on a half-understood configuration.
//!
//! ```
//! use doorway_core::Config;
//!
//! let config = Config::from_toml_str(r#"
//!     [gate]
//!     quiet_period_secs = 5
//! "#).unwrap();
//!
//! assert_eq!(config.gate.quiet_period().as_secs(), 5);
//! assert_eq!(config.lock.pin, 26);
//! ```

use crate::address::{http_url, normalize_base_url};
use crate::constants::*;
use crate::{Error, Result};
use std::ffi::OsString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub authority: AuthorityConfig,
    pub gate: GateConfig,
    pub lock: LockConfig,
    pub buzzer: BuzzerConfig,
    pub drivers: DriversConfig,
}

/// Where to look up the authority address at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// URL of the discovery document.
    pub url: String,

    /// JSON field holding the authority base URL.
    pub field: String,

    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DISCOVERY_URL.to_string(),
            field: DEFAULT_DISCOVERY_FIELD.to_string(),
            timeout_ms: DEFAULT_DISCOVERY_TIMEOUT_MS,
        }
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Remote verification authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorityConfig {
    /// Fixed base URL. When set, discovery is skipped entirely.
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_VERIFY_TIMEOUT_MS,
        }
    }
}

impl AuthorityConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Debounce gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    pub quiet_period_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            quiet_period_secs: DEFAULT_QUIET_PERIOD_SECS,
        }
    }
}

impl GateConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_secs(self.quiet_period_secs)
    }
}

/// Lock relay output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockConfig {
    pub pin: u8,
    pub open_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            pin: DEFAULT_LOCK_PIN,
            open_secs: DEFAULT_LOCK_OPEN_SECS,
        }
    }
}

impl LockConfig {
    pub fn open_duration(&self) -> Duration {
        Duration::from_secs(self.open_secs)
    }
}

/// A buzzer pulse train: `pulses` times on for `on_ms`, then off for `off_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    pub pulses: u32,
    pub on_ms: u64,
    #[serde(default)]
    pub off_ms: u64,
}

/// Buzzer output and its two feedback patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuzzerConfig {
    pub pin: u8,
    pub approved: PulseConfig,
    pub denied: PulseConfig,
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self {
            pin: DEFAULT_BUZZER_PIN,
            approved: PulseConfig {
                pulses: APPROVED_PULSES,
                on_ms: APPROVED_ON_MS,
                off_ms: APPROVED_OFF_MS,
            },
            denied: PulseConfig {
                pulses: DENIED_PULSES,
                on_ms: DENIED_ON_MS,
                off_ms: DENIED_OFF_MS,
            },
        }
    }
}

/// Tag reader driver selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagReaderDriver {
    /// In-process mock, fed through its handle.
    #[default]
    Mock,
    /// One identifier per line read from a file, FIFO or character device.
    /// `-` reads standard input.
    Line { path: PathBuf },
}

/// Camera driver selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraDriver {
    #[default]
    Mock,
    /// Each line read from `path` is one frame.
    Line { path: PathBuf },
}

/// GPIO driver selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GpioDriver {
    #[default]
    Mock,
    /// Linux sysfs GPIO interface rooted at `root` (usually `/sys/class/gpio`).
    Sysfs { root: PathBuf },
}

/// Which drivers back the external collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriversConfig {
    pub tag_reader: TagReaderDriver,
    pub camera: CameraDriver,
    pub gpio: GpioDriver,
}

impl Config {
    /// Parse and validate a configuration from TOML text.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` on malformed TOML or unknown keys and
    /// `Error::Config` when a value fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the errors
    /// of [`Config::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Resolve the configuration following the documented lookup order.
    ///
    /// # Errors
    /// Fails if an explicitly named file (flag or environment variable) is
    /// missing, or if any file found is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(
            explicit,
            std::env::var_os(CONFIG_ENV_VAR),
            Path::new("."),
        )
    }

    /// [`Config::load`] with the environment value and working directory
    /// supplied by the caller.
    ///
    /// # Errors
    /// Same as [`Config::load`].
    pub fn load_from(explicit: Option<&Path>, env: Option<OsString>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::info!(path = %path.display(), "Loading configuration");
            return Self::from_file(path);
        }

        if let Some(path) = env.filter(|value| !value.is_empty()) {
            let path = PathBuf::from(path);
            tracing::info!(path = %path.display(), "Loading configuration from {CONFIG_ENV_VAR}");
            return Self::from_file(&path);
        }

        let local = dir.join(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::info!(path = %local.display(), "Loading configuration");
            return Self::from_file(&local);
        }

        tracing::info!("No configuration file found, using built-in defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| Error::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field and range constraints.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.gate.quiet_period_secs == 0 {
            return Err(Error::Config("gate.quiet_period_secs must be > 0".into()));
        }
        if self.lock.open_secs == 0 {
            return Err(Error::Config("lock.open_secs must be > 0".into()));
        }
        if self.lock.pin == self.buzzer.pin {
            return Err(Error::Config(format!(
                "lock.pin and buzzer.pin must differ, both are {}",
                self.lock.pin
            )));
        }
        for (name, pulse) in [
            ("buzzer.approved", &self.buzzer.approved),
            ("buzzer.denied", &self.buzzer.denied),
        ] {
            if pulse.pulses == 0 {
                return Err(Error::Config(format!("{name}.pulses must be >= 1")));
            }
            if pulse.on_ms == 0 {
                return Err(Error::Config(format!("{name}.on_ms must be > 0")));
            }
        }
        for (name, timeout) in [
            ("discovery.timeout_ms", self.discovery.timeout_ms),
            ("authority.timeout_ms", self.authority.timeout_ms),
        ] {
            if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout) {
                return Err(Error::Config(format!(
                    "{name} must be {MIN_TIMEOUT_MS}-{MAX_TIMEOUT_MS}, got {timeout}"
                )));
            }
        }
        match &self.authority.base_url {
            Some(base_url) => {
                normalize_base_url(base_url)
                    .map_err(|e| Error::Config(format!("authority.base_url: {e}")))?;
            }
            None => {
                if self.discovery.url.trim().is_empty() {
                    return Err(Error::MissingConfig("discovery.url".into()));
                }
                if self.discovery.field.trim().is_empty() {
                    return Err(Error::MissingConfig("discovery.field".into()));
                }
                http_url(&self.discovery.url)
                    .map_err(|e| Error::Config(format!("discovery.url: {e}")))?;
            }
        }
        Ok(())
    }
}
