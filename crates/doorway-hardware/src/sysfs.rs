//! Linux sysfs GPIO output.
//!
//! Drives a pin through the legacy `/sys/class/gpio` interface:
//!
//! ```text
//! echo 26  > /sys/class/gpio/export
//! echo out > /sys/class/gpio/gpio26/direction
//! echo 1   > /sys/class/gpio/gpio26/value
//! ```
//!
//! The root directory is configurable so the driver can be pointed at a
//! scratch directory in tests.

use crate::{HardwareError, Result, traits::OutputPin, types::Level};
use std::fs;
use std::path::{Path, PathBuf};

/// Output pin exported through sysfs.
#[derive(Debug)]
pub struct SysfsPin {
    number: u8,
    value_path: PathBuf,
}

impl SysfsPin {
    /// Export `number` under `root`, configure it as an output and drive it
    /// low.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the pin cannot be
    /// exported or configured.
    pub fn open(root: &Path, number: u8) -> Result<Self> {
        let pin_dir = root.join(format!("gpio{number}"));

        if !pin_dir.exists() {
            fs::write(root.join("export"), number.to_string()).map_err(|e| {
                HardwareError::initialization_failed(format!("export of GPIO {number} failed: {e}"))
            })?;
        }

        fs::write(pin_dir.join("direction"), "out").map_err(|e| {
            HardwareError::initialization_failed(format!(
                "cannot set GPIO {number} as output: {e}"
            ))
        })?;

        let pin = Self {
            number,
            value_path: pin_dir.join("value"),
        };
        pin.set_level(Level::Low)?;

        tracing::debug!(pin = number, root = %root.display(), "GPIO exported as output");
        Ok(pin)
    }
}

impl OutputPin for SysfsPin {
    fn set_level(&self, level: Level) -> Result<()> {
        let value = if level.is_high() { "1" } else { "0" };
        fs::write(&self.value_path, value).map_err(|e| HardwareError::pin(self.number, e.to_string()))
    }

    fn number(&self) -> u8 {
        self.number
    }
}
