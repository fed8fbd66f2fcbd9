//! Enum wrappers for hardware device dispatch.
//!
//! Traits returning `impl Future` are not object-safe, so a driver chosen
//! from configuration at runtime cannot be boxed as `dyn TagReader`. These
//! enums provide the concrete type instead: one variant per driver, each
//! method forwarding with a `match`.
//!
//! # Examples
//!
//! ```
//! use doorway_hardware::devices::AnyTagReader;
//! use doorway_hardware::mock::MockTagReader;
//! use doorway_hardware::traits::TagReader;
//!
//! let (reader, _handle) = MockTagReader::new();
//! let any_reader = AnyTagReader::Mock(reader);
//! assert_eq!(any_reader.info().name, "Mock Tag Reader");
//! ```

use crate::line::{LineFrameSource, LineTagReader};
use crate::mock::{MockCamera, MockPin, MockTagReader};
use crate::sysfs::SysfsPin;
use crate::traits::{FrameSource, OutputPin, TagReader};
use crate::{DeviceInfo, Frame, Level, Result, TagRead};

/// Enum wrapper for tag reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTagReader {
    /// Mock reader for development and testing.
    Mock(MockTagReader),
    /// Line-oriented reader (keyboard wedge, FIFO, stdin).
    Line(LineTagReader),
}

impl TagReader for AnyTagReader {
    async fn read_tag(&mut self) -> Result<TagRead> {
        match self {
            Self::Mock(device) => device.read_tag().await,
            Self::Line(device) => device.read_tag().await,
        }
    }

    fn info(&self) -> DeviceInfo {
        match self {
            Self::Mock(device) => device.info(),
            Self::Line(device) => device.info(),
        }
    }
}

/// Enum wrapper for camera dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyFrameSource {
    /// Mock camera for development and testing.
    Mock(MockCamera),
    /// One frame per line of input.
    Line(LineFrameSource),
}

impl FrameSource for AnyFrameSource {
    async fn capture(&mut self) -> Result<Frame> {
        match self {
            Self::Mock(device) => device.capture().await,
            Self::Line(device) => device.capture().await,
        }
    }

    fn release(&mut self) {
        match self {
            Self::Mock(device) => device.release(),
            Self::Line(device) => device.release(),
        }
    }

    fn info(&self) -> DeviceInfo {
        match self {
            Self::Mock(device) => device.info(),
            Self::Line(device) => device.info(),
        }
    }
}

/// Enum wrapper for output pin dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyOutputPin {
    /// Recording mock pin.
    Mock(MockPin),
    /// Linux sysfs GPIO.
    Sysfs(std::sync::Arc<SysfsPin>),
}

impl OutputPin for AnyOutputPin {
    fn set_level(&self, level: Level) -> Result<()> {
        match self {
            Self::Mock(pin) => pin.set_level(level),
            Self::Sysfs(pin) => pin.set_level(level),
        }
    }

    fn number(&self) -> u8 {
        match self {
            Self::Mock(pin) => pin.number(),
            Self::Sysfs(pin) => pin.number(),
        }
    }
}
