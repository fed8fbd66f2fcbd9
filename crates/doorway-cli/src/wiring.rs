//! Builds drivers and the authority address from the configuration.

use anyhow::{Context, Result};
use doorway_core::Config;
use doorway_core::config::{CameraDriver, GpioDriver, TagReaderDriver};
use doorway_gate::Peripherals;
use doorway_hardware::line::{LineFrameSource, LineTagReader, TextDecoder};
use doorway_hardware::mock::{
    MockCamera, MockCameraHandle, MockPin, MockTagReader, MockTagReaderHandle,
};
use doorway_hardware::sysfs::SysfsPin;
use doorway_hardware::{AnyFrameSource, AnyOutputPin, AnyTagReader};
use doorway_network::{Url, normalize_base_url, resolve_authority};
use std::sync::Arc;
use tracing::{info, warn};

/// Control handles of any mock device in use.
///
/// Kept alive for the whole run: a mock whose handle is dropped reports a
/// disconnection on every read instead of idling.
#[derive(Debug, Default)]
pub struct MockHandles {
    pub tags: Option<MockTagReaderHandle>,
    pub codes: Option<MockCameraHandle>,
}

impl MockHandles {
    pub fn in_use(&self) -> bool {
        self.tags.is_some() || self.codes.is_some()
    }
}

/// Peripherals ready for the supervisor.
pub struct Wired {
    pub peripherals: Peripherals,
    pub mocks: MockHandles,
}

/// The authority base URL: the configured override, or the discovery
/// document.
pub async fn authority_url(config: &Config) -> Result<Url> {
    match &config.authority.base_url {
        Some(raw) => {
            let url = normalize_base_url(raw)
                .with_context(|| format!("Invalid authority.base_url '{raw}'"))?;
            info!(authority = %url, "Using configured authority address");
            Ok(url)
        }
        None => resolve_authority(&config.discovery)
            .await
            .context("Authority discovery failed"),
    }
}

pub async fn tag_reader(config: &Config) -> Result<(AnyTagReader, Option<MockTagReaderHandle>)> {
    match &config.drivers.tag_reader {
        TagReaderDriver::Mock => {
            warn!("Using mock tag reader");
            let (reader, handle) = MockTagReader::new();
            Ok((AnyTagReader::Mock(reader), Some(handle)))
        }
        TagReaderDriver::Line { path } => {
            let reader = LineTagReader::open(path)
                .await
                .with_context(|| format!("Failed to open tag reader at {}", path.display()))?;
            Ok((AnyTagReader::Line(reader), None))
        }
    }
}

pub async fn camera(config: &Config) -> Result<(AnyFrameSource, Option<MockCameraHandle>)> {
    match &config.drivers.camera {
        CameraDriver::Mock => {
            warn!("Using mock camera");
            let (camera, handle) = MockCamera::new();
            Ok((AnyFrameSource::Mock(camera), Some(handle)))
        }
        CameraDriver::Line { path } => {
            let camera = LineFrameSource::open(path)
                .await
                .with_context(|| format!("Failed to open camera at {}", path.display()))?;
            Ok((AnyFrameSource::Line(camera), None))
        }
    }
}

pub fn output_pin(driver: &GpioDriver, number: u8) -> Result<AnyOutputPin> {
    match driver {
        GpioDriver::Mock => Ok(AnyOutputPin::Mock(MockPin::new(number))),
        GpioDriver::Sysfs { root } => {
            let pin = SysfsPin::open(root, number)
                .with_context(|| format!("Failed to set up GPIO {number}"))?;
            Ok(AnyOutputPin::Sysfs(Arc::new(pin)))
        }
    }
}

/// Open every device named by `config.drivers`.
pub async fn peripherals(config: &Config) -> Result<Wired> {
    let (tag_reader, tags) = tag_reader(config).await?;
    let (camera, codes) = camera(config).await?;
    if matches!(config.drivers.gpio, GpioDriver::Mock) {
        warn!("Using mock GPIO; the lock will not move");
    }
    let lock = output_pin(&config.drivers.gpio, config.lock.pin)?;
    let buzzer = output_pin(&config.drivers.gpio, config.buzzer.pin)?;

    Ok(Wired {
        peripherals: Peripherals {
            tag_reader,
            camera,
            decoder: Box::new(TextDecoder),
            lock,
            buzzer,
        },
        mocks: MockHandles { tags, codes },
    })
}
