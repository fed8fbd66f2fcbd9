//! Mock tag reader implementation for testing and development.
//!
//! This module provides a simulated tag reader that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    HardwareError, Result,
    traits::TagReader,
    types::{DeviceInfo, TagRead},
};
use doorway_core::TagId;
use tokio::sync::mpsc;

/// Mock tag reader for testing and development.
///
/// Reads block until the paired [`MockTagReaderHandle`] presents a tag,
/// reports a reader timeout, or injects a failure. Dropping every handle
/// makes further reads fail with a disconnection error.
///
/// # Examples
///
/// ```
/// use doorway_hardware::mock::MockTagReader;
/// use doorway_hardware::traits::TagReader;
///
/// #[tokio::main]
/// async fn main() -> doorway_hardware::Result<()> {
///     let (mut reader, handle) = MockTagReader::new();
///
///     handle.present_tag("584190912345").await?;
///
///     let read = reader.read_tag().await?;
///     assert_eq!(read.id.unwrap().as_str(), "584190912345");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagReader {
    /// Channel receiver for reader events
    event_rx: mpsc::Receiver<ReaderEvent>,

    /// Device name
    name: String,
}

impl MockTagReader {
    /// Create a new mock tag reader with the default name.
    ///
    /// Returns a tuple of (MockTagReader, MockTagReaderHandle) where the
    /// handle can be used to simulate tag presentations.
    pub fn new() -> (Self, MockTagReaderHandle) {
        Self::with_name("Mock Tag Reader")
    }

    /// Create a new mock tag reader with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockTagReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx,
            name: name.into(),
        };

        (reader, MockTagReaderHandle { event_tx })
    }
}

impl TagReader for MockTagReader {
    async fn read_tag(&mut self) -> Result<TagRead> {
        let event = self
            .event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(format!("{} event channel closed", self.name)))?;

        match event {
            ReaderEvent::Read(read) => Ok(read),
            ReaderEvent::Failure(message) => Err(HardwareError::read(message)),
        }
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock")
    }
}

/// Internal event type for mock tag reader.
#[derive(Debug, Clone)]
enum ReaderEvent {
    Read(TagRead),
    Failure(String),
}

/// Handle for controlling a mock tag reader.
///
/// Cloning the handle gives another sender onto the same reader.
#[derive(Debug, Clone)]
pub struct MockTagReaderHandle {
    /// Channel sender for reader events
    event_tx: mpsc::Sender<ReaderEvent>,
}

impl MockTagReaderHandle {
    /// Present a tag with an empty data block.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_tag(&self, id: impl Into<TagId>) -> Result<()> {
        self.send(ReaderEvent::Read(TagRead::tag(id, ""))).await
    }

    /// Present a tag along with the text stored on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_tag_with_text(
        &self,
        id: impl Into<TagId>,
        text: impl Into<String>,
    ) -> Result<()> {
        self.send(ReaderEvent::Read(TagRead::tag(id, text))).await
    }

    /// Complete the pending read without a tag, as a reader timeout would.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn report_no_tag(&self) -> Result<()> {
        self.send(ReaderEvent::Read(TagRead::empty())).await
    }

    /// Make the pending read fail with a read error.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn inject_error(&self, message: impl Into<String>) -> Result<()> {
        self.send(ReaderEvent::Failure(message.into())).await
    }

    async fn send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("tag reader event channel closed"))
    }
}
