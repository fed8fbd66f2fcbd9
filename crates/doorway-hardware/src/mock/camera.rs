//! Mock camera implementation for testing and development.

use crate::{
    HardwareError, Result,
    traits::FrameSource,
    types::{DeviceInfo, Frame},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Mock camera producing frames queued through its handle.
///
/// Frames produced with [`MockCameraHandle::show_codes`] use the layout of
/// [`TextDecoder`](crate::line::TextDecoder), so the pair behaves like a
/// camera plus decoder that sees exactly the queued payloads.
///
/// # Examples
///
/// ```
/// use doorway_hardware::line::TextDecoder;
/// use doorway_hardware::mock::MockCamera;
/// use doorway_hardware::traits::{CodeDecoder, FrameSource};
///
/// #[tokio::main]
/// async fn main() -> doorway_hardware::Result<()> {
///     let (mut camera, handle) = MockCamera::new();
///
///     handle.show_codes(["token-a", "token-b"]).await?;
///
///     let frame = camera.capture().await?;
///     let payloads = TextDecoder.decode(&frame)?;
///     assert_eq!(payloads, vec!["token-a", "token-b"]);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCamera {
    /// Channel receiver for frame events
    event_rx: Option<mpsc::Receiver<CameraEvent>>,

    /// Device name
    name: String,

    /// Set once `release()` has run; shared with the handle
    released: Arc<AtomicBool>,
}

impl MockCamera {
    /// Create a new mock camera with the default name.
    pub fn new() -> (Self, MockCameraHandle) {
        Self::with_name("Mock Camera")
    }

    /// Create a new mock camera with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockCameraHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let released = Arc::new(AtomicBool::new(false));

        let camera = Self {
            event_rx: Some(event_rx),
            name: name.into(),
            released: Arc::clone(&released),
        };

        (camera, MockCameraHandle { event_tx, released })
    }
}

impl FrameSource for MockCamera {
    async fn capture(&mut self) -> Result<Frame> {
        let Some(event_rx) = self.event_rx.as_mut() else {
            return Err(HardwareError::disconnected(format!("{} released", self.name)));
        };

        let event = event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(format!("{} event channel closed", self.name)))?;

        match event {
            CameraEvent::Frame(frame) => Ok(frame),
            CameraEvent::Failure(message) => Err(HardwareError::capture(message)),
        }
    }

    fn release(&mut self) {
        self.event_rx = None;
        self.released.store(true, Ordering::SeqCst);
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock")
    }
}

/// Internal event type for mock camera.
#[derive(Debug, Clone)]
enum CameraEvent {
    Frame(Frame),
    Failure(String),
}

/// Handle for controlling a mock camera.
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    /// Channel sender for frame events
    event_tx: mpsc::Sender<CameraEvent>,

    /// Release flag shared with the camera
    released: Arc<AtomicBool>,
}

impl MockCameraHandle {
    /// Queue a frame showing the given codes, in decode order.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped or released.
    pub async fn show_codes<I, S>(&self, payloads: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let payloads: Vec<S> = payloads.into_iter().collect();
        self.send(CameraEvent::Frame(Frame::from_payloads(&payloads[..])))
            .await
    }

    /// Queue a frame with no code in view.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped or released.
    pub async fn show_nothing(&self) -> Result<()> {
        self.send(CameraEvent::Frame(Frame::new(Vec::new()))).await
    }

    /// Queue an arbitrary frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped or released.
    pub async fn show_frame(&self, frame: Frame) -> Result<()> {
        self.send(CameraEvent::Frame(frame)).await
    }

    /// Make the next capture fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera has been dropped or released.
    pub async fn inject_error(&self, message: impl Into<String>) -> Result<()> {
        self.send(CameraEvent::Failure(message.into())).await
    }

    /// Whether the camera has been released.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    async fn send(&self, event: CameraEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("camera event channel closed"))
    }
}
