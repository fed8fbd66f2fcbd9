//! Hardware device trait definitions.
//!
//! These traits are the contract between the gate and the door peripherals:
//! a tag reader, a camera with its code decoder, and the GPIO outputs that
//! drive the lock relay and the buzzer. Mock and real drivers implement them
//! interchangeably.
//!
//! The asynchronous methods are declared as `fn ... -> impl Future + Send`
//! rather than `async fn` so that generic source loops holding a device can
//! be spawned onto the multi-threaded runtime. Implementations still write
//! plain `async fn`.
//!
//! # Object Safety and Dynamic Dispatch
//!
//! Traits returning `impl Future` are not object-safe; `Box<dyn TagReader>`
//! does not compile. Use generic parameters, or the enum wrappers in
//! [`devices`](crate::devices) when the driver is picked at runtime.

use crate::error::Result;
use crate::types::{DeviceInfo, Frame, Level, TagRead};
use std::future::Future;

/// Contactless tag reader.
///
/// # Examples
///
/// ```no_run
/// use doorway_hardware::traits::TagReader;
/// use doorway_hardware::error::Result;
///
/// async fn wait_for_tag<R: TagReader>(reader: &mut R) -> Result<String> {
///     loop {
///         if let Some(id) = reader.read_tag().await?.id {
///             return Ok(id.to_string());
///         }
///     }
/// }
/// ```
pub trait TagReader: Send {
    /// Block until a tag is presented or the reader's timeout expires.
    ///
    /// A timeout is not an error: it yields a [`TagRead`] whose `id` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected
    /// - The tag could not be read (collision, CRC failure)
    fn read_tag(&mut self) -> impl Future<Output = Result<TagRead>> + Send;

    /// Describe the reader.
    fn info(&self) -> DeviceInfo;
}

/// Camera delivering one frame per call.
pub trait FrameSource: Send {
    /// Capture the next frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is gone or the capture failed. A
    /// released source always reports [`HardwareError::Disconnected`].
    ///
    /// [`HardwareError::Disconnected`]: crate::HardwareError::Disconnected
    fn capture(&mut self) -> impl Future<Output = Result<Frame>> + Send;

    /// Free the underlying device. Idempotent.
    fn release(&mut self);

    /// Describe the camera.
    fn info(&self) -> DeviceInfo;
}

/// Extracts optical code payloads from a frame.
pub trait CodeDecoder: Send + Sync {
    /// Decode every code visible in `frame`, in decode order.
    ///
    /// Returns an empty vector when the frame shows no code.
    ///
    /// # Errors
    ///
    /// Returns an error if a code was found but its payload is not UTF-8.
    fn decode(&self, frame: &Frame) -> Result<Vec<String>>;
}

impl<D: CodeDecoder + ?Sized> CodeDecoder for Box<D> {
    fn decode(&self, frame: &Frame) -> Result<Vec<String>> {
        (**self).decode(frame)
    }
}

/// A single digital output.
///
/// Writes are fast register or sysfs writes, so the method is synchronous;
/// this lets release guards drive pins low from `Drop`. Implementations must
/// be usable from several tasks at once through a shared reference.
pub trait OutputPin: Send + Sync {
    /// Drive the pin to `level`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::PinError`](crate::HardwareError::PinError)
    /// if the write failed.
    fn set_level(&self, level: Level) -> Result<()>;

    /// Pin number, for logs.
    fn number(&self) -> u8;
}

impl<P: OutputPin + ?Sized> OutputPin for std::sync::Arc<P> {
    fn set_level(&self, level: Level) -> Result<()> {
        (**self).set_level(level)
    }

    fn number(&self) -> u8 {
        (**self).number()
    }
}
