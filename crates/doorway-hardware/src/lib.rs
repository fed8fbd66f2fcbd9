//! Hardware device abstraction layer for the doorway access-control gate.
//!
//! This crate provides trait-based abstractions for the door peripherals:
//! the contactless tag reader, the camera with its code decoder, and the
//! GPIO outputs for the lock relay and the buzzer. The traits allow mock
//! implementations (for development and testing) and real drivers to be
//! swapped freely.
//!
//! # Design Philosophy
//!
//! - **Async reads**: tag reads and frame captures block until the device
//!   produces something, so they are `async` and suspend only their caller.
//! - **Sync writes**: pin writes are immediate and take `&self`, so one pin
//!   can be shared between tasks and released from `Drop`.
//! - **Error-aware**: every operation returns [`Result<T>`][error::Result]
//!   with a [`HardwareError`].
//!
//! # Drivers
//!
//! | Concern | Mock | Real |
//! |---------|------|------|
//! | Tag reader | [`mock::MockTagReader`] | [`line::LineTagReader`] |
//! | Camera | [`mock::MockCamera`] | [`line::LineFrameSource`] |
//! | Decoder | | [`line::TextDecoder`] |
//! | GPIO | [`mock::MockPin`] | [`sysfs::SysfsPin`] |
//!
//! The [`devices`] module wraps them in enums for runtime selection.
//!
//! ```no_run
//! use doorway_hardware::traits::TagReader;
//! use doorway_hardware::error::Result;
//!
//! async fn print_tags<R: TagReader>(reader: &mut R) -> Result<()> {
//!     loop {
//!         if let Some(id) = reader.read_tag().await?.id {
//!             println!("{id}");
//!         }
//!     }
//! }
//! ```

pub mod devices;
pub mod error;
pub mod line;
pub mod mock;
pub mod sysfs;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{CodeDecoder, FrameSource, OutputPin, TagReader};
pub use types::{DeviceInfo, Frame, Level, TagRead};

pub use devices::{AnyFrameSource, AnyOutputPin, AnyTagReader};
