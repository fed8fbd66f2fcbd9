//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware.

pub mod camera;
pub mod pin;
pub mod tag_reader;

// Re-export commonly used types
pub use camera::{MockCamera, MockCameraHandle};
pub use pin::{MockPin, PinChange};
pub use tag_reader::{MockTagReader, MockTagReaderHandle};
