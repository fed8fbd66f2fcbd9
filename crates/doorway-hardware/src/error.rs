//! Error types for hardware operations.
//!
//! This module defines error types specific to the door peripherals: the
//! tag reader, the camera and the GPIO outputs.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Tag reading error.
    #[error("Tag read error: {message}")]
    ReadError { message: String },

    /// Frame capture error.
    #[error("Frame capture error: {message}")]
    CaptureError { message: String },

    /// Output pin could not be driven.
    #[error("GPIO {pin} error: {message}")]
    PinError { pin: u8, message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new tag read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::ReadError {
            message: message.into(),
        }
    }

    /// Create a new frame capture error.
    pub fn capture(message: impl Into<String>) -> Self {
        Self::CaptureError {
            message: message.into(),
        }
    }

    /// Create a new output pin error.
    pub fn pin(pin: u8, message: impl Into<String>) -> Self {
        Self::PinError {
            pin,
            message: message.into(),
        }
    }

    /// Returns `true` if the device is gone rather than momentarily failing.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("MFRC522");
        assert!(error.is_disconnected());
        assert_eq!(error.to_string(), "Device disconnected: MFRC522");
    }

    #[test]
    fn test_invalid_data_error() {
        let error = HardwareError::invalid_data("code payload is not UTF-8");
        assert!(matches!(error, HardwareError::InvalidData { .. }));
        assert_eq!(error.to_string(), "Invalid data: code payload is not UTF-8");
    }

    #[test]
    fn test_pin_error() {
        let error = HardwareError::pin(26, "permission denied");
        assert_eq!(error.to_string(), "GPIO 26 error: permission denied");
        assert!(!error.is_disconnected());
    }

    #[test]
    fn test_capture_error() {
        let error = HardwareError::capture("VIDIOC_DQBUF failed");
        assert_eq!(error.to_string(), "Frame capture error: VIDIOC_DQBUF failed");
    }
}
