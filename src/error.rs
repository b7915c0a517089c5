use thiserror::Error;

/// Failures raised by the driver core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The engine handed back a frame of the wrong size. Engine and driver
    /// disagree about the raster, so nothing drawn from here on can be trusted.
    #[error("frame buffer is {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },

    #[error("no preset named \"{0}\"")]
    UnknownPreset(String),

    #[error("no preset in slot {0}")]
    NoPresetAt(usize),

    #[error("unknown key scheme \"{0}\"")]
    UnknownScheme(String),
}

impl DriverError {
    /// Contract violations stop the frame loop; everything else is recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::FrameSize { .. })
    }
}

/// Why a cartridge image could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("server answered with status {0}")]
    Status(u16),

    #[error("read failed: {0}")]
    Read(String),
}
