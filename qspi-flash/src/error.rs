use core::fmt::Debug;
use embedded_block::{BlockDeviceError, BlockDeviceErrorKind};

/// Error type for the QSPI flash driver.
///
/// It is generic over the peripheral error type (PE), which is passed through untouched
/// as [`QspiFlashError::Peripheral`] so callers can inspect what the HAL reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QspiFlashError<PE> {
    /// Error from the QSPI peripheral
    #[error("QSPI peripheral error: {0:?}")]
    Peripheral(PE),
    /// Buffer is missing or shorter than the requested length
    #[error("Buffer too small for requested length")]
    InvalidArgument,
    /// Requested range is outside the device
    #[error("Requested range out of bounds")]
    InvalidAddress,
    /// Device stayed busy for the whole polling budget
    #[error("Timed out waiting for the device to become ready")]
    Timeout,
    /// Status register read back after open did not hold the programmed value
    #[error("Status register mismatch: expected {expected:#04x}, found {found:#04x}")]
    StatusMismatch { expected: u8, found: u8 },
    /// Geometry does not fit the peripheral's bank window
    #[error("Geometry does not fit the bank window")]
    InvalidGeometry,
    /// Other error
    #[error("Other error. Should not happen")]
    Other,
}

impl<PE: Debug> BlockDeviceError for QspiFlashError<PE> {
    fn kind(&self) -> BlockDeviceErrorKind {
        match self {
            QspiFlashError::Peripheral(_) => BlockDeviceErrorKind::Device,
            QspiFlashError::InvalidArgument => BlockDeviceErrorKind::InvalidArgument,
            QspiFlashError::InvalidAddress => BlockDeviceErrorKind::InvalidAddress,
            QspiFlashError::Timeout => BlockDeviceErrorKind::Timeout,
            QspiFlashError::StatusMismatch { .. } => BlockDeviceErrorKind::Device,
            QspiFlashError::InvalidGeometry => BlockDeviceErrorKind::Other,
            QspiFlashError::Other => BlockDeviceErrorKind::Other,
        }
    }
}

// This impl is only for the helper check range / buffer functions for auto conversion from errors
impl<PE> From<BlockDeviceErrorKind> for QspiFlashError<PE> {
    fn from(kind: BlockDeviceErrorKind) -> Self {
        match kind {
            BlockDeviceErrorKind::InvalidArgument => QspiFlashError::InvalidArgument,
            BlockDeviceErrorKind::InvalidAddress => QspiFlashError::InvalidAddress,
            BlockDeviceErrorKind::Timeout => QspiFlashError::Timeout,
            _ => QspiFlashError::Other,
        }
    }
}
