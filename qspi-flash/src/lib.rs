#![cfg_attr(not(test), no_std)]
//! Block device driver for QSPI NOR flash behind a banked memory mapped window.
//!
//! QSPI controllers typically map a fixed 64 MiB window of the flash into the bus,
//! and larger parts are reached by switching banks. [QspiFlash] hides this, exposing
//! the whole part as a linear [embedded_block::BlockDevice] and splitting reads,
//! programs and erases on bank, page and erase block boundaries.
//!
//! The hardware is reached only through the [QspiPeripheral] trait, implemented by
//! the HAL layer. With the `sim` feature, [sim::SimQspi] provides an in-memory
//! implementation for testing code built on top of the driver.

// Must be first to share macros across crate
pub(crate) mod fmt;

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod bank;
pub mod config;
mod device;
pub mod error;
mod geometry;
pub mod mapped;
mod peripheral;
mod poll;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod utils;

pub use bank::{BankIndex, BankTranslator, PhysicalAddress, TransferKind, TransferSegment};
pub use config::{QspiConfig, QspiPins};
pub use device::{DeviceState, QspiFlash, QspiFlashResult, DEVICE_TYPE};
pub use error::QspiFlashError;
pub use geometry::{Geometry, GeometryError};
pub use peripheral::{FlashStatus, QspiPeripheral, BANK_WINDOW_SIZE};
pub use poll::StatusPoller;
