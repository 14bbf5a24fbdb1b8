use core::fmt::Debug;

use crate::{
    bank::{BankIndex, PhysicalAddress},
    config::QspiConfig,
    mapped::MappedRegion,
};

/// Size of the window a QSPI controller maps at once, 64 MiB
pub const BANK_WINDOW_SIZE: u32 = 0x0400_0000;

/// Status reported by the peripheral
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashStatus {
    /// Write or erase still in progress
    pub write_in_progress: bool,
}

/// Primitive operations of a QSPI controller in front of a NOR flash.
///
/// Implemented by the HAL layer. The driver never passes a logical address here,
/// only a selected bank plus a [PhysicalAddress] inside its window.
///
/// For a simulated implementation see [crate::sim::SimQspi].
pub trait QspiPeripheral {
    /// Error reported by the controller. Passed through to callers unchanged.
    type Error: Debug;

    /// Size of the address window selected by [QspiPeripheral::bank_select]
    const BANK_SIZE: u32 = BANK_WINDOW_SIZE;

    /// Route the pins and bring the controller up
    fn open(&mut self, config: &QspiConfig) -> Result<(), Self::Error>;

    /// Shut the controller down
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Clock `bytes` out as a raw command.
    /// With `keep_selected` chip select stays asserted for a following [QspiPeripheral::direct_read].
    fn direct_write(&mut self, bytes: &[u8], keep_selected: bool) -> Result<(), Self::Error>;

    /// Clock `buffer.len()` bytes in and release chip select
    fn direct_read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Read the flash status register
    fn status(&mut self) -> Result<FlashStatus, Self::Error>;

    /// Map `bank` into the window
    fn bank_select(&mut self, bank: BankIndex) -> Result<(), Self::Error>;

    /// Program `source` at `dest`. Must not cross a page.
    fn program(&mut self, source: &[u8], dest: PhysicalAddress) -> Result<(), Self::Error>;

    /// Erase the `length` byte block at `dest`
    fn erase_block(&mut self, dest: PhysicalAddress, length: u32) -> Result<(), Self::Error>;

    /// Memory mapped view of the selected bank
    fn mapped_window(&self) -> MappedRegion<'_>;
}
