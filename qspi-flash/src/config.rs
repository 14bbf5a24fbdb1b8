//! Peripheral configuration handed to [`crate::QspiPeripheral::open`] and used by the
//! open handshake.

/// Default start of the memory mapped (XIP) window
pub const DEVICE_START_ADDRESS: u32 = 0x6000_0000;

/// Pins routed to the QSPI peripheral
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QspiPins {
    pub ck: u8,
    pub cs: u8,
    pub io0: u8,
    pub io1: u8,
    pub io2: u8,
    pub io3: u8,
}

/// Command used by the controller for memory mapped reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReadMode {
    Standard,
    FastRead,
    FastReadDualOutput,
    FastReadDualIo,
    FastReadQuadOutput,
    #[default]
    FastReadQuadIo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressBytes {
    #[default]
    Three,
    Four,
}

/// Everything the driver needs to bring the peripheral and the flash up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QspiConfig {
    /// Physical address the selected bank is mapped at
    pub base_address: u32,
    pub pins: QspiPins,
    pub read_mode: ReadMode,
    pub address_bytes: AddressBytes,
    /// Dummy clocks for the fast read commands, 0 keeps the device default
    pub dummy_clocks: u8,
    /// Page size programmed into the peripheral
    pub page_size: u32,
    pub page_program_command: u8,
    pub write_enable_command: u8,
    pub status_command: u8,
    pub xip_enter_command: u8,
    pub xip_exit_command: u8,
    /// Raw bytes sent to program the status register during open, command first
    pub status_payload: [u8; 3],
    /// Value the status register must read back after open
    pub expected_status: u8,
    /// Upper bound on status reads while waiting for the busy flag to clear.
    /// This is an iteration count, not a time, so calibrate it per target.
    pub max_ready_polls: u32,
}

impl Default for QspiConfig {
    fn default() -> Self {
        QspiConfig {
            base_address: DEVICE_START_ADDRESS,
            pins: QspiPins::default(),
            read_mode: ReadMode::default(),
            address_bytes: AddressBytes::default(),
            dummy_clocks: 0,
            page_size: 256,
            page_program_command: 0x02,
            write_enable_command: 0x06,
            status_command: 0x05,
            xip_enter_command: 0x20,
            xip_exit_command: 0xFF,
            // Write status register, set the quad enable bit
            status_payload: [0x01, 0x40, 0x00],
            expected_status: 0x40,
            max_ready_polls: i32::MAX as u32,
        }
    }
}
