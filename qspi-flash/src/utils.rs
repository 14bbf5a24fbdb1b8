use crate::{
    bank::{BankIndex, PhysicalAddress},
    error::QspiFlashError,
    peripheral::{FlashStatus, QspiPeripheral},
};

/// Wrapper around [QspiPeripheral::direct_write] that maps errors
pub fn qspi_direct_write<P: QspiPeripheral>(
    qspi: &mut P,
    bytes: &[u8],
    keep_selected: bool,
) -> Result<(), QspiFlashError<P::Error>> {
    qspi.direct_write(bytes, keep_selected)
        .map_err(QspiFlashError::Peripheral)
}

/// Wrapper around [QspiPeripheral::direct_read] that maps errors
pub fn qspi_direct_read<P: QspiPeripheral>(
    qspi: &mut P,
    buffer: &mut [u8],
) -> Result<(), QspiFlashError<P::Error>> {
    qspi.direct_read(buffer).map_err(QspiFlashError::Peripheral)
}

/// Wrapper around [QspiPeripheral::status] that maps errors
pub fn qspi_status<P: QspiPeripheral>(qspi: &mut P) -> Result<FlashStatus, QspiFlashError<P::Error>> {
    qspi.status().map_err(QspiFlashError::Peripheral)
}

/// Wrapper around [QspiPeripheral::bank_select] that maps errors
pub fn qspi_bank_select<P: QspiPeripheral>(
    qspi: &mut P,
    bank: BankIndex,
) -> Result<(), QspiFlashError<P::Error>> {
    qspi.bank_select(bank).map_err(QspiFlashError::Peripheral)
}

/// Wrapper around [QspiPeripheral::program] that maps errors
pub fn qspi_program<P: QspiPeripheral>(
    qspi: &mut P,
    source: &[u8],
    dest: PhysicalAddress,
) -> Result<(), QspiFlashError<P::Error>> {
    qspi.program(source, dest).map_err(QspiFlashError::Peripheral)
}

/// Wrapper around [QspiPeripheral::erase_block] that maps errors
pub fn qspi_erase_block<P: QspiPeripheral>(
    qspi: &mut P,
    dest: PhysicalAddress,
    length: u32,
) -> Result<(), QspiFlashError<P::Error>> {
    qspi.erase_block(dest, length)
        .map_err(QspiFlashError::Peripheral)
}
