use core::fmt::Debug;

use embedded_block::{check_buffer, check_range, BlockDevice, ByteAddress, ErrorType};

use crate::{
    bank::{BankTranslator, TransferKind},
    config::QspiConfig,
    error::QspiFlashError,
    geometry::Geometry,
    peripheral::QspiPeripheral,
    poll::StatusPoller,
    utils::{
        qspi_bank_select, qspi_direct_read, qspi_direct_write, qspi_erase_block, qspi_program,
        qspi_status,
    },
};

/// Identifier returned by [BlockDevice::get_type]
pub const DEVICE_TYPE: &str = "QSPIFLASH";

/// Result from all QSPI flash operations
pub type QspiFlashResult<T, P> = Result<T, QspiFlashError<<P as QspiPeripheral>::Error>>;

/// Whether the open handshake has completed on this instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    #[default]
    Closed,
    Open,
}

/// Block device over a QSPI NOR flash that is larger than the controller's bank window.
///
/// Callers see a linear address space `0..geometry.total_size()`. Every request is cut
/// into segments that stay within one bank, and for programs within one page, before it
/// reaches the [QspiPeripheral]. Programs and erases wait for the busy flag to clear
/// after each segment.
///
/// All operations take `&mut self`. The selected bank and the device status are shared
/// hardware state, so sharing one device between contexts needs an external mutex.
pub struct QspiFlash<P> {
    qspi: P,
    config: QspiConfig,
    geometry: Geometry,
    translator: BankTranslator,
    poller: StatusPoller,
    state: DeviceState,
}

// Manually implement Debug to avoid bounds on P
impl<P> Debug for QspiFlash<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QspiFlash")
            .field("config", &self.config)
            .field("geometry", &self.geometry)
            .field("state", &self.state)
            .finish()
    }
}

impl<P: QspiPeripheral> QspiFlash<P> {
    /// Create a closed device. Nothing is sent to the peripheral until [QspiFlash::open].
    ///
    /// Fails with [QspiFlashError::InvalidGeometry] if a granularity does not divide
    /// [QspiPeripheral::BANK_SIZE].
    pub fn new(qspi: P, geometry: Geometry, config: QspiConfig) -> QspiFlashResult<Self, P> {
        if !geometry.fits_window(P::BANK_SIZE) {
            error!("Geometry does not tile a {:#x} byte bank", P::BANK_SIZE);
            return Err(QspiFlashError::InvalidGeometry);
        }
        let translator = BankTranslator::new(config.base_address, P::BANK_SIZE, &geometry);
        let poller = StatusPoller::new(config.max_ready_polls);
        Ok(QspiFlash {
            qspi,
            config,
            geometry,
            translator,
            poller,
            state: DeviceState::Closed,
        })
    }

    /// Give the peripheral back
    pub fn release(self) -> P {
        self.qspi
    }

    pub fn peripheral(&self) -> &P {
        &self.qspi
    }

    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.qspi
    }

    pub fn config(&self) -> &QspiConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn is_open(&self) -> bool {
        self.state == DeviceState::Open
    }

    /// Bring up the peripheral and put the flash in its operating mode.
    ///
    /// Sends write enable, programs the status register with
    /// [QspiConfig::status_payload] and reads it back, failing with
    /// [QspiFlashError::StatusMismatch] if it does not hold
    /// [QspiConfig::expected_status]. Stops at the first failing step and leaves
    /// whatever was already sent in place.
    ///
    /// A second call on an open device does nothing.
    pub fn open(&mut self) -> QspiFlashResult<(), P> {
        if self.is_open() {
            trace!("Already open");
            return Ok(());
        }
        debug!("Opening QSPI peripheral");
        self.qspi
            .open(&self.config)
            .map_err(QspiFlashError::Peripheral)?;

        debug!("Write enable");
        qspi_direct_write(&mut self.qspi, &[self.config.write_enable_command], false)?;
        self.wait_ready()?;

        debug!("Writing status register");
        let payload = self.config.status_payload;
        qspi_direct_write(&mut self.qspi, &payload, false)?;
        self.wait_ready()?;

        qspi_direct_write(&mut self.qspi, &[self.config.status_command], true)?;
        let mut status = [0u8; 1];
        qspi_direct_read(&mut self.qspi, &mut status)?;
        if status[0] != self.config.expected_status {
            error!(
                "Status register reads {:#x}, expected {:#x}",
                status[0],
                self.config.expected_status
            );
            return Err(QspiFlashError::StatusMismatch {
                expected: self.config.expected_status,
                found: status[0],
            });
        }
        self.state = DeviceState::Open;
        info!("QSPI flash open");
        Ok(())
    }

    /// Shut the peripheral down. A later [QspiFlash::open] runs the handshake again.
    pub fn close(&mut self) -> QspiFlashResult<(), P> {
        debug!("Closing QSPI peripheral");
        self.state = DeviceState::Closed;
        self.qspi.close().map_err(QspiFlashError::Peripheral)
    }

    /// Wait for the busy flag to clear
    pub fn wait_ready(&mut self) -> QspiFlashResult<(), P> {
        let qspi = &mut self.qspi;
        self.poller.wait_ready(|| qspi.status())
    }

    /// Read the status register once
    pub fn is_busy(&mut self) -> QspiFlashResult<bool, P> {
        Ok(qspi_status(&mut self.qspi)?.write_in_progress)
    }

    /// Check the buffer holds `length` bytes and the range fits the device
    fn validate(&self, available: usize, address: u32, length: u32) -> QspiFlashResult<(), P> {
        check_buffer(available, length)?;
        check_range(self.geometry.total_size(), address, length)?;
        Ok(())
    }

    /// Read `length` bytes from `address` into the start of `buffer`.
    ///
    /// Reads go through the memory mapped window, one copy per bank touched. No status
    /// polling is needed.
    pub fn read(&mut self, buffer: &mut [u8], address: u32, length: u32) -> QspiFlashResult<(), P> {
        trace!("Reading {} bytes from {:#x}", length, address);
        self.validate(buffer.len(), address, length)?;

        let translator = self.translator;
        for segment in translator.segments(ByteAddress::new(address), length, TransferKind::Read) {
            trace!(
                "Read bank {} physical {:#x} length {}",
                segment.bank.as_u32(),
                segment.physical.as_u32(),
                segment.length
            );
            qspi_bank_select(&mut self.qspi, segment.bank)?;
            let start = segment.position as usize;
            let dest = &mut buffer[start..start + segment.length as usize];
            self.qspi
                .mapped_window()
                .copy_to(segment.offset, dest)
                .ok_or(QspiFlashError::InvalidAddress)?;
        }
        Ok(())
    }

    /// Program `length` bytes from the start of `buffer` at `address`.
    ///
    /// One program command per page (and bank) touched, each followed by a wait for
    /// ready. The first failure is returned; pages already programmed stay programmed.
    pub fn write(&mut self, buffer: &[u8], address: u32, length: u32) -> QspiFlashResult<(), P> {
        trace!("Writing {} bytes to {:#x}", length, address);
        self.validate(buffer.len(), address, length)?;

        let translator = self.translator;
        for segment in translator.segments(ByteAddress::new(address), length, TransferKind::Program)
        {
            trace!(
                "Program bank {} physical {:#x} length {}",
                segment.bank.as_u32(),
                segment.physical.as_u32(),
                segment.length
            );
            qspi_bank_select(&mut self.qspi, segment.bank)?;
            let start = segment.position as usize;
            let source = &buffer[start..start + segment.length as usize];
            qspi_program(&mut self.qspi, source, segment.physical)?;
            self.wait_ready()?;
        }
        Ok(())
    }

    /// Alias for [QspiFlash::write]
    pub fn program(&mut self, buffer: &[u8], address: u32, length: u32) -> QspiFlashResult<(), P> {
        self.write(buffer, address, length)
    }

    /// Erase every erase block overlapping `address..address + length`.
    ///
    /// Erase works on whole blocks, so bytes before `address` and after
    /// `address + length` that share a block with the range are erased too. Align
    /// requests to [Geometry::erase_size] to avoid losing neighbouring data.
    pub fn erase(&mut self, address: u32, length: u32) -> QspiFlashResult<(), P> {
        trace!("Erasing {} bytes from {:#x}", length, address);
        check_range(self.geometry.total_size(), address, length)?;

        let erase_size = self.geometry.erase_size();
        let translator = self.translator;
        for block in self.erase_blocks(address, length) {
            let (bank, physical) = translator.translate(ByteAddress::new(block));
            trace!(
                "Erase bank {} physical {:#x}",
                bank.as_u32(),
                physical.as_u32()
            );
            qspi_bank_select(&mut self.qspi, bank)?;
            qspi_erase_block(&mut self.qspi, physical, erase_size)?;
            self.wait_ready()?;
        }
        Ok(())
    }
}

impl<P: QspiPeripheral> ErrorType for QspiFlash<P> {
    type Error = QspiFlashError<P::Error>;
}

impl<P: QspiPeripheral> BlockDevice for QspiFlash<P> {
    fn init(&mut self) -> Result<(), Self::Error> {
        self.open()
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        self.close()
    }

    fn read(&mut self, buffer: &mut [u8], address: u32, length: u32) -> Result<(), Self::Error> {
        QspiFlash::read(self, buffer, address, length)
    }

    fn write(&mut self, buffer: &[u8], address: u32, length: u32) -> Result<(), Self::Error> {
        QspiFlash::write(self, buffer, address, length)
    }

    fn erase(&mut self, address: u32, length: u32) -> Result<(), Self::Error> {
        QspiFlash::erase(self, address, length)
    }

    fn size(&self) -> u32 {
        self.geometry.total_size()
    }

    fn get_read_size(&self) -> u32 {
        self.geometry.read_size()
    }

    fn get_program_size(&self) -> u32 {
        self.geometry.program_size()
    }

    fn get_erase_size(&self) -> u32 {
        self.geometry.erase_size()
    }

    fn get_type(&self) -> &'static str {
        DEVICE_TYPE
    }
}
