//! Simulated QSPI controller and NOR flash for testing.
//!
//! Models the parts of a real part the driver depends on: erased cells read `0xFF`,
//! programming can only clear bits, only the selected bank is visible through the
//! memory mapped window, and a program or erase leaves the device busy for a few status
//! reads. Programs that cross a page or the window, and erases that are not block
//! aligned, are rejected so tests catch bad segmentation.
//!
//! Every primitive call is recorded in [SimQspi::ops].

use alloc::{vec, vec::Vec};

use crate::{
    bank::{BankIndex, PhysicalAddress},
    config::QspiConfig,
    mapped::MappedRegion,
    peripheral::{FlashStatus, QspiPeripheral, BANK_WINDOW_SIZE},
};

const WRITE_STATUS_COMMAND: u8 = 0x01;
const READ_STATUS_COMMAND: u8 = 0x05;
const WRITE_ENABLE_COMMAND: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimError {
    /// Failure requested through one of the `fail_*` fields
    Injected,
    /// Peripheral used before [QspiPeripheral::open]
    NotOpen,
    /// Address outside the window or the flash array
    OutOfRange,
    /// Program crosses a page or the window
    CrossesBoundary,
    /// Erase not aligned to the erase size
    Misaligned,
    /// Status register write without a preceding write enable
    WriteDisabled,
}

/// A recorded call on the simulated peripheral
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimOp {
    Open,
    Close,
    DirectWrite { bytes: Vec<u8>, keep_selected: bool },
    DirectRead { length: usize },
    Status,
    BankSelect(u32),
    Program { dest: u32, length: usize },
    Erase { dest: u32, length: u32 },
}

/// Simulated controller. `BANK` is the window size, smaller windows keep tests cheap.
#[derive(Debug, Clone)]
pub struct SimQspi<const BANK: u32 = BANK_WINDOW_SIZE> {
    memory: Vec<u8>,
    base_address: u32,
    page_size: u32,
    erase_size: u32,
    bank: u32,
    opened: bool,
    write_enabled: bool,
    status_register: u8,
    read_status_pending: bool,
    busy_remaining: u32,
    /// Status reads that report busy after each program, erase or status write
    pub busy_polls: u32,
    /// Report busy forever
    pub stuck_busy: bool,
    /// Fail every status read
    pub fail_status: bool,
    /// Fail the program call with this index (0 based)
    pub fail_program_at: Option<usize>,
    /// Fail the erase call with this index (0 based)
    pub fail_erase_at: Option<usize>,
    /// Ignore status register writes, so open reads back the old value
    pub status_write_protected: bool,
    programs: usize,
    erases: usize,
    ops: Vec<SimOp>,
}

impl<const BANK: u32> SimQspi<BANK> {
    /// Erased flash of `size` bytes
    pub fn new(size: u32, page_size: u32, erase_size: u32) -> Self {
        SimQspi {
            memory: vec![0xFF; size as usize],
            base_address: crate::config::DEVICE_START_ADDRESS,
            page_size,
            erase_size,
            bank: 0,
            opened: false,
            write_enabled: false,
            status_register: 0,
            read_status_pending: false,
            busy_remaining: 0,
            busy_polls: 2,
            stuck_busy: false,
            fail_status: false,
            fail_program_at: None,
            fail_erase_at: None,
            status_write_protected: false,
            programs: 0,
            erases: 0,
            ops: Vec::new(),
        }
    }

    /// Whole flash array in logical order
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    pub fn ops(&self) -> &[SimOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn selected_bank(&self) -> u32 {
        self.bank
    }

    pub fn status_register(&self) -> u8 {
        self.status_register
    }

    /// Logical range covered by `length` bytes at `dest` in the selected bank
    fn logical_range(&self, dest: PhysicalAddress, length: usize) -> Result<(usize, usize), SimError> {
        let offset = dest
            .as_u32()
            .checked_sub(self.base_address)
            .ok_or(SimError::OutOfRange)?;
        if offset as u64 + length as u64 > BANK as u64 {
            return Err(SimError::CrossesBoundary);
        }
        let start = self.bank as usize * BANK as usize + offset as usize;
        let end = start + length;
        if end > self.memory.len() {
            return Err(SimError::OutOfRange);
        }
        Ok((start, end))
    }

    fn check_open(&self) -> Result<(), SimError> {
        if self.opened {
            Ok(())
        } else {
            Err(SimError::NotOpen)
        }
    }

    fn take_write_enable(&mut self) -> Result<(), SimError> {
        if !self.write_enabled {
            return Err(SimError::WriteDisabled);
        }
        self.write_enabled = false;
        Ok(())
    }
}

impl<const BANK: u32> QspiPeripheral for SimQspi<BANK> {
    type Error = SimError;

    const BANK_SIZE: u32 = BANK;

    fn open(&mut self, config: &QspiConfig) -> Result<(), Self::Error> {
        self.ops.push(SimOp::Open);
        self.base_address = config.base_address;
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.ops.push(SimOp::Close);
        self.check_open()?;
        self.opened = false;
        Ok(())
    }

    fn direct_write(&mut self, bytes: &[u8], keep_selected: bool) -> Result<(), Self::Error> {
        self.ops.push(SimOp::DirectWrite {
            bytes: bytes.to_vec(),
            keep_selected,
        });
        self.check_open()?;
        match bytes {
            [WRITE_ENABLE_COMMAND] => self.write_enabled = true,
            [READ_STATUS_COMMAND] if keep_selected => self.read_status_pending = true,
            [WRITE_STATUS_COMMAND, value, ..] => {
                self.take_write_enable()?;
                if !self.status_write_protected {
                    self.status_register = *value;
                }
                self.busy_remaining = self.busy_polls;
            }
            _ => {}
        }
        Ok(())
    }

    fn direct_read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.ops.push(SimOp::DirectRead {
            length: buffer.len(),
        });
        self.check_open()?;
        let value = if core::mem::take(&mut self.read_status_pending) {
            self.status_register
        } else {
            0xFF
        };
        buffer.fill(value);
        Ok(())
    }

    fn status(&mut self) -> Result<FlashStatus, Self::Error> {
        self.ops.push(SimOp::Status);
        self.check_open()?;
        if self.fail_status {
            return Err(SimError::Injected);
        }
        let write_in_progress = self.stuck_busy || self.busy_remaining > 0;
        self.busy_remaining = self.busy_remaining.saturating_sub(1);
        Ok(FlashStatus { write_in_progress })
    }

    fn bank_select(&mut self, bank: BankIndex) -> Result<(), Self::Error> {
        self.ops.push(SimOp::BankSelect(bank.as_u32()));
        self.check_open()?;
        self.bank = bank.as_u32();
        Ok(())
    }

    fn program(&mut self, source: &[u8], dest: PhysicalAddress) -> Result<(), Self::Error> {
        self.ops.push(SimOp::Program {
            dest: dest.as_u32(),
            length: source.len(),
        });
        self.check_open()?;
        let index = self.programs;
        self.programs += 1;
        if self.fail_program_at == Some(index) {
            return Err(SimError::Injected);
        }
        let (start, end) = self.logical_range(dest, source.len())?;
        let page_offset = (dest.as_u32() - self.base_address) % self.page_size;
        if page_offset as usize + source.len() > self.page_size as usize {
            return Err(SimError::CrossesBoundary);
        }
        for (cell, byte) in self.memory[start..end].iter_mut().zip(source) {
            *cell &= *byte;
        }
        self.busy_remaining = self.busy_polls;
        Ok(())
    }

    fn erase_block(&mut self, dest: PhysicalAddress, length: u32) -> Result<(), Self::Error> {
        self.ops.push(SimOp::Erase {
            dest: dest.as_u32(),
            length,
        });
        self.check_open()?;
        let index = self.erases;
        self.erases += 1;
        if self.fail_erase_at == Some(index) {
            return Err(SimError::Injected);
        }
        let (start, end) = self.logical_range(dest, length as usize)?;
        if length != self.erase_size || start % self.erase_size as usize != 0 {
            return Err(SimError::Misaligned);
        }
        self.memory[start..end].fill(0xFF);
        self.busy_remaining = self.busy_polls;
        Ok(())
    }

    fn mapped_window(&self) -> MappedRegion<'_> {
        let start = (self.bank as usize * BANK as usize).min(self.memory.len());
        let end = (start + BANK as usize).min(self.memory.len());
        MappedRegion::new(&self.memory[start..end])
    }
}
