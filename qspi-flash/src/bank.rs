use core::fmt::Display;

use embedded_block::ByteAddress;

use crate::Geometry;

/// Index of a bank (address window) in the flash device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BankIndex(pub(crate) u32);

impl BankIndex {
    pub fn new(index: u32) -> Self {
        BankIndex(index)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Display for BankIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

/// Offset of a byte within the selected bank window.
///
/// Only produced by [BankTranslator], so it is always below the window size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowOffset(pub(crate) u32);

impl WindowOffset {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Address on the controller's bus, inside the memory mapped window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalAddress(pub(crate) u32);

impl PhysicalAddress {
    pub fn new(address: u32) -> Self {
        PhysicalAddress(address)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Which boundaries a transfer must respect besides the bank window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferKind {
    /// Memory mapped read, only the window matters
    Read,
    /// Page program
    Program,
    /// Block erase
    Erase,
}

/// One primitive transfer that stays inside a single bank and page/erase block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferSegment {
    pub bank: BankIndex,
    pub offset: WindowOffset,
    pub physical: PhysicalAddress,
    pub length: u32,
    /// Bytes of the request already covered before this segment
    pub position: u32,
}

/// Maps logical addresses onto (bank, offset) pairs and measures the distance to the next
/// bank, page or erase block boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankTranslator {
    base_address: u32,
    window_size: u32,
    program_size: u32,
    erase_size: u32,
}

impl BankTranslator {
    pub fn new(base_address: u32, window_size: u32, geometry: &Geometry) -> Self {
        BankTranslator {
            base_address,
            window_size,
            program_size: geometry.program_size(),
            erase_size: geometry.erase_size(),
        }
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn bank(&self, address: ByteAddress) -> BankIndex {
        BankIndex(address.as_u32() / self.window_size)
    }

    pub fn offset(&self, address: ByteAddress) -> WindowOffset {
        WindowOffset(address.offset_in(self.window_size))
    }

    /// Bank to select and bus address to use for a logical address
    pub fn translate(&self, address: ByteAddress) -> (BankIndex, PhysicalAddress) {
        let offset = self.offset(address);
        (
            self.bank(address),
            PhysicalAddress(self.base_address + offset.0),
        )
    }

    pub fn bytes_remaining_in_window(&self, address: ByteAddress) -> u32 {
        address.remaining_in(self.window_size)
    }

    pub fn bytes_remaining_in_program_page(&self, address: ByteAddress) -> u32 {
        address.remaining_in(self.program_size)
    }

    pub fn bytes_remaining_in_erase_block(&self, address: ByteAddress) -> u32 {
        address.remaining_in(self.erase_size)
    }

    /// Largest transfer of `kind` starting at `address` that crosses no boundary
    pub fn segment_limit(&self, address: ByteAddress, kind: TransferKind) -> u32 {
        let window = self.bytes_remaining_in_window(address);
        match kind {
            TransferKind::Read => window,
            TransferKind::Program => window.min(self.bytes_remaining_in_program_page(address)),
            TransferKind::Erase => window.min(self.bytes_remaining_in_erase_block(address)),
        }
    }

    /// Split `length` bytes from `address` into segments of `kind`
    pub fn segments(&self, address: ByteAddress, length: u32, kind: TransferKind) -> Segments<'_> {
        Segments {
            translator: self,
            kind,
            address,
            position: 0,
            length,
        }
    }
}

/// Iterator over the [TransferSegment]s of a request, see [BankTranslator::segments]
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    translator: &'a BankTranslator,
    kind: TransferKind,
    address: ByteAddress,
    position: u32,
    length: u32,
}

impl Iterator for Segments<'_> {
    type Item = TransferSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.length - self.position;
        if remaining == 0 {
            return None;
        }
        let (bank, physical) = self.translator.translate(self.address);
        let length = remaining.min(self.translator.segment_limit(self.address, self.kind));
        let segment = TransferSegment {
            bank,
            offset: self.translator.offset(self.address),
            physical,
            length,
            position: self.position,
        };
        self.position += length;
        // The last segment may end exactly at the top of the address space
        self.address = ByteAddress::new(self.address.as_u32().wrapping_add(length));
        Some(segment)
    }
}
