use core::{
    fmt::Display,
    ops::{Add, AddAssign},
};

/// Logical address of a byte in the block device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteAddress(pub(crate) u32);

impl ByteAddress {
    pub fn new(address: u32) -> Self {
        ByteAddress(address)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Number of bytes into the unit of `granularity` bytes containing this address
    pub fn offset_in(&self, granularity: u32) -> u32 {
        self.0 % granularity
    }

    /// Number of bytes from this address up to the next multiple of `granularity`
    pub fn remaining_in(&self, granularity: u32) -> u32 {
        granularity - self.offset_in(granularity)
    }

    /// Round down to a multiple of `granularity`
    pub fn align_down(&self, granularity: u32) -> ByteAddress {
        ByteAddress(self.0 - self.offset_in(granularity))
    }

    pub fn is_aligned(&self, granularity: u32) -> bool {
        self.offset_in(granularity) == 0
    }
}

impl From<u32> for ByteAddress {
    fn from(address: u32) -> Self {
        ByteAddress(address)
    }
}

impl From<ByteAddress> for u32 {
    fn from(ba: ByteAddress) -> Self {
        ba.as_u32()
    }
}

impl Add<u32> for ByteAddress {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        ByteAddress(self.0 + rhs)
    }
}

impl AddAssign<u32> for ByteAddress {
    fn add_assign(&mut self, rhs: u32) {
        self.0 += rhs;
    }
}

impl Display for ByteAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_remaining() {
        let ba = ByteAddress::new(0x1234);
        assert_eq!(ba.offset_in(0x100), 0x34);
        assert_eq!(ba.remaining_in(0x100), 0xCC);
        assert_eq!(ByteAddress::new(0x1200).remaining_in(0x100), 0x100);
    }

    #[test]
    fn test_align() {
        let ba = ByteAddress::new(0x1FFF);
        assert_eq!(ba.align_down(0x1000), ByteAddress::new(0x1000));
        assert!(!ba.is_aligned(0x1000));
        assert!(ByteAddress::new(0x2000).is_aligned(0x1000));
        assert_eq!(ba + 1, ByteAddress::new(0x2000));
    }
}
