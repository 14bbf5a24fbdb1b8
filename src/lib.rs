#![cfg_attr(not(test), no_std)]

// Must be first to share macros across crate
mod fmt;

mod address;
pub mod iter;
pub use address::ByteAddress;

pub trait BlockDeviceError {
    /// Convert a specific block device error into a generic error kind
    fn kind(&self) -> BlockDeviceErrorKind;
}

/// A trait that BlockDevice implementations can use to share an error type.
pub trait ErrorType {
    /// Errors returned by this block device.
    type Error: BlockDeviceError;
}

/// Block device error kinds.
///
/// Block device implementations must map their error to those generic error kinds through the
/// [`BlockDeviceError`] trait.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum BlockDeviceErrorKind {
    /// A buffer argument is missing or too small for the requested length.
    InvalidArgument,

    /// The requested range does not fit inside the device.
    InvalidAddress,

    /// The device stayed busy for longer than the polling bound.
    Timeout,

    /// The underlying peripheral reported a failure.
    Device,

    /// Error specific to the implementation.
    Other,
}

/// Byte addressed block device with separate read, program and erase granularities.
///
/// Addresses are logical: `0..size()`. Implementations are responsible for splitting
/// requests on whatever physical boundaries the hardware imposes.
pub trait BlockDevice: ErrorType {
    /// Bring the device up. Calling this on an already initialised device is a no-op.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Shut the device down.
    fn deinit(&mut self) -> Result<(), Self::Error>;

    /// Read `length` bytes starting at `address` into the start of `buffer`.
    ///
    /// # Errors
    ///
    /// Returns an error if `buffer` is shorter than `length` or the range is out of bounds.
    /// The implementation can use the [`check_buffer`] and [`check_range`] helpers.
    fn read(&mut self, buffer: &mut [u8], address: u32, length: u32) -> Result<(), Self::Error>;

    /// Program `length` bytes from the start of `buffer` to `address`.
    ///
    /// Programming can only clear bits, the target range should be erased first.
    fn write(&mut self, buffer: &[u8], address: u32, length: u32) -> Result<(), Self::Error>;

    /// Alias for [`BlockDevice::write`].
    fn program(&mut self, buffer: &[u8], address: u32, length: u32) -> Result<(), Self::Error> {
        self.write(buffer, address, length)
    }

    /// Erase every erase block that overlaps `address..address + length`.
    ///
    /// Erased blocks read back as all 1s. Bytes outside the requested range but inside an
    /// overlapping block are erased too.
    fn erase(&mut self, address: u32, length: u32) -> Result<(), Self::Error>;

    /// The capacity of the device in bytes.
    fn size(&self) -> u32;

    /// The minimum number of bytes the device can read
    fn get_read_size(&self) -> u32;

    /// The page size used when programming
    fn get_program_size(&self) -> u32;

    /// The minimum number of bytes the device can erase
    fn get_erase_size(&self) -> u32;

    /// Fixed identifier of the device type
    fn get_type(&self) -> &'static str;

    /// Iterate over the start addresses of the erase blocks overlapping a range
    fn erase_blocks(&self, address: u32, length: u32) -> iter::BlockIter {
        iter::BlockIter::covering(address, length, self.get_erase_size())
    }
}

/// Return whether `address..address + length` lies inside a device of `capacity` bytes.
///
/// A zero length range is valid as long as it does not start past the end of the device.
pub fn check_range(capacity: u32, address: u32, length: u32) -> Result<(), BlockDeviceErrorKind> {
    // u64 so that address + length cannot wrap
    if address as u64 + length as u64 > capacity as u64 {
        trace!(
            "Range {}+{} outside capacity {}",
            address,
            length,
            capacity
        );
        return Err(BlockDeviceErrorKind::InvalidAddress);
    }
    Ok(())
}

/// Return whether a buffer of `available` bytes can hold a transfer of `length` bytes.
pub fn check_buffer(available: usize, length: u32) -> Result<(), BlockDeviceErrorKind> {
    if (available as u64) < length as u64 {
        return Err(BlockDeviceErrorKind::InvalidArgument);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    const CAPACITY: u32 = 0x0100_0000;

    #[test]
    fn test_range_inside() {
        assert_eq!(check_range(CAPACITY, 0, CAPACITY), Ok(()));
        assert_eq!(check_range(CAPACITY, CAPACITY - 1, 1), Ok(()));
        assert_eq!(check_range(CAPACITY, 0x1234, 0x100), Ok(()));
    }

    #[test]
    fn test_range_outside() {
        assert_eq!(
            check_range(CAPACITY, CAPACITY, 1),
            Err(BlockDeviceErrorKind::InvalidAddress)
        );
        assert_eq!(
            check_range(CAPACITY, CAPACITY - 1, 2),
            Err(BlockDeviceErrorKind::InvalidAddress)
        );
        assert_eq!(
            check_range(CAPACITY, 0, CAPACITY + 1),
            Err(BlockDeviceErrorKind::InvalidAddress)
        );
    }

    /// address + length must not wrap around into a valid range
    #[test]
    fn test_range_overflow() {
        assert_eq!(
            check_range(u32::MAX, u32::MAX, u32::MAX),
            Err(BlockDeviceErrorKind::InvalidAddress)
        );
        assert_eq!(
            check_range(CAPACITY, 0x10, u32::MAX),
            Err(BlockDeviceErrorKind::InvalidAddress)
        );
    }

    #[test]
    fn test_range_empty() {
        assert_eq!(check_range(CAPACITY, 0, 0), Ok(()));
        assert_eq!(check_range(CAPACITY, CAPACITY, 0), Ok(()));
        assert_eq!(
            check_range(CAPACITY, CAPACITY + 1, 0),
            Err(BlockDeviceErrorKind::InvalidAddress)
        );
    }

    #[test]
    fn test_buffer() {
        assert_eq!(check_buffer(16, 16), Ok(()));
        assert_eq!(check_buffer(32, 16), Ok(()));
        assert_eq!(check_buffer(0, 0), Ok(()));
        assert_eq!(
            check_buffer(15, 16),
            Err(BlockDeviceErrorKind::InvalidArgument)
        );
    }
}
