/// Layout of the flash array as seen by callers.
///
/// Fixed at construction. Every granularity must divide `total_size`, and
/// [`Geometry::fits_window`] checks they also divide the controller's bank window so
/// that no page or erase block straddles two banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    total_size: u32,
    read_size: u32,
    program_size: u32,
    erase_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    #[error("Sizes must be non zero")]
    ZeroSize,
    #[error("Granularity does not divide the total size")]
    Misaligned,
}

impl Geometry {
    pub const fn new(
        total_size: u32,
        read_size: u32,
        program_size: u32,
        erase_size: u32,
    ) -> Result<Self, GeometryError> {
        if total_size == 0 || read_size == 0 || program_size == 0 || erase_size == 0 {
            return Err(GeometryError::ZeroSize);
        }
        if total_size % read_size != 0
            || total_size % program_size != 0
            || total_size % erase_size != 0
        {
            return Err(GeometryError::Misaligned);
        }
        Ok(Geometry {
            total_size,
            read_size,
            program_size,
            erase_size,
        })
    }

    /// Capacity in bytes
    pub const fn total_size(&self) -> u32 {
        self.total_size
    }

    pub const fn read_size(&self) -> u32 {
        self.read_size
    }

    /// Program page size, a single program command never crosses a page
    pub const fn program_size(&self) -> u32 {
        self.program_size
    }

    /// Erase block (sector) size
    pub const fn erase_size(&self) -> u32 {
        self.erase_size
    }

    /// Check every granularity divides the bank window
    pub const fn fits_window(&self, window_size: u32) -> bool {
        window_size % self.read_size == 0
            && window_size % self.program_size == 0
            && window_size % self.erase_size == 0
    }
}

impl Default for Geometry {
    /// 16 MiB part with 256 byte pages and 4 KiB sectors
    fn default() -> Self {
        Geometry {
            total_size: 0x0100_0000,
            read_size: 1,
            program_size: 256,
            erase_size: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_valid() {
        let geometry = Geometry::new(0x0800_0000, 1, 256, 0x1_0000).unwrap();
        assert_eq!(geometry.total_size(), 0x0800_0000);
        assert_eq!(geometry.program_size(), 256);
        assert_eq!(geometry.erase_size(), 0x1_0000);
        assert!(geometry.fits_window(0x0400_0000));
    }

    #[test]
    fn test_zero() {
        assert_eq!(Geometry::new(0x1000, 1, 0, 0x1000), Err(GeometryError::ZeroSize));
        assert_eq!(Geometry::new(0, 1, 256, 0x1000), Err(GeometryError::ZeroSize));
    }

    #[test]
    fn test_misaligned() {
        assert_eq!(
            Geometry::new(0x1800, 1, 256, 0x1000),
            Err(GeometryError::Misaligned)
        );
    }

    #[test]
    fn test_window() {
        // 3 KiB sectors cannot tile a 64 MiB window
        let geometry = Geometry::new(3 * 0x0400, 1, 256, 3 * 0x0400).unwrap();
        assert!(!geometry.fits_window(0x0400_0000));
        assert!(Geometry::default().fits_window(0x0400_0000));
    }
}
