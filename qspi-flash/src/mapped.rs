use crate::bank::WindowOffset;

/// Bounds checked view of the memory mapped (XIP) window of the selected bank.
///
/// Reads only accept a [WindowOffset], which the driver gets from the bank
/// translator, and are checked against the window length.
#[derive(Debug, Clone, Copy)]
pub struct MappedRegion<'a> {
    window: &'a [u8],
}

impl<'a> MappedRegion<'a> {
    pub fn new(window: &'a [u8]) -> Self {
        MappedRegion { window }
    }

    /// Build a region over a raw memory mapped window.
    ///
    /// # Safety
    ///
    /// `base` must point to `len` bytes that stay readable for `'a`, usually the XIP
    /// window of an opened QSPI controller.
    pub unsafe fn from_raw(base: *const u8, len: usize) -> Self {
        MappedRegion {
            window: core::slice::from_raw_parts(base, len),
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Copy `dest.len()` bytes starting at `offset` into `dest`.
    ///
    /// Returns `None` without touching `dest` if the range runs past the window.
    pub fn copy_to(&self, offset: WindowOffset, dest: &mut [u8]) -> Option<()> {
        let start = offset.as_u32() as usize;
        let end = start.checked_add(dest.len())?;
        dest.copy_from_slice(self.window.get(start..end)?);
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_copy_inside() {
        let window = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let region = MappedRegion::new(&window);
        let mut dest = [0xAA; 3];
        assert_eq!(region.copy_to(WindowOffset(4), &mut dest), Some(()));
        assert_eq!(dest, [4, 5, 6]);
    }

    #[test]
    fn test_copy_outside() {
        let window = [0u8; 8];
        let region = MappedRegion::new(&window);
        let mut dest = [0xAA; 4];
        assert_eq!(region.copy_to(WindowOffset(6), &mut dest), None);
        assert_eq!(dest, [0xAA; 4]);
        assert_eq!(region.copy_to(WindowOffset(8), &mut []), Some(()));
    }
}
