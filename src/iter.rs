/// Iterate over the start addresses of fixed size blocks
///
/// Use [BlockIter::covering] to get every block that overlaps a byte range.
#[derive(Debug, Clone)]
pub struct BlockIter {
    pub(crate) block_size: u32,
    pub(crate) next: u64,
    pub(crate) end: u64,
}

impl BlockIter {
    /// Blocks of `block_size` bytes overlapping `address..address + length`.
    ///
    /// The first block starts at or before `address`, the last one ends at or after
    /// `address + length`. An empty range yields no blocks.
    pub fn covering(address: u32, length: u32, block_size: u32) -> Self {
        let block_size_u64 = block_size as u64;
        let start = address as u64 / block_size_u64 * block_size_u64;
        let end = if length == 0 {
            start
        } else {
            (address as u64 + length as u64).div_ceil(block_size_u64) * block_size_u64
        };
        BlockIter {
            block_size,
            next: start,
            end,
        }
    }

    /// Number of bytes the remaining blocks cover
    pub fn span(&self) -> u64 {
        self.end - self.next
    }
}

impl Iterator for BlockIter {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            let block = self.next as u32;
            self.next += self.block_size as u64;
            Some(block)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.span() / self.block_size as u64) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BlockIter {}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_aligned_range() {
        let blocks: [u32; 2] = [0x1000, 0x2000];
        assert!(BlockIter::covering(0x1000, 0x2000, 0x1000).eq(blocks));
    }

    #[test]
    fn test_unaligned_range() {
        // Starts half way into block 0 and ends half way into block 1
        let iter = BlockIter::covering(0x800, 0x1000, 0x1000);
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.span(), 0x2000);
        assert!(iter.eq([0x0, 0x1000]));
    }

    #[test]
    fn test_sub_block_range() {
        assert!(BlockIter::covering(0x1010, 0x10, 0x1000).eq([0x1000]));
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(BlockIter::covering(0x1010, 0, 0x1000).count(), 0);
    }

    #[test]
    fn test_end_of_address_space() {
        let iter = BlockIter::covering(u32::MAX - 0xFFF, 0x1000, 0x1000);
        assert!(iter.eq([u32::MAX - 0xFFF]));
    }
}
