//! Range table construction from an ordered list of region sizes

use std::slice;
use thiserror::Error;
use crate::error::{ConfigError, ConfigResult};
use super::range::Range;

/// Largest supported address bus
pub const MAX_ADDRESS_WIDTH: u32 = 64;

/// Ways a list of ranges can fail to tile the decode window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutFault {
    #[error("table is empty")]
    Empty,
    #[error("first region starts at 0x{0:x} instead of 0")]
    NotAtZero(u64),
    #[error("region {index} is inverted ({range})")]
    Inverted { index: usize, range: Range },
    #[error("region {index} ({range}) doesn't start right after the previous one")]
    NotContiguous { index: usize, range: Range },
}

/// Check the sizes against the address bus and return the total number of addresses they span.
pub fn validate_layout(region_sizes: &[u64], address_width: u32) -> ConfigResult<u128> {
    if address_width == 0 || address_width > MAX_ADDRESS_WIDTH {
        return Err(ConfigError::BadAddressWidth(address_width));
    }

    if region_sizes.is_empty() {
        return Err(ConfigError::NoRegions);
    }

    if let Some(index) = region_sizes.iter().position(|&s| s == 0) {
        return Err(ConfigError::EmptyRegion { index });
    }

    // Can't overflow: we'd need more than 2^64 regions
    let total: u128 = region_sizes.iter().map(|&s| s as u128).sum();
    let capacity = 1u128 << address_width;

    if total > capacity {
        return Err(ConfigError::TooLarge {
            total,
            width: address_width,
            capacity,
        });
    }

    Ok(total)
}

/// Ordered, contiguous, disjoint ranges starting at address 0, one per region. Immutable once
/// built.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RangeTable {
    ranges: Box<[Range]>,
    total: u128,
}

impl RangeTable {
    /// Lay the regions out back to back starting at address 0
    pub fn build(region_sizes: &[u64], address_width: u32) -> ConfigResult<RangeTable> {
        let total = validate_layout(region_sizes, address_width)?;

        let mut ranges = Vec::with_capacity(region_sizes.len());
        let mut start = 0u64;

        for &size in region_sizes {
            // `validate_layout` guarantees that the whole table fits in 64 bits, but the start of
            // the region following the very last address doesn't
            let end = start + (size - 1);
            ranges.push(Range::new(start, end));
            start = end.wrapping_add(1);
        }

        let table = RangeTable {
            ranges: ranges.into_boxed_slice(),
            total,
        };

        table.check_layout()?;

        debug!(
            "Built range table: {} regions, 0x{:x} addresses",
            table.len(),
            table.total
        );

        Ok(table)
    }

    /// Verify that the ranges tile `[0, total)` without gaps or overlaps
    pub fn check_layout(&self) -> Result<(), LayoutFault> {
        let first = self.ranges.first().ok_or(LayoutFault::Empty)?;

        if first.start() != 0 {
            return Err(LayoutFault::NotAtZero(first.start()));
        }

        for (index, &range) in self.ranges.iter().enumerate() {
            if range.start() > range.end() {
                return Err(LayoutFault::Inverted { index, range });
            }

            if index > 0 {
                let prev = self.ranges[index - 1];

                if prev.end().checked_add(1) != Some(range.start()) {
                    return Err(LayoutFault::NotContiguous { index, range });
                }
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Always false for a built table, present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Range> {
        self.ranges.get(index).copied()
    }

    pub fn iter(&self) -> slice::Iter<'_, Range> {
        self.ranges.iter()
    }

    pub fn as_slice(&self) -> &[Range] {
        &self.ranges
    }

    /// Total number of addresses covered by the table
    pub fn total_size(&self) -> u128 {
        self.total
    }

    /// Lowest decodable address, always 0
    pub fn lo(&self) -> u64 {
        self.ranges[0].start()
    }

    /// Highest decodable address
    pub fn hi(&self) -> u64 {
        self.ranges[self.ranges.len() - 1].end()
    }

    /// Compare `addr` against every range, the way a bank of per-region comparators would.
    /// Returns the matching region and the offset within it.
    pub fn find_linear(&self, addr: u64) -> Option<(usize, u64)> {
        let mut hit = None;

        for (index, range) in self.ranges.iter().enumerate() {
            if let Some(offset) = range.contains(addr) {
                assert!(
                    hit.is_none(),
                    "address 0x{:x} selects several regions",
                    addr
                );
                hit = Some((index, offset));
            }
        }

        hit
    }

    /// Binary search over the sorted ranges
    pub fn find_binary(&self, addr: u64) -> Option<(usize, u64)> {
        // Index of the first range ending at or after `addr`
        let index = self.ranges.partition_point(|r| r.end() < addr);

        let range = self.ranges.get(index)?;

        range.contains(addr).map(|offset| (index, offset))
    }
}

impl<'a> IntoIterator for &'a RangeTable {
    type Item = &'a Range;
    type IntoIter = slice::Iter<'a, Range>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_accumulates() {
        let t = RangeTable::build(&[4, 1, 16], 8).unwrap();

        assert_eq!(
            t.as_slice(),
            &[Range::new(0, 3), Range::new(4, 4), Range::new(5, 20)]
        );
        assert_eq!(t.total_size(), 21);
        assert_eq!(t.lo(), 0);
        assert_eq!(t.hi(), 20);
        assert_eq!(t.check_layout(), Ok(()));
    }

    #[test]
    fn build_rejects() {
        assert_eq!(RangeTable::build(&[], 8), Err(ConfigError::NoRegions));
        assert_eq!(
            RangeTable::build(&[4, 0, 4], 8),
            Err(ConfigError::EmptyRegion { index: 1 })
        );
        assert_eq!(
            RangeTable::build(&[300], 8),
            Err(ConfigError::TooLarge {
                total: 300,
                width: 8,
                capacity: 256
            })
        );
        assert_eq!(
            RangeTable::build(&[1], 0),
            Err(ConfigError::BadAddressWidth(0))
        );
        assert_eq!(
            RangeTable::build(&[1], 65),
            Err(ConfigError::BadAddressWidth(65))
        );
    }

    #[test]
    fn build_fills_bus() {
        // Exactly 2^width is fine
        let t = RangeTable::build(&[128, 128], 8).unwrap();
        assert_eq!(t.hi(), 255);

        let t = RangeTable::build(&[u64::MAX, 1], 64).unwrap();
        assert_eq!(t.hi(), u64::MAX);
        assert_eq!(t.total_size(), 1 << 64);
        assert_eq!(t.find_binary(u64::MAX), Some((1, 0)));
        assert_eq!(t.find_linear(u64::MAX - 1), Some((0, u64::MAX - 1)));
    }

    #[test]
    fn search_boundaries() {
        let t = RangeTable::build(&[8, 8, 8], 8).unwrap();

        for (addr, expected) in [
            (0, Some((0, 0))),
            (7, Some((0, 7))),
            (8, Some((1, 0))),
            (15, Some((1, 7))),
            (23, Some((2, 7))),
            (24, None),
            (255, None),
        ] {
            assert_eq!(t.find_linear(addr), expected, "linear 0x{:x}", addr);
            assert_eq!(t.find_binary(addr), expected, "binary 0x{:x}", addr);
        }
    }

    #[test]
    fn layout_faults() {
        let t = RangeTable {
            ranges: vec![Range::new(1, 4)].into_boxed_slice(),
            total: 4,
        };
        assert_eq!(t.check_layout(), Err(LayoutFault::NotAtZero(1)));

        let t = RangeTable {
            ranges: vec![Range::new(0, 4), Range::new(6, 8)].into_boxed_slice(),
            total: 8,
        };
        assert_eq!(
            t.check_layout(),
            Err(LayoutFault::NotContiguous {
                index: 1,
                range: Range::new(6, 8)
            })
        );
    }

    #[test]
    #[should_panic(expected = "selects several regions")]
    fn overlapping_ranges_are_caught() {
        let t = RangeTable {
            ranges: vec![Range::new(0, 4), Range::new(4, 8)].into_boxed_slice(),
            total: 9,
        };

        t.find_linear(4);
    }
}
