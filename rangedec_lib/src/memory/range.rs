use std::fmt;
use std::ops::RangeInclusive;

/// Inclusive address span `[start, end]` covered by one region
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Range {
    start: u64,
    end: u64,
}

impl Range {
    pub fn new(start: u64, end: u64) -> Range {
        debug_assert!(start <= end, "inverted range 0x{:x}..=0x{:x}", start, end);

        Range { start, end }
    }

    pub fn start(self) -> u64 {
        self.start
    }

    /// Last address belonging to the range
    pub fn end(self) -> u64 {
        self.end
    }

    /// Number of addresses in the range. A range covering the full 64-bit space holds 2^64
    /// addresses, hence the u128.
    pub fn size(self) -> u128 {
        (self.end - self.start) as u128 + 1
    }

    /// Return `Some(offset)` if addr is contained in `self`
    pub fn contains(self, addr: u64) -> Option<u64> {
        let Range { start, end } = self;

        if addr >= start && addr <= end {
            Some(addr - start)
        } else {
            None
        }
    }
}

impl From<Range> for RangeInclusive<u64> {
    fn from(r: Range) -> RangeInclusive<u64> {
        r.start..=r.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:x}..=0x{:x}", self.start, self.end)
    }
}

#[test]
fn range_contains() {
    let r = Range::new(8, 15);

    assert_eq!(r.contains(7), None);
    assert_eq!(r.contains(8), Some(0));
    assert_eq!(r.contains(9), Some(1));
    // The upper bound is part of the range
    assert_eq!(r.contains(15), Some(7));
    assert_eq!(r.contains(16), None);
    assert_eq!(r.size(), 8);
}

#[test]
fn range_full_space() {
    let r = Range::new(0, u64::MAX);

    assert_eq!(r.size(), 1 << 64);
    assert_eq!(r.contains(u64::MAX), Some(u64::MAX));
    assert_eq!(RangeInclusive::from(r), 0..=u64::MAX);
}
