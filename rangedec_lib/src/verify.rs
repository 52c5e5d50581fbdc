//! Correctness oracle for `AddressDecoder`.
//!
//! The checker recomputes every lookup from the raw configuration (region sizes and the power
//! of two window they fit in) without going through the range table or the mask, and compares
//! the result with what the decoder returns. Small address spaces are enumerated completely,
//! larger ones are covered by the region boundaries plus seeded random addresses.

use std::fmt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use crate::memory::decoder::{AddressDecoder, LookupRequest, LookupResult, Selection};
use crate::memory::mask::low_mask;
use crate::memory::table::LayoutFault;

/// Widest address bus `check` enumerates completely
pub const EXHAUSTIVE_MAX_WIDTH: u32 = 20;

/// Random addresses tried by `check` when the bus is too wide to enumerate
pub const DEFAULT_SAMPLES: u64 = 100_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("Range table layout: {0}")]
    Layout(#[from] LayoutFault),
    #[error("Region {index} spans {got} addresses, configured for {expected}")]
    RegionSize { index: usize, expected: u64, got: u128 },
    #[error("Range table covers {got} addresses, configured for {expected}")]
    TotalSize { expected: u128, got: u128 },
    #[error("0x{address:x}: expected {expected:?}, decoded {got:?}")]
    Mismatch {
        address: u64,
        expected: Selection,
        got: LookupResult,
    },
    #[error("0x{address:x}: offset 0x{offset:x} is past the end of region {index}")]
    OffsetOutOfRegion { address: u64, index: usize, offset: u64 },
    #[error("0x{address:x}: {high} select lines high, expected {expected}")]
    SelectLines {
        address: u64,
        high: usize,
        expected: usize,
    },
    #[error("0x{address:x} with enable={enable} select={select} wasn't idle: {got:?}")]
    NotIdle {
        address: u64,
        enable: bool,
        select: bool,
        got: LookupResult,
    },
    #[error("0x{address:x}: decoded {first:?} then {second:?}")]
    NotIdempotent {
        address: u64,
        first: LookupResult,
        second: LookupResult,
    },
    #[error("Can't enumerate a {width}-bit address space (limit is {max} bits)")]
    DomainTooLarge { width: u32, max: u32 },
}

/// Tally of the addresses a check went through
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CheckReport {
    pub checked: u64,
    /// Addresses that selected a region
    pub hits: u64,
    /// Addresses reported out of range
    pub misses: u64,
}

impl CheckReport {
    fn record(&mut self, hit: bool) {
        self.checked += 1;

        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} addresses checked, {} in range, {} out of range",
            self.checked, self.hits, self.misses
        )
    }
}

pub struct PropertyChecker<'a> {
    decoder: &'a AddressDecoder,
    /// Highest address the bus can carry
    domain_max: u64,
}

impl<'a> PropertyChecker<'a> {
    pub fn new(decoder: &'a AddressDecoder) -> PropertyChecker<'a> {
        PropertyChecker {
            decoder,
            domain_max: low_mask(decoder.config().address_width()),
        }
    }

    /// Enumerate the whole address space if it's small enough, sample it otherwise
    pub fn check(&self, samples: u64, seed: u64) -> Result<CheckReport, Violation> {
        if self.decoder.config().address_width() <= EXHAUSTIVE_MAX_WIDTH {
            self.check_exhaustive()
        } else {
            self.check_sampled(samples, seed)
        }
    }

    pub fn check_exhaustive(&self) -> Result<CheckReport, Violation> {
        let width = self.decoder.config().address_width();

        if width > EXHAUSTIVE_MAX_WIDTH {
            return Err(Violation::DomainTooLarge {
                width,
                max: EXHAUSTIVE_MAX_WIDTH,
            });
        }

        self.run(0..=self.domain_max)
    }

    /// Check every region boundary, then `samples` random addresses drawn from a generator
    /// seeded with `seed`
    pub fn check_sampled(&self, samples: u64, seed: u64) -> Result<CheckReport, Violation> {
        let mut rng = StdRng::seed_from_u64(seed);
        let domain_max = self.domain_max;

        let boundaries = self.boundary_addresses();
        let random = (0..samples).map(move |_| rng.gen_range(0..=domain_max));

        self.run(boundaries.into_iter().chain(random))
    }

    fn run<I>(&self, addresses: I) -> Result<CheckReport, Violation>
    where
        I: Iterator<Item = u64>,
    {
        let outcome = self.check_layout().and_then(|_| {
            let mut report = CheckReport::default();

            for addr in addresses {
                let hit = self.check_address(addr)?;
                report.record(hit);
            }

            Ok(report)
        });

        match &outcome {
            Ok(report) => info!("Decoder verified: {}", report),
            Err(v) => warn!("Decoder check failed: {}", v),
        }

        outcome
    }

    /// Check that the range table matches the configured region sizes and tiles the window
    pub fn check_layout(&self) -> Result<(), Violation> {
        let table = self.decoder.table();
        let sizes = self.decoder.config().region_sizes();

        table.check_layout()?;

        for (index, (range, &expected)) in table.iter().zip(sizes).enumerate() {
            if range.size() != expected as u128 {
                return Err(Violation::RegionSize {
                    index,
                    expected,
                    got: range.size(),
                });
            }
        }

        let expected: u128 = sizes.iter().map(|&s| s as u128).sum();
        let got = table.hi() as u128 + 1;

        if table.len() != sizes.len() || got != expected {
            return Err(Violation::TotalSize { expected, got });
        }

        Ok(())
    }

    /// What decoding `address` must return, computed straight from the region sizes
    pub fn expected(&self, address: u64) -> Selection {
        let sizes = self.decoder.config().region_sizes();
        let total: u128 = sizes.iter().map(|&s| s as u128).sum();
        let window = total.next_power_of_two();
        let masked = address as u128 % window;

        let mut start = 0u128;

        for (index, &size) in sizes.iter().enumerate() {
            let end = start + size as u128;

            if masked < end {
                return Selection::Region {
                    index,
                    offset: (masked - start) as u64,
                };
            }

            start = end;
        }

        Selection::OutOfRange { address }
    }

    /// Check all the properties of a single address. Returns true if it hit a region.
    pub fn check_address(&self, address: u64) -> Result<bool, Violation> {
        let d = self.decoder;
        let req = LookupRequest::new(address);

        let got = d.decode(req);

        let second = d.decode(req);
        if second != got {
            return Err(Violation::NotIdempotent {
                address,
                first: got,
                second,
            });
        }

        let expected = self.expected(address);
        if got != LookupResult::from(expected) {
            return Err(Violation::Mismatch {
                address,
                expected,
                got,
            });
        }

        let high = got.select_lines(d.table().len()).iter().filter(|&&l| l).count();
        let hit = got.selected.is_some();
        let expected_high = hit as usize;

        if high != expected_high {
            return Err(Violation::SelectLines {
                address,
                high,
                expected: expected_high,
            });
        }

        if let Some(index) = got.selected {
            let size = d.config().region_sizes()[index];

            if got.offset >= size {
                return Err(Violation::OffsetOutOfRegion {
                    address,
                    index,
                    offset: got.offset,
                });
            }
        }

        for (enable, select) in [(false, true), (true, false), (false, false)] {
            let got = d.decode(req.with_enable(enable).with_select(select));

            if got != LookupResult::IDLE {
                return Err(Violation::NotIdle {
                    address,
                    enable,
                    select,
                    got,
                });
            }
        }

        Ok(hit)
    }

    /// First and last address of every region, the address right after each of them, plus the
    /// edges of the decode window and of the bus. Mirrors of every region start are included
    /// when the bus is wider than the window.
    fn boundary_addresses(&self) -> Vec<u64> {
        let mask = self.decoder.mask().mask();
        let domain_max = self.domain_max;

        let mut addrs = vec![0, mask, mask.wrapping_add(1), domain_max];

        for range in self.decoder.table() {
            addrs.push(range.start());
            addrs.push(range.end());
            addrs.push(range.end().wrapping_add(1));

            if mask < domain_max {
                addrs.push(range.start() | (mask + 1));
                addrs.push(range.end() | !mask);
            }
        }

        for a in addrs.iter_mut() {
            *a &= domain_max;
        }

        addrs.sort_unstable();
        addrs.dedup();

        addrs
    }
}
