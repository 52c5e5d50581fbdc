use num_derive::{FromPrimitive, ToPrimitive};
use crate::config::Configuration;
use crate::error::ConfigResult;
use super::mask::AddressMask;
use super::table::RangeTable;

/// Below this many regions a linear scan beats the binary search
pub const LINEAR_SCAN_MAX_REGIONS: usize = 8;

/// Error code reported alongside every lookup, as seen on the bus
#[derive(FromPrimitive, ToPrimitive, Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum ErrorCode {
    #[default]
    None = 0,
    /// The (masked) address doesn't fall in any region
    AddressOutOfRange = 1,
}

/// A single lookup as driven by the parent bus
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LookupRequest {
    pub address: u64,
    pub enable: bool,
    pub select: bool,
}

impl LookupRequest {
    /// Enabled and selected lookup of `address`
    pub fn new(address: u64) -> LookupRequest {
        LookupRequest {
            address,
            enable: true,
            select: true,
        }
    }

    pub fn with_enable(self, enable: bool) -> LookupRequest {
        LookupRequest { enable, ..self }
    }

    pub fn with_select(self, select: bool) -> LookupRequest {
        LookupRequest { select, ..self }
    }

    /// True if the decoder actually performs a lookup for this request
    pub fn is_active(self) -> bool {
        self.enable && self.select
    }
}

/// Outcome of a lookup
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Selection {
    /// Not enabled or not selected, nothing was looked up
    Idle,
    /// The address hit region `index`, `offset` addresses past its start
    Region { index: usize, offset: u64 },
    /// No region contains the address. `address` is the raw, unmasked address.
    OutOfRange { address: u64 },
}

/// Flat view of the decode outputs
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LookupResult {
    /// Index of the selected region, if any
    pub selected: Option<usize>,
    /// Address relative to the start of the selected region, 0 otherwise
    pub offset: u64,
    pub error: ErrorCode,
    /// Raw address of the failed lookup, 0 otherwise
    pub error_address: u64,
}

impl LookupResult {
    pub const IDLE: LookupResult = LookupResult {
        selected: None,
        offset: 0,
        error: ErrorCode::None,
        error_address: 0,
    };

    pub fn hit(index: usize, offset: u64) -> LookupResult {
        LookupResult {
            selected: Some(index),
            offset,
            ..LookupResult::IDLE
        }
    }

    pub fn out_of_range(address: u64) -> LookupResult {
        LookupResult {
            error: ErrorCode::AddressOutOfRange,
            error_address: address,
            ..LookupResult::IDLE
        }
    }

    pub fn is_error(&self) -> bool {
        self.error != ErrorCode::None
    }

    pub fn selection(&self) -> Selection {
        match (self.selected, self.error) {
            (Some(index), _) => Selection::Region {
                index,
                offset: self.offset,
            },
            (None, ErrorCode::AddressOutOfRange) => Selection::OutOfRange {
                address: self.error_address,
            },
            (None, ErrorCode::None) => Selection::Idle,
        }
    }

    /// One select line per region, at most one of them high
    pub fn select_lines(&self, regions: usize) -> Vec<bool> {
        (0..regions).map(|i| self.selected == Some(i)).collect()
    }
}

impl From<Selection> for LookupResult {
    fn from(s: Selection) -> LookupResult {
        match s {
            Selection::Idle => LookupResult::IDLE,
            Selection::Region { index, offset } => LookupResult::hit(index, offset),
            Selection::OutOfRange { address } => LookupResult::out_of_range(address),
        }
    }
}

/// How the decoder looks up the region containing an address
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchStrategy {
    /// Test every region
    Linear,
    /// Binary search over the sorted ranges
    Binary,
    /// Linear for small tables, binary otherwise
    #[default]
    Auto,
}

/// Immutable address decoder. All lookups go through `&self` so a single instance can be
/// shared between any number of threads.
#[derive(Clone, Debug)]
pub struct AddressDecoder {
    config: Configuration,
    table: RangeTable,
    mask: AddressMask,
    strategy: SearchStrategy,
}

impl AddressDecoder {
    pub fn new(config: Configuration) -> ConfigResult<AddressDecoder> {
        config.validate()?;

        let table = RangeTable::build(config.region_sizes(), config.address_width())?;
        let mask = AddressMask::for_total(table.total_size());

        Ok(AddressDecoder {
            config,
            table,
            mask,
            strategy: SearchStrategy::default(),
        })
    }

    pub fn with_strategy(self, strategy: SearchStrategy) -> AddressDecoder {
        AddressDecoder { strategy, ..self }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn table(&self) -> &RangeTable {
        &self.table
    }

    pub fn mask(&self) -> AddressMask {
        self.mask
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn decode(&self, req: LookupRequest) -> LookupResult {
        if !req.is_active() {
            return LookupResult::IDLE;
        }

        let addr = self.mask.apply(req.address);

        if addr < self.table.lo() || addr > self.table.hi() {
            return LookupResult::out_of_range(req.address);
        }

        match self.find(addr) {
            Some((index, offset)) => LookupResult::hit(index, offset),
            // Can't happen with a contiguous table, report it like any other miss
            None => LookupResult::out_of_range(req.address),
        }
    }

    /// Shorthand for an enabled and selected lookup
    pub fn decode_address(&self, address: u64) -> LookupResult {
        self.decode(LookupRequest::new(address))
    }

    /// Per-region select lines for `req`
    pub fn select_lines(&self, req: LookupRequest) -> Vec<bool> {
        self.decode(req).select_lines(self.table.len())
    }

    fn find(&self, addr: u64) -> Option<(usize, u64)> {
        let linear = match self.strategy {
            SearchStrategy::Linear => true,
            SearchStrategy::Binary => false,
            SearchStrategy::Auto => self.table.len() <= LINEAR_SCAN_MAX_REGIONS,
        };

        if linear {
            return self.table.find_linear(addr);
        }

        let hit = self.table.find_binary(addr);

        if cfg!(feature = "paranoid") {
            assert_eq!(
                hit,
                self.table.find_linear(addr),
                "binary search disagrees with linear scan for 0x{:x}",
                addr
            );
        }

        hit
    }
}
