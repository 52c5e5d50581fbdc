//! Static address-range decoder.
//!
//! An address space is split into an ordered list of contiguous regions. Every lookup masks the
//! incoming address down to the smallest power of two window covering the regions, then reports
//! which region holds it and at which offset, or flags the address as out of range.
//!
//! ```
//! use rangedec_lib::{AddressDecoder, Configuration, LookupResult};
//!
//! let config = Configuration::new(8, 32, vec![8; 8]).unwrap();
//! let decoder = AddressDecoder::new(config).unwrap();
//!
//! assert_eq!(decoder.decode_address(9), LookupResult::hit(1, 1));
//! // Bit 7 is outside the 64 address window, 200 mirrors 8
//! assert_eq!(decoder.decode_address(200), LookupResult::hit(1, 0));
//! ```

#[macro_use]
extern crate log;

mod config;
mod error;
pub mod memory;
pub mod snapshot;
pub mod verify;

pub use config::Configuration;
pub use error::{ConfigError, ConfigResult, SnapshotError};
pub use memory::decoder::{
    AddressDecoder, ErrorCode, LookupRequest, LookupResult, SearchStrategy, Selection,
};
pub use memory::mask::AddressMask;
pub use memory::range::Range;
pub use memory::table::{LayoutFault, RangeTable};
pub use verify::{CheckReport, PropertyChecker, Violation};
