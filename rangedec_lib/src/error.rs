use thiserror::Error;
use crate::memory::table::LayoutFault;

pub type ConfigResult<T> = ::std::result::Result<T, ConfigError>;

/// Reasons a decoder map is rejected at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No regions configured")]
    NoRegions,
    #[error("Region {index} has a size of 0")]
    EmptyRegion { index: usize },
    #[error("Address width must be between 1 and 64 bits, got {0}")]
    BadAddressWidth(u32),
    #[error("Data width must be at least 1 bit")]
    BadDataWidth,
    #[error("Regions span {total} addresses but a {width}-bit address bus only has {capacity}")]
    TooLarge {
        total: u128,
        width: u32,
        capacity: u128,
    },
    #[error("Bad range table layout: {0}")]
    Layout(#[from] LayoutFault),
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Couldn't encode decoder snapshot: {0}")]
    Encode(#[from] flexbuffers::SerializationError),
    #[error("Couldn't decode decoder snapshot: {0}")]
    Decode(#[from] flexbuffers::DeserializationError),
    #[error("Bad snapshot version: expected {expected} got {got}")]
    BadVersion { expected: u32, got: u32 },
    #[error("Snapshot holds an invalid decoder map: {0}")]
    Invalid(#[from] ConfigError),
}
