use serde::{Deserialize, Serialize};
use crate::error::{ConfigError, ConfigResult};
use crate::memory::table::validate_layout;

/// Static description of a decoder map. Once validated it is never modified.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Configuration {
    /// Width of the address bus in bits
    address_width: u32,
    /// Width of the data bus in bits. Not used for decoding, carried through for the consumers
    /// of the decode result.
    data_width: u32,
    /// Size of every region, in address order
    region_sizes: Vec<u64>,
}

impl Configuration {
    pub fn new(
        address_width: u32,
        data_width: u32,
        region_sizes: Vec<u64>,
    ) -> ConfigResult<Configuration> {
        let config = Configuration {
            address_width,
            data_width,
            region_sizes,
        };

        config.validate()?;

        Ok(config)
    }

    /// Reject the configuration if it can't be decoded. Returns the total number of addresses
    /// covered by the regions.
    pub fn validate(&self) -> ConfigResult<u128> {
        if self.data_width == 0 {
            return Err(ConfigError::BadDataWidth);
        }

        validate_layout(&self.region_sizes, self.address_width)
    }

    pub fn address_width(&self) -> u32 {
        self.address_width
    }

    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    pub fn region_sizes(&self) -> &[u64] {
        &self.region_sizes
    }

    pub fn region_count(&self) -> usize {
        self.region_sizes.len()
    }
}

#[test]
fn configuration_validation() {
    let c = Configuration::new(8, 32, vec![8; 8]).unwrap();
    assert_eq!(c.validate(), Ok(64));
    assert_eq!(c.region_count(), 8);

    assert_eq!(
        Configuration::new(8, 0, vec![8]),
        Err(ConfigError::BadDataWidth)
    );
    assert_eq!(
        Configuration::new(8, 32, vec![]),
        Err(ConfigError::NoRegions)
    );
    assert!(matches!(
        Configuration::new(8, 32, vec![300]),
        Err(ConfigError::TooLarge { total: 300, .. })
    ));
}
