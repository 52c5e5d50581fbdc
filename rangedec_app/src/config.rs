//! Decoder maps stored as INI files:
//!
//! ```ini
//! [Decoder]
//! AddressWidth = 8
//! DataWidth = 32
//! Regions = 0x10, 0x10, 8
//!
//! [Names]
//! 0 = uart
//! 2 = timer
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use ini::{Ini, Properties};
use tracing::{info, warn};
use rangedec_lib::{snapshot, AddressDecoder, Configuration};
use crate::error::{AppError, Result};

const DECODER_SECTION: &str = "Decoder";
const NAMES_SECTION: &str = "Names";

/// Decimal or `0x` prefixed hexadecimal number, `_` separators allowed
pub fn parse_number(s: &str) -> Result<u64> {
    let s = s.trim();
    let digits = s.replace('_', "");

    let parsed = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse::<u64>(),
    };

    parsed.map_err(|_| AppError::BadNumber(s.to_string()))
}

fn get<'a>(section: &'a Properties, key: &'static str) -> Result<&'a str> {
    section.get(key).ok_or(AppError::MissingKey {
        section: DECODER_SECTION,
        key,
    })
}

/// A decoder with optional human readable region names
pub struct DecoderMap {
    decoder: AddressDecoder,
    names: HashMap<usize, String>,
}

impl DecoderMap {
    pub fn load(path: &Path) -> Result<DecoderMap> {
        let ini = Ini::load_from_file(path).map_err(|source| AppError::Ini {
            path: path.to_path_buf(),
            source,
        })?;

        let map = DecoderMap::from_ini(&ini)?;

        info!(
            "Loaded decoder map {}: {} regions",
            path.display(),
            map.decoder.table().len()
        );

        Ok(map)
    }

    pub fn from_ini(ini: &Ini) -> Result<DecoderMap> {
        let decoder_sec = ini
            .section(Some(DECODER_SECTION))
            .ok_or(AppError::MissingSection(DECODER_SECTION))?;

        let address_width = parse_number(get(decoder_sec, "AddressWidth")?)?;
        let data_width = parse_number(get(decoder_sec, "DataWidth")?)?;

        let region_sizes = get(decoder_sec, "Regions")?
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(parse_number)
            .collect::<Result<Vec<u64>>>()?;

        let address_width =
            u32::try_from(address_width).map_err(|_| AppError::BadNumber(address_width.to_string()))?;
        let data_width =
            u32::try_from(data_width).map_err(|_| AppError::BadNumber(data_width.to_string()))?;

        let config = Configuration::new(address_width, data_width, region_sizes)?;
        let decoder = AddressDecoder::new(config)?;

        let mut names = HashMap::new();

        if let Some(names_sec) = ini.section(Some(NAMES_SECTION)) {
            for (index, name) in names_sec {
                let index = parse_number(index)? as usize;

                if index >= decoder.table().len() {
                    return Err(AppError::UnknownRegion {
                        index,
                        count: decoder.table().len(),
                    });
                }

                if names.insert(index, name.trim().to_string()).is_some() {
                    warn!("Region {} named more than once, keeping `{}`", index, name);
                }
            }
        }

        Ok(DecoderMap { decoder, names })
    }

    /// Restore a map frozen with `freeze`. Snapshots don't carry region names.
    pub fn thaw(path: &Path) -> Result<DecoderMap> {
        let bytes = fs::read(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(DecoderMap {
            decoder: snapshot::thaw(&bytes)?,
            names: HashMap::new(),
        })
    }

    pub fn freeze(&self, path: &Path) -> Result<()> {
        let bytes = snapshot::freeze(&self.decoder)?;

        fs::write(path, bytes).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Decoder map frozen to {}", path.display());

        Ok(())
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }
}
