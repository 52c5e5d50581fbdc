//! Freeze a decoder map to a flexbuffer and bring it back. Restored maps go through the same
//! validation as freshly built ones.

use serde::{Deserialize, Serialize};
use crate::config::Configuration;
use crate::error::SnapshotError;
use crate::memory::decoder::AddressDecoder;

/// Bumped whenever the layout of `Snapshot` changes
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    config: Configuration,
}

pub fn freeze(decoder: &AddressDecoder) -> Result<Vec<u8>, SnapshotError> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        config: decoder.config().clone(),
    };

    Ok(flexbuffers::to_vec(&snapshot)?)
}

pub fn thaw(bytes: &[u8]) -> Result<AddressDecoder, SnapshotError> {
    let snapshot: Snapshot = flexbuffers::from_slice(bytes)?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::BadVersion {
            expected: SNAPSHOT_VERSION,
            got: snapshot.version,
        });
    }

    let decoder = AddressDecoder::new(snapshot.config)?;

    info!(
        "Restored decoder snapshot: {} regions",
        decoder.table().len()
    );

    Ok(decoder)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn thaw_restores_map() {
        let d = AddressDecoder::new(Configuration::new(10, 16, vec![256, 3, 512]).unwrap()).unwrap();
        let bytes = freeze(&d).unwrap();
        let restored = thaw(&bytes).unwrap();

        assert_eq!(restored.config(), d.config());
        assert_eq!(restored.table(), d.table());
    }

    #[test]
    fn thaw_revalidates() {
        // Hand-built snapshot that never went through `Configuration::new`
        #[derive(Serialize)]
        struct RawConfig {
            address_width: u32,
            data_width: u32,
            region_sizes: Vec<u64>,
        }

        #[derive(Serialize)]
        struct RawSnapshot {
            version: u32,
            config: RawConfig,
        }

        let raw = RawSnapshot {
            version: SNAPSHOT_VERSION,
            config: RawConfig {
                address_width: 8,
                data_width: 8,
                region_sizes: vec![300],
            },
        };
        let bytes = flexbuffers::to_vec(&raw).unwrap();

        assert!(matches!(
            thaw(&bytes),
            Err(SnapshotError::Invalid(ConfigError::TooLarge { .. }))
        ));
    }

    #[test]
    fn thaw_rejects_other_versions() {
        let d = AddressDecoder::new(Configuration::new(8, 8, vec![8]).unwrap()).unwrap();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION + 1,
            config: d.config().clone(),
        };
        let bytes = flexbuffers::to_vec(&snapshot).unwrap();

        assert!(matches!(
            thaw(&bytes),
            Err(SnapshotError::BadVersion { got, .. }) if got == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn thaw_rejects_garbage() {
        assert!(matches!(
            thaw(&[]),
            Err(SnapshotError::Decode(_))
        ));
    }
}
