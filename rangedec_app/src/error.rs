use std::path::PathBuf;
use thiserror::Error;
use rangedec_lib::{ConfigError, SnapshotError, Violation};

pub type Result<T> = ::std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Couldn't access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Couldn't parse decoder map {path}: {source}")]
    Ini {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },
    #[error("Missing [{0}] section in decoder map")]
    MissingSection(&'static str),
    #[error("Missing {key} in [{section}]")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },
    #[error("Bad number in decoder map: `{0}`")]
    BadNumber(String),
    #[error("Name given for region {index} but the map only has {count} regions")]
    UnknownRegion { index: usize, count: usize },
    #[error("A decoder map is needed, use --config or --snapshot")]
    NoMap,
    #[error("Invalid decoder map: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("Decoder check failed: {0}")]
    Violation(#[from] Violation),
}
