//! Error types for the benchmark catalog and query layer.

use std::path::PathBuf;
use thiserror::Error;

/// Load-time catalog faults.
///
/// These surface while opening or re-reading the catalog file. A *missing*
/// catalog is deliberately not represented here: absence is a valid handle
/// state (`Store::is_valid` returns `false`) and only turns into
/// [`QueryError::NotFound`] once an operation is attempted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog file {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Unsupported catalog version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        StoreError::Config(err.to_string())
    }
}

/// Errors raised by query operations.
///
/// The two kinds callers may want to branch on are kept distinct: a bad
/// filter value (`InvalidArgument`, caller mistake, raised before any table
/// is touched) versus an unavailable catalog (`NotFound`, fix by populating
/// the catalog and re-connecting).
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(
        "Catalog cannot be found at expected location {location:?}. \
         Populate it and then try re-connecting using Store::connect()"
    )]
    NotFound { location: PathBuf },

    #[error("Invalid {field} {value:?}. Valid values are {valid:?}, or lists of those")]
    InvalidArgument {
        field: &'static str,
        value: String,
        valid: Vec<String>,
    },

    #[error("Expected exactly one {entity} matching {key:?}, found {matches}")]
    Lookup {
        entity: &'static str,
        key: String,
        matches: usize,
    },
}

/// Errors raised by the population-side catalog builder.
///
/// The builder enforces the schema invariants (unique keys, resolvable
/// foreign keys) so the read path can trust any catalog it loads.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Duplicate {entity} key {key:?}")]
    Duplicate { entity: &'static str, key: String },

    #[error("Unknown {entity} {key:?} referenced by {referrer}")]
    UnknownReference {
        entity: &'static str,
        key: String,
        referrer: &'static str,
    },
}
