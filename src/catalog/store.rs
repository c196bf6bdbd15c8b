//! Catalog container and the read-only store handle.
//!
//! The catalog is a single bincode file with a version header. Opening a
//! handle against a *missing* file yields an invalid-but-usable handle
//! (`is_valid() == false`); the absence is only reported once a query
//! asserts validity. A handle that did load holds every table in memory
//! for its whole lifetime — the dataset is small and fixed-size, and no
//! write path exists at runtime.

use crate::catalog::index::CatalogIndex;
use crate::catalog::models::{
    Client, File, Protocol, ProtocolPurpose, PurposeFile, Subworld, SubworldMember,
};
use crate::config::Settings;
use crate::error::{QueryError, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk format version understood by this crate
pub const CATALOG_VERSION: u32 = 1;

/// The full set of catalog tables.
///
/// Row order is the population order; queries impose their own ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub(crate) clients: Vec<Client>,
    pub(crate) subworlds: Vec<Subworld>,
    pub(crate) files: Vec<File>,
    pub(crate) protocols: Vec<Protocol>,
    pub(crate) protocol_purposes: Vec<ProtocolPurpose>,
    pub(crate) subworld_members: Vec<SubworldMember>,
    pub(crate) purpose_files: Vec<PurposeFile>,
}

impl Catalog {
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn subworlds(&self) -> &[Subworld] {
        &self.subworlds
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }

    pub fn protocol_purposes(&self) -> &[ProtocolPurpose] {
        &self.protocol_purposes
    }

    pub fn subworld_members(&self) -> &[SubworldMember] {
        &self.subworld_members
    }

    pub fn purpose_files(&self) -> &[PurposeFile] {
        &self.purpose_files
    }
}

/// Versioned envelope written to disk
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CatalogFile {
    pub(crate) version: u32,
    pub(crate) catalog: Catalog,
}

/// Tables plus the indices built over them at load time
#[derive(Debug)]
pub(crate) struct Loaded {
    pub(crate) catalog: Catalog,
    pub(crate) index: CatalogIndex,
}

/// Read-only handle to the catalog file.
///
/// The handle owns the loaded tables for its lifetime. [`Store::connect`]
/// may be called again to retry after the catalog has been populated.
#[derive(Debug)]
pub struct Store {
    location: PathBuf,
    loaded: Option<Loaded>,
}

impl Store {
    /// Open a handle against the catalog at `location`.
    ///
    /// A missing file is not an error: the handle is simply invalid until
    /// the catalog is populated and [`Store::connect`] is called again.
    /// An unreadable or mis-versioned file is an error.
    pub fn open<P: AsRef<Path>>(location: P) -> Result<Self, StoreError> {
        let mut store = Store {
            location: location.as_ref().to_path_buf(),
            loaded: None,
        };
        store.connect()?;
        Ok(store)
    }

    /// Open a handle against the configured well-known catalog location
    pub fn open_default() -> Result<Self, StoreError> {
        let settings = Settings::load()?;
        Self::open(settings.catalog_path)
    }

    /// Try connecting or re-connecting to the catalog file
    pub fn connect(&mut self) -> Result<(), StoreError> {
        if !self.location.exists() {
            debug!(location = %self.location.display(), "catalog file absent, handle invalid");
            self.loaded = None;
            return Ok(());
        }

        let bytes = fs::read(&self.location)?;
        let envelope: CatalogFile =
            bincode::deserialize(&bytes).map_err(|e| StoreError::Corrupt {
                path: self.location.clone(),
                reason: e.to_string(),
            })?;
        if envelope.version != CATALOG_VERSION {
            return Err(StoreError::Version {
                found: envelope.version,
                expected: CATALOG_VERSION,
            });
        }

        let catalog = envelope.catalog;
        let index = CatalogIndex::build(&catalog);
        info!(
            location = %self.location.display(),
            clients = catalog.clients.len(),
            files = catalog.files.len(),
            protocols = catalog.protocols.len(),
            "catalog loaded"
        );
        self.loaded = Some(Loaded { catalog, index });
        Ok(())
    }

    /// Expected location of the catalog file
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Whether a catalog has been loaded and queries may run
    pub fn is_valid(&self) -> bool {
        self.loaded.is_some()
    }

    /// Fail with [`QueryError::NotFound`] when the handle is invalid.
    ///
    /// Every query operation calls this before touching any table.
    pub fn assert_validity(&self) -> Result<(), QueryError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(QueryError::NotFound {
                location: self.location.clone(),
            })
        }
    }

    /// Tables and indices, or the validity error
    pub(crate) fn loaded(&self) -> Result<(&Catalog, &CatalogIndex), QueryError> {
        match &self.loaded {
            Some(loaded) => Ok((&loaded.catalog, &loaded.index)),
            None => Err(QueryError::NotFound {
                location: self.location.clone(),
            }),
        }
    }
}
