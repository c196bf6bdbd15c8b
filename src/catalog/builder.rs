//! Population-side catalog builder.
//!
//! The query layer never writes; this builder is the interface a population
//! tool (or a test fixture) uses to assemble a catalog satisfying the schema
//! invariants and emit the single catalog file. Uniqueness and foreign-key
//! checks happen here so the read path can trust whatever it loads.

use crate::catalog::models::{
    Client, File, Protocol, ProtocolPurpose, PurposeFile, Subworld, SubworldMember,
};
use crate::catalog::store::{Catalog, CatalogFile, CATALOG_VERSION};
use crate::error::{BuildError, StoreError};
use crate::types::{
    ClientGroup, ClientId, FileId, Gender, Language, ProtocolId, ProtocolPurposeId, Purpose,
    PurposeGroup, SubworldId,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Incrementally assembles a [`Catalog`] and writes it to disk.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
    client_ids: HashSet<ClientId>,
    file_ids: HashSet<FileId>,
    file_paths: HashSet<String>,
    subworld_names: HashMap<String, SubworldId>,
    protocol_names: HashMap<String, ProtocolId>,
    purpose_ids: HashSet<ProtocolPurposeId>,
    next_subworld_id: SubworldId,
    next_protocol_id: ProtocolId,
    next_purpose_id: ProtocolPurposeId,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        CatalogBuilder {
            next_subworld_id: 1,
            next_protocol_id: 1,
            next_purpose_id: 1,
            ..Default::default()
        }
    }

    pub fn add_client(
        &mut self,
        id: ClientId,
        gender: Gender,
        group: ClientGroup,
        language: Language,
    ) -> Result<(), BuildError> {
        if !self.client_ids.insert(id) {
            return Err(BuildError::Duplicate {
                entity: "client",
                key: id.to_string(),
            });
        }
        self.catalog.clients.push(Client {
            id,
            gender,
            group,
            language,
        });
        Ok(())
    }

    pub fn add_subworld(&mut self, name: &str) -> Result<SubworldId, BuildError> {
        if self.subworld_names.contains_key(name) {
            return Err(BuildError::Duplicate {
                entity: "subworld",
                key: name.to_string(),
            });
        }
        let id = self.next_subworld_id;
        self.next_subworld_id += 1;
        self.subworld_names.insert(name.to_string(), id);
        self.catalog.subworlds.push(Subworld {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    pub fn add_subworld_member(
        &mut self,
        subworld_id: SubworldId,
        client_id: ClientId,
    ) -> Result<(), BuildError> {
        if !self.subworld_names.values().any(|&id| id == subworld_id) {
            return Err(BuildError::UnknownReference {
                entity: "subworld",
                key: subworld_id.to_string(),
                referrer: "subworld membership",
            });
        }
        if !self.client_ids.contains(&client_id) {
            return Err(BuildError::UnknownReference {
                entity: "client",
                key: client_id.to_string(),
                referrer: "subworld membership",
            });
        }
        self.catalog.subworld_members.push(SubworldMember {
            subworld_id,
            client_id,
        });
        Ok(())
    }

    pub fn add_file(
        &mut self,
        id: FileId,
        real_client_id: ClientId,
        path: &str,
        claimed_id: ClientId,
        shot_id: i64,
        session_id: i64,
    ) -> Result<(), BuildError> {
        if !self.client_ids.contains(&real_client_id) {
            return Err(BuildError::UnknownReference {
                entity: "client",
                key: real_client_id.to_string(),
                referrer: "file",
            });
        }
        if !self.file_ids.insert(id) {
            return Err(BuildError::Duplicate {
                entity: "file",
                key: id.to_string(),
            });
        }
        if !self.file_paths.insert(path.to_string()) {
            return Err(BuildError::Duplicate {
                entity: "file path",
                key: path.to_string(),
            });
        }
        // claimed_id is intentionally unchecked: it may name a non-existent
        // client to encode an impostor attempt
        self.catalog.files.push(File {
            id,
            real_client_id,
            path: path.to_string(),
            claimed_id,
            shot_id,
            session_id,
        });
        Ok(())
    }

    pub fn add_protocol(&mut self, name: &str) -> Result<ProtocolId, BuildError> {
        if self.protocol_names.contains_key(name) {
            return Err(BuildError::Duplicate {
                entity: "protocol",
                key: name.to_string(),
            });
        }
        let id = self.next_protocol_id;
        self.next_protocol_id += 1;
        self.protocol_names.insert(name.to_string(), id);
        self.catalog.protocols.push(Protocol {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    pub fn add_protocol_purpose(
        &mut self,
        protocol_id: ProtocolId,
        group: PurposeGroup,
        purpose: Purpose,
    ) -> Result<ProtocolPurposeId, BuildError> {
        if !self.protocol_names.values().any(|&id| id == protocol_id) {
            return Err(BuildError::UnknownReference {
                entity: "protocol",
                key: protocol_id.to_string(),
                referrer: "protocol purpose",
            });
        }
        let id = self.next_purpose_id;
        self.next_purpose_id += 1;
        self.purpose_ids.insert(id);
        self.catalog.protocol_purposes.push(ProtocolPurpose {
            id,
            protocol_id,
            group,
            purpose,
        });
        Ok(id)
    }

    pub fn add_purpose_file(
        &mut self,
        purpose_id: ProtocolPurposeId,
        file_id: FileId,
    ) -> Result<(), BuildError> {
        if !self.purpose_ids.contains(&purpose_id) {
            return Err(BuildError::UnknownReference {
                entity: "protocol purpose",
                key: purpose_id.to_string(),
                referrer: "purpose/file association",
            });
        }
        if !self.file_ids.contains(&file_id) {
            return Err(BuildError::UnknownReference {
                entity: "file",
                key: file_id.to_string(),
                referrer: "purpose/file association",
            });
        }
        self.catalog.purpose_files.push(PurposeFile {
            purpose_id,
            file_id,
        });
        Ok(())
    }

    /// The assembled tables, consuming the builder
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Write the catalog file at `location` (write to .tmp, then rename).
    pub fn write<P: AsRef<Path>>(&self, location: P) -> Result<(), StoreError> {
        let location = location.as_ref();
        let envelope = CatalogFile {
            version: CATALOG_VERSION,
            catalog: self.catalog.clone(),
        };
        let bytes = bincode::serialize(&envelope).map_err(|e| StoreError::Corrupt {
            path: location.to_path_buf(),
            reason: format!("serialization failed: {e}"),
        })?;

        if let Some(parent) = location.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = location.with_extension("catalog.tmp");
        fs::write(&temp, &bytes)?;
        fs::rename(&temp, location).map_err(|e| {
            let _ = fs::remove_file(&temp);
            StoreError::Io(e)
        })?;
        Ok(())
    }
}
