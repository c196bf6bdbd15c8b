//! Lookup indices over the catalog tables.
//!
//! Built once when the catalog file is loaded, then shared by every query.
//! Forward and reverse directions of both associations are indexed so the
//! resolver never scans an association table at query time.

use crate::catalog::models::{Client, File, Protocol};
use crate::catalog::store::Catalog;
use crate::types::{ClientId, FileId, ProtocolId, ProtocolPurposeId, SubworldId};
use std::collections::{HashMap, HashSet};

/// Positional and relational indices for one loaded [`Catalog`].
///
/// Values are row positions into the owning catalog's tables, except for
/// the association indices which hold row ids directly.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    client_by_id: HashMap<ClientId, usize>,
    file_by_id: HashMap<FileId, usize>,
    file_by_path: HashMap<String, usize>,
    protocol_by_name: HashMap<String, usize>,
    purposes_of_protocol: HashMap<ProtocolId, Vec<usize>>,
    files_of_purpose: HashMap<ProtocolPurposeId, Vec<FileId>>,
    purposes_of_file: HashMap<FileId, Vec<ProtocolPurposeId>>,
    clients_of_subworld: HashMap<SubworldId, HashSet<ClientId>>,
    subworld_by_name: HashMap<String, SubworldId>,
}

impl CatalogIndex {
    /// Build all indices for `catalog` in one pass per table.
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = CatalogIndex::default();

        for (pos, client) in catalog.clients().iter().enumerate() {
            index.client_by_id.insert(client.id, pos);
        }
        for (pos, file) in catalog.files().iter().enumerate() {
            index.file_by_id.insert(file.id, pos);
            index.file_by_path.insert(file.path.clone(), pos);
        }
        for (pos, protocol) in catalog.protocols().iter().enumerate() {
            index.protocol_by_name.insert(protocol.name.clone(), pos);
        }
        for (pos, purpose) in catalog.protocol_purposes().iter().enumerate() {
            index
                .purposes_of_protocol
                .entry(purpose.protocol_id)
                .or_default()
                .push(pos);
        }
        for subworld in catalog.subworlds() {
            index.subworld_by_name.insert(subworld.name.clone(), subworld.id);
            // Present even when the split has no members yet
            index.clients_of_subworld.entry(subworld.id).or_default();
        }
        for member in catalog.subworld_members() {
            index
                .clients_of_subworld
                .entry(member.subworld_id)
                .or_default()
                .insert(member.client_id);
        }
        for assoc in catalog.purpose_files() {
            index
                .files_of_purpose
                .entry(assoc.purpose_id)
                .or_default()
                .push(assoc.file_id);
            index
                .purposes_of_file
                .entry(assoc.file_id)
                .or_default()
                .push(assoc.purpose_id);
        }

        index
    }

    pub fn client<'c>(&self, catalog: &'c Catalog, id: ClientId) -> Option<&'c Client> {
        self.client_by_id.get(&id).map(|&pos| &catalog.clients()[pos])
    }

    pub fn file<'c>(&self, catalog: &'c Catalog, id: FileId) -> Option<&'c File> {
        self.file_by_id.get(&id).map(|&pos| &catalog.files()[pos])
    }

    pub fn file_by_path<'c>(&self, catalog: &'c Catalog, path: &str) -> Option<&'c File> {
        self.file_by_path.get(path).map(|&pos| &catalog.files()[pos])
    }

    pub fn protocol_by_name<'c>(&self, catalog: &'c Catalog, name: &str) -> Option<&'c Protocol> {
        self.protocol_by_name
            .get(name)
            .map(|&pos| &catalog.protocols()[pos])
    }

    /// Row positions of the buckets belonging to `protocol`
    pub fn purpose_rows(&self, protocol: ProtocolId) -> &[usize] {
        self.purposes_of_protocol
            .get(&protocol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// File ids attached to one protocol-purpose bucket, in association order
    pub fn files_of_purpose(&self, purpose: ProtocolPurposeId) -> &[FileId] {
        self.files_of_purpose
            .get(&purpose)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bucket ids a file is attached to
    pub fn purposes_of_file(&self, file: FileId) -> &[ProtocolPurposeId] {
        self.purposes_of_file
            .get(&file)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Members of a subworld, looked up by split name
    pub fn subworld_members(&self, name: &str) -> Option<&HashSet<ClientId>> {
        let id = self.subworld_by_name.get(name)?;
        self.clients_of_subworld.get(id)
    }
}
