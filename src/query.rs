//! Protocol-aware query resolution over the catalog.
//!
//! [`Database`] owns a [`Store`] handle and exposes every read operation of
//! the benchmark: client selection (plain and T-norm/Z-norm cohorts), file
//! selection per protocol/purpose/group, and the data-driven protocol and
//! subworld accessors. Every operation asserts store validity first, then
//! validates each filter against its vocabulary before touching a table.
//!
//! File selection evaluates up to four independent branches (world, enrol,
//! probe/client, probe/impostor), each ordered by (client, session, claimed,
//! shot), then concatenates them and drops duplicates keeping the first
//! occurrence. The impostor branch is the one place model ids are matched
//! against the *claimed* identity instead of the owning client.

use crate::catalog::index::CatalogIndex;
use crate::catalog::models::{Client, File, Protocol, ProtocolPurpose, Subworld};
use crate::catalog::store::{Catalog, Store};
use crate::error::{QueryError, StoreError};
use crate::types::{ClientId, FileId, Purpose, PurposeGroup};
use crate::vocab::{self, Ids, Terms};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Filters for client selection.
///
/// Every field defaults to "no constraint". `protocol` is accepted for
/// symmetry with file selection but does not restrict the result: client
/// group membership is protocol-independent in this dataset.
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    pub protocol: Terms,
    pub groups: Terms,
    pub gender: Terms,
    pub language: Terms,
    pub subworld: Terms,
}

/// Filters for file selection
#[derive(Debug, Clone, Default)]
pub struct ObjectQuery {
    pub protocol: Terms,
    pub purposes: Terms,
    pub model_ids: Ids,
    pub groups: Terms,
    pub classes: Terms,
    pub languages: Terms,
    pub subworld: Terms,
}

/// Filters for T-norm / Z-norm file selection
#[derive(Debug, Clone, Default)]
pub struct NormQuery {
    pub protocol: Terms,
    pub model_ids: Ids,
    pub groups: Terms,
    pub languages: Terms,
}

/// The query resolver: a read-only view over one catalog handle.
#[derive(Debug)]
pub struct Database {
    store: Store,
}

impl Database {
    /// Wrap an already-opened store handle
    pub fn new(store: Store) -> Self {
        Database { store }
    }

    /// Open the catalog at `location`
    pub fn open<P: AsRef<Path>>(location: P) -> Result<Self, StoreError> {
        Ok(Database {
            store: Store::open(location)?,
        })
    }

    /// Open the catalog at the configured well-known location
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Database {
            store: Store::open_default()?,
        })
    }

    /// Retry loading the catalog file (after population)
    pub fn connect(&mut self) -> Result<(), StoreError> {
        self.store.connect()
    }

    pub fn is_valid(&self) -> bool {
        self.store.is_valid()
    }

    pub fn assert_validity(&self) -> Result<(), QueryError> {
        self.store.assert_validity()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ----- fixed vocabularies -----

    /// Protocol-purpose group names
    pub fn groups(&self) -> &'static [&'static str] {
        &vocab::GROUPS
    }

    /// Client group names. This dataset has no separate train/dev/eval
    /// client partition; g1 and g2 swap roles between protocols.
    pub fn client_groups(&self) -> &'static [&'static str] {
        &vocab::CLIENT_GROUPS
    }

    pub fn genders(&self) -> &'static [&'static str] {
        &vocab::GENDERS
    }

    pub fn languages(&self) -> &'static [&'static str] {
        &vocab::LANGUAGES
    }

    pub fn purposes(&self) -> &'static [&'static str] {
        &vocab::PURPOSES
    }

    pub fn classes(&self) -> &'static [&'static str] {
        &vocab::CLASSES
    }

    // ----- data-driven vocabularies -----

    /// All registered subworlds
    pub fn subworlds(&self) -> Result<Vec<Subworld>, QueryError> {
        let (catalog, _) = self.store.loaded()?;
        Ok(catalog.subworlds().to_vec())
    }

    /// Names of all registered subworlds
    pub fn subworld_names(&self) -> Result<Vec<String>, QueryError> {
        let (catalog, _) = self.store.loaded()?;
        Ok(catalog.subworlds().iter().map(|s| s.name.clone()).collect())
    }

    pub fn has_subworld(&self, name: &str) -> Result<bool, QueryError> {
        let (_, index) = self.store.loaded()?;
        Ok(index.subworld_members(name).is_some())
    }

    /// All registered protocols
    pub fn protocols(&self) -> Result<Vec<Protocol>, QueryError> {
        let (catalog, _) = self.store.loaded()?;
        Ok(catalog.protocols().to_vec())
    }

    /// Names of all registered protocols
    pub fn protocol_names(&self) -> Result<Vec<String>, QueryError> {
        let (catalog, _) = self.store.loaded()?;
        Ok(catalog.protocols().iter().map(|p| p.name.clone()).collect())
    }

    pub fn has_protocol(&self, name: &str) -> Result<bool, QueryError> {
        let (catalog, index) = self.store.loaded()?;
        Ok(index.protocol_by_name(catalog, name).is_some())
    }

    /// Fetch one protocol by its unique name
    pub fn protocol(&self, name: &str) -> Result<Protocol, QueryError> {
        let (catalog, index) = self.store.loaded()?;
        index
            .protocol_by_name(catalog, name)
            .cloned()
            .ok_or_else(|| QueryError::Lookup {
                entity: "protocol",
                key: name.to_string(),
                matches: 0,
            })
    }

    /// All registered protocol-purpose buckets
    pub fn protocol_purposes(&self) -> Result<Vec<ProtocolPurpose>, QueryError> {
        let (catalog, _) = self.store.loaded()?;
        Ok(catalog.protocol_purposes().to_vec())
    }

    // ----- clients -----

    pub fn has_client_id(&self, id: ClientId) -> Result<bool, QueryError> {
        let (catalog, index) = self.store.loaded()?;
        Ok(index.client(catalog, id).is_some())
    }

    /// Fetch one client by its unique id
    pub fn client(&self, id: ClientId) -> Result<Client, QueryError> {
        let (catalog, index) = self.store.loaded()?;
        index
            .client(catalog, id)
            .cloned()
            .ok_or_else(|| QueryError::Lookup {
                entity: "client",
                key: id.to_string(),
                matches: 0,
            })
    }

    /// Select clients by group, gender, language, and subworld membership.
    ///
    /// Two disjoint branches, concatenated world-first, each ordered by
    /// client id: the world branch (restricted to one subworld when exactly
    /// one was requested) and the g1/g2 branch. Group membership is
    /// exclusive, so no cross-branch deduplication is needed.
    pub fn clients(&self, query: ClientQuery) -> Result<Vec<Client>, QueryError> {
        let (catalog, index) = self.store.loaded()?;

        let groups = vocab::replace_group_aliases(query.groups);
        let groups = vocab::validate(&groups, "group", &vocab::CLIENT_GROUPS, &vocab::CLIENT_GROUPS)?;
        let gender = vocab::validate(&query.gender, "gender", &vocab::GENDERS, &vocab::GENDERS)?;
        let language =
            vocab::validate(&query.language, "language", &vocab::LANGUAGES, &vocab::LANGUAGES)?;
        let valid_subworlds = self.subworld_names()?;
        let subworld =
            vocab::validate(&query.subworld, "subworld", &valid_subworlds, &valid_subworlds)?;

        debug!(?groups, ?gender, ?language, ?subworld, "selecting clients");

        let demographic_ok = |c: &Client| {
            gender.iter().any(|g| g == c.gender.as_str())
                && language.iter().any(|l| l == c.language.as_str())
        };

        let mut selected: Vec<Client> = Vec::new();

        if groups.iter().any(|g| g == "world") {
            let mut branch: Vec<&Client> = if subworld.len() == 1 {
                let members = index.subworld_members(&subworld[0]);
                catalog
                    .clients()
                    .iter()
                    .filter(|c| members.map(|m| m.contains(&c.id)).unwrap_or(false))
                    .collect()
            } else {
                catalog
                    .clients()
                    .iter()
                    .filter(|c| c.group.as_str() == "world")
                    .collect()
            };
            branch.retain(|c| demographic_ok(c));
            branch.sort_by_key(|c| c.id);
            selected.extend(branch.into_iter().cloned());
        }

        if groups.iter().any(|g| g == "g1" || g == "g2") {
            let mut branch: Vec<&Client> = catalog
                .clients()
                .iter()
                .filter(|c| c.group.as_str() != "world")
                .filter(|c| groups.iter().any(|g| g == c.group.as_str()))
                .filter(|c| demographic_ok(c))
                .collect();
            branch.sort_by_key(|c| c.id);
            selected.extend(branch.into_iter().cloned());
        }

        Ok(selected)
    }

    /// T-norm cohort: each requested group pulls the clients of the *other*
    /// group, so one half of the evaluation pool normalizes scores for the
    /// other half. Only g1/g2 (or their dev/eval aliases) are valid.
    pub fn tclients(&self, groups: impl Into<Terms>) -> Result<Vec<Client>, QueryError> {
        let groups = vocab::replace_group_aliases(groups.into());
        let groups = vocab::validate(&groups, "group", &vocab::NORM_GROUPS, &vocab::NORM_GROUPS)?;
        let mut swapped = Vec::new();
        if groups.iter().any(|g| g == "g1") {
            swapped.push("g2");
        }
        if groups.iter().any(|g| g == "g2") {
            swapped.push("g1");
        }
        self.clients(ClientQuery {
            groups: Terms::from(swapped),
            ..ClientQuery::default()
        })
    }

    /// Z-norm cohort; same group swap as [`Database::tclients`]
    pub fn zclients(&self, groups: impl Into<Terms>) -> Result<Vec<Client>, QueryError> {
        self.tclients(groups)
    }

    /// Models are clients in this dataset: a model id equals the id of the
    /// client enrolled under it.
    pub fn models(&self, query: ClientQuery) -> Result<Vec<Client>, QueryError> {
        self.clients(query)
    }

    /// T-norm models, see [`Database::tclients`]
    pub fn tmodels(&self, groups: impl Into<Terms>) -> Result<Vec<Client>, QueryError> {
        self.tclients(groups)
    }

    /// Model ids and client ids coincide in this dataset
    pub fn get_client_id_from_model_id(&self, model_id: ClientId) -> ClientId {
        model_id
    }

    /// T-norm model ids and client ids coincide as well
    pub fn get_client_id_from_tmodel_id(&self, tmodel_id: ClientId) -> ClientId {
        tmodel_id
    }

    // ----- files -----

    /// Fetch one file by id, if present
    pub fn file(&self, id: FileId) -> Result<Option<File>, QueryError> {
        let (catalog, index) = self.store.loaded()?;
        Ok(index.file(catalog, id).cloned())
    }

    /// Fetch one file by its unique logical path, if present
    pub fn file_by_path(&self, path: &str) -> Result<Option<File>, QueryError> {
        let (catalog, index) = self.store.loaded()?;
        Ok(index.file_by_path(catalog, path).cloned())
    }

    /// Select sample files for an experiment.
    ///
    /// Evaluated as up to four branches over the protocol-purpose buckets:
    ///
    /// 1. world: purposes and classes are ignored; restricted by language,
    ///    optional single subworld, and model ids against the owning client.
    /// 2. enrol (dev/eval requested, `enrol` in purposes): model ids match
    ///    the owning client.
    /// 3. probe/client: genuine attempts (`claimed == owner`); model ids
    ///    match the owning client.
    /// 4. probe/impostor: impostor attempts (`claimed != owner`); model ids
    ///    match the **claimed** identity.
    ///
    /// Branches are concatenated in that order and duplicates collapsed,
    /// keeping the first occurrence.
    pub fn objects(&self, query: ObjectQuery) -> Result<Vec<File>, QueryError> {
        let (catalog, index) = self.store.loaded()?;

        let valid_protocols = self.protocol_names()?;
        let protocol =
            vocab::validate(&query.protocol, "protocol", &valid_protocols, &valid_protocols)?;
        let purposes =
            vocab::validate(&query.purposes, "purpose", &vocab::PURPOSES, &vocab::PURPOSES)?;
        let groups = vocab::validate(&query.groups, "group", &vocab::GROUPS, &vocab::GROUPS)?;
        let languages =
            vocab::validate(&query.languages, "language", &vocab::LANGUAGES, &vocab::LANGUAGES)?;
        let classes = vocab::validate(&query.classes, "class", &vocab::CLASSES, &vocab::CLASSES)?;
        let valid_subworlds = self.subworld_names()?;
        let subworld =
            vocab::validate(&query.subworld, "subworld", &valid_subworlds, &valid_subworlds)?;
        let model_ids = query.model_ids;

        debug!(?protocol, ?purposes, ?groups, ?classes, "selecting files");

        let mut selected: Vec<File> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();
        let mut merge = |branch: Vec<File>| {
            for file in branch {
                if seen.insert(file.id) {
                    selected.push(file);
                }
            }
        };

        if groups.iter().any(|g| g == "world") {
            let members = if subworld.len() == 1 {
                index.subworld_members(&subworld[0])
            } else {
                None
            };
            merge(branch_files(
                catalog,
                index,
                &protocol,
                |bucket| bucket.group == PurposeGroup::World,
                |_, client| {
                    client.group.as_str() == "world"
                        && languages.iter().any(|l| l == client.language.as_str())
                        && members.map(|m| m.contains(&client.id)).unwrap_or(true)
                        && model_ids.contains(client.id)
                },
            ));
        }

        let dev_eval: Vec<&String> = groups
            .iter()
            .filter(|g| g.as_str() == "dev" || g.as_str() == "eval")
            .collect();
        if !dev_eval.is_empty() {
            let in_dev_eval =
                |bucket: &ProtocolPurpose| dev_eval.iter().any(|g| g.as_str() == bucket.group.as_str());

            if purposes.iter().any(|p| p == "enrol") {
                merge(branch_files(
                    catalog,
                    index,
                    &protocol,
                    |bucket| in_dev_eval(bucket) && bucket.purpose == Purpose::Enrol,
                    |_, client| model_ids.contains(client.id),
                ));
            }

            if purposes.iter().any(|p| p == "probe") {
                if classes.iter().any(|c| c == "client") {
                    merge(branch_files(
                        catalog,
                        index,
                        &protocol,
                        |bucket| in_dev_eval(bucket) && bucket.purpose == Purpose::Probe,
                        |file, client| {
                            file.claimed_id == file.real_client_id && model_ids.contains(client.id)
                        },
                    ));
                }
                if classes.iter().any(|c| c == "impostor") {
                    merge(branch_files(
                        catalog,
                        index,
                        &protocol,
                        |bucket| in_dev_eval(bucket) && bucket.purpose == Purpose::Probe,
                        // Impostor files are matched by the identity they
                        // claim, not by the client that produced them.
                        |file, _| {
                            file.claimed_id != file.real_client_id
                                && model_ids.contains(file.claimed_id)
                        },
                    ));
                }
            }
        }

        Ok(selected)
    }

    /// Files for enrolling T-norm models: `enrol` purpose, `client` class,
    /// with dev and eval swapped so each side draws its cohort from the
    /// opposite half.
    pub fn tobjects(&self, query: NormQuery) -> Result<Vec<File>, QueryError> {
        let groups = vocab::validate(
            &query.groups,
            "group",
            &vocab::NORM_OBJECT_GROUPS,
            &vocab::NORM_OBJECT_GROUPS,
        )?;
        self.objects(ObjectQuery {
            protocol: query.protocol,
            purposes: Terms::from("enrol"),
            model_ids: query.model_ids,
            groups: swap_dev_eval(&groups),
            classes: Terms::from("client"),
            languages: query.languages,
            subworld: Terms::none(),
        })
    }

    /// Probe files for Z-norm score normalization: `probe` purpose, all
    /// classes, with dev and eval swapped.
    pub fn zobjects(&self, query: NormQuery) -> Result<Vec<File>, QueryError> {
        let groups = vocab::validate(
            &query.groups,
            "group",
            &vocab::NORM_OBJECT_GROUPS,
            &vocab::NORM_OBJECT_GROUPS,
        )?;
        self.objects(ObjectQuery {
            protocol: query.protocol,
            purposes: Terms::from("probe"),
            model_ids: query.model_ids,
            groups: swap_dev_eval(&groups),
            classes: Terms::none(),
            languages: query.languages,
            subworld: Terms::none(),
        })
    }
}

fn swap_dev_eval(groups: &[String]) -> Terms {
    let mut swapped = Vec::new();
    if groups.iter().any(|g| g == "dev") {
        swapped.push("eval");
    }
    if groups.iter().any(|g| g == "eval") {
        swapped.push("dev");
    }
    Terms::from(swapped)
}

/// One branch of file selection: walk the buckets of the requested
/// protocols, keep those passing `bucket_pred`, collect their files once
/// each, keep those passing `file_pred`, and order the branch by
/// (owning client, session, claimed id, shot). File id breaks remaining
/// ties to keep the ordering total.
fn branch_files(
    catalog: &Catalog,
    index: &CatalogIndex,
    protocols: &[String],
    bucket_pred: impl Fn(&ProtocolPurpose) -> bool,
    file_pred: impl Fn(&File, &Client) -> bool,
) -> Vec<File> {
    let mut picked: Vec<&File> = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();

    for protocol in catalog
        .protocols()
        .iter()
        .filter(|p| protocols.iter().any(|name| name == &p.name))
    {
        for &row in index.purpose_rows(protocol.id) {
            let bucket = &catalog.protocol_purposes()[row];
            if !bucket_pred(bucket) {
                continue;
            }
            for &file_id in index.files_of_purpose(bucket.id) {
                if !seen.insert(file_id) {
                    continue;
                }
                let Some(file) = index.file(catalog, file_id) else {
                    continue;
                };
                let Some(client) = index.client(catalog, file.real_client_id) else {
                    continue;
                };
                if file_pred(file, client) {
                    picked.push(file);
                }
            }
        }
    }

    picked.sort_by_key(|f| (f.real_client_id, f.session_id, f.claimed_id, f.shot_id, f.id));
    picked.into_iter().cloned().collect()
}
