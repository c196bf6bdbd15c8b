//! Row types of the benchmark catalog.
//!
//! These mirror the relational schema one-to-one: five entity tables plus
//! two association tables. Relations are id-based; the navigable lookups
//! (client of a file, files of a bucket, ...) live in the indices built at
//! load time, not on the rows themselves. All rows are immutable once the
//! catalog is populated.

use crate::types::{ClientGroup, ClientId, FileId, Gender, Language, ProtocolId, ProtocolPurposeId, Purpose, PurposeGroup, SubworldId};
use serde::{Deserialize, Serialize};

/// An enrolled subject, marked by an integer identifier and the evaluation
/// group it belongs to. Every client has exactly one gender and one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub gender: Gender,
    pub group: ClientGroup,
    pub language: Language,
}

/// A named split of the world group used to vary training-set size.
///
/// Membership is only meaningful for clients whose group is `world`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subworld {
    pub id: SubworldId,
    pub name: String,
}

/// A sample file.
///
/// `path` is the logical, store-relative identifier of the sample without
/// directory or extension; it uniquely determines the file. `claimed_id`
/// is the identity asserted at capture time and need not match an existing
/// client id — a mismatch with the owning client encodes an impostor
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub real_client_id: ClientId,
    pub path: String,
    pub claimed_id: ClientId,
    pub shot_id: i64,
    pub session_id: i64,
}

/// A named experiment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: ProtocolId,
    pub name: String,
}

/// A (protocol, group, purpose) bucket enumerating the files that serve a
/// given role within a protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPurpose {
    pub id: ProtocolPurposeId,
    pub protocol_id: ProtocolId,
    pub group: PurposeGroup,
    pub purpose: Purpose,
}

/// Subworld membership association row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubworldMember {
    pub subworld_id: SubworldId,
    pub client_id: ClientId,
}

/// Protocol-purpose / file association row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeFile {
    pub purpose_id: ProtocolPurposeId,
    pub file_id: FileId,
}
