//! Core identifier and vocabulary types for the benchmark catalog.
//!
//! Row identifiers are plain integers carried over from the catalog file;
//! the closed vocabularies (gender, group, purpose) are explicit enums so
//! that a populated catalog can never hold an out-of-vocabulary value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an enrolled client (also the model id, see `query`)
pub type ClientId = i64;
/// Identifier of a sample file
pub type FileId = i64;
/// Identifier of a protocol
pub type ProtocolId = i64;
/// Identifier of a (protocol, group, purpose) bucket
pub type ProtocolPurposeId = i64;
/// Identifier of a subworld split
pub type SubworldId = i64;

/// Gender of an enrolled client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "m",
            Gender::F => "f",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "m" => Some(Gender::M),
            "f" => Some(Gender::F),
            _ => None,
        }
    }
}

/// Evaluation-set partition a client belongs to.
///
/// `dev` and `eval` are accepted as aliases for `g1` and `g2` at the query
/// surface (see `vocab::replace_group_aliases`); the catalog itself only
/// ever stores the canonical three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientGroup {
    G1,
    G2,
    World,
}

impl ClientGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientGroup::G1 => "g1",
            ClientGroup::G2 => "g2",
            ClientGroup::World => "world",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "g1" => Some(ClientGroup::G1),
            "g2" => Some(ClientGroup::G2),
            "world" => Some(ClientGroup::World),
            _ => None,
        }
    }
}

/// Group axis of a protocol-purpose bucket (`world`, `dev`, `eval`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurposeGroup {
    World,
    Dev,
    Eval,
}

impl PurposeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurposeGroup::World => "world",
            PurposeGroup::Dev => "dev",
            PurposeGroup::Eval => "eval",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "world" => Some(PurposeGroup::World),
            "dev" => Some(PurposeGroup::Dev),
            "eval" => Some(PurposeGroup::Eval),
            _ => None,
        }
    }
}

/// Role a file plays under a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Train,
    Enrol,
    Probe,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Train => "train",
            Purpose::Enrol => "enrol",
            Purpose::Probe => "probe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "train" => Some(Purpose::Train),
            "enrol" => Some(Purpose::Enrol),
            "probe" => Some(Purpose::Probe),
            _ => None,
        }
    }
}

/// Language spoken by a client (only English in the current dataset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Gender, ClientGroup, PurposeGroup, Purpose, Language);
