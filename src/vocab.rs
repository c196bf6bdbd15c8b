//! Fixed query vocabularies and filter-input validation.
//!
//! Query operations accept loosely-typed filters: a single value, a list of
//! values, or nothing at all ("no constraint"). [`Terms`] captures that shape
//! explicitly, [`validate`] checks it against an allowed set, and
//! [`replace_group_aliases`] resolves the `dev`/`eval` spelling of the g1/g2
//! client groups before validation.

use crate::error::QueryError;
use crate::types::{ClientId, FileId};

/// Client group partition names
pub const CLIENT_GROUPS: [&str; 3] = ["g1", "g2", "world"];
/// Protocol-purpose group names
pub const GROUPS: [&str; 3] = ["world", "dev", "eval"];
/// Groups valid for T-norm / Z-norm cohort selection
pub const NORM_GROUPS: [&str; 2] = ["g1", "g2"];
/// Dev/eval groups valid for T-norm / Z-norm file selection
pub const NORM_OBJECT_GROUPS: [&str; 2] = ["dev", "eval"];
/// Client genders
pub const GENDERS: [&str; 2] = ["m", "f"];
/// Client languages
pub const LANGUAGES: [&str; 1] = ["en"];
/// File purposes under a protocol
pub const PURPOSES: [&str; 3] = ["train", "enrol", "probe"];
/// Access classes of probe attempts
pub const CLASSES: [&str; 2] = ["client", "impostor"];

/// A scalar-or-collection filter argument.
///
/// `Terms::default()` (or converting from `None`) means "no constraint";
/// a single `&str` converts to a singleton list. This keeps the scalar
/// auto-wrap convenience of the query surface as explicit conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terms(Option<Vec<String>>);

impl Terms {
    /// The "no constraint" filter
    pub fn none() -> Self {
        Terms(None)
    }

    pub fn is_none(&self) -> bool {
        // An empty list is treated the same as an absent filter
        match &self.0 {
            None => true,
            Some(v) => v.is_empty(),
        }
    }

    pub fn as_deref(&self) -> Option<&[String]> {
        match &self.0 {
            Some(v) if !v.is_empty() => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for Terms {
    fn from(value: &str) -> Self {
        Terms(Some(vec![value.to_string()]))
    }
}

impl From<String> for Terms {
    fn from(value: String) -> Self {
        Terms(Some(vec![value]))
    }
}

impl From<Vec<String>> for Terms {
    fn from(values: Vec<String>) -> Self {
        Terms(Some(values))
    }
}

impl From<Vec<&str>> for Terms {
    fn from(values: Vec<&str>) -> Self {
        Terms(Some(values.into_iter().map(String::from).collect()))
    }
}

impl From<&[&str]> for Terms {
    fn from(values: &[&str]) -> Self {
        Terms(Some(values.iter().map(|s| s.to_string()).collect()))
    }
}

impl<const N: usize> From<[&str; N]> for Terms {
    fn from(values: [&str; N]) -> Self {
        Terms(Some(values.iter().map(|s| s.to_string()).collect()))
    }
}

impl<T> From<Option<T>> for Terms
where
    T: Into<Terms>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Terms(None),
        }
    }
}

/// A scalar-or-collection id filter (model ids, file ids).
///
/// Unlike [`Terms`] there is no enumeration to widen to: an absent filter
/// simply means the id restriction is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ids(Option<Vec<i64>>);

impl Ids {
    pub fn none() -> Self {
        Ids(None)
    }

    /// The ids to restrict on, or `None` when unrestricted
    pub fn as_deref(&self) -> Option<&[i64]> {
        match &self.0 {
            Some(v) if !v.is_empty() => Some(v),
            _ => None,
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        match self.as_deref() {
            Some(ids) => ids.contains(&id),
            None => true,
        }
    }
}

impl From<ClientId> for Ids {
    fn from(id: ClientId) -> Self {
        Ids(Some(vec![id]))
    }
}

impl From<Vec<i64>> for Ids {
    fn from(ids: Vec<i64>) -> Self {
        Ids(Some(ids))
    }
}

impl From<&[FileId]> for Ids {
    fn from(ids: &[FileId]) -> Self {
        Ids(Some(ids.to_vec()))
    }
}

impl<const N: usize> From<[i64; N]> for Ids {
    fn from(ids: [i64; N]) -> Self {
        Ids(Some(ids.to_vec()))
    }
}

/// Replace the `dev`/`eval` group aliases by their canonical client-group
/// names (`g1`/`g2`), element-wise. Absent input passes through unchanged,
/// as does any value that is not an alias.
pub fn replace_group_aliases(terms: Terms) -> Terms {
    match terms.0 {
        None => Terms(None),
        Some(values) => Terms(Some(
            values
                .into_iter()
                .map(|v| match v.as_str() {
                    "dev" => "g1".to_string(),
                    "eval" => "g2".to_string(),
                    _ => v,
                })
                .collect(),
        )),
    }
}

/// Check a filter argument against its allowed set.
///
/// Absent input widens to `default` (normally the full allowed set, giving
/// "no filter means all values" semantics). Any element outside `valid`
/// fails with [`QueryError::InvalidArgument`] naming the offending value,
/// the field, and the allowed set. Absent or empty input never fails.
pub fn validate<S: AsRef<str>>(
    terms: &Terms,
    field: &'static str,
    valid: &[S],
    default: &[S],
) -> Result<Vec<String>, QueryError> {
    let values = match terms.as_deref() {
        None => return Ok(default.iter().map(|s| s.as_ref().to_string()).collect()),
        Some(values) => values,
    };
    for value in values {
        if !valid.iter().any(|v| v.as_ref() == value) {
            return Err(QueryError::InvalidArgument {
                field,
                value: value.clone(),
                valid: valid.iter().map(|s| s.as_ref().to_string()).collect(),
            });
        }
    }
    Ok(values.to_vec())
}
