//! Path resolution: logical sample identifiers to filesystem paths.
//!
//! The catalog stores each file under a logical, store-relative `path` with
//! no directory or extension. This module is the only place that translates
//! it into a concrete filesystem path, by prefixing a caller-supplied
//! directory and suffixing a caller-supplied extension. Nothing here checks
//! that the resulting path exists.

use crate::catalog::models::File;
use crate::error::QueryError;
use crate::query::Database;
use crate::types::FileId;
use std::path::{Path, PathBuf};

impl File {
    /// Build a usable filesystem path from the logical one.
    ///
    /// `extension` normally includes the leading dot, as in `.hdf5` (the
    /// configured default, see `config::Settings::default_extension`).
    pub fn make_path(&self, directory: Option<&Path>, extension: Option<&str>) -> PathBuf {
        let name = format!("{}{}", self.path, extension.unwrap_or(""));
        match directory {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

impl Database {
    /// Resolve file ids to full paths.
    ///
    /// Input order and duplicates are preserved; ids with no matching file
    /// contribute nothing.
    pub fn paths(
        &self,
        ids: &[FileId],
        prefix: Option<&Path>,
        suffix: Option<&str>,
    ) -> Result<Vec<PathBuf>, QueryError> {
        self.assert_validity()?;
        let mut resolved = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(file) = self.file(id)? {
                resolved.push(file.make_path(prefix, suffix));
            }
        }
        Ok(resolved)
    }

    /// Reverse lookup: logical path stems to file ids.
    ///
    /// Input order is preserved; stems unknown to the catalog are silently
    /// skipped. Only bare logical paths reverse — paths that went through
    /// a directory prefix or extension suffix do not.
    pub fn reverse<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<FileId>, QueryError> {
        self.assert_validity()?;
        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(file) = self.file_by_path(path.as_ref())? {
                ids.push(file.id);
            }
        }
        Ok(ids)
    }
}
