//! Veriset: benchmark catalog and query layer
//!
//! A read-only metadata catalog for a fixed face-verification benchmark:
//! enrolled clients, their demographic attributes, the evaluation protocols
//! defined over them, and the sample files serving each protocol, group,
//! and purpose. Callers open a [`query::Database`] and ask it for exactly
//! the file lists a verification experiment needs (training, enrollment,
//! probing), then turn those into filesystem paths via the path resolver.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod query;
pub mod types;
pub mod vocab;

pub use catalog::{Catalog, CatalogBuilder, Store};
pub use error::{BuildError, QueryError, StoreError};
pub use query::{ClientQuery, Database, NormQuery, ObjectQuery};
pub use vocab::{Ids, Terms};
