//! Catalog schema, storage, and load-time indices.

pub mod builder;
pub mod index;
pub mod models;
pub mod store;

pub use builder::CatalogBuilder;
pub use index::CatalogIndex;
pub use models::{Client, File, Protocol, ProtocolPurpose, PurposeFile, Subworld, SubworldMember};
pub use store::{Catalog, Store, CATALOG_VERSION};
