//! # Meme Catalog
//!
//! The two sides of meme metadata reconciliation:
//!
//! - [`LocalCatalog`]: the source-of-truth JSON file, loaded once, mutated in
//!   memory and persisted explicitly
//! - [`RemoteStore`] / [`RemoteSnapshot`]: the hosted asset store contract and
//!   a read-only, point-in-time copy of it
//!
//! ```text
//! meme_metadata.json ──> LocalCatalog ──┐
//!                                       ├──> reconcile / search
//! RemoteStore::fetch_all ─> Snapshot ───┘
//! ```

mod error;
pub mod memory;
mod remote;
mod store;
mod types;

pub use error::{CatalogError, RemoteOperation, Result, StoreKind};
pub use remote::{RemoteSnapshot, RemoteStore, UploadRequest, UploadSource, UploadedAsset};
pub use store::LocalCatalog;
pub use types::{AssetName, LocalEntry, Properties, RemoteEntry, TagSet, DEFAULT_LANGUAGE};
