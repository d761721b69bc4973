use crate::error::Result;
use crate::types::{AssetName, RemoteEntry, TagSet};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

/// Where the image bytes of an upload come from
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Image file on disk
    Path(PathBuf),
    /// Bytes already in memory, e.g. a multipart body
    Bytes { file_name: String, data: Vec<u8> },
}

impl UploadSource {
    /// File name sent with the upload
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Path(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            Self::Bytes { file_name, .. } => Some(file_name.clone()),
        }
    }
}

/// Everything needed to create a remote asset
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: AssetName,
    pub source: UploadSource,
    pub tags: TagSet,
    pub title: String,
    pub language: String,
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub name: AssetName,
    /// Remote identifier, `memes/<name>`
    pub public_id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Hosted asset store primitives.
///
/// Mutations are idempotent on the remote side: writing the same tags or
/// language twice leaves the asset unchanged.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every asset with tags and context, in the store's listing order (single page)
    async fn fetch_all(&self) -> Result<Vec<RemoteEntry>>;

    /// Replace the asset's tags with exactly `tags`
    async fn set_tags(&self, name: &str, tags: &TagSet) -> Result<()>;

    /// Write the `language` context field
    async fn set_language(&self, name: &str, language: &str) -> Result<()>;

    async fn destroy(&self, name: &str) -> Result<()>;

    async fn upload(&self, request: &UploadRequest) -> Result<UploadedAsset>;
}

/// Point-in-time, read-only copy of the remote catalog.
///
/// Fetched once per command and never refreshed; keeps the listing order.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    entries: Vec<RemoteEntry>,
    index: HashMap<AssetName, usize>,
}

impl RemoteSnapshot {
    pub fn new(entries: Vec<RemoteEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            if index.insert(entry.name.clone(), pos).is_some() {
                log::warn!("Duplicate remote asset '{}', keeping the last", entry.name);
            }
        }
        Self { entries, index }
    }

    pub async fn fetch(store: &(impl RemoteStore + ?Sized)) -> Result<Self> {
        let entries = store.fetch_all().await?;
        log::debug!("Fetched remote snapshot with {} assets", entries.len());
        Ok(Self::new(entries))
    }

    pub fn get(&self, name: &str) -> Option<&RemoteEntry> {
        self.index.get(name).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in listing order
    pub fn entries(&self) -> &[RemoteEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<RemoteEntry>> for RemoteSnapshot {
    fn from(entries: Vec<RemoteEntry>) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_keeps_listing_order_and_indexes_names() {
        let snapshot = RemoteSnapshot::new(vec![
            RemoteEntry::new("zebra"),
            RemoteEntry::new("apple").with_tags(["fruit"]),
        ]);
        let names: Vec<_> = snapshot.names().collect();
        assert_eq!(names, vec!["zebra", "apple"]);
        assert!(snapshot.get("apple").unwrap().tags.contains("fruit"));
        assert!(!snapshot.contains("pear"));
    }
}
