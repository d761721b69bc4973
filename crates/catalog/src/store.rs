use crate::error::{CatalogError, Result, StoreKind};
use crate::types::{AssetName, LocalEntry, TagSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// On-disk layout: `{"meme_images": {<name>: <entry>}}` plus any extra top-level keys
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    meme_images: BTreeMap<AssetName, LocalEntry>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// In-memory local metadata catalog backed by a JSON file.
///
/// Mutations stay in memory until [`LocalCatalog::persist`] is called.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    path: PathBuf,
    entries: BTreeMap<AssetName, LocalEntry>,
    extra: Map<String, Value>,
}

impl LocalCatalog {
    /// Empty catalog that will persist to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Load the catalog file. A missing file yields an empty catalog.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            log::debug!("No catalog at {}, starting empty", path.display());
            return Ok(Self::empty(path));
        }

        let raw = fs::read(&path).map_err(|source| CatalogError::Persistence {
            path: path.clone(),
            source,
        })?;
        let file: CatalogFile =
            serde_json::from_slice(&raw).map_err(|source| CatalogError::Corrupt {
                path: path.clone(),
                source,
            })?;

        let entries = file
            .meme_images
            .into_iter()
            .map(|(name, mut entry)| {
                entry.name.clone_from(&name);
                (name, entry)
            })
            .collect::<BTreeMap<_, _>>();
        log::debug!("Loaded {} entries from {}", entries.len(), path.display());

        Ok(Self {
            path,
            entries,
            extra: file.extra,
        })
    }

    /// Load, degrading to an empty catalog on any read or parse failure
    pub fn load_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(&path) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::warn!("{err}; continuing with an empty catalog");
                Self::empty(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&LocalEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn all(&self) -> &BTreeMap<AssetName, LocalEntry> {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace an entry, keyed by its name
    pub fn insert(&mut self, entry: LocalEntry) -> Option<LocalEntry> {
        self.entries.insert(entry.name.clone(), entry)
    }

    pub fn remove(&mut self, name: &str) -> Result<LocalEntry> {
        self.entries
            .remove(name)
            .ok_or_else(|| CatalogError::not_found(name, StoreKind::Local))
    }

    /// Replace the tag set of `name`
    pub fn set_tags(&mut self, name: &str, tags: TagSet) -> Result<()> {
        let entry = self.entry_mut(name)?;
        *entry.tags_mut() = tags;
        Ok(())
    }

    /// Returns the previous explicit language, if any
    pub fn set_language(&mut self, name: &str, language: &str) -> Result<Option<String>> {
        let entry = self.entry_mut(name)?;
        Ok(entry.language.replace(language.to_string()))
    }

    /// Union `tags` into the entry; returns the tags that were actually new
    pub fn add_tags(&mut self, name: &str, tags: &TagSet) -> Result<TagSet> {
        let entry = self.entry_mut(name)?;
        let added = tags.difference(entry.tags());
        if !added.is_empty() {
            entry.tags_mut().extend_from(tags);
        }
        Ok(added)
    }

    /// Write the whole catalog atomically (temp file + rename)
    pub fn persist(&self) -> Result<()> {
        let file = CatalogFile {
            meme_images: self.entries.clone(),
            extra: self.extra.clone(),
        };
        let bytes = to_pretty_json(&file).map_err(|source| CatalogError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let io_err = |source: std::io::Error| CatalogError::Persistence {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut out = fs::File::create(&tmp).map_err(io_err)?;
            out.write_all(&bytes).map_err(io_err)?;
            out.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        log::debug!(
            "Persisted {} entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut LocalEntry> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| CatalogError::not_found(name, StoreKind::Local))
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
    "meme_images": {
        "cat_meme": {
            "file_name": "cat_meme.png",
            "title": "cat_meme",
            "width": 500,
            "height": 400,
            "box_count": 2,
            "properties": {
                "type": "image",
                "format": "png",
                "dimensions": "500x400"
            },
            "tags": ["funny", "cat"],
            "language": "en"
        },
        "legacy": {
            "file_name": "legacy.jpg",
            "keywords": ["old"]
        }
    }
}"#;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let catalog = LocalCatalog::load(dir.path().join("nope.json")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error_but_load_or_empty_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, "{not json").unwrap();

        let err = LocalCatalog::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt { .. }));
        assert!(LocalCatalog::load_or_empty(&path).is_empty());
    }

    #[test]
    fn load_fills_names_from_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, SAMPLE).unwrap();

        let catalog = LocalCatalog::load(&path).unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["cat_meme", "legacy"]);
        assert_eq!(catalog.get("cat_meme").unwrap().name, "cat_meme");
        assert_eq!(catalog.get("legacy").unwrap().language, None);
    }

    #[test]
    fn round_trip_keeps_key_presence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, SAMPLE).unwrap();

        LocalCatalog::load(&path).unwrap().persist().unwrap();
        let before: Value = serde_json::from_str(SAMPLE).unwrap();
        let after: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();

        for name in ["cat_meme", "legacy"] {
            let mut keys_before: Vec<_> = before["meme_images"][name]
                .as_object()
                .unwrap()
                .keys()
                .collect();
            let mut keys_after: Vec<_> = after["meme_images"][name]
                .as_object()
                .unwrap()
                .keys()
                .collect();
            keys_before.sort();
            keys_after.sort();
            assert_eq!(keys_before, keys_after, "keys of {name}");
        }
        let cat_after = &after["meme_images"]["cat_meme"];

        // tags come back sorted
        assert_eq!(cat_after["tags"], serde_json::json!(["cat", "funny"]));
        assert_eq!(
            after["meme_images"]["legacy"]["keywords"],
            serde_json::json!(["old"])
        );
        assert!(after["meme_images"]["legacy"].get("language").is_none());
        assert!(after["meme_images"]["legacy"].get("tags").is_none());
    }

    #[test]
    fn add_tags_is_a_sorted_union() {
        let mut catalog = LocalCatalog::empty("unused.json");
        catalog.insert(LocalEntry::new("dog").with_tags(["woof", "dog"]));

        let added = catalog
            .add_tags("dog", &TagSet::parse_list("puppy,dog"))
            .unwrap();
        assert_eq!(added.to_vec(), vec!["puppy".to_string()]);
        assert_eq!(
            catalog.get("dog").unwrap().tags().to_vec(),
            vec!["dog".to_string(), "puppy".to_string(), "woof".to_string()]
        );
    }

    #[test]
    fn mutations_on_unknown_names_are_not_found() {
        let mut catalog = LocalCatalog::empty("unused.json");
        let err = catalog.set_tags("ghost", TagSet::new()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                store: StoreKind::Local,
                ..
            }
        ));
        assert!(catalog.remove("ghost").is_err());
        assert!(catalog.set_language("ghost", "fr").is_err());
    }

    #[test]
    fn set_language_replaces_the_explicit_value() {
        let mut catalog = LocalCatalog::empty("unused.json");
        catalog.insert(LocalEntry::new("cat"));

        assert_eq!(catalog.set_language("cat", "fr").unwrap(), None);
        assert_eq!(
            catalog.set_language("cat", "es").unwrap().as_deref(),
            Some("fr")
        );
        assert_eq!(catalog.get("cat").unwrap().language_or_default(), "es");
    }

    #[test]
    fn persist_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("static").join("meta.json");
        let mut catalog = LocalCatalog::empty(&path);
        catalog.insert(LocalEntry::new("a").with_tags(["x"]));
        catalog.persist().unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        let reloaded = LocalCatalog::load(&path).unwrap();
        assert_eq!(reloaded.get("a").unwrap().tags().to_vec(), vec!["x".to_string()]);
    }
}
