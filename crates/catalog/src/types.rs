use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Language assumed for an entry that never had one recorded.
///
/// Only applied when comparing or presenting; never written into storage.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Unique identifier of a meme, the key in both stores
pub type AssetName = String;

static NO_TAGS: TagSet = TagSet(BTreeSet::new());

/// Ordered, duplicate-free, case-sensitive set of tags.
///
/// Serialises as a sorted JSON array so persisted diffs stay minimal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated tag list, trimming blanks away
    pub fn parse_list(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Set union, keeping the sorted order
    pub fn extend_from(&mut self, other: &TagSet) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Tags in `self` that are missing from `other`
    #[must_use]
    pub fn difference(&self, other: &TagSet) -> TagSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}

/// Nested `properties` object of a local entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// `"<width>x<height>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One record of the local catalog file.
///
/// Optional keys stay absent when they were absent on load, and keys this
/// type does not know about are carried through `extra`, so a load/save
/// cycle never drops data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalEntry {
    /// Filled from the map key on load
    #[serde(skip)]
    pub name: AssetName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,

    /// `None` when the file had no `tags` key; see [`LocalEntry::tags`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<TagSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocalEntry {
    pub fn new(name: impl Into<AssetName>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set tags
    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    /// Builder: set language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builder: set title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Tags of the entry; empty when the key was never written
    pub fn tags(&self) -> &TagSet {
        self.tags.as_ref().unwrap_or(&NO_TAGS)
    }

    /// Mutable tags, creating the key on first write
    pub fn tags_mut(&mut self) -> &mut TagSet {
        self.tags.get_or_insert_with(TagSet::new)
    }

    pub fn has_tags_key(&self) -> bool {
        self.tags.is_some()
    }

    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn title_or_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// One asset as seen in a remote snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: AssetName,
    pub tags: TagSet,
    /// Absent until a language context was written remotely
    pub language: Option<String>,
    pub caption: Option<String>,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl RemoteEntry {
    pub fn new(name: impl Into<AssetName>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set tags
    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Builder: set language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builder: set delivery URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn caption_or_name(&self) -> &str {
        self.caption.as_deref().unwrap_or(&self.name)
    }
}
