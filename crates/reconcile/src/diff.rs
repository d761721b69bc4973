use meme_catalog::{AssetName, LocalEntry, RemoteEntry, TagSet};
use serde::Serialize;

/// Minimal set of remote field updates for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub name: AssetName,
    /// Full replacement tag set (never a merge)
    pub tags_to_set: Option<TagSet>,
    pub language_to_set: Option<String>,
}

impl ChangeSet {
    pub fn in_sync(&self) -> bool {
        self.tags_to_set.is_none() && self.language_to_set.is_none()
    }

    /// Human-readable change lines, empty when in sync
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(tags) = &self.tags_to_set {
            lines.push(format!("update tags: {tags}"));
        }
        if let Some(language) = &self.language_to_set {
            lines.push(format!("update language: {language}"));
        }
        lines
    }
}

/// Compare a local entry with its remote counterpart. Local always wins.
///
/// A remote asset without a language never matches, so the first push always
/// writes the language context.
pub fn diff(local: &LocalEntry, remote: &RemoteEntry) -> ChangeSet {
    debug_assert_eq!(local.name, remote.name);

    let tags_to_set = (*local.tags() != remote.tags).then(|| local.tags().clone());

    let local_language = local.language_or_default();
    let language_to_set = (remote.language.as_deref() != Some(local_language))
        .then(|| local_language.to_string());

    ChangeSet {
        name: local.name.clone(),
        tags_to_set,
        language_to_set,
    }
}
