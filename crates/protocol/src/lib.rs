use anyhow::Result;
use meme_catalog::RemoteEntry;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_THRESHOLD: u32 = 75;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorEnvelope,
}

/// One meme as served to web clients
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MemeView {
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub tags: Vec<String>,
    /// Falls back to `"en"`
    pub language: String,
    /// Remote caption, or the name when none was set
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl MemeView {
    #[must_use]
    pub fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }
}

impl From<&RemoteEntry> for MemeView {
    fn from(entry: &RemoteEntry) -> Self {
        Self {
            name: entry.name.clone(),
            url: entry.url.clone(),
            width: entry.width,
            height: entry.height,
            tags: entry.tags.to_vec(),
            language: entry.language_or_default().to_string(),
            title: entry.caption_or_name().to_string(),
            score: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MemesResponse {
    pub memes: Vec<MemeView>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub memes: Vec<MemeView>,
    pub query: String,
    pub threshold: u32,
    pub total_matches: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeleteResponse {
    pub success: bool,
    /// False when the remote destroy failed and only the local entry went away
    pub remote_deleted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub threshold: Option<u32>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meme_view_defaults_language_and_title() {
        let entry = RemoteEntry::new("cat_meme").with_tags(["cat"]);
        let view = MemeView::from(&entry);
        assert_eq!(view.language, "en");
        assert_eq!(view.title, "cat_meme");

        let json = serialize_json(&view).unwrap();
        assert!(!json.contains("score"));
        assert!(serialize_json(&view.with_score(80)).unwrap().contains("\"score\":80"));
    }
}
