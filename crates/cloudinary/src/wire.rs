use meme_catalog::{RemoteEntry, TagSet};
use serde::Deserialize;
use std::collections::HashMap;

/// Public ids of managed assets live under this folder
pub const ASSET_PREFIX: &str = "memes/";

/// Largest page the Admin API hands out; listing is never paginated further
pub const MAX_RESULTS: u32 = 500;

pub(crate) fn public_id(name: &str) -> String {
    format!("{ASSET_PREFIX}{name}")
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Resource {
    pub public_id: String,
    #[serde(default)]
    pub secure_url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub context: Option<ResourceContext>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResourceContext {
    #[serde(default)]
    pub custom: HashMap<String, String>,
}

impl From<Resource> for RemoteEntry {
    fn from(resource: Resource) -> Self {
        let name = resource
            .public_id
            .strip_prefix(ASSET_PREFIX)
            .unwrap_or(&resource.public_id)
            .to_string();
        let mut custom = resource.context.unwrap_or_default().custom;
        Self {
            name,
            tags: resource.tags.into_iter().collect::<TagSet>(),
            language: custom.remove("language"),
            caption: custom.remove("caption"),
            url: resource.secure_url,
            width: resource.width,
            height: resource.height,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub secure_url: String,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorMessage {
    pub message: String,
}

/// `destroy` answers 200 with `{"result": "not found"}` for unknown ids
#[derive(Debug, Deserialize)]
pub(crate) struct DestroyResponse {
    #[serde(default)]
    pub result: String,
}
