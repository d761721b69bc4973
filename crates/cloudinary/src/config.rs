use meme_catalog::{CatalogError, Result};
use std::fmt;
use url::Url;

pub const CLOUDINARY_URL_ENV: &str = "CLOUDINARY_URL";
pub const API_BASE_ENV: &str = "CLOUDINARY_API_BASE";
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Credentials and endpoint of one Cloudinary account.
///
/// Parsed once at startup and handed to [`crate::CloudinaryClient::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Parse `cloudinary://<api_key>:<api_secret>@<cloud_name>`
    pub fn from_url(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CatalogError::configuration(format!(
                "{CLOUDINARY_URL_ENV} is empty"
            )));
        }
        let parsed = Url::parse(raw).map_err(|err| {
            CatalogError::configuration(format!("{CLOUDINARY_URL_ENV} is not a valid URL: {err}"))
        })?;
        if parsed.scheme() != "cloudinary" {
            return Err(CatalogError::configuration(format!(
                "{CLOUDINARY_URL_ENV} must use the cloudinary:// scheme, got {}://",
                parsed.scheme()
            )));
        }

        let api_key = parsed.username();
        let api_secret = parsed.password().unwrap_or_default();
        let cloud_name = parsed.host_str().unwrap_or_default();
        if api_key.is_empty() || api_secret.is_empty() || cloud_name.is_empty() {
            return Err(CatalogError::configuration(format!(
                "{CLOUDINARY_URL_ENV} must look like cloudinary://<api_key>:<api_secret>@<cloud_name>"
            )));
        }

        Ok(Self {
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Read `CLOUDINARY_URL` (and optional `CLOUDINARY_API_BASE`) from the environment
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(CLOUDINARY_URL_ENV).map_err(|_| {
            CatalogError::configuration(format!("{CLOUDINARY_URL_ENV} not found in environment"))
        })?;
        let mut config = Self::from_url(&raw)?;
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config = config.with_api_base(base.trim());
            }
        }
        Ok(config)
    }

    /// Builder: point the client at another API origin
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/v1_1/{}/{path}", self.api_base, self.cloud_name)
    }
}

// Keep the secret out of logs
impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}
