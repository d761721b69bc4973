use crate::config::CloudinaryConfig;
use crate::sign::{escape_context_value, unix_timestamp, SignedParams};
use crate::wire::{
    public_id, ApiErrorBody, DestroyResponse, ResourceList, UploadResponse, ASSET_PREFIX,
    MAX_RESULTS,
};
use async_trait::async_trait;
use meme_catalog::{
    CatalogError, RemoteEntry, RemoteOperation, RemoteStore, Result, StoreKind, TagSet,
    UploadRequest, UploadSource, UploadedAsset,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`RemoteStore`] backed by the Cloudinary Admin and Upload APIs
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    http: Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| {
                CatalogError::configuration(format!("cannot build HTTP client: {err}"))
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    fn signed_form(&self, params: SignedParams) -> Vec<(String, String)> {
        params
            .with("timestamp", unix_timestamp())
            .into_form(&self.config.api_key, &self.config.api_secret)
    }

    async fn post_signed(
        &self,
        operation: RemoteOperation,
        name: &str,
        path: &str,
        params: SignedParams,
    ) -> Result<Response> {
        let form = self.signed_form(params);
        let response = self
            .http
            .post(self.config.endpoint(path))
            .form(&form)
            .send()
            .await
            .map_err(|err| CatalogError::remote(operation, Some(name), err.to_string()))?;
        check_status(operation, Some(name), response).await
    }
}

#[async_trait]
impl RemoteStore for CloudinaryClient {
    async fn fetch_all(&self) -> Result<Vec<RemoteEntry>> {
        let operation = RemoteOperation::FetchAll;
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .http
            .get(self.config.endpoint("resources/image/upload"))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .query(&[
                ("prefix", ASSET_PREFIX),
                ("max_results", max_results.as_str()),
                ("tags", "true"),
                ("context", "true"),
            ])
            .send()
            .await
            .map_err(|err| CatalogError::remote(operation, None, err.to_string()))?;
        let response = check_status(operation, None, response).await?;
        let list: ResourceList = decode(operation, None, response).await?;

        if list.next_cursor.is_some() {
            log::warn!(
                "Remote listing holds more than {MAX_RESULTS} assets; only the first page is used"
            );
        }
        Ok(list.resources.into_iter().map(RemoteEntry::from).collect())
    }

    async fn set_tags(&self, name: &str, tags: &TagSet) -> Result<()> {
        let mut params = SignedParams::new().with("public_ids", public_id(name));
        params = if tags.is_empty() {
            params.with("command", "remove_all")
        } else {
            params
                .with("command", "replace")
                .with("tag", tags.to_vec().join(","))
        };

        self.post_signed(RemoteOperation::SetTags, name, "image/tags", params)
            .await?;
        log::debug!("Replaced tags of {name}: {tags}");
        Ok(())
    }

    async fn set_language(&self, name: &str, language: &str) -> Result<()> {
        let params = SignedParams::new()
            .with("command", "add")
            .with(
                "context",
                format!("language={}", escape_context_value(language)),
            )
            .with("public_ids", public_id(name));

        self.post_signed(RemoteOperation::SetLanguage, name, "image/context", params)
            .await?;
        log::debug!("Set language of {name} to {language}");
        Ok(())
    }

    async fn destroy(&self, name: &str) -> Result<()> {
        let operation = RemoteOperation::Destroy;
        let params = SignedParams::new().with("public_id", public_id(name));
        let response = self
            .post_signed(operation, name, "image/destroy", params)
            .await?;
        let body: DestroyResponse = decode(operation, Some(name), response).await?;
        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(CatalogError::not_found(name, StoreKind::Remote)),
            other => Err(CatalogError::remote(operation, Some(name), other.to_string())),
        }
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadedAsset> {
        let operation = RemoteOperation::Upload;
        let name = request.name.as_str();
        let file_name = request
            .source
            .file_name()
            .unwrap_or_else(|| name.to_string());
        let bytes = match &request.source {
            UploadSource::Path(path) => tokio::fs::read(path).await.map_err(|err| {
                CatalogError::remote(
                    operation,
                    Some(name),
                    format!("cannot read {}: {err}", path.display()),
                )
            })?,
            UploadSource::Bytes { data, .. } => data.clone(),
        };

        let context = format!(
            "language={}|caption={}",
            escape_context_value(&request.language),
            escape_context_value(&request.title)
        );
        let params = SignedParams::new()
            .with("public_id", public_id(name))
            .with("tags", request.tags.to_vec().join(","))
            .with("context", context);

        let form = self
            .signed_form(params)
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(self.config.endpoint("image/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|err| CatalogError::remote(operation, Some(name), err.to_string()))?;
        let response = check_status(operation, Some(name), response).await?;
        let uploaded: UploadResponse = decode(operation, Some(name), response).await?;

        log::info!("Uploaded {name} ({}x{})", uploaded.width, uploaded.height);
        Ok(UploadedAsset {
            name: name.to_string(),
            public_id: uploaded.public_id.unwrap_or_else(|| public_id(name)),
            url: uploaded.secure_url,
            width: uploaded.width,
            height: uploaded.height,
        })
    }
}

async fn check_status(
    operation: RemoteOperation,
    name: Option<&str>,
    response: Response,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let reason = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    Err(CatalogError::remote(
        operation,
        name,
        format!("HTTP {}: {reason}", status.as_u16()),
    ))
}

async fn decode<T: DeserializeOwned>(
    operation: RemoteOperation,
    name: Option<&str>,
    response: Response,
) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| CatalogError::remote(operation, name, format!("bad response: {err}")))
}
