use crate::commands::AppContext;
use crate::server_security::{join_addrs, BindTarget};
use crate::ui::print_stdout;
use anyhow::{Context as AnyhowContext, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use clap::Args;
use meme_catalog::{
    CatalogError, LocalCatalog, LocalEntry, Properties, RemoteSnapshot, RemoteStore, StoreKind,
    UploadRequest, UploadSource, UploadedAsset, DEFAULT_LANGUAGE,
};
use meme_protocol::{
    DeleteResponse, ErrorEnvelope, ErrorResponse, MemeView, MemesResponse, SearchQuery,
    SearchResponse, UploadResponse, DEFAULT_SEARCH_THRESHOLD,
};
use meme_search::{FuzzySearch, MatchMode, SearchError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tag carried by every asset uploaded through the API
const UPLOAD_TAG: &str = "meme";
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:5001
    #[arg(long, default_value = "127.0.0.1:5001")]
    bind: String,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,
}

/// Shared handler state.
///
/// The catalog is re-read from disk by every mutating request so edits made
/// by the CLI while the server runs are never overwritten. `catalog_lock`
/// serialises those read-modify-write cycles.
pub(crate) struct AppState {
    remote: Arc<dyn RemoteStore>,
    metadata: PathBuf,
    catalog_lock: Mutex<()>,
}

impl AppState {
    pub(crate) fn new(remote: Arc<dyn RemoteStore>, metadata: impl Into<PathBuf>) -> Self {
        Self {
            remote,
            metadata: metadata.into(),
            catalog_lock: Mutex::new(()),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    envelope: ErrorEnvelope,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            envelope: ErrorEnvelope::new("invalid_request", message),
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.envelope = self.envelope.with_hint(hint);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.envelope,
            }),
        )
            .into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let envelope = ErrorEnvelope::new("invalid_request", err.to_string());
        let envelope = match err {
            SearchError::EmptyQuery => envelope.with_hint("Pass a non-empty ?q= parameter"),
            SearchError::InvalidThreshold(_) => {
                envelope.with_hint("threshold must be an integer between 0 and 100")
            }
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            envelope,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let (status, code) = match &err {
            CatalogError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            CatalogError::RemoteCall { .. } => (StatusCode::BAD_GATEWAY, "remote_error"),
            CatalogError::Configuration(_)
            | CatalogError::Persistence { .. }
            | CatalogError::Corrupt { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        if status.is_server_error() {
            log::error!("{err}");
        }
        Self {
            status,
            envelope: ErrorEnvelope::new(code, err.to_string()),
        }
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/memes", get(list_memes))
        .route("/api/memes/search", get(search_memes))
        .route("/api/memes/:name", delete(delete_meme).post(upload_meme))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn list_memes(State(state): State<Arc<AppState>>) -> ApiResult<MemesResponse> {
    let snapshot = RemoteSnapshot::fetch(state.remote.as_ref()).await?;
    Ok(Json(MemesResponse {
        memes: snapshot.entries().iter().map(MemeView::from).collect(),
    }))
}

async fn search_memes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let threshold = query.threshold.unwrap_or(DEFAULT_SEARCH_THRESHOLD);
    let engine = FuzzySearch::new(MatchMode::TagSubstring);
    // Reject bad input before calling the remote
    engine.rank(&query.q, threshold, &[])?;

    let snapshot = RemoteSnapshot::fetch(state.remote.as_ref()).await?;
    let memes: Vec<MemeView> = engine
        .rank(&query.q, threshold, snapshot.entries())?
        .into_iter()
        .map(|hit| MemeView::from(hit.entry).with_score(hit.score))
        .collect();

    Ok(Json(SearchResponse {
        total_matches: memes.len(),
        memes,
        query: query.q,
        threshold,
    }))
}

/// Drop the local entry, then destroy the remote asset on a best-effort basis
async fn delete_meme(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<DeleteResponse> {
    let local_deleted = {
        let _guard = state.catalog_lock.lock().await;
        let mut catalog = LocalCatalog::load(&state.metadata)?;
        match catalog.remove(&name) {
            Ok(_) => {
                catalog.persist()?;
                true
            }
            Err(CatalogError::NotFound { .. }) => false,
            Err(err) => return Err(err.into()),
        }
    };

    let remote_deleted = match state.remote.destroy(&name).await {
        Ok(()) => true,
        Err(CatalogError::NotFound { .. }) if !local_deleted => {
            return Err(CatalogError::not_found(&name, StoreKind::Remote).into());
        }
        Err(err) => {
            log::warn!("Remote delete of {name} failed: {err}");
            false
        }
    };

    log::info!("Deleted {name} (local: {local_deleted}, remote: {remote_deleted})");
    Ok(Json(DeleteResponse {
        success: true,
        remote_deleted,
    }))
}

/// Upload the multipart `file` field as `name`.
///
/// Local metadata is only written when the catalog has no entry for `name` yet.
async fn upload_meme(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let (file_name, data) = read_file_field(&mut multipart).await?;

    let existing = LocalCatalog::load_or_empty(&state.metadata).get(&name).cloned();
    let mut tags = existing
        .as_ref()
        .map(|entry| entry.tags().clone())
        .unwrap_or_default();
    tags.insert(UPLOAD_TAG);
    let request = UploadRequest {
        name: name.clone(),
        source: UploadSource::Bytes {
            file_name: file_name.clone(),
            data,
        },
        tags,
        title: existing
            .as_ref()
            .map_or(name.as_str(), LocalEntry::title_or_name)
            .to_string(),
        language: existing
            .as_ref()
            .map_or(DEFAULT_LANGUAGE, LocalEntry::language_or_default)
            .to_string(),
    };
    let asset = state.remote.upload(&request).await?;

    {
        let _guard = state.catalog_lock.lock().await;
        let mut catalog = LocalCatalog::load(&state.metadata)?;
        if !catalog.contains(&name) {
            catalog.insert(uploaded_entry(&name, &file_name, &asset));
            catalog.persist()?;
            log::info!("Recorded metadata for {name} in {}", state.metadata.display());
        }
    }

    Ok(Json(UploadResponse {
        success: true,
        url: asset.url,
        public_id: asset.public_id,
    }))
}

async fn read_file_field(
    multipart: &mut Multipart,
) -> std::result::Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().trim().to_string();
        if file_name.is_empty() {
            return Err(ApiError::bad_request("No file selected"));
        }
        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        return Ok((file_name, data.to_vec()));
    }
    Err(ApiError::bad_request("No file provided")
        .with_hint("Send the image as the multipart field `file`"))
}

/// Catalog entry for a freshly uploaded asset that had no local metadata
fn uploaded_entry(name: &str, file_name: &str, asset: &UploadedAsset) -> LocalEntry {
    let format = std::path::Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());
    let mut entry = LocalEntry::new(name).with_language(DEFAULT_LANGUAGE);
    entry.file_name = Some(file_name.to_string());
    entry.width = Some(asset.width);
    entry.height = Some(asset.height);
    entry.properties = Some(Properties {
        kind: Some("image".to_string()),
        format,
        dimensions: Some(format!("{}x{}", asset.width, asset.height)),
        ..Properties::default()
    });
    entry
}

pub(crate) async fn serve(args: ServeArgs, ctx: &AppContext) -> Result<()> {
    let target = BindTarget::resolve(&args.bind)
        .await?
        .authorize(args.public)?;
    let remote = ctx.remote()?;
    let catalog = ctx.load_catalog();
    log::info!(
        "Loaded {} local entries from {}",
        catalog.len(),
        catalog.path().display()
    );

    let state = Arc::new(AppState::new(Arc::new(remote), ctx.metadata()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(target.addrs())
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    let base_url = format!("http://{}", listener.local_addr()?);

    print_stdout(&format!("Serving meme API: {base_url}/api/memes"))?;
    if args.public {
        print_stdout(&format!(
            "Public bind enabled (--public). Reachable on: {}",
            join_addrs(&target.exposed())
        ))?;
    }
    print_stdout(&format!("Try: curl '{base_url}/api/memes/search?q=cat'"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
