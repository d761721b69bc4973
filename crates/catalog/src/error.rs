use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalog and remote store operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Which side of the reconciliation an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Local,
    Remote,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local catalog"),
            Self::Remote => f.write_str("remote store"),
        }
    }
}

/// Remote primitive that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    FetchAll,
    SetTags,
    SetLanguage,
    Destroy,
    Upload,
    /// Several writes of one change-set failed together
    UpdateMetadata,
}

impl RemoteOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchAll => "fetch",
            Self::SetTags => "set tags",
            Self::SetLanguage => "set language",
            Self::Destroy => "destroy",
            Self::Upload => "upload",
            Self::UpdateMetadata => "metadata update",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the catalog, the persistence layer and remote stores
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Remote credentials missing or unparseable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Asset name absent from the store that was asked about it
    #[error("Asset '{name}' not found in {store}")]
    NotFound { name: String, store: StoreKind },

    /// A remote primitive failed (network, auth, rate limit, remote 404)
    #[error("Remote {operation} failed{}: {reason}", for_asset(.name))]
    RemoteCall {
        operation: RemoteOperation,
        name: Option<String>,
        reason: String,
    },

    /// Local catalog file could not be read or written
    #[error("Persistence failure at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local catalog file exists but is not valid catalog JSON
    #[error("Corrupt catalog file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn for_asset(name: &Option<String>) -> String {
    name.as_deref()
        .map(|n| format!(" for '{n}'"))
        .unwrap_or_default()
}

impl CatalogError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn not_found(name: impl Into<String>, store: StoreKind) -> Self {
        Self::NotFound {
            name: name.into(),
            store,
        }
    }

    pub fn remote(
        operation: RemoteOperation,
        name: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RemoteCall {
            operation,
            name: name.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Short reason suitable for a per-asset failure line
    pub fn reason(&self) -> String {
        match self {
            Self::RemoteCall {
                operation, reason, ..
            } => format!("{operation}: {reason}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_call_message_names_the_asset() {
        let err = CatalogError::remote(RemoteOperation::SetTags, Some("cat_meme"), "HTTP 420");
        assert_eq!(
            err.to_string(),
            "Remote set tags failed for 'cat_meme': HTTP 420"
        );
        assert_eq!(err.reason(), "set tags: HTTP 420");
    }

    #[test]
    fn remote_call_without_asset_omits_name() {
        let err = CatalogError::remote(RemoteOperation::FetchAll, None, "timed out");
        assert_eq!(err.to_string(), "Remote fetch failed: timed out");
    }
}
