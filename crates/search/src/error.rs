use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(u32),
}
