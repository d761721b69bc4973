mod error;
mod fuzzy;
mod similarity;

pub use error::{Result, SearchError};
pub use fuzzy::{FuzzySearch, MatchMode, Ranked, SearchResult, API_THRESHOLD, CLI_THRESHOLD};
pub use similarity::{partial_ratio, ratio};
