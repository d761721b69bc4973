use crate::error::{Result, SearchError};
use crate::similarity::{partial_ratio, ratio};
use meme_catalog::{AssetName, RemoteEntry, TagSet};
use serde::Serialize;

/// Default threshold of the command-line search
pub const CLI_THRESHOLD: u32 = 60;

/// Default threshold of the HTTP search endpoint
pub const API_THRESHOLD: u32 = 75;

/// How a query is scored against an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Best partial ratio over the name and every tag
    #[default]
    NameAndTags,
    /// Tags only: literal substring scores 100, otherwise full ratio
    TagSubstring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub name: AssetName,
    pub score: u8,
    pub tags: TagSet,
    pub url: String,
}

/// A borrowed hit, for callers that need the whole remote entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked<'a> {
    pub entry: &'a RemoteEntry,
    pub score: u8,
}

impl From<Ranked<'_>> for SearchResult {
    fn from(hit: Ranked<'_>) -> Self {
        Self {
            name: hit.entry.name.clone(),
            score: hit.score,
            tags: hit.entry.tags.clone(),
            url: hit.entry.url.clone(),
        }
    }
}

/// Fuzzy ranking of remote assets by name and tags
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzySearch {
    mode: MatchMode,
}

impl FuzzySearch {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Score one asset against an already lower-cased query
    pub fn score(&self, query_lower: &str, entry: &RemoteEntry) -> u8 {
        match self.mode {
            MatchMode::NameAndTags => {
                let name_score = partial_ratio(query_lower, &entry.name.to_lowercase());
                entry
                    .tags
                    .iter()
                    .map(|tag| partial_ratio(query_lower, &tag.to_lowercase()))
                    .fold(name_score, u8::max)
            }
            MatchMode::TagSubstring => {
                let mut best = 0;
                for tag in entry.tags.iter() {
                    let tag = tag.to_lowercase();
                    if tag.contains(query_lower) {
                        return 100;
                    }
                    best = best.max(ratio(query_lower, &tag));
                }
                best
            }
        }
    }

    /// Rank `catalog` against `query`, keeping hits with `score >= threshold`.
    ///
    /// Sorted by score descending; equal scores keep catalog order.
    pub fn rank<'a>(
        &self,
        query: &str,
        threshold: u32,
        catalog: &'a [RemoteEntry],
    ) -> Result<Vec<Ranked<'a>>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if threshold > 100 {
            return Err(SearchError::InvalidThreshold(threshold));
        }

        let query_lower = query.to_lowercase();
        let mut hits: Vec<Ranked<'a>> = catalog
            .iter()
            .map(|entry| Ranked {
                entry,
                score: self.score(&query_lower, entry),
            })
            .filter(|hit| u32::from(hit.score) >= threshold)
            .collect();

        // sort_by is stable
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        log::debug!(
            "Query {query:?} ({:?}, threshold {threshold}): {} of {} assets matched",
            self.mode,
            hits.len(),
            catalog.len()
        );
        Ok(hits)
    }

    pub fn search(
        &self,
        query: &str,
        threshold: u32,
        catalog: &[RemoteEntry],
    ) -> Result<Vec<SearchResult>> {
        Ok(self
            .rank(query, threshold, catalog)?
            .into_iter()
            .map(SearchResult::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn asset(name: &str, tags: &[&str]) -> RemoteEntry {
        RemoteEntry::new(name)
            .with_tags(tags.iter().copied())
            .with_url(format!("https://cdn.test/memes/{name}"))
    }

    fn names(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn exact_substring_ranks_first() {
        let catalog = vec![
            asset("kat_pic", &["kitten"]),
            asset("cat_meme", &["cat", "funny"]),
        ];
        let results = FuzzySearch::default()
            .search("cat", CLI_THRESHOLD, &catalog)
            .unwrap();

        assert_eq!(names(&results), vec!["cat_meme", "kat_pic"]);
        assert_eq!(results[0].score, 100);
        assert!(results[1].score < 100);
        assert_eq!(results[0].url, "https://cdn.test/memes/cat_meme");
    }

    #[test]
    fn threshold_is_inclusive() {
        let catalog = vec![asset("kat_pic", &[])];
        let search = FuzzySearch::default();
        let score = search.score("cat", &catalog[0]);
        assert_eq!(score, 67);

        let at = search.search("cat", u32::from(score), &catalog).unwrap();
        assert_eq!(at.len(), 1);
        let above = search.search("cat", u32::from(score) + 1, &catalog).unwrap();
        assert!(above.is_empty());
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = vec![
            asset("zeta_dog", &[]),
            asset("alpha_dog", &[]),
            asset("mid_dog", &["dog"]),
        ];
        let results = FuzzySearch::default().search("dog", 0, &catalog).unwrap();
        assert_eq!(names(&results), vec!["zeta_dog", "alpha_dog", "mid_dog"]);
        assert!(results.iter().all(|r| r.score == 100));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let catalog = vec![asset("Doge_WOW", &["Shiba"])];
        let search = FuzzySearch::default();
        assert_eq!(search.score("doge", &catalog[0]), 100);
        assert_eq!(search.score("shiba", &catalog[0]), 100);
    }

    #[test]
    fn empty_tags_and_names_do_not_crash() {
        let catalog = vec![asset("", &[])];
        let search = FuzzySearch::default();
        assert_eq!(search.score("cat", &catalog[0]), 0);
        let tag_search = FuzzySearch::new(MatchMode::TagSubstring);
        assert_eq!(tag_search.score("cat", &catalog[0]), 0);
    }

    #[test]
    fn rejects_blank_query_and_bad_threshold() {
        let search = FuzzySearch::default();
        assert_eq!(search.search("  ", 60, &[]), Err(SearchError::EmptyQuery));
        assert_eq!(
            search.search("cat", 101, &[]),
            Err(SearchError::InvalidThreshold(101))
        );
    }

    #[test]
    fn tag_substring_mode_ignores_names() {
        let catalog = vec![
            asset("cat_meme", &["pet"]),
            asset("other", &["concatenate"]),
        ];
        let results = FuzzySearch::new(MatchMode::TagSubstring)
            .search("cat", API_THRESHOLD, &catalog)
            .unwrap();
        assert_eq!(names(&results), vec!["other"]);
        assert_eq!(results[0].score, 100);
    }

    #[test]
    fn tag_substring_falls_back_to_ratio() {
        let catalog = vec![asset("x", &["kat", "dog"])];
        let search = FuzzySearch::new(MatchMode::TagSubstring);
        assert_eq!(search.score("cat", &catalog[0]), 67);
    }

    #[test]
    fn rank_exposes_full_entries() {
        let catalog = vec![asset("cat_meme", &["cat"]).with_language("fr")];
        let hits = FuzzySearch::default().rank("cat", 60, &catalog).unwrap();
        assert_eq!(hits[0].entry.language.as_deref(), Some("fr"));
    }
}
