use super::AppContext;
use crate::ui::print_stdout;
use anyhow::Result;
use clap::Args;
use meme_catalog::RemoteSnapshot;
use meme_search::{FuzzySearch, MatchMode, SearchResult, CLI_THRESHOLD};
use tabled::{Table, Tabled};

#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Keyword matched against names and tags
    keyword: String,

    /// Minimum match score (0-100)
    #[arg(long, default_value_t = CLI_THRESHOLD, value_parser = clap::value_parser!(u32).range(0..=100))]
    threshold: u32,
}

#[derive(Tabled)]
struct SearchRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Match Score")]
    score: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&SearchResult> for SearchRow {
    fn from(hit: &SearchResult) -> Self {
        Self {
            name: hit.name.clone(),
            score: format!("{}%", hit.score),
            tags: hit.tags.to_string(),
            url: hit.url.clone(),
        }
    }
}

fn render_results(results: &[SearchResult]) -> String {
    Table::new(results.iter().map(SearchRow::from)).to_string()
}

pub(crate) async fn run(args: SearchArgs, ctx: &AppContext) -> Result<()> {
    // Validate before any network call
    let engine = FuzzySearch::new(MatchMode::NameAndTags);
    engine.rank(&args.keyword, args.threshold, &[])?;

    let client = ctx.remote()?;
    let snapshot = RemoteSnapshot::fetch(&client).await?;
    let results = engine.search(&args.keyword, args.threshold, snapshot.entries())?;

    if results.is_empty() {
        print_stdout(&format!(
            "No memes matched '{}' (threshold {}).",
            args.keyword, args.threshold
        ))?;
        return Ok(());
    }

    print_stdout(&render_results(&results))?;
    print_stdout(&format!("\n{} matches", results.len()))?;
    Ok(())
}
