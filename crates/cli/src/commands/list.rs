use super::AppContext;
use crate::ui::{dim, heading, print_stdout};
use anyhow::Result;
use clap::Args;
use meme_catalog::RemoteSnapshot;

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Show dimensions, tags, language and URL
    #[arg(long)]
    details: bool,
}

pub(crate) async fn run(args: ListArgs, ctx: &AppContext) -> Result<()> {
    let client = ctx.remote()?;
    let snapshot = RemoteSnapshot::fetch(&client).await?;

    if snapshot.is_empty() {
        print_stdout("No memes found in the cloud.")?;
        return Ok(());
    }

    print_stdout(&heading(&format!("{} memes in the cloud", snapshot.len())))?;
    for entry in snapshot.entries() {
        if !args.details {
            print_stdout(&format!("  {}", entry.name))?;
            continue;
        }
        print_stdout(&format!(
            "  {} {}",
            entry.name,
            dim(&format!("({}x{})", entry.width, entry.height))
        ))?;
        let tags = if entry.tags.is_empty() {
            "(none)".to_string()
        } else {
            entry.tags.to_string()
        };
        print_stdout(&format!("    tags:     {tags}"))?;
        print_stdout(&format!("    language: {}", entry.language_or_default()))?;
        print_stdout(&format!("    url:      {}", entry.url))?;
    }
    Ok(())
}
