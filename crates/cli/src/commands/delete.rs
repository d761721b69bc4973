use super::{finish_batch, AppContext};
use crate::ui::{dim, dry_run_hint, fail, heading, ok, print_stdout, warn};
use anyhow::Result;
use clap::Args;
use meme_catalog::{CatalogError, RemoteStore};

#[derive(Args)]
pub(crate) struct DeleteArgs {
    /// Meme to delete from the cloud
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    name: Option<String>,

    /// Delete every meme listed in the local catalog
    #[arg(long)]
    all: bool,

    /// Actually delete instead of previewing
    #[arg(long)]
    confirm: bool,
}

pub(crate) async fn run(args: DeleteArgs, ctx: &AppContext) -> Result<()> {
    let names: Vec<String> = match args.name {
        Some(name) => vec![name],
        None => ctx.load_catalog().names().map(str::to_string).collect(),
    };
    if names.is_empty() {
        print_stdout("Nothing to delete: the local catalog is empty.")?;
        return Ok(());
    }

    if !args.confirm {
        for name in &names {
            print_stdout(&format!("Would delete {name}"))?;
        }
        let again = if args.all {
            "meme delete --all --confirm".to_string()
        } else {
            format!("meme delete {} --confirm", names[0])
        };
        return dry_run_hint(&again);
    }

    let client = ctx.remote()?;
    let (deleted, missing, failed) = destroy_all(&client, &names).await?;
    print_stdout("")?;
    print_stdout(&heading(&format!(
        "Summary: {deleted} deleted, {missing} not found, {failed} failed"
    )))?;
    finish_batch(failed, names.len())
}

/// Destroy each name independently; returns (deleted, missing, failed)
async fn destroy_all(
    store: &(impl RemoteStore + ?Sized),
    names: &[String],
) -> Result<(usize, usize, usize)> {
    let (mut deleted, mut missing, mut failed) = (0, 0, 0);
    for name in names {
        match store.destroy(name).await {
            Ok(()) => {
                deleted += 1;
                print_stdout(&ok(&format!("Deleted {name}")))?;
            }
            Err(CatalogError::NotFound { .. }) => {
                missing += 1;
                print_stdout(&warn(&format!("Not found in the cloud: {name}")))?;
            }
            Err(err) => {
                failed += 1;
                log::debug!("destroy {name}: {err:?}");
                print_stdout(&fail(&format!("Failed {name}: {}", err.reason())))?;
            }
        }
    }
    if missing > 0 {
        print_stdout(&dim("Missing assets are not counted as failures."))?;
    }
    Ok((deleted, missing, failed))
}
