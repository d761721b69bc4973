use super::{finish_batch, AppContext};
use crate::ui::{dim, dry_run_hint, fail, heading, ok, print_stdout, warn};
use anyhow::Result;
use clap::Args;
use meme_catalog::{CatalogError, LocalCatalog, RemoteSnapshot, StoreKind, TagSet};
use meme_reconcile::{
    execute, plan, Execution, ExecutionReport, PlanPreview, ReconciliationPlan, RemoteApplier,
};

#[derive(Args)]
pub(crate) struct MetaArgs {
    /// Meme to inspect or edit locally
    name: Option<String>,

    /// Push local tags and language to the cloud
    #[arg(long, conflicts_with_all = ["name", "add", "language"])]
    push: bool,

    /// Comma-separated tags to add to the local entry
    #[arg(long, requires = "name")]
    add: Option<String>,

    /// Set the display language of the local entry
    #[arg(long, requires = "name")]
    language: Option<String>,

    /// Apply changes instead of previewing them
    #[arg(long)]
    confirm: bool,
}

pub(crate) async fn run(args: MetaArgs, ctx: &AppContext) -> Result<()> {
    if args.push {
        return push(args.confirm, ctx).await;
    }
    let Some(name) = args.name.as_deref() else {
        anyhow::bail!("Specify a meme name or --push");
    };
    if args.add.is_none() && args.language.is_none() {
        return show(name, ctx);
    }
    edit(name, args.add.as_deref(), args.language.as_deref(), args.confirm, ctx)
}

fn show(name: &str, ctx: &AppContext) -> Result<()> {
    let catalog = ctx.load_catalog();
    let entry = catalog
        .get(name)
        .ok_or_else(|| CatalogError::not_found(name, StoreKind::Local))?;

    print_stdout(&heading(entry.title_or_name()))?;
    let tags = if entry.tags().is_empty() {
        "(none)".to_string()
    } else {
        entry.tags().to_string()
    };
    print_stdout(&format!("  tags:     {tags}"))?;
    print_stdout(&format!("  language: {}", entry.language_or_default()))?;
    Ok(())
}

fn edit(
    name: &str,
    add: Option<&str>,
    language: Option<&str>,
    confirm: bool,
    ctx: &AppContext,
) -> Result<()> {
    let tags = add.map(TagSet::parse_list).unwrap_or_default();
    if add.is_some() && tags.is_empty() {
        anyhow::bail!("--add needs at least one non-empty tag");
    }
    let language = language.map(str::trim);
    if language == Some("") {
        anyhow::bail!("--language must not be empty");
    }

    let mut catalog = ctx.load_catalog_for_write()?;
    let entry = catalog
        .get(name)
        .ok_or_else(|| CatalogError::not_found(name, StoreKind::Local))?;
    let new_tags = tags.difference(entry.tags());
    let mut resulting = entry.tags().clone();
    resulting.extend_from(&tags);
    let current_language = entry.language_or_default().to_string();
    let language_change = language.filter(|lang| entry.language.as_deref() != Some(*lang));

    if new_tags.is_empty() && language_change.is_none() {
        print_stdout(&format!("{name} is already up to date"))?;
        return Ok(());
    }

    if !confirm {
        if !new_tags.is_empty() {
            print_stdout(&format!("Would add to {name}: {new_tags}"))?;
            print_stdout(&format!("Resulting tags: {resulting}"))?;
        }
        if let Some(lang) = language_change {
            print_stdout(&format!(
                "Would set language of {name}: {current_language} -> {lang}"
            ))?;
        }
        let mut again = format!("meme meta {name}");
        if let Some(raw) = add {
            again.push_str(&format!(" --add \"{raw}\""));
        }
        if let Some(lang) = language {
            again.push_str(&format!(" --language {lang}"));
        }
        again.push_str(" --confirm");
        return dry_run_hint(&again);
    }

    if !new_tags.is_empty() {
        let added = catalog.add_tags(name, &tags)?;
        print_stdout(&ok(&format!("Added to {name}: {added}")))?;
        print_stdout(&format!("Tags now: {resulting}"))?;
    }
    if let Some(lang) = language_change {
        catalog.set_language(name, lang)?;
        print_stdout(&ok(&format!("Language of {name}: {lang}")))?;
    }
    catalog.persist()?;
    print_stdout(&dim(&format!(
        "Run `meme meta --push --confirm` to sync {} with the cloud",
        catalog.path().display()
    )))?;
    Ok(())
}

async fn push(confirm: bool, ctx: &AppContext) -> Result<()> {
    let catalog = ctx.load_catalog();
    if catalog.is_empty() {
        log::warn!(
            "Local catalog {} is empty; nothing will be reconciled",
            catalog.path().display()
        );
    }

    let client = ctx.remote()?;
    let snapshot = RemoteSnapshot::fetch(&client).await?;
    let plan = plan(&catalog, &snapshot);
    let applier = RemoteApplier::new(&client);

    match execute(&plan, confirm, &applier).await {
        Execution::DryRun(preview) => {
            print_preview(&preview)?;
            print_drift(&plan, &catalog)?;
            if preview.updated > 0 {
                dry_run_hint("meme meta --push --confirm")?;
            }
            Ok(())
        }
        Execution::Applied(report) => {
            print_report(&plan, &report)?;
            print_drift(&plan, &catalog)?;
            finish_batch(report.failed_count(), plan.updated)
        }
    }
}

fn print_preview(preview: &PlanPreview) -> Result<()> {
    for item in &preview.items {
        if item.in_sync {
            print_stdout(&dim(&format!("Skipped {}: already in sync", item.name)))?;
            continue;
        }
        print_stdout(&format!("Would update {}:", item.name))?;
        for change in &item.changes {
            print_stdout(&format!("  - {change}"))?;
        }
    }
    print_stdout("")?;
    print_stdout(&heading(&format!(
        "Summary: {} to update, {} skipped",
        preview.updated, preview.skipped
    )))
}

fn print_report(plan: &ReconciliationPlan, report: &ExecutionReport) -> Result<()> {
    for change in &plan.entries {
        if change.in_sync() {
            print_stdout(&dim(&format!("Skipped {}: already in sync", change.name)))?;
        } else if let Some(failure) = report.failures.iter().find(|f| f.name == change.name) {
            print_stdout(&fail(&format!("Failed {}: {}", failure.name, failure.reason)))?;
        } else {
            print_stdout(&ok(&format!("Updated {}:", change.name)))?;
            for line in change.describe() {
                print_stdout(&format!("  - {line}"))?;
            }
        }
    }
    print_stdout("")?;
    print_stdout(&heading(&format!(
        "Summary: {} updated, {} skipped, {} failed",
        report.applied_count(),
        report.skipped,
        report.failed_count()
    )))
}

fn print_drift(plan: &ReconciliationPlan, catalog: &LocalCatalog) -> Result<()> {
    for rejected in &plan.rejected {
        print_stdout(&warn(&format!(
            "Not pushed {}: {}",
            rejected.name, rejected.reason
        )))?;
    }
    if !plan.has_drift() {
        return Ok(());
    }
    if !plan.local_only.is_empty() {
        print_stdout(&warn(&format!(
            "{} local entries are not in the cloud (run `meme upload`): {}",
            plan.local_only.len(),
            plan.local_only.join(", ")
        )))?;
    }
    if !plan.remote_only.is_empty() {
        print_stdout(&warn(&format!(
            "{} cloud assets have no entry in {}: {}",
            plan.remote_only.len(),
            catalog.path().display(),
            plan.remote_only.join(", ")
        )))?;
    }
    Ok(())
}
