use super::{finish_batch, AppContext};
use crate::paths::{ImageDirs, ImageFile, ImageState};
use crate::ui::{dry_run_hint, fail, heading, ok, print_stdout};
use anyhow::Result;
use clap::Args;
use meme_catalog::{
    LocalCatalog, RemoteStore, TagSet, UploadRequest, UploadSource, DEFAULT_LANGUAGE,
};

#[derive(Args)]
pub(crate) struct UploadArgs {
    /// Meme to upload (file stem in pending/ or uploaded/)
    #[arg(required_unless_present_any = ["pending", "all"], conflicts_with_all = ["pending", "all"])]
    name: Option<String>,

    /// Upload every image in pending/
    #[arg(long, conflicts_with = "all")]
    pending: bool,

    /// Upload every image in pending/ and uploaded/
    #[arg(long)]
    all: bool,

    /// Actually upload instead of previewing
    #[arg(long)]
    confirm: bool,
}

impl UploadArgs {
    fn confirm_command(&self) -> String {
        match &self.name {
            Some(name) => format!("meme upload {name} --confirm"),
            None if self.pending => "meme upload --pending --confirm".to_string(),
            None => "meme upload --all --confirm".to_string(),
        }
    }
}

pub(crate) async fn run(args: UploadArgs, ctx: &AppContext) -> Result<()> {
    let dirs = ctx.images();
    let files = match &args.name {
        Some(name) => match dirs.find(name)? {
            Some(file) => vec![file],
            None => anyhow::bail!(
                "No image named '{name}' under {} or its uploaded/ sibling",
                dirs.pending_dir().display()
            ),
        },
        None if args.pending => dirs.pending()?,
        None => dirs.all()?,
    };
    if files.is_empty() {
        print_stdout("No images to upload.")?;
        return Ok(());
    }

    let catalog = ctx.load_catalog();
    let requests: Vec<(ImageFile, UploadRequest)> = files
        .into_iter()
        .map(|file| {
            let request = build_request(&catalog, &file);
            (file, request)
        })
        .collect();

    if !args.confirm {
        for (file, request) in &requests {
            print_stdout(&format!(
                "Would upload {} from {} (tags: {}, language: {})",
                request.name,
                file.path.display(),
                if request.tags.is_empty() {
                    "(none)".to_string()
                } else {
                    request.tags.to_string()
                },
                request.language
            ))?;
        }
        return dry_run_hint(&args.confirm_command());
    }

    let client = ctx.remote()?;
    let (uploaded, failed) = upload_all(&client, dirs, &requests).await?;
    print_stdout("")?;
    print_stdout(&heading(&format!(
        "Summary: {uploaded} uploaded, {failed} failed"
    )))?;
    finish_batch(failed, requests.len())
}

/// Upload request carrying the local tags, title and language of `file`
fn build_request(catalog: &LocalCatalog, file: &ImageFile) -> UploadRequest {
    let (tags, title, language) = match catalog.get(&file.name) {
        Some(entry) => (
            entry.tags().clone(),
            entry.title_or_name().to_string(),
            entry.language_or_default().to_string(),
        ),
        None => {
            log::warn!("{} has no local metadata; uploading without tags", file.name);
            (
                TagSet::new(),
                file.name.clone(),
                DEFAULT_LANGUAGE.to_string(),
            )
        }
    };
    UploadRequest {
        name: file.name.clone(),
        source: UploadSource::Path(file.path.clone()),
        tags,
        title,
        language,
    }
}

/// Upload each file independently; pending files move to uploaded/ on success
async fn upload_all(
    store: &(impl RemoteStore + ?Sized),
    dirs: &ImageDirs,
    requests: &[(ImageFile, UploadRequest)],
) -> Result<(usize, usize)> {
    let (mut uploaded, mut failed) = (0, 0);
    for (file, request) in requests {
        match store.upload(request).await {
            Ok(asset) => {
                uploaded += 1;
                print_stdout(&ok(&format!("Uploaded {}: {}", asset.name, asset.url)))?;
                if file.state == ImageState::Pending {
                    let moved = dirs.mark_uploaded(file)?;
                    log::debug!("Moved {} to {}", file.path.display(), moved.display());
                }
            }
            Err(err) => {
                failed += 1;
                print_stdout(&fail(&format!("Failed {}: {}", request.name, err.reason())))?;
            }
        }
    }
    Ok((uploaded, failed))
}
