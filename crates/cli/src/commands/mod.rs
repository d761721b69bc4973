pub(crate) mod delete;
pub(crate) mod list;
pub(crate) mod meta;
pub(crate) mod search;
pub(crate) mod upload;

use crate::paths::ImageDirs;
use anyhow::{Context as AnyhowContext, Result};
use meme_catalog::LocalCatalog;
use meme_cloudinary::{CloudinaryClient, CloudinaryConfig};
use std::path::{Path, PathBuf};

/// Paths resolved from global flags, shared by every subcommand
#[derive(Debug, Clone)]
pub(crate) struct AppContext {
    metadata: PathBuf,
    images: ImageDirs,
}

impl AppContext {
    pub(crate) fn new(metadata: PathBuf, images_dir: PathBuf) -> Self {
        Self {
            metadata,
            images: ImageDirs::new(&images_dir),
        }
    }

    pub(crate) fn metadata(&self) -> &Path {
        &self.metadata
    }

    pub(crate) fn images(&self) -> &ImageDirs {
        &self.images
    }

    /// Missing or unreadable metadata degrades to an empty catalog
    pub(crate) fn load_catalog(&self) -> LocalCatalog {
        LocalCatalog::load_or_empty(&self.metadata)
    }

    /// Strict load for commands that persist: a corrupt file must not be overwritten
    pub(crate) fn load_catalog_for_write(&self) -> Result<LocalCatalog> {
        LocalCatalog::load(&self.metadata).with_context(|| {
            format!(
                "Failed to load metadata from {}",
                self.metadata.display()
            )
        })
    }

    pub(crate) fn remote(&self) -> Result<CloudinaryClient> {
        let config = CloudinaryConfig::from_env()
            .context("Cloudinary credentials are required for this command")?;
        log::debug!("Using Cloudinary config {config:?}");
        Ok(CloudinaryClient::new(config)?)
    }
}

/// Exit status for batch commands: any failed asset fails the process
pub(crate) fn finish_batch(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        anyhow::bail!("{failed} of {total} assets failed");
    }
    Ok(())
}
