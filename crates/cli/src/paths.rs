use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageState {
    Pending,
    Uploaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageFile {
    /// File stem, which is also the asset name
    pub name: String,
    pub path: PathBuf,
    pub state: ImageState,
}

/// `<root>/pending` holds images never uploaded, `<root>/uploaded` the rest
#[derive(Debug, Clone)]
pub(crate) struct ImageDirs {
    pending: PathBuf,
    uploaded: PathBuf,
}

impl ImageDirs {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            pending: root.join("pending"),
            uploaded: root.join("uploaded"),
        }
    }

    pub(crate) fn pending_dir(&self) -> &Path {
        &self.pending
    }

    pub(crate) fn pending(&self) -> Result<Vec<ImageFile>> {
        scan(&self.pending, ImageState::Pending)
    }

    /// Pending images first, then uploaded ones
    pub(crate) fn all(&self) -> Result<Vec<ImageFile>> {
        let mut files = scan(&self.pending, ImageState::Pending)?;
        files.extend(scan(&self.uploaded, ImageState::Uploaded)?);
        Ok(files)
    }

    /// Look up one asset; a pending copy wins over an uploaded one
    pub(crate) fn find(&self, name: &str) -> Result<Option<ImageFile>> {
        Ok(self.all()?.into_iter().find(|file| file.name == name))
    }

    /// Move a pending image into `uploaded/`
    pub(crate) fn mark_uploaded(&self, file: &ImageFile) -> Result<PathBuf> {
        let Some(file_name) = file.path.file_name() else {
            anyhow::bail!("Not a file path: {}", file.path.display());
        };
        fs::create_dir_all(&self.uploaded)
            .with_context(|| format!("Failed to create {}", self.uploaded.display()))?;
        let target = self.uploaded.join(file_name);
        fs::rename(&file.path, &target).with_context(|| {
            format!(
                "Failed to move {} to {}",
                file.path.display(),
                target.display()
            )
        })?;
        Ok(target)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn scan(dir: &Path, state: ImageState) -> Result<Vec<ImageFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        files.push(ImageFile {
            name: name.to_string(),
            path: path.clone(),
            state,
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scans_only_images_and_moves_pending() {
        let dir = tempdir().unwrap();
        let dirs = ImageDirs::new(dir.path());
        fs::create_dir_all(dir.path().join("pending")).unwrap();
        fs::create_dir_all(dir.path().join("uploaded")).unwrap();
        fs::write(dir.path().join("pending/b_meme.PNG"), b"x").unwrap();
        fs::write(dir.path().join("pending/a_meme.jpg"), b"x").unwrap();
        fs::write(dir.path().join("pending/notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("uploaded/old.gif"), b"x").unwrap();

        let pending = dirs.pending().unwrap();
        let names: Vec<_> = pending.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a_meme", "b_meme"]);
        assert_eq!(dirs.all().unwrap().len(), 3);

        let found = dirs.find("old").unwrap().unwrap();
        assert_eq!(found.state, ImageState::Uploaded);

        let moved = dirs.mark_uploaded(&pending[0]).unwrap();
        assert!(moved.ends_with("uploaded/a_meme.jpg"));
        assert!(!pending[0].path.exists());
        assert_eq!(dirs.pending().unwrap().len(), 1);
    }

    #[test]
    fn missing_dirs_are_empty() {
        let dir = tempdir().unwrap();
        let dirs = ImageDirs::new(&dir.path().join("nope"));
        assert!(dirs.all().unwrap().is_empty());
        assert!(dirs.find("x").unwrap().is_none());
    }
}
