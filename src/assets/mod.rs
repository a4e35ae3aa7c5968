//! Packaged assets: bundled fonts, the stylesheet and the window icon.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

const ASSETS_DIR_ENV: &str = "DISCORD_GTK_ASSETS_DIR";
const FONTS_SUBDIR: &str = "fonts";
const STYLESHEET_FILE: &str = "style.css";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read stylesheet: {path}")]
    Stylesheet { path: PathBuf, source: io::Error },
    #[error("failed to read fonts directory: {path}")]
    FontDirectory { path: PathBuf, source: io::Error },
    #[error("failed to register font {path}: {reason}")]
    Font { path: PathBuf, reason: String },
    #[error("application fonts are not supported by this build")]
    FontsUnsupported,
    #[error("failed to load icon {path}: {reason}")]
    Icon { path: PathBuf, reason: String },
}

/// Result of a best-effort startup step.
#[derive(Debug)]
pub enum LoadOutcome<E = AssetError> {
    Loaded { count: usize },
    Skipped,
    Failed(E),
}

impl<E> LoadOutcome<E> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Loaded { count } => *count,
            Self::Skipped | Self::Failed(_) => 0,
        }
    }
}

/// Toolkit side of font loading.
pub trait FontRegistry {
    fn register_font(&self, path: &Path) -> Result<(), AssetError>;

    fn supports_fonts(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub fonts_dir: PathBuf,
    pub stylesheet: PathBuf,
    pub icon: PathBuf,
}

impl AssetPaths {
    pub fn in_dir(root: &Path) -> Self {
        Self {
            fonts_dir: root.join(FONTS_SUBDIR),
            stylesheet: root.join(STYLESHEET_FILE),
            icon: root.join(format!("{}.png", crate::APPLICATION_ID)),
        }
    }

    /// `$DISCORD_GTK_ASSETS_DIR`, or the `assets/` directory shipped with the crate.
    pub fn resolve() -> Self {
        let root = std::env::var_os(ASSETS_DIR_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"));
        Self::in_dir(&root)
    }
}

/// Registers every regular file in `dir` as an application font.
///
/// A missing directory is skipped. A file the registry rejects is logged and
/// left out of the count; it does not fail the step.
pub fn load_fonts<R: FontRegistry + ?Sized>(dir: &Path, registry: &R) -> LoadOutcome {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "no bundled fonts directory; skipping");
        return LoadOutcome::Skipped;
    }
    if !registry.supports_fonts() {
        tracing::warn!(
            dir = %dir.display(),
            "bundled fonts present but this build cannot register them"
        );
        return LoadOutcome::Failed(AssetError::FontsUnsupported);
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            let err = AssetError::FontDirectory {
                path: dir.to_path_buf(),
                source,
            };
            tracing::warn!(?err, "failed to list bundled fonts");
            return LoadOutcome::Failed(err);
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut count = 0;
    for path in &files {
        match registry.register_font(path) {
            Ok(()) => count += 1,
            Err(err) => tracing::warn!(?err, "skipping bundled font"),
        }
    }

    tracing::info!(registered = count, found = files.len(), "loaded bundled fonts");
    LoadOutcome::Loaded { count }
}

/// The stylesheet is a packaged asset, so failure to read it is fatal.
pub fn read_stylesheet(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Stylesheet {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies the window icon with `apply` if the file exists.
pub fn load_icon<F>(path: &Path, apply: F) -> LoadOutcome
where
    F: FnOnce(&Path) -> Result<(), AssetError>,
{
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "window icon missing; skipping");
        return LoadOutcome::Skipped;
    }

    match apply(path) {
        Ok(()) => LoadOutcome::Loaded { count: 1 },
        Err(err) => {
            tracing::warn!(?err, "failed to apply window icon");
            LoadOutcome::Failed(err)
        }
    }
}
