use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::log_warn;
use crate::models::Role;
use crate::vision::Photograph;

const ENABLE_LOGS: bool = true;

/// Prefix recorded instead of a path when an image could not be written.
pub const UNSAVED_PREFIX: &str = "[unsaved]";

/// Audit copies of analysed photographs. Never read back by the analysis.
pub struct ImageArchive {
    dir: Option<PathBuf>,
}

impl ImageArchive {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }

    /// An archive that records filenames but writes nothing.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Saves every photograph as PNG and returns role → stored path. A failed
    /// save yields an `[unsaved] <filename>` entry rather than an error.
    pub fn save_all(
        &self,
        material_code: &str,
        photos: &[Photograph],
        captured_at: DateTime<Utc>,
    ) -> BTreeMap<Role, String> {
        photos
            .iter()
            .map(|photo| {
                let name = file_name(material_code, photo.role(), captured_at);
                let stored = match &self.dir {
                    Some(dir) => match save_png(dir, &name, photo) {
                        Ok(path) => path.display().to_string(),
                        Err(err) => {
                            log_warn!("Could not archive {} photo: {err:#}", photo.role());
                            format!("{UNSAVED_PREFIX} {name}")
                        }
                    },
                    None => format!("{UNSAVED_PREFIX} {name}"),
                };
                (photo.role(), stored)
            })
            .collect()
    }
}

/// `{code}_{role}_{YYYYmmdd_HHMMSS_ffffff}.png`, with path separators in the
/// code replaced so the name stays inside the archive directory.
pub fn file_name(material_code: &str, role: Role, captured_at: DateTime<Utc>) -> String {
    let safe_code: String = material_code
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!(
        "{safe_code}_{role}_{}.png",
        captured_at.format("%Y%m%d_%H%M%S_%6f")
    )
}

fn save_png(dir: &Path, name: &str, photo: &Photograph) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create image directory {}", dir.display()))?;
    let path = dir.join(name);
    photo
        .pixels()
        .save_with_format(&path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
