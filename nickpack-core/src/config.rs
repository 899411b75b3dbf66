use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fixed local paths for the three templates and the brand font.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub avatar_template: PathBuf,
    pub cover_primary_template: PathBuf,
    pub cover_secondary_template: PathBuf,
    pub font: PathBuf,
}

impl AssetConfig {
    /// Conventional layout: all four assets under one directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        AssetConfig {
            avatar_template: dir.join("avatar.png"),
            cover_primary_template: dir.join("cover_primary.png"),
            cover_secondary_template: dir.join("cover_secondary.png"),
            font: dir.join("brand.ttf"),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            avatar = %self.avatar_template.display(),
            cover_primary = %self.cover_primary_template.display(),
            cover_secondary = %self.cover_secondary_template.display(),
            font = %self.font.display(),
            "Loaded AssetConfig"
        );
        debug!(?self, "AssetConfig loaded (full debug)");
    }
}
