//! Where addon bundles live on disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the addons root.
pub const ADDONS_ROOT_ENV: &str = "ADDONDEPOT_ADDONS_ROOT";

/// File every addon bundle must carry at its top level.
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonsConfig {
    pub root: PathBuf,
}

impl AddonsConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Picks the addons root: explicit path first, then the
    /// `ADDONDEPOT_ADDONS_ROOT` variable, then the platform data directory.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(root) = explicit {
            return Ok(Self::new(root));
        }

        if let Some(root) = std::env::var_os(ADDONS_ROOT_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }

        Self::platform_default()
    }

    /// `<platform data dir>/addons`, e.g. `~/.local/share/addondepot/addons` on Linux.
    pub fn platform_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("app", "AddonDepot", "addondepot")
            .context("Could not determine a home directory for addon storage")?;
        Ok(Self::new(dirs.data_dir().join("addons")))
    }
}
