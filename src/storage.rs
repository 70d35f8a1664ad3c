//! Addon storage on disk: creating the root, listing bundle folders, and
//! loading their manifests.
//!
//! Layout:
//!
//! ```text
//! <addons-root>/<bundle-folder>/manifest.json
//! <addons-root>/<bundle-folder>/<icon, screenshots, placement entry files>
//! ```

use crate::config::MANIFEST_FILE;
use crate::log::ScanLog;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A candidate addon folder directly under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Folder name, used as the entry name when the manifest is rejected
    pub name: String,
    pub path: PathBuf,
}

impl Bundle {
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }
}

/// Creates the addons root if it does not exist yet. Safe to call repeatedly.
pub async fn ensure_addons_root(root: &Path) -> Result<()> {
    fs::create_dir_all(root)
        .await
        .context(format!("Failed to create addons directory: {:?}", root))?;
    Ok(())
}

/// Lists the folders directly under `root`.
///
/// Plain files and symlinks are skipped and reported to `log`. The result is
/// in whatever order the filesystem returns; callers sort later.
pub async fn list_bundles(root: &Path, log: &dyn ScanLog) -> Result<Vec<Bundle>> {
    let mut bundles = Vec::new();

    let mut entries = fs::read_dir(root)
        .await
        .context(format!("Failed to read addons directory: {:?}", root))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .context(format!("Failed to list addons directory: {:?}", root))?
    {
        let path = entry.path();

        let meta = match fs::symlink_metadata(&path).await {
            Ok(meta) => meta,
            Err(e) => {
                log.bundle_unreadable(&path, &e);
                continue;
            }
        };

        // Symlinked folders could point into another bundle
        if !meta.is_dir() {
            log.bundle_skipped(&path);
            continue;
        }

        // Non-UTF-8 folder names are kept; only the display name is lossy
        let name = entry.file_name().to_string_lossy().into_owned();
        bundles.push(Bundle { name, path });
    }

    Ok(bundles)
}

/// Loads the raw `manifest.json` bytes of a bundle.
///
/// `Ok(None)` means the folder has no manifest and is not an addon.
pub async fn read_manifest(bundle: &Bundle) -> std::io::Result<Option<Vec<u8>>> {
    match fs::read(bundle.manifest_path()).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// True when `path` exists and is a regular file.
pub async fn resource_exists(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) => meta.is_file(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NullLog;
    use std::fs as stdfs;

    #[tokio::test]
    async fn ensure_root_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("addons");

        ensure_addons_root(&root).await.unwrap();
        ensure_addons_root(&root).await.unwrap();

        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn ensure_root_fails_when_blocked_by_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("addons");
        stdfs::write(&root, "not a directory").unwrap();

        assert!(ensure_addons_root(&root).await.is_err());
    }

    #[tokio::test]
    async fn list_skips_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir(dir.path().join("foo")).unwrap();
        stdfs::create_dir(dir.path().join("bar")).unwrap();
        stdfs::write(dir.path().join("README.txt"), "stray").unwrap();

        let mut names: Vec<String> = list_bundles(dir.path(), &NullLog)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["bar", "foo"]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn list_keeps_non_utf8_folders() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let raw = OsStr::from_bytes(b"caf\xe9");
        stdfs::create_dir(dir.path().join(raw)).unwrap();

        let bundles = list_bundles(dir.path(), &NullLog).await.unwrap();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].name, "caf\u{FFFD}");
        assert_eq!(bundles[0].path, dir.path().join(raw));
    }

    #[tokio::test]
    async fn list_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(list_bundles(&missing, &NullLog).await.is_err());
    }

    #[tokio::test]
    async fn read_manifest_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = Bundle {
            name: "empty".to_string(),
            path: dir.path().to_path_buf(),
        };
        assert_eq!(read_manifest(&bundle).await.unwrap(), None);

        stdfs::write(dir.path().join(MANIFEST_FILE), "{}").unwrap();
        assert_eq!(read_manifest(&bundle).await.unwrap(), Some(b"{}".to_vec()));
    }

    #[tokio::test]
    async fn resource_exists_requires_a_file() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir(dir.path().join("folder")).unwrap();
        stdfs::write(dir.path().join("icon.png"), [0u8; 4]).unwrap();

        assert!(resource_exists(&dir.path().join("icon.png")).await);
        assert!(!resource_exists(&dir.path().join("folder")).await);
        assert!(!resource_exists(&dir.path().join("missing.png")).await);
    }
}
