//! Diagnostics sink for the scan pipeline.
//!
//! The validator and the registry report what they see through a [`ScanLog`]
//! handed to them instead of calling a global logger, so tests can observe
//! the audit trail directly.

use crate::error::ValidationError;
use std::io;
use std::path::Path;

pub trait ScanLog: Send + Sync {
    /// A directory entry under the root was not a folder (plain file or symlink).
    fn bundle_skipped(&self, path: &Path);

    /// A directory entry under the root could not be stat'ed and was skipped.
    fn bundle_unreadable(&self, path: &Path, error: &io::Error);

    /// A folder has no `manifest.json` and is not an addon.
    fn manifest_missing(&self, bundle: &str);

    /// `manifest.json` exists but could not be read; the bundle is reported
    /// as `InvalidJSON`.
    fn manifest_unreadable(&self, bundle: &str, error: &io::Error);

    /// A check failed; the bundle will show up as a failed entry.
    fn validation_failed(&self, bundle: &str, error: ValidationError);

    fn addon_loaded(&self, bundle: &str, name: &str);
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ScanLog for TracingLog {
    fn bundle_skipped(&self, path: &Path) {
        tracing::debug!("Skipping non-directory entry in addons root: {:?}", path);
    }

    fn bundle_unreadable(&self, path: &Path, error: &io::Error) {
        tracing::debug!("Failed to stat {:?}: {}", path, error);
    }

    fn manifest_unreadable(&self, bundle: &str, error: &io::Error) {
        tracing::warn!(bundle, error = %error, "Failed to read manifest.json");
    }

    fn manifest_missing(&self, bundle: &str) {
        tracing::info!(bundle, "No manifest.json found, not an addon");
    }

    fn validation_failed(&self, bundle: &str, error: ValidationError) {
        tracing::warn!(bundle, error = %error, "Addon manifest rejected");
    }

    fn addon_loaded(&self, bundle: &str, name: &str) {
        tracing::info!(bundle, name, "Loaded addon");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl ScanLog for NullLog {
    fn bundle_skipped(&self, _path: &Path) {}
    fn bundle_unreadable(&self, _path: &Path, _error: &io::Error) {}
    fn manifest_unreadable(&self, _bundle: &str, _error: &io::Error) {}
    fn manifest_missing(&self, _bundle: &str) {}
    fn validation_failed(&self, _bundle: &str, _error: ValidationError) {}
    fn addon_loaded(&self, _bundle: &str, _name: &str) {}
}
