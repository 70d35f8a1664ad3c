//! Addon registry: scanning the addons root and classifying the results.
//!
//! A scan walks every folder under the root, validates its manifest and
//! resolves its resources. Broken bundles do not abort the scan; they come
//! back as [`ScanEntry::Failed`] named after their folder so the host can show
//! why they did not load. Only failures on the root itself (it cannot be
//! created or listed) are returned as errors.
//!
//! Nothing is cached. Every call re-reads storage, and concurrent calls on the
//! same [`AddonStore`] are serialized so they do not interleave their I/O.

use crate::addon::{
    AddonManifest, AddonPlacementManifest, FailedAddon, PlacementKind, ScanEntry,
};
use crate::config::AddonsConfig;
use crate::error::ValidationError;
use crate::log::{ScanLog, TracingLog};
use crate::resolver::resolve_resources;
use crate::storage::{ensure_addons_root, list_bundles, read_manifest, Bundle};
use crate::validator::validate;
use anyhow::Result;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub struct AddonStore {
    config: AddonsConfig,
    log: Arc<dyn ScanLog>,
    scan_lock: Mutex<()>,
}

impl AddonStore {
    /// Create a store that logs through `tracing`.
    pub fn new(config: AddonsConfig) -> Self {
        Self {
            config,
            log: Arc::new(TracingLog),
            scan_lock: Mutex::new(()),
        }
    }

    /// Replace the diagnostics sink.
    pub fn with_log(mut self, log: Arc<dyn ScanLog>) -> Self {
        self.log = log;
        self
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Scans every bundle under the root.
    ///
    /// Entries are sorted by name with [`locale_compare`], independent of the
    /// order the filesystem lists folders in.
    pub async fn scan_all(&self) -> Result<Vec<ScanEntry>> {
        let _guard = self.scan_lock.lock().await;
        let root = self.root();

        ensure_addons_root(root).await?;
        let bundles = list_bundles(root, self.log.as_ref()).await?;

        let mut entries = Vec::with_capacity(bundles.len());
        for bundle in &bundles {
            if let Some(entry) = scan_bundle(bundle, self.log.as_ref()).await {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| locale_compare(a.name(), b.name()));
        Ok(entries)
    }

    /// Loaded addons that declare at least one home widget.
    pub async fn home_widgets(&self) -> Result<Vec<AddonManifest>> {
        Ok(home_widgets_of(self.scan_all().await?))
    }

    /// One entry per declared settings page across all loaded addons.
    pub async fn settings_widgets(&self) -> Result<Vec<AddonPlacementManifest>> {
        Ok(settings_widgets_of(self.scan_all().await?))
    }
}

/// Runs reader, validator and resolver over one bundle.
///
/// Returns `None` when the folder has no manifest.
async fn scan_bundle(bundle: &Bundle, log: &dyn ScanLog) -> Option<ScanEntry> {
    let raw = match read_manifest(bundle).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log.manifest_missing(&bundle.name);
            return None;
        }
        Err(e) => {
            log.manifest_unreadable(&bundle.name, &e);
            return Some(failed(bundle, ValidationError::InvalidJson));
        }
    };

    match validate(&raw, bundle, log).await {
        Ok(valid) => {
            let manifest = resolve_resources(valid, &bundle.path);
            log.addon_loaded(&bundle.name, &manifest.name);
            Some(ScanEntry::Loaded(manifest))
        }
        Err(error) => Some(failed(bundle, error)),
    }
}

fn failed(bundle: &Bundle, error: ValidationError) -> ScanEntry {
    ScanEntry::Failed(FailedAddon {
        name: bundle.name.clone(),
        error,
    })
}

/// Filters a scan down to addons with a home widget. Failed entries never match.
pub fn home_widgets_of(entries: Vec<ScanEntry>) -> Vec<AddonManifest> {
    entries
        .into_iter()
        .filter_map(ScanEntry::into_manifest)
        .filter(|m| m.has_placement(PlacementKind::HomeWidget))
        .collect()
}

/// Expands a scan into `(manifest, index)` pairs, one per settings page, in
/// registry order then declaration order.
pub fn settings_widgets_of(entries: Vec<ScanEntry>) -> Vec<AddonPlacementManifest> {
    let mut pages = Vec::new();

    for manifest in entries.into_iter().filter_map(ScanEntry::into_manifest) {
        let indices = manifest.placements_of(PlacementKind::SettingsPage);
        if indices.is_empty() {
            continue;
        }

        let manifest = Arc::new(manifest);
        pages.extend(
            indices
                .into_iter()
                .filter_map(|index| AddonPlacementManifest::new(Arc::clone(&manifest), index)),
        );
    }

    pages
}

/// Name ordering close to a UI locale compare.
///
/// Letters compare by their base form first, so `École` sorts between `Agenda`
/// and `Fichiers`. Ties are broken by accents, then by case with the lowercase
/// spelling first.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}
