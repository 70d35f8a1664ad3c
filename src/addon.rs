use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// `minAppVersion` used when a manifest does not declare one.
pub const DEFAULT_MIN_APP_VERSION: &str = "7.0.0";

/// Host UI surfaces an addon can mount into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    #[serde(rename = "PLACE_HOME_WIDGET")]
    HomeWidget,
    #[serde(rename = "PLACE_HOME_PAGE")]
    HomePage,
    #[serde(rename = "PLACE_SETTINGS_PAGE")]
    SettingsPage,
    #[serde(rename = "PLACE_ADDONS_VIEW")]
    AddonsView,
    #[serde(rename = "PLACE_HIDDEN_VIEW")]
    HiddenView,
}

/// Capabilities an addon may ask the user for.
///
/// Declaring a permission records intent only; nothing in this crate enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionName {
    #[serde(rename = "PERM_USER_INFORMATION")]
    UserInformation,
    #[serde(rename = "PERM_GRADES_READ")]
    GradesRead,
    #[serde(rename = "PERM_HOMEWORK_READ")]
    HomeworkRead,
    #[serde(rename = "PERM_TIMETABLE_READ")]
    TimetableRead,
    #[serde(rename = "PERM_ATTENDANCE_READ")]
    AttendanceRead,
    #[serde(rename = "PERM_EVALUATIONS_READ")]
    EvaluationsRead,
    #[serde(rename = "PERM_NEWS_READ")]
    NewsRead,
    #[serde(rename = "PERM_CHATS_READ")]
    ChatsRead,
}

/// One mount point declared by an addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonPlacement {
    pub placement: PlacementKind,
    pub name: String,
    /// Absolute path of the entry file inside the addon folder
    pub main: PathBuf,
    pub icon: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonPermission {
    pub name: PermissionName,
    /// Justification shown to the user before granting
    pub reason: String,
}

/// An outbound network endpoint the addon intends to contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonDomain {
    pub domain: String,
    pub reason: String,
}

/// A fully validated addon with every resource path resolved.
///
/// Instances only come out of the resolver, so `placements` is never empty
/// and every path lives under the addon's own folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonManifest {
    pub name: String,
    pub author: String,
    pub version: String,
    pub min_app_version: String,
    pub development: bool,
    pub license: Option<String>,
    pub description: Option<String>,
    pub icon: Option<PathBuf>,
    pub screenshots: Vec<PathBuf>,
    pub placements: Vec<AddonPlacement>,
    pub permissions: Vec<AddonPermission>,
    pub domains: Vec<AddonDomain>,
}

impl AddonManifest {
    pub fn has_placement(&self, kind: PlacementKind) -> bool {
        self.placements.iter().any(|p| p.placement == kind)
    }

    /// Indices of every placement of the given kind, in declaration order
    pub fn placements_of(&self, kind: PlacementKind) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.placement == kind)
            .map(|(i, _)| i)
            .collect()
    }
}

/// A bundle that had a manifest but failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAddon {
    /// Folder name of the bundle
    pub name: String,
    pub error: ValidationError,
}

/// Outcome of scanning one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    Loaded(AddonManifest),
    Failed(FailedAddon),
}

impl ScanEntry {
    /// Sort key of the entry; never empty.
    pub fn name(&self) -> &str {
        match self {
            ScanEntry::Loaded(manifest) => &manifest.name,
            ScanEntry::Failed(failed) => &failed.name,
        }
    }

    pub fn error(&self) -> Option<ValidationError> {
        match self {
            ScanEntry::Loaded(_) => None,
            ScanEntry::Failed(failed) => Some(failed.error),
        }
    }

    pub fn manifest(&self) -> Option<&AddonManifest> {
        match self {
            ScanEntry::Loaded(manifest) => Some(manifest),
            ScanEntry::Failed(_) => None,
        }
    }

    pub fn into_manifest(self) -> Option<AddonManifest> {
        match self {
            ScanEntry::Loaded(manifest) => Some(manifest),
            ScanEntry::Failed(_) => None,
        }
    }

    /// Flattens the entry into the single record shape handed to UI hosts.
    /// Failed bundles get empty defaults for everything but `name` and `error`.
    pub fn to_record(&self) -> AddonRecord {
        match self {
            ScanEntry::Loaded(m) => AddonRecord {
                name: m.name.clone(),
                author: m.author.clone(),
                version: m.version.clone(),
                min_app_version: m.min_app_version.clone(),
                development: m.development,
                license: m.license.clone(),
                description: m.description.clone(),
                icon: m.icon.clone(),
                screenshots: m.screenshots.clone(),
                placements: m.placements.clone(),
                permissions: m.permissions.clone(),
                domains: m.domains.clone(),
                error: None,
            },
            ScanEntry::Failed(f) => AddonRecord {
                name: f.name.clone(),
                author: String::new(),
                version: String::new(),
                min_app_version: DEFAULT_MIN_APP_VERSION.to_string(),
                development: false,
                license: None,
                description: None,
                icon: None,
                screenshots: Vec::new(),
                placements: Vec::new(),
                permissions: Vec::new(),
                domains: Vec::new(),
                error: Some(f.error),
            },
        }
    }
}

/// Flat view of a [`ScanEntry`] as serialized for native hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonRecord {
    pub name: String,
    pub author: String,
    pub version: String,
    pub min_app_version: String,
    pub development: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
    pub screenshots: Vec<PathBuf>,
    pub placements: Vec<AddonPlacement>,
    pub permissions: Vec<AddonPermission>,
    pub domains: Vec<AddonDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationError>,
}

/// Addresses a single placement inside a loaded addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonPlacementManifest {
    manifest: Arc<AddonManifest>,
    index: usize,
}

impl AddonPlacementManifest {
    /// Returns `None` when `index` is out of range, so every value that
    /// exists points at a real placement.
    pub fn new(manifest: Arc<AddonManifest>, index: usize) -> Option<Self> {
        if index < manifest.placements.len() {
            Some(Self { manifest, index })
        } else {
            None
        }
    }

    pub fn manifest(&self) -> &AddonManifest {
        &self.manifest
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn placement(&self) -> &AddonPlacement {
        &self.manifest.placements[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(kind: PlacementKind) -> AddonPlacement {
        AddonPlacement {
            placement: kind,
            name: "p".to_string(),
            main: PathBuf::from("/addons/a/index.html"),
            icon: None,
        }
    }

    fn manifest(kinds: &[PlacementKind]) -> AddonManifest {
        AddonManifest {
            name: "A".to_string(),
            author: "me".to_string(),
            version: "1.0".to_string(),
            min_app_version: DEFAULT_MIN_APP_VERSION.to_string(),
            development: false,
            license: None,
            description: None,
            icon: None,
            screenshots: Vec::new(),
            placements: kinds.iter().copied().map(placement).collect(),
            permissions: Vec::new(),
            domains: Vec::new(),
        }
    }

    #[test]
    fn placements_of_keeps_declaration_order() {
        let m = manifest(&[
            PlacementKind::SettingsPage,
            PlacementKind::HomeWidget,
            PlacementKind::SettingsPage,
        ]);
        assert_eq!(m.placements_of(PlacementKind::SettingsPage), vec![0, 2]);
        assert!(m.has_placement(PlacementKind::HomeWidget));
        assert!(!m.has_placement(PlacementKind::HiddenView));
    }

    #[test]
    fn failed_record_uses_defaults() {
        let entry = ScanEntry::Failed(FailedAddon {
            name: "bar".to_string(),
            error: ValidationError::EmptyPlacement,
        });
        let record = entry.to_record();
        assert_eq!(record.name, "bar");
        assert_eq!(record.error, Some(ValidationError::EmptyPlacement));
        assert!(record.author.is_empty());
        assert!(record.placements.is_empty());
        assert_eq!(record.min_app_version, DEFAULT_MIN_APP_VERSION);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["error"], "EmptyPlacement");
        assert_eq!(json["minAppVersion"], "7.0.0");
    }

    #[test]
    fn placement_manifest_rejects_out_of_range_index() {
        let m = Arc::new(manifest(&[PlacementKind::SettingsPage]));
        assert!(AddonPlacementManifest::new(Arc::clone(&m), 1).is_none());
        let entry = AddonPlacementManifest::new(m, 0).unwrap();
        assert_eq!(entry.placement().placement, PlacementKind::SettingsPage);
    }
}
