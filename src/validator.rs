//! Manifest validation.
//!
//! Checks run in a fixed order and the first failure wins: a manifest missing
//! both `author` and `version` is reported as `MissingAuthor`. Nothing is
//! resolved here; a manifest that passes comes back as a [`ValidManifest`]
//! holding the declared (bundle-relative) paths, ready for the resolver.

use crate::addon::{
    AddonDomain, AddonPermission, PermissionName, PlacementKind, DEFAULT_MIN_APP_VERSION,
};
use crate::error::ValidationError;
use crate::log::ScanLog;
use crate::storage::{resource_exists, Bundle};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Component, Path};

/// A placement as written in the manifest, before path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredPlacement {
    pub placement: PlacementKind,
    pub name: String,
    pub main: String,
    pub icon: Option<String>,
}

/// A manifest that passed every check. Paths are still bundle-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidManifest {
    pub name: String,
    pub author: String,
    pub version: String,
    pub min_app_version: String,
    pub development: bool,
    pub license: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub screenshots: Vec<String>,
    pub placements: Vec<DeclaredPlacement>,
    pub permissions: Vec<AddonPermission>,
    pub domains: Vec<AddonDomain>,
}

#[derive(Deserialize)]
struct RawPlacement {
    placement: PlacementKind,
    main: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Deserialize)]
struct RawPermission {
    name: PermissionName,
    reason: String,
}

#[derive(Deserialize)]
struct RawDomain {
    domain: String,
    reason: String,
}

/// Validates raw `manifest.json` bytes for `bundle`.
///
/// The failing check, if any, is reported to `log` before returning.
pub async fn validate(
    raw: &[u8],
    bundle: &Bundle,
    log: &dyn ScanLog,
) -> Result<ValidManifest, ValidationError> {
    let result = check_manifest(raw, &bundle.path).await;
    if let Err(error) = result {
        log.validation_failed(&bundle.name, error);
    }
    result
}

async fn check_manifest(raw: &[u8], bundle_dir: &Path) -> Result<ValidManifest, ValidationError> {
    let value: Value = serde_json::from_slice(raw).map_err(|_| ValidationError::InvalidJson)?;

    // A non-object document simply has no fields, so it fails on `name`
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let name = required_string(obj, "name", ValidationError::MissingName)?;
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    let author = required_string(obj, "author", ValidationError::MissingAuthor)?;
    let version = required_string(obj, "version", ValidationError::MissingVersion)?;

    let raw_placements = declared(obj, &["placement", "placements"])
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingPlacement)?;
    if raw_placements.is_empty() {
        return Err(ValidationError::EmptyPlacement);
    }
    let placements = raw_placements
        .iter()
        .map(parse_placement)
        .collect::<Result<Vec<_>, _>>()?;

    let raw_permissions = obj
        .get("permissions")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingPermissions)?;
    let raw_domains = obj
        .get("domains")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingDomains)?;

    let icon = match declared(obj, &["icon"]) {
        None => None,
        Some(value) => {
            let icon = value
                .as_str()
                .filter(|p| is_confined(p))
                .ok_or(ValidationError::InvalidIcon)?;
            if !resource_exists(&bundle_dir.join(icon)).await {
                return Err(ValidationError::IconNotFound);
            }
            Some(icon.to_string())
        }
    };

    let mut screenshots = Vec::new();
    if let Some(value) = declared(obj, &["screenshot", "screenshots"]) {
        let declared = value.as_array().ok_or(ValidationError::InvalidScreenshot)?;
        for shot in declared {
            let shot = shot
                .as_str()
                .filter(|p| is_confined(p))
                .ok_or(ValidationError::InvalidScreenshot)?;
            screenshots.push(shot.to_string());
        }
        for shot in &screenshots {
            if !resource_exists(&bundle_dir.join(shot)).await {
                return Err(ValidationError::ScreenshotNotFound);
            }
        }
    }

    let development = match declared(obj, &["development"]) {
        None => false,
        Some(value) => value.as_bool().ok_or(ValidationError::InvalidDevelopment)?,
    };
    let min_app_version =
        optional_string(obj, "minAppVersion", ValidationError::InvalidMinAppVersion)?
            .unwrap_or_else(|| DEFAULT_MIN_APP_VERSION.to_string());
    let license = optional_string(obj, "license", ValidationError::InvalidLicense)?;
    let description = optional_string(obj, "description", ValidationError::InvalidDescription)?;

    let permissions = raw_permissions
        .iter()
        .map(|entry| {
            from_object::<RawPermission>(entry)
                .filter(|p| !p.reason.trim().is_empty())
                .map(|p| AddonPermission {
                    name: p.name,
                    reason: p.reason,
                })
                .ok_or(ValidationError::InvalidPermissions)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let domains = raw_domains
        .iter()
        .map(|entry| {
            from_object::<RawDomain>(entry)
                .filter(|d| !d.domain.trim().is_empty() && !d.reason.trim().is_empty())
                .map(|d| AddonDomain {
                    domain: d.domain,
                    reason: d.reason,
                })
                .ok_or(ValidationError::InvalidDomains)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidManifest {
        name: name.to_string(),
        author: author.to_string(),
        version: version.to_string(),
        min_app_version,
        development,
        license,
        description,
        icon,
        screenshots,
        placements,
        permissions,
        domains,
    })
}

fn parse_placement(entry: &Value) -> Result<DeclaredPlacement, ValidationError> {
    let raw: RawPlacement = from_object(entry).ok_or(ValidationError::InvalidPlacement)?;

    if !is_confined(&raw.main) {
        return Err(ValidationError::InvalidPlacement);
    }
    if let Some(icon) = &raw.icon {
        if !is_confined(icon) {
            return Err(ValidationError::InvalidPlacement);
        }
    }

    Ok(DeclaredPlacement {
        placement: raw.placement,
        name: raw.name.unwrap_or_default(),
        main: raw.main,
        icon: raw.icon,
    })
}

/// Deserializes a manifest entry that must be a JSON object. Derived
/// `Deserialize` would also accept a positional array.
fn from_object<T: DeserializeOwned>(entry: &Value) -> Option<T> {
    if !entry.is_object() {
        return None;
    }
    serde_json::from_value(entry.clone()).ok()
}

/// First non-null value among `keys`. `null` counts as not declared.
fn declared<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    error: ValidationError,
) -> Result<&'a str, ValidationError> {
    obj.get(key).and_then(Value::as_str).ok_or(error)
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    error: ValidationError,
) -> Result<Option<String>, ValidationError> {
    match declared(obj, &[key]) {
        None => Ok(None),
        Some(value) => value.as_str().map(|s| Some(s.to_string())).ok_or(error),
    }
}

/// A declared resource path must stay inside its bundle folder: relative,
/// non-empty, and free of `..`.
fn is_confined(declared: &str) -> bool {
    let mut has_segment = false;
    for component in Path::new(declared).components() {
        match component {
            Component::Normal(_) => has_segment = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    has_segment
}
