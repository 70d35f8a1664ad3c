//! Rewrites the bundle-relative paths of a validated manifest into absolute
//! paths under the bundle folder.

use crate::addon::{AddonManifest, AddonPlacement};
use crate::validator::ValidManifest;
use std::path::Path;

/// Builds the final [`AddonManifest`] for a bundle living at `bundle_path`.
///
/// Covers the top-level icon, every screenshot (order kept), and each
/// placement's `main` and `icon`. The validator has already rejected
/// absolute and `..` paths, so every join stays inside `bundle_path`.
pub fn resolve_resources(manifest: ValidManifest, bundle_path: &Path) -> AddonManifest {
    let placements = manifest
        .placements
        .into_iter()
        .map(|p| AddonPlacement {
            placement: p.placement,
            name: p.name,
            main: bundle_path.join(p.main),
            icon: p.icon.map(|icon| bundle_path.join(icon)),
        })
        .collect();

    AddonManifest {
        name: manifest.name,
        author: manifest.author,
        version: manifest.version,
        min_app_version: manifest.min_app_version,
        development: manifest.development,
        license: manifest.license,
        description: manifest.description,
        icon: manifest.icon.map(|icon| bundle_path.join(icon)),
        screenshots: manifest
            .screenshots
            .into_iter()
            .map(|shot| bundle_path.join(shot))
            .collect(),
        placements,
        permissions: manifest.permissions,
        domains: manifest.domains,
    }
}
