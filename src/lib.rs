//! AddonDepot Core Library
//!
//! On-device loader for third-party addon bundles of a school companion app.
//!
//! # Architecture
//!
//! This library is designed to be consumed by a native mobile host:
//! - **Rust callers** use [`AddonStore`] directly
//! - **iOS / Android** link the static or dynamic library and go through `ffi`
//!
//! # Pipeline
//!
//! ## Storage (`storage` module)
//! - `ensure_addons_root()` - Create the addons root if missing
//! - `list_bundles()` - List candidate bundle folders under the root
//! - `read_manifest()` - Load a bundle's `manifest.json` (absent means "not an addon")
//!
//! ## Validation (`validator` module)
//! - `validate()` - Ordered, first-failure-wins checks producing a `ValidManifest`
//!   or a `ValidationError` tag
//!
//! ## Resolution (`resolver` module)
//! - `resolve_resources()` - Turn declared relative paths into absolute paths
//!   under the bundle folder
//!
//! ## Registry (`registry` module)
//! - `AddonStore::scan_all()` - Every bundle, valid or failed, sorted by name
//! - `AddonStore::home_widgets()` - Addons declaring a home widget
//! - `AddonStore::settings_widgets()` - One `(manifest, index)` pair per settings page
//!
//! Permissions and domains declared by an addon are recorded for the consent
//! UI. Enforcing them is left to the host.

pub mod addon;
pub mod config;
pub mod error;
pub mod ffi;
pub mod log;
pub mod registry;
pub mod resolver;
pub mod storage;
pub mod validator;

pub use addon::{
    AddonDomain, AddonManifest, AddonPermission, AddonPlacement, AddonPlacementManifest,
    AddonRecord, FailedAddon, PermissionName, PlacementKind, ScanEntry,
};
pub use config::AddonsConfig;
pub use error::ValidationError;
pub use log::{ScanLog, TracingLog};
pub use registry::AddonStore;
