//! Per-bundle failure tags.
//!
//! A bundle that cannot be loaded never aborts a scan. Instead the first
//! failing check is recorded as one of these variants on a [`FailedAddon`]
//! entry. Both `Display` and the serde representation produce the bare tag
//! (`"MissingVersion"`, `"InvalidJSON"`, ...) so the host UI can match on it.
//!
//! [`FailedAddon`]: crate::addon::FailedAddon

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum ValidationError {
    #[error("InvalidJSON")]
    #[serde(rename = "InvalidJSON")]
    InvalidJson,

    #[error("MissingName")]
    MissingName,

    #[error("MissingAuthor")]
    MissingAuthor,

    #[error("MissingVersion")]
    MissingVersion,

    #[error("MissingPlacement")]
    MissingPlacement,

    #[error("EmptyPlacement")]
    EmptyPlacement,

    #[error("InvalidPlacement")]
    InvalidPlacement,

    #[error("MissingPermissions")]
    MissingPermissions,

    #[error("MissingDomains")]
    MissingDomains,

    #[error("InvalidIcon")]
    InvalidIcon,

    #[error("IconNotFound")]
    IconNotFound,

    #[error("InvalidScreenshot")]
    InvalidScreenshot,

    #[error("ScreenshotNotFound")]
    ScreenshotNotFound,

    #[error("InvalidDevelopment")]
    InvalidDevelopment,

    #[error("InvalidMinAppVersion")]
    InvalidMinAppVersion,

    #[error("InvalidLicense")]
    InvalidLicense,

    #[error("InvalidDescription")]
    InvalidDescription,

    #[error("InvalidPermissions")]
    InvalidPermissions,

    #[error("InvalidDomains")]
    InvalidDomains,
}
