//! FFI (Foreign Function Interface) bindings for the mobile host.
//!
//! The host app (Swift on iOS, Kotlin via JNI on Android) calls into the
//! registry through these C-compatible functions. Results cross the boundary
//! as null-terminated UTF-8 JSON.
//!
//! # Memory Management
//!
//! - Rust allocates every returned string and list
//! - The calling code MUST call the matching `_free` function to prevent leaks
//! - A null `root` argument means "use the configured default addons root"
//!
//! # Usage from Swift (iOS)
//!
//! ```swift
//! let json = addondepot_home_widgets(root)
//! defer { addondepot_free_string(json) }
//! let widgets = try JSONDecoder().decode([AddonManifest].self, from: Data(String(cString: json!).utf8))
//! ```

use crate::addon::AddonRecord;
use crate::config::AddonsConfig;
use crate::registry::{home_widgets_of, settings_widgets_of, AddonStore};
use crate::ScanEntry;
use anyhow::{Context, Result};
use serde::Serialize;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::ptr;

// ============================================================================
// C-Compatible Types
// ============================================================================

/// Opaque handle to the records of one scan
pub struct CAddonList {
    records: Vec<AddonRecord>,
}

// ============================================================================
// Registry Scanning
// ============================================================================

/// Scan the addons root and return the whole registry as a JSON array of
/// records. Failed bundles carry an `error` tag.
/// Returns null if the root cannot be created or listed.
/// Caller MUST call addondepot_free_string() when done.
#[no_mangle]
pub extern "C" fn addondepot_scan(root: *const c_char) -> *mut c_char {
    scan_to_json(root, |entries| {
        entries.iter().map(ScanEntry::to_record).collect::<Vec<_>>()
    })
}

/// Return the addons that declare a home widget as a JSON array.
/// Caller MUST call addondepot_free_string() when done.
#[no_mangle]
pub extern "C" fn addondepot_home_widgets(root: *const c_char) -> *mut c_char {
    scan_to_json(root, home_widgets_of)
}

/// Return every declared settings page as a JSON array of
/// `{ "manifest": ..., "index": n }` objects.
/// Caller MUST call addondepot_free_string() when done.
#[no_mangle]
pub extern "C" fn addondepot_settings_widgets(root: *const c_char) -> *mut c_char {
    scan_to_json(root, settings_widgets_of)
}

/// Scan the addons root and return an opaque list handle.
/// Caller MUST call addondepot_free_addon_list() when done.
#[no_mangle]
pub extern "C" fn addondepot_scan_list(root: *const c_char) -> *mut CAddonList {
    match run_scan(root) {
        Ok(entries) => {
            let records = entries.iter().map(ScanEntry::to_record).collect();
            Box::into_raw(Box::new(CAddonList { records }))
        }
        Err(e) => {
            tracing::error!("Error scanning addons: {:#}", e);
            ptr::null_mut()
        }
    }
}

/// Get the number of records in a list.
#[no_mangle]
pub extern "C" fn addondepot_addon_list_count(list: *const CAddonList) -> c_int {
    if list.is_null() {
        return 0;
    }
    unsafe { (*list).records.len() as c_int }
}

/// Get the record at `index` as a JSON object, or null when out of range.
/// Caller MUST call addondepot_free_string() when done.
#[no_mangle]
pub extern "C" fn addondepot_addon_list_get(list: *const CAddonList, index: c_int) -> *mut c_char {
    if list.is_null() || index < 0 {
        return ptr::null_mut();
    }

    let records = unsafe { &(*list).records };
    match records.get(index as usize) {
        Some(record) => to_json_c_char(record),
        None => ptr::null_mut(),
    }
}

/// Free a list returned by addondepot_scan_list().
#[no_mangle]
pub extern "C" fn addondepot_free_addon_list(list: *mut CAddonList) {
    if !list.is_null() {
        unsafe {
            let _ = Box::from_raw(list);
        }
    }
}

// ============================================================================
// String Management
// ============================================================================

/// Free a string returned by FFI functions.
#[no_mangle]
pub extern "C" fn addondepot_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn scan_to_json<T, F>(root: *const c_char, project: F) -> *mut c_char
where
    T: Serialize,
    F: FnOnce(Vec<ScanEntry>) -> T,
{
    match run_scan(root) {
        Ok(entries) => to_json_c_char(&project(entries)),
        Err(e) => {
            tracing::error!("Error scanning addons: {:#}", e);
            ptr::null_mut()
        }
    }
}

/// Blocks the calling (host) thread on a single scan.
fn run_scan(root: *const c_char) -> Result<Vec<ScanEntry>> {
    let explicit = if root.is_null() {
        None
    } else {
        let root = unsafe { CStr::from_ptr(root) }
            .to_str()
            .context("Addons root is not valid UTF-8")?;
        Some(root)
    };

    let config = AddonsConfig::resolve(explicit.map(Path::new))?;
    let store = AddonStore::new(config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start scan runtime")?;
    runtime.block_on(store.scan_all())
}

fn to_json_c_char<T: Serialize + ?Sized>(value: &T) -> *mut c_char {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize addon registry: {}", e);
            return ptr::null_mut();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}
