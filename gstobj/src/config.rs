// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration and path resolution for the GStreamer library.
//!
//! The bridge loads GStreamer dynamically. The library is looked up by its
//! platform default soname unless [`LIBRARY_ENV_VAR`] points somewhere else.

use std::{ffi::OsString, path::PathBuf};

/// Environment variable overriding the GStreamer shared library path.
pub const LIBRARY_ENV_VAR: &str = "GSTOBJ_GSTREAMER_LIBRARY";

#[cfg(target_os = "linux")]
const DEFAULT_LIBRARY: &str = "libgstreamer-1.0.so.0";
#[cfg(target_os = "macos")]
const DEFAULT_LIBRARY: &str = "libgstreamer-1.0.0.dylib";
#[cfg(target_os = "windows")]
const DEFAULT_LIBRARY: &str = "gstreamer-1.0-0.dll";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const DEFAULT_LIBRARY: &str = "libgstreamer-1.0.so";

/// Returns the path of the GStreamer shared library to load.
///
/// The GLib and GObject symbols the bridge needs are resolved through the
/// GStreamer library's own dependencies, so this is the only library that has
/// to be located.
///
/// # Examples
///
/// ```no_run
/// use gstobj::config::get_gstreamer_library_path;
/// use gstobj::load_api;
///
/// # fn main() -> Result<(), gstobj::Error> {
/// let api = load_api(get_gstreamer_library_path())?;
/// # Ok(())
/// # }
/// ```
pub fn get_gstreamer_library_path() -> PathBuf {
    resolve_library_path(std::env::var_os(LIBRARY_ENV_VAR))
}

fn resolve_library_path(override_path: Option<OsString>) -> PathBuf {
    override_path
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_platform_default() {
        assert_eq!(resolve_library_path(None), PathBuf::from(DEFAULT_LIBRARY));
    }

    #[test]
    fn empty_override_is_ignored() {
        assert_eq!(
            resolve_library_path(Some(OsString::new())),
            PathBuf::from(DEFAULT_LIBRARY)
        );
    }

    #[test]
    fn override_wins() {
        assert_eq!(
            resolve_library_path(Some("/opt/gst/lib/libgstreamer-1.0.so.0".into())),
            PathBuf::from("/opt/gst/lib/libgstreamer-1.0.so.0")
        );
    }
}
