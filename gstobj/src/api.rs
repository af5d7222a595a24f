// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! The native object system as seen by the bridge.
//!
//! [`ObjectApi`] lists every foreign operation an [`crate::Object`] performs.
//! [`GstApi`] forwards them to a dynamically loaded GStreamer, while
//! [`SimulatedApi`] implements them in process for tests and offline use.

mod gstreamer;
mod simulated;

use std::{
    ffi::{CStr, OsStr},
    os::raw::c_void,
    sync::Arc,
};

use crate::{DebugCategory, DebugLevel, Result, Value};

pub use gstreamer::GstApi;
pub use simulated::{LogEntry, SimulatedApi};

/// Shared handle to a native object API.
pub type ObjectApiHandle = Arc<dyn ObjectApi>;

/// Result of setting a property from its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetArgOutcome {
    /// The string was converted and the property set.
    Applied,
    /// The object has no property with the given name.
    MissingProperty,
    /// The property is read-only or construct-only.
    NotWritable,
    /// The string could not be converted to the property type.
    ConversionFailed,
}

/// Location and text of a native log record, already converted to C strings.
#[derive(Debug, Clone, Copy)]
pub struct NativeLogSite<'a> {
    /// Source file path.
    pub file: &'a CStr,
    /// Function or module name, possibly empty.
    pub function: &'a CStr,
    /// 1-based line number.
    pub line: u32,
}

/// Operations of the native object system used by the bridge.
///
/// Reference increments and decrements must be atomic: the bridge adds no
/// locking around them.
///
/// # Safety
///
/// Every `object` argument must be a non-null pointer to a live object owned
/// by this API's object system (refcount ≥ 1), except where a method states
/// otherwise.
pub trait ObjectApi: Send + Sync {
    /// Adds one reference.
    unsafe fn ref_object(&self, object: *mut c_void);

    /// Drops one reference, destroying the object when it was the last.
    unsafe fn unref_object(&self, object: *mut c_void);

    /// Reads the current refcount. This is a plain field load, not
    /// synchronized with concurrent updates beyond its own atomicity.
    ///
    /// Unlike other methods, this may be called on an object whose refcount
    /// already reached zero as long as its memory has not been reused.
    unsafe fn refcount(&self, object: *mut c_void) -> u32;

    /// Drops the reference held in `slot` and nulls the slot in one step.
    /// A null slot is left untouched.
    unsafe fn clear_object(&self, slot: &mut *mut c_void);

    /// Copies the object's name. `None` if the object has no name.
    unsafe fn object_name(&self, object: *mut c_void) -> Option<String>;

    /// Value of a controlled property at `timestamp` nanoseconds, or `None`
    /// if nothing controls the property at that time.
    unsafe fn controlled_value(
        &self,
        object: *mut c_void,
        property: &CStr,
        timestamp: u64,
    ) -> Option<Value>;

    /// Parses `value` into the type of property `name` and sets it.
    /// The text `NULL` clears a `GstStructure` property.
    unsafe fn set_arg_from_str(
        &self,
        object: *mut c_void,
        name: &CStr,
        value: &CStr,
    ) -> SetArgOutcome;

    /// Emits a log record tagged with `object`.
    unsafe fn log_object(
        &self,
        category: DebugCategory,
        level: DebugLevel,
        site: NativeLogSite<'_>,
        object: *mut c_void,
        message: &CStr,
    );

    /// Looks up a registered debug category by name.
    fn debug_category(&self, name: &CStr) -> Option<DebugCategory>;
}

/// Loads the GStreamer shared library and returns a handle to its object API.
///
/// The caller remains responsible for initializing GStreamer itself.
///
/// # Errors
///
/// Returns [`crate::Error::LibLoading`] if the library cannot be opened or
/// lacks one of the required symbols.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> Result<(), gstobj::Error> {
/// let api = gstobj::load_api(gstobj::config::get_gstreamer_library_path())?;
/// # Ok(())
/// # }
/// ```
pub fn load_api<P: AsRef<OsStr>>(path: P) -> Result<ObjectApiHandle> {
    Ok(Arc::new(GstApi::load(path)?))
}
