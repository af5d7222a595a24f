// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! The refcount-safe handle around a native base object.
//!
//! [`Object`] owns exactly one native reference from construction until it is
//! cleared or dropped. Every release path checks before it decrements, so a
//! bridge can be dropped, cleared or drained in any order without driving the
//! native refcount below zero.

use std::{ffi::CString, fmt, os::raw::c_void, time::Duration};

use crate::{
    DebugCategory, DebugLevel, Error, LogSite, ObjectApiHandle, Result, Value,
    api::{NativeLogSite, SetArgOutcome},
    value::clock_time,
};

/// How the bridge came by its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// The caller held no reference; the bridge took one at construction.
    Borrowed,
    /// A reference was transferred to the bridge at construction.
    Owned,
}

/// Handle to a native base object with explicit reference management.
///
/// Construction leaves the bridge holding one native reference, whether it
/// took it ([`Object::from_borrowed`]) or was handed it ([`Object::from_owned`]).
/// Dropping the bridge gives that reference back via [`Object::clear`].
/// References added with [`Object::acquire`] are the caller's to release.
///
/// Accessors on a cleared (null) bridge return empty results instead of
/// faulting.
///
/// # Thread Safety
///
/// `Object` is `Send` but not `Sync`. Native refcount updates are atomic, so
/// separate bridges over the same native object can be used from different
/// threads freely; a single bridge needs external synchronization.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use gstobj::{Object, ObjectApiHandle, SimulatedApi};
///
/// let space = Arc::new(SimulatedApi::new());
/// let raw = space.create_object("src");
/// let api: ObjectApiHandle = space.clone();
///
/// let object = unsafe { Object::from_borrowed(api, raw) };
/// assert_eq!(object.refcount(), 2);
///
/// object.acquire().acquire();
/// assert_eq!(object.refcount(), 4);
///
/// object.force_release_all();
/// assert_eq!(object.refcount(), 1);
/// ```
pub struct Object {
    api: ObjectApiHandle,
    handle: *mut c_void,
    mode: AcquisitionMode,
}

// Safety: the native refcount primitives are atomic, and the raw handle is
// only mutated through `&mut self`.
unsafe impl Send for Object {}

impl Object {
    /// Wraps an object the caller holds no reference to, taking one.
    ///
    /// A null `handle` produces a null bridge without touching the native side.
    ///
    /// # Safety
    ///
    /// A non-null `handle` must point at a live object of `api`'s object
    /// system for the duration of this call.
    pub unsafe fn from_borrowed(api: ObjectApiHandle, handle: *mut c_void) -> Self {
        if handle.is_null() {
            tracing::debug!("Wrapping a null borrowed handle");
        } else {
            unsafe { api.ref_object(handle) };
        }
        Self {
            api,
            handle,
            mode: AcquisitionMode::Borrowed,
        }
    }

    /// Wraps an object whose reference has been transferred to the bridge.
    ///
    /// No reference is taken.
    ///
    /// # Safety
    ///
    /// A non-null `handle` must point at a live object of `api`'s object
    /// system, and one of its references must now belong to the bridge.
    pub unsafe fn from_owned(api: ObjectApiHandle, handle: *mut c_void) -> Self {
        if handle.is_null() {
            tracing::debug!("Wrapping a null owned handle");
        }
        Self {
            api,
            handle,
            mode: AcquisitionMode::Owned,
        }
    }

    /// The raw native instance pointer. Null once cleared.
    pub fn as_ptr(&self) -> *mut c_void {
        self.handle
    }

    /// True once the bridge has been cleared or was built over null.
    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// How the construction reference was obtained.
    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// The native object API this bridge calls into.
    pub fn api(&self) -> &ObjectApiHandle {
        &self.api
    }

    fn live_handle(&self) -> Option<*mut c_void> {
        (!self.handle.is_null()).then_some(self.handle)
    }

    /// Returns the object's name, or an empty string if the bridge is null or
    /// the object is unnamed.
    ///
    /// The result is a copy; the native string is freed before returning.
    pub fn name(&self) -> String {
        self.live_handle()
            .and_then(|handle| unsafe { self.api.object_name(handle) })
            .unwrap_or_default()
    }

    /// Returns the value of the controlled property `property` at `timestamp`.
    ///
    /// `None` means nothing controls the property at that time. It is never
    /// replaced by a default.
    pub fn value(&self, property: &str, timestamp: Duration) -> Option<Value> {
        let handle = self.live_handle()?;
        let Ok(property) = CString::new(property) else {
            tracing::debug!(property, "Property name contains a NUL byte");
            return None;
        };
        unsafe {
            self.api
                .controlled_value(handle, &property, clock_time(timestamp))
        }
    }

    /// Sets property `name` from its string form.
    ///
    /// This is a best-effort convenience: if the object has no such property,
    /// or `value` does not convert to the property's type, nothing happens and
    /// nothing is reported. Use [`Object::try_set_arg`] when the outcome
    /// matters.
    pub fn set_arg(&self, name: &str, value: &str) {
        if let Err(err) = self.try_set_arg(name, value) {
            tracing::debug!(name, value, "Ignoring failed set_arg: {err}");
        }
    }

    /// Sets property `name` from its string form, reporting why it did not.
    ///
    /// # Errors
    ///
    /// - [`Error::NullHandle`] if the bridge has been cleared
    /// - [`Error::MissingProperty`] if the object has no property `name`
    /// - [`Error::PropertyNotWritable`] if the property is read-only or construct-only
    /// - [`Error::ConversionFailed`] if `value` does not parse as the property type
    /// - [`Error::NulString`] if either argument contains a NUL byte
    pub fn try_set_arg(&self, name: &str, value: &str) -> Result<()> {
        let handle = self.live_handle().ok_or(Error::NullHandle)?;
        let c_name = CString::new(name)?;
        let c_value = CString::new(value)?;
        match unsafe { self.api.set_arg_from_str(handle, &c_name, &c_value) } {
            SetArgOutcome::Applied => Ok(()),
            SetArgOutcome::MissingProperty => Err(Error::MissingProperty(name.to_string())),
            SetArgOutcome::NotWritable => Err(Error::PropertyNotWritable(name.to_string())),
            SetArgOutcome::ConversionFailed => Err(Error::ConversionFailed {
                property: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Emits `message` to `category` at `level`, tagged with this object and
    /// the caller's file and line.
    ///
    /// The function name is left empty because `#[track_caller]` does not
    /// expose it. Use [`crate::object_log!`] to record the calling module.
    /// Does nothing on a null bridge.
    #[track_caller]
    pub fn log(&self, category: DebugCategory, level: DebugLevel, message: &str) {
        self.log_at(category, level, LogSite::caller(), message);
    }

    /// Like [`Object::log`] with an explicit source location. See also
    /// [`crate::object_log!`].
    pub fn log_at(&self, category: DebugCategory, level: DebugLevel, site: LogSite, message: &str) {
        let Some(handle) = self.live_handle() else {
            return;
        };
        let file = sanitized_cstring(site.file);
        let function = sanitized_cstring(site.function);
        let message = sanitized_cstring(message);
        let site = NativeLogSite {
            file: &file,
            function: &function,
            line: site.line,
        };
        unsafe { self.api.log_object(category, level, site, handle, &message) };
    }

    /// Adds one native reference and returns `self` for chaining.
    ///
    /// Relies on the native atomic increment; takes no lock.
    pub fn acquire(&self) -> &Self {
        if let Some(handle) = self.live_handle() {
            unsafe { self.api.ref_object(handle) };
        }
        self
    }

    /// The current native refcount, or 0 for a null bridge.
    pub fn refcount(&self) -> u32 {
        self.live_handle()
            .map(|handle| unsafe { self.api.refcount(handle) })
            .unwrap_or(0)
    }

    /// Drops one native reference.
    ///
    /// Skips the decrement if the native refcount is already zero. The handle
    /// is kept; call [`Object::clear`] to stop using it.
    pub fn release(&self) {
        let Some(handle) = self.live_handle() else {
            return;
        };
        if unsafe { self.api.refcount(handle) } == 0 {
            tracing::warn!(?handle, "Skipping release of an object with refcount 0");
            return;
        }
        unsafe { self.api.unref_object(handle) };
    }

    /// Drops the bridge's reference and nulls the handle in one native call.
    ///
    /// Idempotent: a second call finds the handle null and does nothing.
    pub fn clear(&mut self) {
        if self.handle.is_null() {
            return;
        }
        if unsafe { self.api.refcount(self.handle) } == 0 {
            tracing::warn!(handle = ?self.handle, "Clearing an object with refcount 0");
            self.handle = std::ptr::null_mut();
            return;
        }
        unsafe { self.api.clear_object(&mut self.handle) };
    }

    /// Releases references until exactly one is left.
    ///
    /// Never drops the last reference, even if it is not the bridge's own:
    /// other code may still use the object through a raw handle.
    pub fn force_release_all(&self) {
        while self.refcount() > 1 {
            self.release();
        }
    }
}

/// Builds a C string, dropping interior NUL bytes instead of failing.
fn sanitized_cstring(text: &str) -> CString {
    CString::new(text)
        .or_else(|_| CString::new(text.replace('\0', "")))
        .unwrap_or_default()
}

impl Clone for Object {
    /// Creates a second bridge over the same object, taking a new reference.
    fn clone(&self) -> Self {
        // Safety: a non-null handle is live while `self` holds its reference.
        unsafe { Self::from_borrowed(self.api.clone(), self.handle) }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("handle", &self.handle)
            .field("mode", &self.mode)
            .field("refcount", &self.refcount())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{ObjectApi, SimulatedApi};

    fn space() -> (Arc<SimulatedApi>, ObjectApiHandle) {
        let space = Arc::new(SimulatedApi::new());
        let api: ObjectApiHandle = space.clone();
        (space, api)
    }

    #[test]
    fn null_bridge_is_inert() {
        let (_space, api) = space();
        let mut object = unsafe { Object::from_borrowed(api, std::ptr::null_mut()) };
        assert!(object.is_null());
        assert_eq!(object.refcount(), 0);
        assert_eq!(object.name(), "");
        assert!(object.value("volume", Duration::ZERO).is_none());
        assert!(matches!(object.try_set_arg("volume", "1"), Err(Error::NullHandle)));
        object.acquire();
        object.release();
        object.force_release_all();
        object.clear();
        assert!(object.is_null());
    }

    #[test]
    fn clear_after_external_finalize_only_nulls() {
        let (space, api) = space();
        let raw = space.create_object("a");
        let mut object = unsafe { Object::from_owned(api, raw) };
        unsafe { space.unref_object(raw) };
        object.clear();
        assert!(object.is_null());
        assert_eq!(unsafe { space.refcount(raw) }, 0);
    }

    #[test]
    fn clone_takes_its_own_reference() {
        let (space, api) = space();
        let raw = space.create_object("a");
        let object = unsafe { Object::from_owned(api, raw) };
        let copy = object.clone();
        assert_eq!(copy.mode(), AcquisitionMode::Borrowed);
        assert_eq!(object.refcount(), 2);
        drop(copy);
        assert_eq!(object.refcount(), 1);
    }

    #[tracing_test::traced_test]
    #[test]
    fn release_at_zero_is_reported_not_applied() {
        let (space, api) = space();
        let raw = space.create_object("a");
        let object = unsafe { Object::from_owned(api, raw) };
        unsafe { space.unref_object(raw) };
        object.release();
        assert_eq!(object.refcount(), 0);
        assert!(logs_contain("Skipping release of an object with refcount 0"));
    }

    #[tracing_test::traced_test]
    #[test]
    fn silent_set_arg_still_traces() {
        let (space, api) = space();
        let raw = space.create_object("a");
        let object = unsafe { Object::from_owned(api, raw) };
        object.set_arg("missing", "1");
        assert!(logs_contain("Ignoring failed set_arg"));
    }

    #[test]
    fn nul_bytes_are_stripped_from_messages() {
        assert_eq!(sanitized_cstring("a\0b").as_bytes(), b"ab");
    }

    #[test]
    fn debug_shows_refcount() {
        let (space, api) = space();
        let raw = space.create_object("a");
        let object = unsafe { Object::from_owned(api, raw) };
        let printed = format!("{object:?}");
        assert!(printed.contains("refcount: 1"));
        assert!(printed.contains("Owned"));
    }
}
