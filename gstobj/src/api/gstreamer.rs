// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! [`ObjectApi`] backed by a dynamically loaded GStreamer.

use std::{
    ffi::{CStr, OsStr},
    os::raw::{c_int, c_void},
    sync::atomic::{AtomicU32, Ordering},
};

use gstobj_sys::{GObject, GObjectClass, GType, GValue, GstObjectLib};

use super::{NativeLogSite, ObjectApi, SetArgOutcome};
use crate::{DebugCategory, DebugLevel, Result, Value};

/// How a textual argument becomes a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgConversion {
    /// `"NULL"` for a `GstStructure` property clears it.
    NullStructure,
    /// Parsed against the property's `GParamSpec`.
    Deserialize,
}

fn arg_conversion(value_type: GType, structure_type: GType, value: &CStr) -> ArgConversion {
    if value_type == structure_type && value == c"NULL" {
        ArgConversion::NullStructure
    } else {
        ArgConversion::Deserialize
    }
}

/// The GStreamer implementation of [`ObjectApi`].
///
/// Holds the loaded library for as long as any bridge references it.
pub struct GstApi {
    lib: GstObjectLib,
}

impl GstApi {
    /// Opens the library at `path` and resolves the symbols the bridge uses.
    pub fn load<P: AsRef<OsStr>>(path: P) -> Result<Self> {
        let lib = unsafe { GstObjectLib::new(path) }?;
        Ok(Self { lib })
    }

    /// Copies a native string allocated by GLib and frees it.
    unsafe fn take_string(&self, ptr: *mut std::os::raw::c_char) -> Option<String> {
        if ptr.is_null() {
            return None;
        }
        let value = unsafe { CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned();
        unsafe { (self.lib.g_free)(ptr.cast()) };
        Some(value)
    }

    unsafe fn copy_value(&self, value: *const GValue) -> Value {
        let lib = &self.lib;
        let g_type = unsafe { (*value).g_type };
        unsafe {
            match (lib.g_type_fundamental)(g_type) {
                gstobj_sys::G_TYPE_BOOLEAN => Value::Bool((lib.g_value_get_boolean)(value) != 0),
                gstobj_sys::G_TYPE_INT => Value::Int((lib.g_value_get_int)(value).into()),
                gstobj_sys::G_TYPE_UINT => Value::UInt((lib.g_value_get_uint)(value).into()),
                gstobj_sys::G_TYPE_LONG => Value::Int((lib.g_value_get_long)(value).into()),
                gstobj_sys::G_TYPE_ULONG => Value::UInt((lib.g_value_get_ulong)(value).into()),
                gstobj_sys::G_TYPE_INT64 => Value::Int((lib.g_value_get_int64)(value)),
                gstobj_sys::G_TYPE_UINT64 => Value::UInt((lib.g_value_get_uint64)(value)),
                gstobj_sys::G_TYPE_FLOAT => Value::Float((lib.g_value_get_float)(value).into()),
                gstobj_sys::G_TYPE_DOUBLE => Value::Float((lib.g_value_get_double)(value)),
                gstobj_sys::G_TYPE_STRING => {
                    let ptr = (lib.g_value_get_string)(value);
                    if ptr.is_null() {
                        Value::String(String::new())
                    } else {
                        Value::String(CStr::from_ptr(ptr).to_string_lossy().into_owned())
                    }
                }
                _ => {
                    let name = (lib.g_type_name)(g_type);
                    let type_name = if name.is_null() {
                        String::new()
                    } else {
                        CStr::from_ptr(name).to_string_lossy().into_owned()
                    };
                    let contents = self
                        .take_string((lib.g_strdup_value_contents)(value))
                        .unwrap_or_default();
                    Value::Other {
                        type_name,
                        contents,
                    }
                }
            }
        }
    }
}

impl ObjectApi for GstApi {
    unsafe fn ref_object(&self, object: *mut c_void) {
        unsafe { (self.lib.gst_object_ref)(object) };
    }

    unsafe fn unref_object(&self, object: *mut c_void) {
        unsafe { (self.lib.gst_object_unref)(object) };
    }

    unsafe fn refcount(&self, object: *mut c_void) -> u32 {
        let field = unsafe { &raw mut (*object.cast::<GObject>()).ref_count };
        unsafe { AtomicU32::from_ptr(field) }.load(Ordering::Acquire)
    }

    unsafe fn clear_object(&self, slot: &mut *mut c_void) {
        let slot: *mut *mut c_void = slot;
        unsafe { (self.lib.gst_clear_object)(slot.cast()) };
    }

    unsafe fn object_name(&self, object: *mut c_void) -> Option<String> {
        unsafe { self.take_string((self.lib.gst_object_get_name)(object.cast())) }
    }

    unsafe fn controlled_value(
        &self,
        object: *mut c_void,
        property: &CStr,
        timestamp: u64,
    ) -> Option<Value> {
        let value =
            unsafe { (self.lib.gst_object_get_value)(object.cast(), property.as_ptr(), timestamp) };
        if value.is_null() {
            return None;
        }
        let copied = unsafe { self.copy_value(value) };
        unsafe {
            (self.lib.g_value_unset)(value);
            (self.lib.g_free)(value.cast());
        }
        Some(copied)
    }

    unsafe fn set_arg_from_str(
        &self,
        object: *mut c_void,
        name: &CStr,
        value: &CStr,
    ) -> SetArgOutcome {
        let lib = &self.lib;
        let gobject = object.cast::<GObject>();
        let class = unsafe { (*gobject).g_type_instance.g_class }.cast::<GObjectClass>();
        let pspec = unsafe { (lib.g_object_class_find_property)(class, name.as_ptr()) };
        if pspec.is_null() {
            return SetArgOutcome::MissingProperty;
        }

        let (flags, value_type) = unsafe { ((*pspec).flags, (*pspec).value_type) };
        if flags & gstobj_sys::G_PARAM_WRITABLE == 0
            || flags & gstobj_sys::G_PARAM_CONSTRUCT_ONLY != 0
        {
            return SetArgOutcome::NotWritable;
        }

        let mut converted = GValue::default();
        unsafe {
            (lib.g_value_init)(&mut converted, value_type);
            let structure_type = (lib.gst_structure_get_type)();
            let converted_ok = match arg_conversion(value_type, structure_type, value) {
                ArgConversion::NullStructure => {
                    (lib.g_value_set_boxed)(&mut converted, std::ptr::null());
                    true
                }
                ArgConversion::Deserialize => {
                    (lib.gst_value_deserialize_with_pspec)(&mut converted, value.as_ptr(), pspec)
                        != 0
                }
            };
            let outcome = if converted_ok {
                (lib.g_object_set_property)(gobject, name.as_ptr(), &converted);
                SetArgOutcome::Applied
            } else {
                SetArgOutcome::ConversionFailed
            };
            (lib.g_value_unset)(&mut converted);
            outcome
        }
    }

    unsafe fn log_object(
        &self,
        category: DebugCategory,
        level: DebugLevel,
        site: NativeLogSite<'_>,
        object: *mut c_void,
        message: &CStr,
    ) {
        unsafe {
            (self.lib.gst_debug_log_literal)(
                category.as_ptr().cast(),
                level.into_raw(),
                site.file.as_ptr(),
                site.function.as_ptr(),
                c_int::try_from(site.line).unwrap_or(c_int::MAX),
                object.cast(),
                message.as_ptr(),
            )
        };
    }

    fn debug_category(&self, name: &CStr) -> Option<DebugCategory> {
        unsafe {
            let category = (self.lib._gst_debug_get_category)(name.as_ptr());
            DebugCategory::from_raw(category.cast())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURE: GType = 0x5a5a0;

    #[test]
    fn null_text_clears_structure_properties() {
        assert_eq!(
            arg_conversion(STRUCTURE, STRUCTURE, c"NULL"),
            ArgConversion::NullStructure
        );
    }

    #[test]
    fn null_text_is_parsed_for_other_types() {
        assert_eq!(
            arg_conversion(gstobj_sys::G_TYPE_STRING, STRUCTURE, c"NULL"),
            ArgConversion::Deserialize
        );
        assert_eq!(
            arg_conversion(STRUCTURE, STRUCTURE, c"null"),
            ArgConversion::Deserialize
        );
        assert_eq!(
            arg_conversion(STRUCTURE, STRUCTURE, c"s, a=(int)1"),
            ArgConversion::Deserialize
        );
    }
}
