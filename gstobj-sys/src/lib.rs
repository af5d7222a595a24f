// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! # gstobj-sys: Raw FFI surface for the GStreamer base object
//!
//! This crate provides low-level, unsafe declarations for the small slice of the
//! GStreamer / GLib C API that the [`gstobj`] ownership bridge needs. Symbols are
//! resolved at runtime with `libloading`, so nothing links against GStreamer at
//! build time.
//!
//! ## Overview
//!
//! `gstobj-sys` exposes:
//! - C struct layouts that are read directly (`GObject` header, `GValue`, `GParamSpec`)
//! - Opaque handle types (`GstObject`, `GstDebugCategory`, `GObjectClass`)
//! - Constants for debug levels, fundamental type ids and param flags
//! - [`GstObjectLib`], a table of function pointers loaded from `libgstreamer-1.0`
//!
//! ## Usage
//!
//! **Most users should NOT use this crate directly.** Use the safe [`gstobj`]
//! wrapper crate instead, which provides refcount-safe RAII handles and
//! best-effort accessors.
//!
//! ## Safety
//!
//! Every function pointer in [`GstObjectLib`] is a raw C entry point:
//! - Pointers passed in must be valid for the call
//! - Strings must be NUL-terminated
//! - Null checks are the caller's responsibility
//!
//! [`gstobj`]: https://docs.rs/gstobj

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]

use std::{
    ffi::OsStr,
    os::raw::{c_char, c_double, c_float, c_int, c_long, c_uint, c_ulong, c_void},
};

pub type gboolean = c_int;
pub type gchar = c_char;
pub type gpointer = *mut c_void;
pub type GType = usize;
pub type GstClockTime = u64;
pub type GstDebugLevel = c_int;
pub type GParamFlags = c_uint;

/// `GST_CLOCK_TIME_NONE`: the "no timestamp" sentinel.
pub const GST_CLOCK_TIME_NONE: GstClockTime = u64::MAX;

pub const GST_LEVEL_NONE: GstDebugLevel = 0;
pub const GST_LEVEL_ERROR: GstDebugLevel = 1;
pub const GST_LEVEL_WARNING: GstDebugLevel = 2;
pub const GST_LEVEL_FIXME: GstDebugLevel = 3;
pub const GST_LEVEL_INFO: GstDebugLevel = 4;
pub const GST_LEVEL_DEBUG: GstDebugLevel = 5;
pub const GST_LEVEL_LOG: GstDebugLevel = 6;
pub const GST_LEVEL_TRACE: GstDebugLevel = 7;
pub const GST_LEVEL_MEMDUMP: GstDebugLevel = 9;

pub const G_TYPE_FUNDAMENTAL_SHIFT: usize = 2;
pub const G_TYPE_CHAR: GType = 3 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_UCHAR: GType = 4 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_BOOLEAN: GType = 5 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_INT: GType = 6 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_UINT: GType = 7 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_LONG: GType = 8 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_ULONG: GType = 9 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_INT64: GType = 10 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_UINT64: GType = 11 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_ENUM: GType = 12 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_FLAGS: GType = 13 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_FLOAT: GType = 14 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_DOUBLE: GType = 15 << G_TYPE_FUNDAMENTAL_SHIFT;
pub const G_TYPE_STRING: GType = 16 << G_TYPE_FUNDAMENTAL_SHIFT;

pub const G_PARAM_READABLE: GParamFlags = 1 << 0;
pub const G_PARAM_WRITABLE: GParamFlags = 1 << 1;
pub const G_PARAM_CONSTRUCT_ONLY: GParamFlags = 1 << 3;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GTypeClass {
    pub g_type: GType,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GTypeInstance {
    pub g_class: *mut GTypeClass,
}

/// Public header of every `GObject` instance.
///
/// `ref_count` is only ever touched atomically by GLib; readers should load it
/// through an atomic view rather than a plain read.
#[repr(C)]
#[derive(Debug)]
pub struct GObject {
    pub g_type_instance: GTypeInstance,
    pub ref_count: c_uint,
    pub qdata: gpointer,
}

#[repr(C)]
pub struct GObjectClass {
    _private: [u8; 0],
}

#[repr(C)]
pub struct GstObject {
    _private: [u8; 0],
}

#[repr(C)]
pub struct GstDebugCategory {
    _private: [u8; 0],
}

/// A `GValue`. The zeroed value is `G_VALUE_INIT`.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct GValue {
    pub g_type: GType,
    pub data: [u64; 2],
}

#[repr(C)]
#[derive(Debug)]
pub struct GParamSpec {
    pub g_type_instance: GTypeInstance,
    pub name: *const gchar,
    pub flags: GParamFlags,
    pub value_type: GType,
    pub owner_type: GType,
    pub _nick: *mut gchar,
    pub _blurb: *mut gchar,
    pub qdata: gpointer,
    pub ref_count: c_uint,
    pub param_id: c_uint,
}

macro_rules! library_symbols {
    ($(pub fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?;)*) => {
        /// Function table resolved from the GStreamer shared library.
        ///
        /// Requires GStreamer 1.20 or later (`gst_value_deserialize_with_pspec`).
        /// All symbols are resolved eagerly by [`GstObjectLib::new`]; a library
        /// missing any of them fails to load instead of failing on first use.
        pub struct GstObjectLib {
            _library: libloading::Library,
            $(pub $name: unsafe extern "C" fn($($ty),*) $(-> $ret)?,)*
        }

        impl GstObjectLib {
            /// Loads the shared library at `path` and resolves every symbol.
            pub unsafe fn new<P: AsRef<OsStr>>(path: P) -> Result<Self, libloading::Error> {
                let library = unsafe { libloading::Library::new(path) }?;
                unsafe { Self::from_library(library) }
            }

            /// Resolves every symbol from an already opened library.
            pub unsafe fn from_library(library: libloading::Library) -> Result<Self, libloading::Error> {
                $(
                    let $name = unsafe {
                        *library.get::<unsafe extern "C" fn($($ty),*) $(-> $ret)?>(
                            concat!(stringify!($name), "\0").as_bytes(),
                        )?
                    };
                )*
                Ok(Self { _library: library, $($name,)* })
            }
        }
    };
}

library_symbols! {
    pub fn gst_object_ref(object: gpointer) -> gpointer;
    pub fn gst_object_unref(object: gpointer);
    pub fn gst_clear_object(object_ptr: *mut *mut GstObject);
    pub fn gst_object_get_name(object: *mut GstObject) -> *mut gchar;
    pub fn gst_object_get_value(
        object: *mut GstObject,
        property_name: *const gchar,
        timestamp: GstClockTime,
    ) -> *mut GValue;
    pub fn gst_value_deserialize_with_pspec(
        dest: *mut GValue,
        src: *const gchar,
        pspec: *mut GParamSpec,
    ) -> gboolean;
    pub fn gst_structure_get_type() -> GType;
    pub fn gst_debug_log_literal(
        category: *mut GstDebugCategory,
        level: GstDebugLevel,
        file: *const gchar,
        function: *const gchar,
        line: c_int,
        object: *mut GObject,
        message_string: *const gchar,
    );
    pub fn _gst_debug_get_category(name: *const gchar) -> *mut GstDebugCategory;
    pub fn g_free(mem: gpointer);
    pub fn g_object_class_find_property(
        oclass: *mut GObjectClass,
        property_name: *const gchar,
    ) -> *mut GParamSpec;
    pub fn g_object_set_property(
        object: *mut GObject,
        property_name: *const gchar,
        value: *const GValue,
    );
    pub fn g_value_init(value: *mut GValue, g_type: GType) -> *mut GValue;
    pub fn g_value_unset(value: *mut GValue);
    pub fn g_value_set_boxed(value: *mut GValue, v_boxed: *const c_void);
    pub fn g_type_fundamental(type_id: GType) -> GType;
    pub fn g_type_name(type_id: GType) -> *const gchar;
    pub fn g_strdup_value_contents(value: *const GValue) -> *mut gchar;
    pub fn g_value_get_boolean(value: *const GValue) -> gboolean;
    pub fn g_value_get_int(value: *const GValue) -> c_int;
    pub fn g_value_get_uint(value: *const GValue) -> c_uint;
    pub fn g_value_get_long(value: *const GValue) -> c_long;
    pub fn g_value_get_ulong(value: *const GValue) -> c_ulong;
    pub fn g_value_get_int64(value: *const GValue) -> i64;
    pub fn g_value_get_uint64(value: *const GValue) -> u64;
    pub fn g_value_get_float(value: *const GValue) -> c_float;
    pub fn g_value_get_double(value: *const GValue) -> c_double;
    pub fn g_value_get_string(value: *const GValue) -> *const gchar;
}
