// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! Debug levels and categories of the native logging subsystem.
//!
//! Categories and sinks are process-wide native state. This module only looks
//! them up and passes them along; it never registers, configures or frees them.

use std::{ffi::CString, os::raw::c_void, ptr::NonNull};

use crate::{Error, ObjectApiHandle, Result};

/// Severity of a native log record, numbered as the native library numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum DebugLevel {
    /// No output.
    None = gstobj_sys::GST_LEVEL_NONE,
    /// Unrecoverable failures.
    Error = gstobj_sys::GST_LEVEL_ERROR,
    /// Problems that were worked around.
    Warning = gstobj_sys::GST_LEVEL_WARNING,
    /// Incomplete code paths.
    Fixme = gstobj_sys::GST_LEVEL_FIXME,
    /// Informational one-off events.
    Info = gstobj_sys::GST_LEVEL_INFO,
    /// Debugging detail.
    Debug = gstobj_sys::GST_LEVEL_DEBUG,
    /// Verbose per-call detail.
    Log = gstobj_sys::GST_LEVEL_LOG,
    /// Repeated events such as refcount changes.
    Trace = gstobj_sys::GST_LEVEL_TRACE,
    /// Hex dumps of data.
    Memdump = gstobj_sys::GST_LEVEL_MEMDUMP,
}

impl DebugLevel {
    /// Returns the raw native level.
    pub fn into_raw(self) -> gstobj_sys::GstDebugLevel {
        self as gstobj_sys::GstDebugLevel
    }

    /// Closest `tracing` level, or `None` for [`DebugLevel::None`].
    pub fn to_tracing(self) -> Option<tracing::Level> {
        match self {
            DebugLevel::None => None,
            DebugLevel::Error => Some(tracing::Level::ERROR),
            DebugLevel::Warning | DebugLevel::Fixme => Some(tracing::Level::WARN),
            DebugLevel::Info => Some(tracing::Level::INFO),
            DebugLevel::Debug => Some(tracing::Level::DEBUG),
            DebugLevel::Log | DebugLevel::Trace | DebugLevel::Memdump => {
                Some(tracing::Level::TRACE)
            }
        }
    }
}

/// Non-owning handle to a native debug category.
///
/// Categories live for the whole process once registered, so the handle is
/// freely copyable and shareable between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebugCategory {
    ptr: NonNull<c_void>,
}

// Safety: native debug categories are immutable after registration and are
// never freed while the library is loaded.
unsafe impl Send for DebugCategory {}
unsafe impl Sync for DebugCategory {}

impl DebugCategory {
    /// Wraps a raw category pointer. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point at a registered category of the native
    /// library that the category will be used with.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Looks up an already registered category by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CategoryNotFound`] if no category with this name has
    /// been registered, or [`Error::NulString`] if `name` contains a NUL byte.
    pub fn get(api: &ObjectApiHandle, name: &str) -> Result<Self> {
        let c_name = CString::new(name)?;
        api.debug_category(&c_name)
            .ok_or_else(|| Error::CategoryNotFound(name.to_string()))
    }

    pub(crate) fn from_non_null(ptr: NonNull<c_void>) -> Self {
        Self { ptr }
    }

    /// The raw native category pointer.
    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }
}

/// Source location attached to a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSite {
    /// Source file path.
    pub file: &'static str,
    /// Function or module name. May be empty.
    pub function: &'static str,
    /// 1-based line number.
    pub line: u32,
}

impl LogSite {
    /// The file and line of the caller.
    ///
    /// `function` is always empty: `#[track_caller]` only exposes file, line
    /// and column. [`crate::object_log!`] fills it with `module_path!()`.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            function: "",
            line: location.line(),
        }
    }
}

/// Logs a formatted message from an [`crate::Object`], recording the calling
/// module as the function name.
///
/// ```no_run
/// # fn example(object: &gstobj::Object, category: gstobj::DebugCategory) {
/// gstobj::object_log!(object, category, gstobj::DebugLevel::Info, "state is {}", 3);
/// # }
/// ```
#[macro_export]
macro_rules! object_log {
    ($object:expr, $category:expr, $level:expr, $($arg:tt)+) => {
        $object.log_at(
            $category,
            $level,
            $crate::LogSite {
                file: file!(),
                function: module_path!(),
                line: line!(),
            },
            &format!($($arg)+),
        )
    };
}
