// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the fallible edges of the bridge.
//!
//! Reference management and the plain accessors never fail: they degrade to a
//! no-op or an empty result. Errors only surface from library loading, debug
//! category lookup and the explicit-result property setter.

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when using the bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The object handle is null (never bound, or already cleared).
    #[error("Null object handle")]
    NullHandle,

    /// The object has no property with this name.
    #[error("No property named \"{0}\"")]
    MissingProperty(String),

    /// The property exists but cannot be set after construction.
    #[error("Property \"{0}\" is not writable")]
    PropertyNotWritable(String),

    /// The string could not be converted to the property's native type.
    #[error("Cannot convert \"{value}\" for property \"{property}\"")]
    ConversionFailed {
        /// Property that was being set.
        property: String,
        /// Text that failed to convert.
        value: String,
    },

    /// No debug category with this name is registered with the native library.
    #[error("Debug category \"{0}\" is not registered")]
    CategoryNotFound(String),

    /// Failed to convert a Rust string to a C-compatible null-terminated string.
    #[error("Null string: {0}")]
    NulString(#[from] std::ffi::NulError),

    /// Failed to load the native library or one of its symbols.
    #[error("Loading library: {0}")]
    LibLoading(#[from] libloading::Error),
}
