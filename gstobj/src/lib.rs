// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! # gstobj - GStreamer base object bridge
//!
//! Safe handles around GStreamer's reference-counted base object, built for
//! callers whose own memory is managed automatically while the object lives in
//! manually refcounted native memory.
//!
//! ## Overview
//!
//! This crate wraps the raw declarations of [`gstobj_sys`] with a single RAII
//! type, [`Object`], and keeps the native object system behind the
//! [`ObjectApi`] trait so the bridge can run against the real library
//! ([`GstApi`]) or an in-process stand-in ([`SimulatedApi`]).
//!
//! ### Key Concepts
//!
//! - **Native object**: lives outside Rust's ownership, freed when its refcount reaches zero
//! - **Borrowed handle**: the caller holds no reference; [`Object::from_borrowed`] takes one
//! - **Owned handle**: a reference was transferred; [`Object::from_owned`] takes it over
//! - **Controlled property**: a property whose value depends on time, read with [`Object::value`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐      ┌──────────────────────┐
//! │  Object  │ ───► │ ObjectApiHandle      │
//! └──────────┘      │ (Arc<dyn ObjectApi>) │
//!                   └──────────┬───────────┘
//!                              ├─► GstApi        (libgstreamer-1.0 via libloading)
//!                              └─► SimulatedApi  (in-process object space)
//! ```
//!
//! ## Failure Model
//!
//! Reference management and accessors never fail. A null handle, a refcount
//! that is already zero, a missing property or an unparsable value all
//! degrade to a no-op or an empty result, with a `tracing` event to diagnose
//! misuse. [`Object::try_set_arg`] is the one accessor that reports why it did
//! nothing.
//!
//! ## Examples
//!
//! ```no_run
//! use gstobj::{DebugCategory, DebugLevel, Object, load_api};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), gstobj::Error> {
//! # let raw_element: *mut std::ffi::c_void = std::ptr::null_mut();
//! let api = load_api(gstobj::config::get_gstreamer_library_path())?;
//!
//! // `raw_element` came from a call that did not transfer a reference.
//! let element = unsafe { Object::from_borrowed(api.clone(), raw_element) };
//! println!("{} has {} references", element.name(), element.refcount());
//!
//! element.set_arg("volume", "0.5");
//! if let Some(volume) = element.value("volume", Duration::from_secs(1)) {
//!     println!("volume at 1s: {volume}");
//! }
//!
//! let category = DebugCategory::get(&api, "default")?;
//! element.log(category, DebugLevel::Info, "configured");
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! - [`ObjectApiHandle`] is `Send + Sync` and shared freely
//! - [`Object`] is `Send` but not `Sync`; clone it to hand a separate reference to another thread

#![warn(missing_docs)]

mod api;
mod debug;
mod error;
mod object;
mod value;

pub mod config;

pub use api::{
    GstApi, LogEntry, NativeLogSite, ObjectApi, ObjectApiHandle, SetArgOutcome, SimulatedApi,
    load_api,
};
pub use debug::{DebugCategory, DebugLevel, LogSite};
pub use error::{Error, Result};
pub use object::{AcquisitionMode, Object};
pub use value::Value;
