// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! An in-process native object space.
//!
//! [`SimulatedApi`] behaves like the native object system as far as the bridge
//! can observe: objects carry atomic refcounts, names, typed properties and
//! controlled-value timelines, and log records go to a captured list.
//!
//! Objects that reach refcount zero are marked finalized but their memory is
//! kept until the space itself is dropped, so a stale refcount read observes
//! zero instead of reading freed memory.

use std::{
    collections::{BTreeMap, HashMap},
    ffi::CStr,
    os::raw::c_void,
    ptr::NonNull,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use super::{NativeLogSite, ObjectApi, SetArgOutcome};
use crate::{DebugCategory, DebugLevel, Value, value::clock_time};

struct SimProperty {
    value: Value,
    writable: bool,
}

struct SimObject {
    ref_count: AtomicU32,
    name: Mutex<Option<String>>,
    properties: Mutex<HashMap<String, SimProperty>>,
    controlled: Mutex<HashMap<String, BTreeMap<u64, Value>>>,
}

struct SimCategory {
    name: String,
}

/// A log record captured by [`SimulatedApi`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Name the category was registered under.
    pub category: String,
    /// Severity of the record.
    pub level: DebugLevel,
    /// Address of the object the record was tagged with.
    pub object: usize,
    /// Source file of the log call.
    pub file: String,
    /// Function or module of the log call, empty when unknown.
    pub function: String,
    /// Line of the log call.
    pub line: u32,
    /// Formatted message text.
    pub message: String,
}

/// In-process implementation of [`ObjectApi`].
///
/// Share it as an [`super::ObjectApiHandle`] by cloning an `Arc<SimulatedApi>`;
/// keep the `Arc` itself to create objects and inspect their state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use gstobj::{Object, ObjectApiHandle, SimulatedApi};
///
/// let space = Arc::new(SimulatedApi::new());
/// let raw = space.create_object("volume0");
/// let api: ObjectApiHandle = space.clone();
///
/// let object = unsafe { Object::from_owned(api, raw) };
/// assert_eq!(object.name(), "volume0");
/// assert_eq!(object.refcount(), 1);
/// ```
#[derive(Default)]
pub struct SimulatedApi {
    objects: Mutex<Vec<Arc<SimObject>>>,
    categories: Mutex<Vec<Box<SimCategory>>>,
    records: Mutex<Vec<LogEntry>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedApi {
    /// An empty object space with no objects or categories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object with refcount 1, the reference being the caller's.
    pub fn create_object(&self, name: &str) -> *mut c_void {
        let object = Arc::new(SimObject {
            ref_count: AtomicU32::new(1),
            name: Mutex::new(Some(name.to_string())),
            properties: Mutex::new(HashMap::new()),
            controlled: Mutex::new(HashMap::new()),
        });
        let ptr = Arc::as_ptr(&object).cast_mut().cast::<c_void>();
        lock(&self.objects).push(object);
        tracing::trace!(name, ?ptr, "Created simulated object");
        ptr
    }

    fn object(&self, ptr: *mut c_void) -> Option<Arc<SimObject>> {
        lock(&self.objects)
            .iter()
            .find(|object| Arc::as_ptr(object).cast::<c_void>() == ptr.cast_const())
            .cloned()
    }

    /// Adds or replaces a writable property.
    ///
    /// The kind of `value` decides how strings are parsed when the property is
    /// later set from text. Unknown handles are ignored.
    pub fn set_property(&self, object: *mut c_void, name: &str, value: impl Into<Value>) {
        self.insert_property(object, name, value.into(), true);
    }

    /// Adds or replaces a property that cannot be set from a string.
    pub fn add_read_only_property(&self, object: *mut c_void, name: &str, value: impl Into<Value>) {
        self.insert_property(object, name, value.into(), false);
    }

    fn insert_property(&self, object: *mut c_void, name: &str, value: Value, writable: bool) {
        if let Some(object) = self.object(object) {
            lock(&object.properties).insert(name.to_string(), SimProperty { value, writable });
        }
    }

    /// Current value of a property.
    pub fn property(&self, object: *mut c_void, name: &str) -> Option<Value> {
        let object = self.object(object)?;
        let properties = lock(&object.properties);
        properties.get(name).map(|property| property.value.clone())
    }

    /// Replaces the object's name. `None` leaves it unnamed.
    pub fn rename(&self, object: *mut c_void, name: Option<&str>) {
        if let Some(object) = self.object(object) {
            *lock(&object.name) = name.map(str::to_string);
        }
    }

    /// Binds a controlled-value timeline to `property`.
    ///
    /// A lookup returns the value of the latest point at or before the
    /// requested time, and nothing before the first point.
    pub fn bind_controlled<I>(&self, object: *mut c_void, property: &str, points: I)
    where
        I: IntoIterator<Item = (Duration, Value)>,
    {
        if let Some(object) = self.object(object) {
            let timeline = points
                .into_iter()
                .map(|(at, value)| (clock_time(at), value))
                .collect();
            lock(&object.controlled).insert(property.to_string(), timeline);
        }
    }

    /// Registers a debug category by name, returning the existing one if the
    /// name is already taken.
    pub fn register_category(&self, name: &str) -> DebugCategory {
        let mut categories = lock(&self.categories);
        let category = match categories.iter().position(|category| category.name == name) {
            Some(index) => &categories[index],
            None => {
                categories.push(Box::new(SimCategory {
                    name: name.to_string(),
                }));
                &categories[categories.len() - 1]
            }
        };
        // Boxed categories are never removed, so the pointer stays valid for
        // the life of the space.
        DebugCategory::from_non_null(NonNull::from(&**category).cast())
    }

    fn category_name(&self, category: DebugCategory) -> String {
        lock(&self.categories)
            .iter()
            .find(|candidate| {
                let ptr: *const SimCategory = &***candidate;
                ptr.cast::<c_void>() == category.as_ptr().cast_const()
            })
            .map(|candidate| candidate.name.clone())
            .unwrap_or_default()
    }

    /// Every log record emitted so far, oldest first.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        lock(&self.records).clone()
    }

    /// Whether the object's refcount has reached zero.
    pub fn is_finalized(&self, object: *mut c_void) -> bool {
        self.object(object)
            .is_some_and(|object| object.ref_count.load(Ordering::Acquire) == 0)
    }
}

impl ObjectApi for SimulatedApi {
    unsafe fn ref_object(&self, object: *mut c_void) {
        let Some(object) = self.object(object) else {
            tracing::error!(?object, "ref on unknown object");
            return;
        };
        let result = object
            .ref_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count > 0).then(|| count + 1)
            });
        if result.is_err() {
            tracing::error!("ref on finalized object");
        }
    }

    unsafe fn unref_object(&self, object: *mut c_void) {
        let Some(target) = self.object(object) else {
            tracing::error!(?object, "unref on unknown object");
            return;
        };
        match target
            .ref_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            }) {
            Ok(1) => tracing::trace!(?object, "Simulated object finalized"),
            Ok(_) => {}
            Err(_) => tracing::error!(?object, "unref on finalized object"),
        }
    }

    unsafe fn refcount(&self, object: *mut c_void) -> u32 {
        self.object(object)
            .map(|object| object.ref_count.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    unsafe fn clear_object(&self, slot: &mut *mut c_void) {
        let object = std::mem::replace(slot, std::ptr::null_mut());
        if !object.is_null() {
            unsafe { self.unref_object(object) };
        }
    }

    unsafe fn object_name(&self, object: *mut c_void) -> Option<String> {
        let object = self.object(object)?;
        lock(&object.name).clone()
    }

    unsafe fn controlled_value(
        &self,
        object: *mut c_void,
        property: &CStr,
        timestamp: u64,
    ) -> Option<Value> {
        let object = self.object(object)?;
        let property = property.to_str().ok()?;
        let controlled = lock(&object.controlled);
        controlled
            .get(property)?
            .range(..=timestamp)
            .next_back()
            .map(|(_, value)| value.clone())
    }

    unsafe fn set_arg_from_str(
        &self,
        object: *mut c_void,
        name: &CStr,
        value: &CStr,
    ) -> SetArgOutcome {
        let Some(object) = self.object(object) else {
            return SetArgOutcome::MissingProperty;
        };
        let Ok(name) = name.to_str() else {
            return SetArgOutcome::MissingProperty;
        };
        let mut properties = lock(&object.properties);
        let Some(property) = properties.get_mut(name) else {
            return SetArgOutcome::MissingProperty;
        };
        if !property.writable {
            return SetArgOutcome::NotWritable;
        }
        let parsed = value
            .to_str()
            .ok()
            .and_then(|text| property.value.parse_as(text));
        match parsed {
            Some(parsed) => {
                property.value = parsed;
                SetArgOutcome::Applied
            }
            None => SetArgOutcome::ConversionFailed,
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
        let entry = LogEntry {
            category: self.category_name(category),
            level,
            object: object as usize,
            file: site.file.to_string_lossy().into_owned(),
            function: site.function.to_string_lossy().into_owned(),
            line: site.line,
            message: message.to_string_lossy().into_owned(),
        };
        forward_to_tracing(&entry);
        lock(&self.records).push(entry);
    }

    fn debug_category(&self, name: &CStr) -> Option<DebugCategory> {
        let name = name.to_str().ok()?;
        let exists = lock(&self.categories)
            .iter()
            .any(|category| category.name == name);
        exists.then(|| self.register_category(name))
    }
}

fn forward_to_tracing(entry: &LogEntry) {
    let LogEntry {
        category,
        object,
        message,
        ..
    } = entry;
    match entry.level.to_tracing() {
        Some(tracing::Level::ERROR) => tracing::error!(%category, object, "{message}"),
        Some(tracing::Level::WARN) => tracing::warn!(%category, object, "{message}"),
        Some(tracing::Level::INFO) => tracing::info!(%category, object, "{message}"),
        Some(tracing::Level::DEBUG) => tracing::debug!(%category, object, "{message}"),
        Some(_) => tracing::trace!(%category, object, "{message}"),
        None => {}
    }
}

impl std::fmt::Debug for SimulatedApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedApi")
            .field("objects", &lock(&self.objects).len())
            .field("categories", &lock(&self.categories).len())
            .field("records", &lock(&self.records).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;

    fn cstring(text: &str) -> CString {
        CString::new(text).unwrap()
    }

    #[test]
    fn unref_saturates_at_zero() {
        let space = SimulatedApi::new();
        let object = space.create_object("a");
        unsafe {
            space.unref_object(object);
            assert!(space.is_finalized(object));
            space.unref_object(object);
            assert_eq!(space.refcount(object), 0);
        }
    }

    #[test]
    fn finalized_objects_cannot_be_revived() {
        let space = SimulatedApi::new();
        let object = space.create_object("a");
        unsafe {
            space.unref_object(object);
            space.ref_object(object);
            assert_eq!(space.refcount(object), 0);
        }
    }

    #[test]
    fn unknown_handles_read_as_zero() {
        let space = SimulatedApi::new();
        let mut marker = 0u8;
        let stranger = (&raw mut marker).cast::<c_void>();
        assert_eq!(unsafe { space.refcount(stranger) }, 0);
    }

    #[test]
    fn controlled_timeline_steps() {
        let space = SimulatedApi::new();
        let object = space.create_object("a");
        space.bind_controlled(
            object,
            "volume",
            [
                (Duration::from_secs(1), Value::Float(0.25)),
                (Duration::from_secs(2), Value::Float(0.75)),
            ],
        );
        let volume = cstring("volume");
        let at = |secs: f64| unsafe {
            space.controlled_value(
                object,
                &volume,
                clock_time(Duration::from_secs_f64(secs)),
            )
        };
        assert_eq!(at(0.5), None);
        assert_eq!(at(1.0), Some(Value::Float(0.25)));
        assert_eq!(at(1.5), Some(Value::Float(0.25)));
        assert_eq!(at(9.0), Some(Value::Float(0.75)));
    }

    #[test]
    fn categories_are_registered_once() {
        let space = SimulatedApi::new();
        let first = space.register_category("bridge");
        let second = space.register_category("bridge");
        assert_eq!(first, second);
        assert_eq!(space.debug_category(&cstring("bridge")), Some(first));
        assert_eq!(space.debug_category(&cstring("other")), None);
    }

    #[test]
    fn clear_nulls_slot() {
        let space = SimulatedApi::new();
        let mut slot = space.create_object("a");
        let object = slot;
        unsafe {
            space.clear_object(&mut slot);
            assert!(slot.is_null());
            space.clear_object(&mut slot);
        }
        assert!(space.is_finalized(object));
    }
}
