// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! Ownership and accessor tests for the object bridge.
//!
//! These tests run the bridge against [`SimulatedApi`], an in-process object
//! space whose refcounts and properties can be inspected directly. Each test
//! builds its own space so refcounts never leak between tests.
//!
//! # Test Coverage
//!
//! - Borrowed versus owned construction
//! - acquire / release / clear / force_release_all bookkeeping
//! - Name, controlled value, property set and log accessors
//! - Concurrent reference traffic over one native object

use std::{ffi::c_void, sync::Arc, thread, time::Duration};

use gstobj::{
    AcquisitionMode, DebugCategory, DebugLevel, Error, Object, ObjectApi, ObjectApiHandle,
    SimulatedApi, Value,
};

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

/// Sets up a test by initializing logging and creating an isolated object space.
///
/// Returns the space (for inspection) and the same space as a shared API handle.
fn setup_test() -> (Arc<SimulatedApi>, ObjectApiHandle) {
    // Initialize logging once (respects RUST_LOG environment variable)
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .init();
    });

    let space = Arc::new(SimulatedApi::new());
    let api: ObjectApiHandle = space.clone();
    (space, api)
}

fn native_refcount(space: &SimulatedApi, raw: *mut c_void) -> u32 {
    unsafe { space.refcount(raw) }
}

/// A borrowed wrap takes exactly one reference.
#[test]
fn borrowed_construction_takes_one_reference() {
    let (space, api) = setup_test();
    let raw = space.create_object("src");
    unsafe { space.ref_object(raw) };
    let before = native_refcount(&space, raw);

    let object = unsafe { Object::from_borrowed(api, raw) };
    assert_eq!(object.mode(), AcquisitionMode::Borrowed);
    assert_eq!(object.refcount(), before + 1);
    assert_eq!(object.as_ptr(), raw);
}

/// An owned wrap takes over the transferred reference without adding one.
#[test]
fn owned_construction_takes_no_reference() {
    let (space, api) = setup_test();
    let raw = space.create_object("src");
    let before = native_refcount(&space, raw);

    let object = unsafe { Object::from_owned(api, raw) };
    assert_eq!(object.mode(), AcquisitionMode::Owned);
    assert_eq!(object.refcount(), before);
}

/// acquire followed by release leaves the count where it started.
#[test]
fn acquire_release_round_trip() {
    let (space, api) = setup_test();
    for extra in 0..4 {
        let raw = space.create_object("rt");
        for _ in 0..extra {
            unsafe { space.ref_object(raw) };
        }
        let object = unsafe { Object::from_owned(api.clone(), raw) };
        let start = object.refcount();
        object.acquire();
        assert_eq!(object.refcount(), start + 1);
        object.release();
        assert_eq!(object.refcount(), start);
    }
}

/// release on an object the native side already finalized does nothing.
#[test]
fn release_at_zero_is_a_no_op() {
    let (space, api) = setup_test();
    let raw = space.create_object("gone");
    let object = unsafe { Object::from_owned(api, raw) };
    unsafe { space.unref_object(raw) };
    assert!(space.is_finalized(raw));

    object.release();
    object.release();
    assert_eq!(object.refcount(), 0);
    assert!(!object.is_null());
}

/// clear twice ends in the same state as clear once.
#[test]
fn clear_is_idempotent() {
    let (space, api) = setup_test();
    let raw = space.create_object("c");
    unsafe { space.ref_object(raw) };
    let mut object = unsafe { Object::from_owned(api, raw) };

    object.clear();
    assert!(object.is_null());
    assert_eq!(native_refcount(&space, raw), 1);

    object.clear();
    assert!(object.is_null());
    assert_eq!(native_refcount(&space, raw), 1);
    assert_eq!(object.refcount(), 0);
}

/// force_release_all always lands on exactly one reference.
#[test]
fn force_release_all_stops_at_one() {
    let (space, api) = setup_test();
    for start in 1..=6 {
        let raw = space.create_object("drain");
        for _ in 1..start {
            unsafe { space.ref_object(raw) };
        }
        let object = unsafe { Object::from_owned(api.clone(), raw) };
        assert_eq!(object.refcount(), start);
        object.force_release_all();
        assert_eq!(object.refcount(), 1);
        assert!(!space.is_finalized(raw));
    }
}

/// Full lifecycle: borrow, acquire three times, drain, clear, then read.
#[test]
fn borrow_acquire_drain_clear_scenario() {
    let (space, api) = setup_test();
    let raw = space.create_object("pipeline0");
    assert_eq!(native_refcount(&space, raw), 1);

    let mut object = unsafe { Object::from_borrowed(api, raw) };
    assert_eq!(object.refcount(), 2);

    object.acquire().acquire().acquire();
    assert_eq!(object.refcount(), 5);

    object.force_release_all();
    assert_eq!(object.refcount(), 1);

    object.clear();
    assert!(object.is_null());
    assert_eq!(object.name(), "");
    assert!(space.is_finalized(raw));
}

/// Setting an unknown property returns normally and changes nothing.
#[test]
fn set_arg_on_missing_property_is_silent() {
    let (space, api) = setup_test();
    let raw = space.create_object("volume0");
    space.set_property(raw, "volume", 1.0);
    let object = unsafe { Object::from_owned(api, raw) };

    object.set_arg("nonexistent-property", "5");
    assert_eq!(space.property(raw, "volume"), Some(Value::Float(1.0)));
    assert_eq!(space.property(raw, "nonexistent-property"), None);
    assert_eq!(object.refcount(), 1);
}

/// set_arg converts through the property's own type.
#[test]
fn set_arg_parses_by_property_type() {
    let (space, api) = setup_test();
    let raw = space.create_object("volume0");
    space.set_property(raw, "volume", 1.0);
    space.set_property(raw, "mute", false);
    space.set_property(raw, "buffers", 0u64);
    let object = unsafe { Object::from_owned(api, raw) };

    object.set_arg("volume", "0.25");
    object.set_arg("mute", "true");
    object.set_arg("buffers", "-3");

    assert_eq!(space.property(raw, "volume"), Some(Value::Float(0.25)));
    assert_eq!(space.property(raw, "mute"), Some(Value::Bool(true)));
    assert_eq!(space.property(raw, "buffers"), Some(Value::UInt(0)));
}

/// try_set_arg reports each way a set can fail.
#[test]
fn try_set_arg_reports_outcome() {
    let (space, api) = setup_test();
    let raw = space.create_object("volume0");
    space.set_property(raw, "volume", 1.0);
    space.add_read_only_property(raw, "latency", 20i64);
    let object = unsafe { Object::from_owned(api, raw) };

    assert!(object.try_set_arg("volume", "0.5").is_ok());
    assert!(matches!(
        object.try_set_arg("nonexistent-property", "5"),
        Err(Error::MissingProperty(name)) if name == "nonexistent-property"
    ));
    assert!(matches!(
        object.try_set_arg("latency", "10"),
        Err(Error::PropertyNotWritable(_))
    ));
    assert!(matches!(
        object.try_set_arg("volume", "loud"),
        Err(Error::ConversionFailed { property, value }) if property == "volume" && value == "loud"
    ));
    assert!(matches!(
        object.try_set_arg("vol\0ume", "1"),
        Err(Error::NulString(_))
    ));
    assert_eq!(space.property(raw, "volume"), Some(Value::Float(0.5)));
    assert_eq!(space.property(raw, "latency"), Some(Value::Int(20)));
}

/// An uncontrolled property has no value, not a zero.
#[test]
fn value_without_binding_is_none() {
    let (space, api) = setup_test();
    let raw = space.create_object("volume0");
    space.set_property(raw, "volume", 1.0);
    let object = unsafe { Object::from_owned(api, raw) };

    assert_eq!(object.value("volume", Duration::ZERO), None);
}

/// Controlled values are looked up at the requested time.
#[test]
fn value_follows_controlled_timeline() {
    let (space, api) = setup_test();
    let raw = space.create_object("volume0");
    space.bind_controlled(
        raw,
        "volume",
        [
            (Duration::ZERO, Value::Float(0.0)),
            (Duration::from_millis(500), Value::Float(1.0)),
        ],
    );
    let object = unsafe { Object::from_owned(api, raw) };

    assert_eq!(
        object.value("volume", Duration::from_millis(499)),
        Some(Value::Float(0.0))
    );
    assert_eq!(
        object.value("volume", Duration::from_secs(3)),
        Some(Value::Float(1.0))
    );
    assert_eq!(object.value("vol\0ume", Duration::ZERO), None);
}

/// The name is a copy that survives renaming and is empty when unset.
#[test]
fn name_is_copied() {
    let (space, api) = setup_test();
    let raw = space.create_object("before");
    let object = unsafe { Object::from_owned(api, raw) };

    let name = object.name();
    space.rename(raw, Some("after"));
    assert_eq!(name, "before");
    assert_eq!(object.name(), "after");

    space.rename(raw, None);
    assert_eq!(object.name(), "");
}

/// Log records carry the object, category, level and caller location.
#[test]
fn log_tags_record_with_object_and_caller() {
    let (space, api) = setup_test();
    let category = space.register_category("bridge");
    let raw = space.create_object("src");
    let object = unsafe { Object::from_owned(api.clone(), raw) };

    let line = line!() + 1;
    object.log(category, DebugLevel::Warning, "state changed");
    gstobj::object_log!(object, category, DebugLevel::Debug, "count is {}", 3);

    let entries = space.log_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].category, "bridge");
    assert_eq!(entries[0].level, DebugLevel::Warning);
    assert_eq!(entries[0].object, raw as usize);
    assert_eq!(entries[0].message, "state changed");
    assert!(entries[0].file.ends_with("ownership_tests.rs"));
    assert_eq!(entries[0].line, line);
    assert_eq!(entries[0].function, "");
    assert_eq!(entries[1].message, "count is 3");
    assert_eq!(entries[1].function, module_path!());

    assert_eq!(DebugCategory::get(&api, "bridge").unwrap(), category);
    assert!(matches!(
        DebugCategory::get(&api, "unregistered"),
        Err(Error::CategoryNotFound(_))
    ));
}

/// A cleared bridge emits nothing.
#[test]
fn log_on_cleared_bridge_is_a_no_op() {
    let (space, api) = setup_test();
    let category = space.register_category("bridge");
    let raw = space.create_object("src");
    let mut object = unsafe { Object::from_borrowed(api, raw) };
    object.clear();

    object.log(category, DebugLevel::Error, "after clear");
    assert!(space.log_entries().is_empty());
}

/// Dropping a bridge returns its construction reference; cloning adds one.
#[test]
fn drop_and_clone_balance_references() {
    let (space, api) = setup_test();
    let raw = space.create_object("shared");

    {
        let borrowed = unsafe { Object::from_borrowed(api.clone(), raw) };
        let copy = borrowed.clone();
        assert_eq!(native_refcount(&space, raw), 3);
        drop(copy);
        assert_eq!(borrowed.refcount(), 2);
    }
    assert_eq!(native_refcount(&space, raw), 1);

    drop(unsafe { Object::from_owned(api, raw) });
    assert!(space.is_finalized(raw));
}

/// Concurrent acquire/release over bridges sharing one object nets to zero.
#[test]
fn concurrent_reference_traffic_is_balanced() {
    let (space, api) = setup_test();
    let raw = space.create_object("busy");
    let root = unsafe { Object::from_owned(api, raw) };

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let object = root.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    object.acquire();
                    object.release();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(root.refcount(), 1);
}
