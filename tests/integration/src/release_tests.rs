//! Release Tests - Scoped Ownership of Remote References
//!
//! These tests exercise the release tracker through the invocation engine:
//! - References acquired by calls are released in reverse order
//! - Every exit path releases: success, error, panic
//! - A failed marshal leaves no stray references behind

mod common;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use common::*;
use oleauto::{
    iid, with_scope, DynamicValue, Error, InvocationEngine, ReleaseTracker, RemoteRef, Variant,
};

/// Root object whose `Child` property returns `child`
fn parent_of(name: &'static str, child: &Arc<MockObject>, log: &ReleaseLog) -> Arc<MockObject> {
    let parent = MockObject::new(name, log);
    let child = child.clone();
    parent.on("Child", 1, move |_| Outcome::Value(Variant::Dispatch(child.new_ref())));
    parent
}

fn adopt_root(tracker: &mut ReleaseTracker, object: &Arc<MockObject>) -> RemoteRef {
    tracker.adopt(object.clone(), iid::IDISPATCH)
}

/// Test: A chain of acquisitions unwinds leaf first
#[test]
fn test_chain_released_in_reverse_order() {
    init_logging();

    let log = ReleaseLog::new();
    let leaf = MockObject::new("leaf", &log);
    let middle = parent_of("middle", &leaf, &log);
    let root = parent_of("root", &middle, &log);
    let engine = InvocationEngine::new();

    let result: oleauto::Result<()> = with_scope(|rel| {
        let app = adopt_root(rel, &root);
        let second = engine.invoke_get_object(rel, &app, "Child", &[])?;
        let third = engine.invoke_get_object(rel, &second, "Child", &[])?;
        assert!(third.is_dispatch());
        assert_eq!(rel.len(), 3);
        Ok(())
    });

    println!("\n=== Chain Release Test ===");
    println!("Release order: {:?}", log.entries());

    assert!(result.is_ok());
    assert_eq!(log.entries(), vec!["leaf", "middle", "root"]);
    assert_eq!(root.refs(), 0);
    assert_eq!(middle.refs(), 1);
    assert_eq!(leaf.refs(), 1);
}

/// Test: A failure midway still releases everything acquired so far
#[test]
fn test_error_path_releases() {
    init_logging();

    let log = ReleaseLog::new();
    let child = MockObject::new("child", &log);
    let root = parent_of("root", &child, &log);
    let engine = InvocationEngine::new();

    let result: oleauto::Result<i32> = with_scope(|rel| {
        let app = adopt_root(rel, &root);
        let obj = engine.invoke_get_object(rel, &app, "Child", &[])?;
        engine.invoke_get(rel, &obj, "Missing", &[])?.as_i32()
    });

    assert!(matches!(result, Err(Error::NameNotFound { ref name, .. }) if name == "Missing"));
    assert_eq!(log.entries(), vec!["child", "root"]);
    assert_eq!(child.refs(), 1);
}

/// Test: Unwinding a panic releases the tracker
#[test]
fn test_panic_releases() {
    init_logging();

    let log = ReleaseLog::new();
    let root = MockObject::new("root", &log);
    let held = root.clone();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut tracker = ReleaseTracker::new();
        adopt_root(&mut tracker, &held);
        panic!("caller bug");
    }));

    assert!(outcome.is_err());
    assert_eq!(log.entries(), vec!["root"]);
    assert_eq!(root.refs(), 0);
}

/// Test: A marshal failure drops the arguments already built and the call
/// never reaches the object
#[test]
fn test_marshal_failure_leaves_no_stray_references() {
    init_logging();

    let log = ReleaseLog::new();
    let target = MockObject::new("target", &log);
    target.on("Combine", 5, |_| Outcome::Value(Variant::Empty));
    let good = MockObject::new("good", &log);
    let stale = MockObject::new("stale", &log);
    let engine = InvocationEngine::new();

    let result: oleauto::Result<DynamicValue> = with_scope(|rel| {
        let target_ref = adopt_root(rel, &target);
        let good_ref = adopt_root(rel, &good);
        let stale_ref = adopt_root(rel, &stale);
        assert!(rel.release_now(&stale_ref));

        // the last argument is marshalled first
        let args = [DynamicValue::from(&stale_ref), DynamicValue::from(&good_ref)];
        let err = engine
            .invoke_method(rel, &target_ref, "Combine", &args)
            .unwrap_err();
        assert!(matches!(err, Error::Released { .. }));
        assert_eq!(good.refs(), 1);

        // the scope is still usable after the failure
        engine.invoke_method(rel, &target_ref, "Combine", &[DynamicValue::from(&good_ref)])
    });

    assert!(result.is_ok());
    assert_eq!(target.calls().len(), 1);
    assert_eq!(target.calls()[0].args, vec!["VT_DISPATCH"]);
    assert_eq!(log.entries(), vec!["stale", "good", "good", "good", "target"]);
    assert_eq!(good.refs(), 0);
    assert_eq!(target.refs(), 0);
}

/// Test: Each new reference from a query or an add_ref is tracked on its own
#[test]
fn test_query_and_add_ref_are_tracked() {
    init_logging();

    let log = ReleaseLog::new();
    let object = MockObject::new("object", &log);

    {
        let mut tracker = ReleaseTracker::new();
        let unknown = tracker.adopt(object.clone(), iid::IUNKNOWN);
        let dispatch = unknown.query_interface(&mut tracker, &iid::IDISPATCH).unwrap();
        let extra = dispatch.add_ref(&mut tracker).unwrap();

        assert!(extra.same_object(&unknown));
        assert_ne!(unknown, dispatch);
        assert_eq!(dispatch, extra);
        assert_eq!(object.refs(), 3);
        assert_eq!(tracker.len(), 3);
    }

    assert_eq!(object.refs(), 0);
    assert_eq!(log.entries().len(), 3);
}

/// Test: Type information comes back tracked
#[test]
fn test_type_info_is_tracked() {
    init_logging();

    let log = ReleaseLog::new();
    let info = MockObject::new("typeinfo", &log);
    let object = MockObject::new("object", &log);
    object.set_type_info(info.clone());
    let engine = InvocationEngine::new();

    let count = with_scope(|rel| {
        let remote = adopt_root(rel, &object);
        let type_info = engine.type_info(rel, &remote)?;
        assert_eq!(type_info.iid(), iid::ITYPEINFO);
        engine.type_info_count(&remote)
    })
    .unwrap();

    assert_eq!(count, 1);
    assert_eq!(log.entries(), vec!["typeinfo", "object"]);
    assert_eq!(info.refs(), 1);
}

/// Test: Using a handle after its scope ended fails instead of calling out
#[test]
fn test_handle_outliving_scope_is_rejected() {
    init_logging();

    let log = ReleaseLog::new();
    let object = MockObject::new("object", &log);
    object.on("Count", 1, |_| Outcome::Value(Variant::I4(3)));
    let engine = InvocationEngine::new();

    let escaped = with_scope(|rel| Ok::<_, Error>(adopt_root(rel, &object))).unwrap();

    let err = with_scope(|rel| engine.invoke_get(rel, &escaped, "Count", &[])).unwrap_err();
    assert!(matches!(err, Error::Released { iid: released } if released == iid::IDISPATCH));
    assert!(object.calls().is_empty());
    assert_eq!(object.refs(), 0);
}
