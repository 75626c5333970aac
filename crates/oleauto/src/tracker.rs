//! Scoped release of remote references
//!
//! Every foreign reference acquired during a unit of work is registered with
//! one [`ReleaseTracker`], which releases them in reverse order of
//! registration when the work ends: later objects may hold back-references
//! into earlier ones, so they go first.
//!
//! ```text
//! with_scope ─► adopt(root) ─► invoke ─► adopt(child) ─► ... ─► release
//!                                                      (child, then root)
//! ```

use std::fmt;
use std::sync::Arc;

use crate::remote::{RemoteRef, Unknown};
use crate::types::Iid;

/// A capability the tracker releases at scope end
pub trait Releasable {
    /// Give the resource back; called exactly once
    fn release(self: Box<Self>);
}

impl<F: FnOnce()> Releasable for F {
    fn release(self: Box<Self>) {
        (*self)()
    }
}

enum Entry {
    Remote(RemoteRef),
    Resource(Box<dyn Releasable>),
}

impl Entry {
    fn release(self) {
        match self {
            Entry::Remote(remote) => {
                remote.release();
            }
            Entry::Resource(resource) => resource.release(),
        }
    }
}

/// Ordered set of acquired references, released last-in first-out
///
/// Owned by one scope. Dropping the tracker releases whatever it still holds,
/// so panics and early returns are covered too.
#[derive(Default)]
pub struct ReleaseTracker {
    entries: Vec<Entry>,
}

impl ReleaseTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tracker with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of entries not yet released
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register any other releasable capability
    pub fn add<R: Releasable + 'static>(&mut self, resource: R) {
        self.entries.push(Entry::Resource(Box::new(resource)));
    }

    /// Take ownership of one already-counted reference to `object`, acquired
    /// as interface `iid`, and return the handle for it.
    pub fn adopt(&mut self, object: Arc<dyn Unknown>, iid: Iid) -> RemoteRef {
        let remote = RemoteRef::new(object, iid);
        self.entries.push(Entry::Remote(remote.clone()));
        remote
    }

    /// Whether `remote` is one of the references held here
    pub fn contains(&self, remote: &RemoteRef) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, Entry::Remote(held) if held.ptr_eq(remote)))
    }

    /// Release one tracked reference immediately and stop tracking it.
    ///
    /// Returns false if `remote` is not held by this tracker.
    pub fn release_now(&mut self, remote: &RemoteRef) -> bool {
        let position = self
            .entries
            .iter()
            .position(|entry| matches!(entry, Entry::Remote(held) if held.ptr_eq(remote)));

        match position {
            Some(index) => {
                self.entries.remove(index).release();
                true
            }
            None => false,
        }
    }

    /// Release everything, most recent first, and empty the tracker.
    ///
    /// Calling it again is a no-op.
    pub fn release(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        let count = self.entries.len();
        while let Some(entry) = self.entries.pop() {
            entry.release();
        }
        tracing::debug!(count, "release tracker unwound");
    }
}

impl Drop for ReleaseTracker {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ReleaseTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseTracker")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Run `f` with a fresh tracker and release it on every exit path.
///
/// # Example
///
/// ```no_run
/// # use oleauto::{with_scope, InvocationEngine, Result};
/// # fn open_root(rel: &mut oleauto::ReleaseTracker) -> Result<oleauto::RemoteRef> { unimplemented!() }
/// let engine = InvocationEngine::new();
/// let count = with_scope(|rel| {
///     let app = open_root(rel)?;
///     let books = engine.invoke_get_object(rel, &app, "Workbooks", &[])?;
///     engine.invoke_get(rel, &books, "Count", &[])?.as_i32()
/// })?;
/// # Ok::<(), oleauto::Error>(())
/// ```
pub fn with_scope<T, E, F>(f: F) -> std::result::Result<T, E>
where
    F: FnOnce(&mut ReleaseTracker) -> std::result::Result<T, E>,
{
    let mut tracker = ReleaseTracker::new();
    let result = f(&mut tracker);
    tracker.release();
    result
}
