//! Remote object references
//!
//! A remote object is reachable only through its method table. The platform
//! binding (or a test double) exposes that table as the [`Unknown`] and
//! [`Dispatch`] traits; this crate never calls a slot directly.
//!
//! Two kinds of handle carry a foreign reference:
//!
//! - [`ComPtr`]: one counted reference, released when dropped. Values in
//!   flight (argument blocks, call results) hold these.
//! - [`RemoteRef`]: a handle to a reference owned by a
//!   [`ReleaseTracker`](crate::ReleaseTracker). Cloning it does not count;
//!   the tracker releases the reference exactly once and every handle fails
//!   with [`Error::Released`] afterwards.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::dispatch::{DispParams, DispatchKind, ExcepInfo};
use crate::types::{iid, Error, HResult, Iid, Lcid, MemberId, Result};
use crate::variant::Variant;
use crate::ReleaseTracker;

/// Base method table of every remote object
pub trait Unknown: Send + Sync {
    /// Increment the foreign reference count, returning the new count
    fn add_ref(&self) -> u32;

    /// Decrement the foreign reference count, returning the remaining count
    fn release(&self) -> u32;

    /// Ask for another interface on the same object.
    ///
    /// On success the returned object carries one reference counted for the
    /// caller.
    fn query_interface(self: Arc<Self>, iid: &Iid) -> std::result::Result<Arc<dyn Unknown>, HResult>;

    /// The late-bound method table, if the object has one
    fn as_dispatch(&self) -> Option<&dyn Dispatch> {
        None
    }
}

/// Late-bound method table
pub trait Dispatch: Unknown {
    /// 1 if the object provides type information, 0 otherwise
    fn get_type_info_count(&self) -> std::result::Result<u32, HResult>;

    /// Type information object, carrying one reference counted for the caller
    fn get_type_info(&self, index: u32, lcid: Lcid) -> std::result::Result<Arc<dyn Unknown>, HResult>;

    /// Map names to member ids.
    ///
    /// `names[0]` is the member, the rest are named parameter labels; each
    /// slice includes its NUL terminator. `ids` has one slot per name and
    /// unknown names get [`MemberId::UNKNOWN`].
    fn get_ids_of_names(&self, names: &[&[u16]], lcid: Lcid, ids: &mut [MemberId]) -> HResult;

    /// Call a member.
    ///
    /// `params` holds the arguments right to left. On `DISP_E_EXCEPTION` the
    /// callee fills `excep`.
    fn invoke(
        &self,
        member: MemberId,
        lcid: Lcid,
        kind: DispatchKind,
        params: &mut DispParams,
        result: &mut Variant,
        excep: &mut ExcepInfo,
    ) -> HResult;
}

/// One counted foreign reference
///
/// Dropping it releases the reference; [`ComPtr::into_tracked`] hands it to a
/// tracker instead.
pub struct ComPtr {
    object: Arc<dyn Unknown>,
    armed: bool,
}

impl ComPtr {
    /// Take ownership of a reference the caller already counted
    pub fn from_counted(object: Arc<dyn Unknown>) -> Self {
        Self {
            object,
            armed: true,
        }
    }

    /// The referenced object
    pub fn object(&self) -> &Arc<dyn Unknown> {
        &self.object
    }

    /// Hand the reference to `tracker`, which releases it at scope end
    pub fn into_tracked(self, tracker: &mut ReleaseTracker, iid: Iid) -> RemoteRef {
        tracker.adopt(self.into_counted(), iid)
    }

    fn into_counted(mut self) -> Arc<dyn Unknown> {
        self.armed = false;
        self.object.clone()
    }
}

impl Clone for ComPtr {
    fn clone(&self) -> Self {
        self.object.add_ref();
        Self::from_counted(self.object.clone())
    }
}

impl Drop for ComPtr {
    fn drop(&mut self) {
        if self.armed {
            self.object.release();
        }
    }
}

impl fmt::Debug for ComPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComPtr({:p})", Arc::as_ptr(&self.object) as *const ())
    }
}

struct Slot {
    object: Arc<dyn Unknown>,
    iid: Iid,
    released: AtomicBool,
}

/// Handle to a tracked remote reference
///
/// Created only by a [`ReleaseTracker`]; the tracker owns the reference.
/// Two handles compare equal when they point at the same foreign object
/// through the same interface.
#[derive(Clone)]
pub struct RemoteRef {
    slot: Arc<Slot>,
}

impl RemoteRef {
    pub(crate) fn new(object: Arc<dyn Unknown>, iid: Iid) -> Self {
        Self {
            slot: Arc::new(Slot {
                object,
                iid,
                released: AtomicBool::new(false),
            }),
        }
    }

    /// Interface this reference was acquired as
    pub fn iid(&self) -> Iid {
        self.slot.iid
    }

    /// Whether the owning tracker already released the reference
    pub fn is_released(&self) -> bool {
        self.slot.released.load(Ordering::Acquire)
    }

    /// Whether both handles are the same tracked reference
    pub fn ptr_eq(&self, other: &RemoteRef) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    /// Whether both handles reach the same foreign object
    pub fn same_object(&self, other: &RemoteRef) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.slot.object) as *const (),
            Arc::as_ptr(&other.slot.object) as *const (),
        )
    }

    /// The foreign object, unless the reference was released
    pub fn object(&self) -> Result<&Arc<dyn Unknown>> {
        if self.is_released() {
            return Err(Error::Released { iid: self.slot.iid });
        }
        Ok(&self.slot.object)
    }

    /// The late-bound method table of the object
    pub fn dispatch(&self) -> Result<&dyn Dispatch> {
        self.object()?
            .as_dispatch()
            .ok_or(Error::ForeignFailure(crate::types::hresult::E_NOINTERFACE))
    }

    /// Query another interface; the new reference is tracked by `tracker`
    pub fn query_interface(&self, tracker: &mut ReleaseTracker, iid: &Iid) -> Result<RemoteRef> {
        let queried = self
            .object()?
            .clone()
            .query_interface(iid)
            .map_err(Error::ForeignFailure)?;
        Ok(tracker.adopt(queried, *iid))
    }

    /// Count one more reference to the same interface, tracked by `tracker`
    pub fn add_ref(&self, tracker: &mut ReleaseTracker) -> Result<RemoteRef> {
        let object = self.object()?;
        object.add_ref();
        Ok(tracker.adopt(object.clone(), self.slot.iid))
    }

    /// A new counted reference for a value leaving this scope
    pub(crate) fn counted(&self) -> Result<ComPtr> {
        let object = self.object()?;
        object.add_ref();
        Ok(ComPtr::from_counted(object.clone()))
    }

    /// Release the reference if nobody did yet; true if this call released it
    pub(crate) fn release(&self) -> bool {
        if self.slot.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        // nothing can be done about a failed release
        let remaining = self.slot.object.release();
        tracing::trace!(iid = %self.slot.iid, remaining, "released remote reference");
        true
    }

    /// Whether the reference was acquired as the late-bound interface
    pub fn is_dispatch(&self) -> bool {
        self.slot.iid == iid::IDISPATCH
    }
}

impl PartialEq for RemoteRef {
    fn eq(&self, other: &Self) -> bool {
        self.iid() == other.iid() && self.same_object(other)
    }
}

impl fmt::Debug for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRef")
            .field("iid", &self.slot.iid)
            .field("object", &(Arc::as_ptr(&self.slot.object) as *const ()))
            .field("released", &self.is_released())
            .finish()
    }
}
