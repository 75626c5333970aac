//! Late-bound call engine
//!
//! Every call runs the same four steps:
//!
//! ```text
//! resolve ──► marshal ──► invoke ──► decode
//! name→id     reverse      kind       value | RemoteException | ForeignFailure
//!             (+PUT tag)
//! ```
//!
//! Member ids are never cached here; callers that repeat a call can resolve
//! once with [`InvocationEngine::get_ids_of_names`] and use
//! [`InvocationEngine::invoke_by_id`].

use std::slice;

use wstr::ScratchBufferPool;

use super::{DispParams, DispatchKind, ExcepInfo};
use crate::remote::RemoteRef;
use crate::types::{hresult, iid, Error, Lcid, MemberId, Result};
use crate::variant::{DynamicValue, Variant};
use crate::ReleaseTracker;

/// Configuration for the invocation engine
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Locale passed with every name lookup and call
    pub lcid: Lcid,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lcid: Lcid::USER_DEFAULT,
        }
    }
}

impl EngineConfig {
    /// Set the locale
    pub fn with_lcid(mut self, lcid: Lcid) -> Self {
        self.lcid = lcid;
        self
    }
}

/// Issues late-bound calls against remote objects
#[derive(Debug)]
pub struct InvocationEngine<'p> {
    config: EngineConfig,
    pool: &'p ScratchBufferPool,
}

impl InvocationEngine<'static> {
    /// Engine with the default configuration and the process-wide pool
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine using the process-wide pool
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_pool(config, ScratchBufferPool::global())
    }
}

impl Default for InvocationEngine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> InvocationEngine<'p> {
    /// Engine transcoding through `pool`
    pub fn with_pool(config: EngineConfig, pool: &'p ScratchBufferPool) -> Self {
        Self { config, pool }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> &'p ScratchBufferPool {
        self.pool
    }

    /// Resolve `member` and its named parameter labels.
    ///
    /// Returns one id per name, the member's first.
    pub fn get_ids_of_names(&self, object: &RemoteRef, member: &str, params: &[&str]) -> Result<Vec<MemberId>> {
        let dispatch = object.dispatch()?;

        let total = std::iter::once(member)
            .chain(params.iter().copied())
            .map(|name| wstr::encoded_len(name) + 1)
            .sum();
        let mut scratch = self.pool.acquire_or_private(total);
        let mut ranges = Vec::with_capacity(params.len() + 1);
        ranges.push(scratch.push_str_nul(member)?);
        for param in params {
            ranges.push(scratch.push_str_nul(param)?);
        }

        let units = scratch.as_slice();
        let names: Vec<&[u16]> = ranges.iter().map(|range| &units[range.clone()]).collect();
        let mut ids = vec![MemberId::UNKNOWN; names.len()];
        let status = dispatch.get_ids_of_names(&names, self.config.lcid, &mut ids);

        if status.failed() {
            // report the first label the callee could not map
            let name = match ids.iter().position(|id| *id == MemberId::UNKNOWN) {
                Some(index) if index > 0 => params[index - 1],
                _ => member,
            };
            tracing::debug!(member, name, %status, "name resolution failed");
            return Err(Error::NameNotFound {
                name: name.to_owned(),
                hresult: status,
            });
        }

        tracing::debug!(member, id = ?ids[0], "resolved member");
        Ok(ids)
    }

    /// Call `member` with an argument block already in wire order.
    ///
    /// The block is consumed: its values are freed once the call returns.
    pub fn invoke(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        member: MemberId,
        kind: DispatchKind,
        mut params: DispParams,
    ) -> Result<DynamicValue> {
        let dispatch = object.dispatch()?;
        let mut result = Variant::Empty;
        let mut excep = ExcepInfo::default();

        let status = dispatch.invoke(member, self.config.lcid, kind, &mut params, &mut result, &mut excep);
        drop(params);

        if status == hresult::DISP_E_EXCEPTION {
            let exception = excep.into_exception(self.pool);
            tracing::debug!(?member, %kind, %exception, "remote exception");
            return Err(Error::RemoteException(Box::new(exception)));
        }
        if status.failed() {
            tracing::debug!(?member, %kind, %status, "call failed");
            return Err(Error::ForeignFailure(status));
        }
        if excep.is_filled() {
            tracing::warn!(?member, %kind, %status, "exception slot filled on success, discarding");
        }

        tracing::debug!(?member, %kind, vt = %result.vt(), "call returned");
        DynamicValue::from_variant(result, tracker, self.pool)
    }

    /// Marshal `args` and call a member resolved earlier
    pub fn invoke_by_id(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        member: MemberId,
        kind: DispatchKind,
        args: &[DynamicValue],
    ) -> Result<DynamicValue> {
        let params = self.marshal(kind, args)?;
        self.invoke(tracker, object, member, kind, params)
    }

    /// Read a property
    pub fn invoke_get(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        name: &str,
        args: &[DynamicValue],
    ) -> Result<DynamicValue> {
        self.call(tracker, object, name, DispatchKind::PropertyGet, args)
    }

    /// Read a property holding an object
    pub fn invoke_get_object(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        name: &str,
        args: &[DynamicValue],
    ) -> Result<RemoteRef> {
        let value = self.invoke_get(tracker, object, name, args)?;
        self.reinterpret(tracker, name, DispatchKind::PropertyGet, value)
    }

    /// Call a method
    pub fn invoke_method(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        name: &str,
        args: &[DynamicValue],
    ) -> Result<DynamicValue> {
        self.call(tracker, object, name, DispatchKind::Method, args)
    }

    /// Call a method returning an object
    pub fn invoke_method_object(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        name: &str,
        args: &[DynamicValue],
    ) -> Result<RemoteRef> {
        let value = self.invoke_method(tracker, object, name, args)?;
        self.reinterpret(tracker, name, DispatchKind::Method, value)
    }

    /// Assign a property
    pub fn invoke_put(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        name: &str,
        value: &DynamicValue,
    ) -> Result<DynamicValue> {
        self.call(tracker, object, name, DispatchKind::PropertyPut, slice::from_ref(value))
    }

    /// Assign a property whose call returns an object
    pub fn invoke_put_object(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        name: &str,
        value: &DynamicValue,
    ) -> Result<RemoteRef> {
        let result = self.invoke_put(tracker, object, name, value)?;
        self.reinterpret(tracker, name, DispatchKind::PropertyPut, result)
    }

    /// Number of type information objects the object provides (0 or 1)
    pub fn type_info_count(&self, object: &RemoteRef) -> Result<u32> {
        object
            .dispatch()?
            .get_type_info_count()
            .map_err(Error::ForeignFailure)
    }

    /// The object's type information, tracked by `tracker`
    pub fn type_info(&self, tracker: &mut ReleaseTracker, object: &RemoteRef) -> Result<RemoteRef> {
        let info = object
            .dispatch()?
            .get_type_info(0, self.config.lcid)
            .map_err(Error::ForeignFailure)?;
        Ok(tracker.adopt(info, iid::ITYPEINFO))
    }

    fn call(
        &self,
        tracker: &mut ReleaseTracker,
        object: &RemoteRef,
        name: &str,
        kind: DispatchKind,
        args: &[DynamicValue],
    ) -> Result<DynamicValue> {
        let ids = self.get_ids_of_names(object, name, &[])?;
        self.invoke_by_id(tracker, object, ids[0], kind, args)
    }

    /// Build the argument block, last argument first.
    ///
    /// A value that fails to marshal drops the ones already built, releasing
    /// their references.
    fn marshal(&self, kind: DispatchKind, args: &[DynamicValue]) -> Result<DispParams> {
        let mut params = DispParams::new();
        if args.is_empty() {
            return Ok(params);
        }

        let wire = args
            .iter()
            .rev()
            .map(|arg| arg.to_variant(self.pool))
            .collect::<Result<Vec<_>>>()?;
        params.set_args(wire);

        if kind == DispatchKind::PropertyPut {
            params.set_named_args(vec![MemberId::PROPERTYPUT]);
        }
        Ok(params)
    }

    fn reinterpret(
        &self,
        tracker: &mut ReleaseTracker,
        name: &str,
        kind: DispatchKind,
        value: DynamicValue,
    ) -> Result<RemoteRef> {
        let not_an_object = || Error::NotAnObject {
            member: name.to_owned(),
            kind,
        };

        match value {
            DynamicValue::Object(remote) if remote.is_dispatch() => Ok(remote),
            DynamicValue::Object(remote) => remote
                .query_interface(tracker, &iid::IDISPATCH)
                .map_err(|_| not_an_object()),
            _ => Err(not_an_object()),
        }
    }
}
