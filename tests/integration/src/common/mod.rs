//! Common test utilities
//!
//! Scripted foreign objects: each member name maps to a behavior that builds
//! the call outcome, every call is recorded, and every release is appended
//! to a log shared by all objects of a test.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use oleauto::{
    hresult, iid, ComPtr, DispParams, Dispatch, DispatchKind, ExcepInfo, HResult, Iid, Lcid,
    MemberId, Unknown, Variant,
};

/// Initialize test logging; safe to call from every test
pub fn init_logging() {
    let _ = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Names of released objects, in release order
#[derive(Clone, Default)]
pub struct ReleaseLog(Arc<Mutex<Vec<&'static str>>>);

impl ReleaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, name: &'static str) {
        self.0.lock().push(name);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().clone()
    }
}

/// What a scripted member does when invoked
pub enum Outcome {
    /// Succeed with this result
    Value(Variant),
    /// Succeed, but also leave the exception slot filled
    ValueWithStaleException(Variant, ExcepInfo),
    /// Raise a structured exception
    Exception(ExcepInfo),
    /// Fail with this status
    Status(HResult),
}

type Behavior = Arc<dyn Fn(&DispParams) -> Outcome + Send + Sync>;

/// One recorded invoke
#[derive(Clone, Debug, PartialEq)]
pub struct CallRecord {
    pub member: MemberId,
    pub kind: DispatchKind,
    /// Arguments in wire order, rendered by [`describe`]
    pub args: Vec<String>,
    pub named_args: Vec<MemberId>,
}

/// Render a wire value for call records
pub fn describe(value: &Variant) -> String {
    match value {
        Variant::I4(value) => value.to_string(),
        Variant::Bstr(text) => {
            let units: Vec<u16> = text.units().collect();
            wstr::decode(&units)
        }
        Variant::Dispatch(_) | Variant::Unknown(_) => value.vt().to_string(),
        other => format!("{:?}", other),
    }
}

/// A scripted remote object
pub struct MockObject {
    name: &'static str,
    refs: AtomicU32,
    log: ReleaseLog,
    answers_dispatch: AtomicBool,
    members: Mutex<HashMap<String, (MemberId, Behavior)>>,
    calls: Mutex<Vec<CallRecord>>,
    type_info: Mutex<Option<Arc<MockObject>>>,
}

impl MockObject {
    /// A new object holding one reference, owned by the caller
    pub fn new(name: &'static str, log: &ReleaseLog) -> Arc<Self> {
        Arc::new(Self {
            name,
            refs: AtomicU32::new(1),
            log: log.clone(),
            answers_dispatch: AtomicBool::new(true),
            members: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            type_info: Mutex::new(None),
        })
    }

    /// Script member `name` with id `id`
    pub fn on<F>(&self, name: &str, id: i32, behavior: F)
    where
        F: Fn(&DispParams) -> Outcome + Send + Sync + 'static,
    {
        let behavior: Behavior = Arc::new(behavior);
        self.members
            .lock()
            .insert(name.to_owned(), (MemberId(id), behavior));
    }

    /// Make queries for the late-bound interface fail
    pub fn refuse_dispatch(&self) {
        self.answers_dispatch.store(false, Ordering::SeqCst);
    }

    pub fn set_type_info(&self, info: Arc<MockObject>) {
        *self.type_info.lock() = Some(info);
    }

    /// A new counted reference, as a callee returns it
    pub fn new_ref(self: &Arc<Self>) -> ComPtr {
        self.add_ref();
        ComPtr::from_counted(self.clone())
    }

    pub fn refs(&self) -> u32 {
        self.refs.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Unknown for MockObject {
    fn add_ref(&self) -> u32 {
        self.refs.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) -> u32 {
        self.log.record(self.name);
        self.refs.fetch_sub(1, Ordering::SeqCst) - 1
    }

    fn query_interface(self: Arc<Self>, iid: &Iid) -> Result<Arc<dyn Unknown>, HResult> {
        if *iid == iid::IDISPATCH && !self.answers_dispatch.load(Ordering::SeqCst) {
            return Err(hresult::E_NOINTERFACE);
        }
        self.add_ref();
        Ok(self)
    }

    fn as_dispatch(&self) -> Option<&dyn Dispatch> {
        Some(self)
    }
}

impl Dispatch for MockObject {
    fn get_type_info_count(&self) -> Result<u32, HResult> {
        Ok(u32::from(self.type_info.lock().is_some()))
    }

    fn get_type_info(&self, _index: u32, _lcid: Lcid) -> Result<Arc<dyn Unknown>, HResult> {
        match self.type_info.lock().as_ref() {
            Some(info) => {
                info.add_ref();
                Ok(info.clone())
            }
            None => Err(hresult::E_NOTIMPL),
        }
    }

    fn get_ids_of_names(&self, names: &[&[u16]], _lcid: Lcid, ids: &mut [MemberId]) -> HResult {
        let members = self.members.lock();
        let mut status = hresult::S_OK;
        for (name, id) in names.iter().zip(ids.iter_mut()) {
            let name = wstr::decode(wstr::until_nul(name));
            match members.get(&name) {
                Some((member, _)) => *id = *member,
                None => {
                    *id = MemberId::UNKNOWN;
                    status = hresult::DISP_E_UNKNOWNNAME;
                }
            }
        }
        status
    }

    fn invoke(
        &self,
        member: MemberId,
        _lcid: Lcid,
        kind: DispatchKind,
        params: &mut DispParams,
        result: &mut Variant,
        excep: &mut ExcepInfo,
    ) -> HResult {
        self.calls.lock().push(CallRecord {
            member,
            kind,
            args: params.args().iter().map(describe).collect(),
            named_args: params.named_args().to_vec(),
        });

        let behavior = self
            .members
            .lock()
            .values()
            .find(|(id, _)| *id == member)
            .map(|(_, behavior)| behavior.clone());
        let Some(behavior) = behavior else {
            return hresult::DISP_E_MEMBERNOTFOUND;
        };

        match (*behavior)(params) {
            Outcome::Value(value) => {
                *result = value;
                hresult::S_OK
            }
            Outcome::ValueWithStaleException(value, stale) => {
                *result = value;
                *excep = stale;
                hresult::S_OK
            }
            Outcome::Exception(info) => {
                *excep = info;
                hresult::DISP_E_EXCEPTION
            }
            Outcome::Status(status) => status,
        }
    }
}
