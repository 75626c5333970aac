//! Late-bound automation over reference-counted foreign objects
//!
//! This crate drives objects that are reachable only through opaque method
//! tables and whose members are resolved by name at call time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller scope                         │
//! │              with_scope(|tracker| { ... })                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  InvocationEngine      │  DynamicValue     │ ReleaseTracker │
//! │  - name → MemberId     │  - host values    │ - LIFO release │
//! │  - marshal (reversed)  │  - Variant / Bstr │ - RemoteRef    │
//! │  - invoke / decode     │  - OLE dates      │   handles      │
//! ├─────────────────────────────────────────────────────────────┤
//! │          Unknown / Dispatch method tables (foreign)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │            wstr: UTF-16 transcoding, scratch pool           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`]: identifiers, status codes and the error type
//! - [`remote`]: method table traits and reference handles
//! - [`tracker`]: scoped release of acquired references
//! - [`variant`]: host values and their wire form
//! - [`dispatch`]: the invocation engine

pub mod dispatch;
pub mod remote;
pub mod tracker;
pub mod types;
pub mod variant;

pub use dispatch::{DispParams, DispatchKind, EngineConfig, ExcepInfo, InvocationEngine, RemoteException};
pub use remote::{ComPtr, Dispatch, RemoteRef, Unknown};
pub use tracker::{with_scope, Releasable, ReleaseTracker};
pub use types::{hresult, iid, Error, HResult, Iid, Lcid, MemberId, Result};
pub use variant::{Bstr, DynamicValue, VarType, Variant};
