//! Late-bound invocation
//!
//! - [`InvocationEngine`]: name resolution, marshalling, invoke, decode
//! - [`DispParams`]: argument block in wire order
//! - [`ExcepInfo`] / [`RemoteException`]: structured exceptions raised by
//!   the callee

mod engine;
mod exception;
mod params;

pub use engine::{EngineConfig, InvocationEngine};
pub use exception::{ExcepInfo, RemoteException};
pub use params::{DispParams, DispatchKind};
