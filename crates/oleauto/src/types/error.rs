//! Automation error types

use thiserror::Error;

use super::{hresult, HResult, Iid};
use crate::dispatch::{DispatchKind, RemoteException};
use crate::variant::VarType;

/// Result type for automation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Automation errors
#[derive(Error, Debug)]
pub enum Error {
    /// Name resolution failed for a member or a named parameter
    #[error("name not found: {name} ({hresult})")]
    NameNotFound { name: String, hresult: HResult },

    /// Value read as the wrong variant
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: VarType, found: VarType },

    /// Call result could not be reinterpreted as a remote object
    #[error("{kind} \"{member}\" didn't return an object")]
    NotAnObject { member: String, kind: DispatchKind },

    /// The callee raised a structured exception
    #[error("remote exception: {0}")]
    RemoteException(Box<RemoteException>),

    /// Any other failure status from a foreign call
    #[error("foreign call failed: {0}")]
    ForeignFailure(HResult),

    /// A remote reference was used after its tracker released it
    #[error("remote reference {iid} used after release")]
    Released { iid: Iid },

    /// Date outside the range the wire format can carry
    #[error("date out of range: {0}")]
    DateOutOfRange(String),

    /// Text that cannot cross the boundary, such as a name with a NUL
    #[error("invalid text: {0}")]
    Wstr(#[from] wstr::WstrError),
}

impl Error {
    /// Status code that best describes this error
    pub fn hresult(&self) -> HResult {
        match self {
            Error::NameNotFound { hresult, .. } => *hresult,
            Error::TypeMismatch { .. } => hresult::DISP_E_TYPEMISMATCH,
            Error::NotAnObject { .. } => hresult::E_NOINTERFACE,
            Error::RemoteException(exception) => exception.hresult(),
            Error::ForeignFailure(hresult) => *hresult,
            Error::Released { .. } => hresult::CO_E_OBJNOTCONNECTED,
            Error::DateOutOfRange(_) => hresult::E_INVALIDARG,
            Error::Wstr(_) => hresult::E_INVALIDARG,
        }
    }
}
