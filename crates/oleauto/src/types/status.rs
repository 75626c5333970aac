//! HRESULT status codes

use std::fmt;

/// Status code returned by every foreign entry point
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HResult(pub u32);

impl HResult {
    /// Severity bit clear (`SUCCEEDED`)
    pub fn succeeded(self) -> bool {
        self.0 & 0x8000_0000 == 0
    }

    /// Severity bit set (`FAILED`)
    pub fn failed(self) -> bool {
        !self.succeeded()
    }

    /// Facility field
    pub fn facility(self) -> u16 {
        ((self.0 >> 16) & 0x1fff) as u16
    }

    /// Code field
    pub fn code(self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    /// Symbolic name for the codes this crate knows about
    pub fn name(self) -> Option<&'static str> {
        use hresult::*;
        let name = match self {
            S_OK => "S_OK",
            S_FALSE => "S_FALSE",
            E_NOTIMPL => "E_NOTIMPL",
            E_NOINTERFACE => "E_NOINTERFACE",
            E_POINTER => "E_POINTER",
            E_FAIL => "E_FAIL",
            E_UNEXPECTED => "E_UNEXPECTED",
            E_OUTOFMEMORY => "E_OUTOFMEMORY",
            E_INVALIDARG => "E_INVALIDARG",
            DISP_E_UNKNOWNINTERFACE => "DISP_E_UNKNOWNINTERFACE",
            DISP_E_MEMBERNOTFOUND => "DISP_E_MEMBERNOTFOUND",
            DISP_E_PARAMNOTFOUND => "DISP_E_PARAMNOTFOUND",
            DISP_E_TYPEMISMATCH => "DISP_E_TYPEMISMATCH",
            DISP_E_UNKNOWNNAME => "DISP_E_UNKNOWNNAME",
            DISP_E_EXCEPTION => "DISP_E_EXCEPTION",
            DISP_E_UNKNOWNLCID => "DISP_E_UNKNOWNLCID",
            DISP_E_BADPARAMCOUNT => "DISP_E_BADPARAMCOUNT",
            RPC_E_DISCONNECTED => "RPC_E_DISCONNECTED",
            CO_E_OBJNOTCONNECTED => "CO_E_OBJNOTCONNECTED",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "HRESULT({name})"),
            None => write!(f, "HRESULT(0x{:08x})", self.0),
        }
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "0x{:08x} {}", self.0, name),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

impl From<i32> for HResult {
    fn from(value: i32) -> Self {
        Self(value as u32)
    }
}

/// HRESULT codes used at the dispatch boundary
pub mod hresult {
    use super::HResult;

    /// Operation successful
    pub const S_OK: HResult = HResult(0x0000_0000);
    /// Operation successful, returning false
    pub const S_FALSE: HResult = HResult(0x0000_0001);
    /// Not implemented
    pub const E_NOTIMPL: HResult = HResult(0x8000_4001);
    /// No such interface supported
    pub const E_NOINTERFACE: HResult = HResult(0x8000_4002);
    /// Invalid pointer
    pub const E_POINTER: HResult = HResult(0x8000_4003);
    /// Unspecified error
    pub const E_FAIL: HResult = HResult(0x8000_4005);
    /// Catastrophic failure
    pub const E_UNEXPECTED: HResult = HResult(0x8000_FFFF);
    /// Out of memory
    pub const E_OUTOFMEMORY: HResult = HResult(0x8007_000E);
    /// Invalid argument
    pub const E_INVALIDARG: HResult = HResult(0x8007_0057);
    /// Interface id passed to Invoke was not IID_NULL
    pub const DISP_E_UNKNOWNINTERFACE: HResult = HResult(0x8002_0001);
    /// Member exists but cannot be used with the requested dispatch kind
    pub const DISP_E_MEMBERNOTFOUND: HResult = HResult(0x8002_0003);
    /// Named parameter not found
    pub const DISP_E_PARAMNOTFOUND: HResult = HResult(0x8002_0004);
    /// Argument could not be coerced
    pub const DISP_E_TYPEMISMATCH: HResult = HResult(0x8002_0005);
    /// Name not known to the object
    pub const DISP_E_UNKNOWNNAME: HResult = HResult(0x8002_0006);
    /// The callee raised an exception, details in the exception slot
    pub const DISP_E_EXCEPTION: HResult = HResult(0x8002_0009);
    /// Locale not recognized
    pub const DISP_E_UNKNOWNLCID: HResult = HResult(0x8002_000C);
    /// Wrong number of arguments
    pub const DISP_E_BADPARAMCOUNT: HResult = HResult(0x8002_000E);
    /// The object invoked has disconnected from its clients
    pub const RPC_E_DISCONNECTED: HResult = HResult(0x8001_0108);
    /// Object is not connected to the server
    pub const CO_E_OBJNOTCONNECTED: HResult = HResult(0x8004_01FD);
}
