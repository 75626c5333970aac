//! Structured exceptions raised by a callee

use std::fmt;

use wstr::ScratchBufferPool;

use crate::types::{hresult, HResult};
use crate::variant::Bstr;

/// Exception slot filled by the callee (EXCEPINFO)
///
/// Owns its strings until converted with [`ExcepInfo::into_exception`].
#[derive(Clone, Debug, Default)]
pub struct ExcepInfo {
    /// Application error code; zero when `scode` is used
    pub code: u16,
    pub scode: i32,
    pub source: Option<Bstr>,
    pub description: Option<Bstr>,
    pub help_file: Option<Bstr>,
    pub help_context: u32,
}

impl ExcepInfo {
    /// Whether the callee wrote anything
    pub fn is_filled(&self) -> bool {
        self.code != 0
            || self.scode != 0
            || self.source.is_some()
            || self.description.is_some()
            || self.help_file.is_some()
            || self.help_context != 0
    }

    /// Convert into a host error, freeing the foreign strings
    pub fn into_exception(self, pool: &ScratchBufferPool) -> RemoteException {
        let text = |bstr: Option<Bstr>| bstr.map(|b| b.to_string_in(pool)).unwrap_or_default();
        RemoteException {
            code: self.code,
            scode: self.scode,
            source: text(self.source),
            description: text(self.description),
            help_file: text(self.help_file),
            help_context: self.help_context,
        }
    }
}

/// Exception raised by a remote member
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteException {
    pub code: u16,
    pub scode: i32,
    pub source: String,
    pub description: String,
    /// Help file path or link
    pub help_file: String,
    pub help_context: u32,
}

impl RemoteException {
    /// The status describing the exception: its `scode` if set
    pub fn hresult(&self) -> HResult {
        if self.scode != 0 {
            HResult::from(self.scode)
        } else {
            hresult::DISP_E_EXCEPTION
        }
    }
}

impl fmt::Display for RemoteException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.hresult())?;
        } else {
            f.write_str(&self.description)?;
        }
        if !self.source.is_empty() {
            write!(f, " (source: {})", self.source)?;
        }
        if self.code != 0 {
            write!(f, " [code {}]", self.code)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteException {}
