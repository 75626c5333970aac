//! Argument blocks

use std::fmt;

use crate::types::MemberId;
use crate::variant::Variant;

/// Kind of late-bound call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchKind {
    /// `DISPATCH_METHOD`
    Method,
    /// `DISPATCH_PROPERTYGET`
    PropertyGet,
    /// `DISPATCH_PROPERTYPUT`
    PropertyPut,
}

impl DispatchKind {
    /// Wire flag value
    pub fn flags(self) -> u16 {
        match self {
            DispatchKind::Method => 1,
            DispatchKind::PropertyGet => 2,
            DispatchKind::PropertyPut => 4,
        }
    }
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DispatchKind::Method => "InvokeMethod",
            DispatchKind::PropertyGet => "InvokeGet",
            DispatchKind::PropertyPut => "InvokePut",
        })
    }
}

/// Arguments of one call (DISPPARAMS)
///
/// Positional arguments are stored right to left: the caller's last
/// argument is at index 0. Named arguments label the first
/// `named_args.len()` entries.
#[derive(Debug, Default)]
pub struct DispParams {
    args: Vec<Variant>,
    named_args: Vec<MemberId>,
}

impl DispParams {
    /// Empty argument block
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the arguments; `args` must already be in wire order
    pub fn set_args(&mut self, args: Vec<Variant>) {
        self.args = args;
    }

    pub fn set_named_args(&mut self, named_args: Vec<MemberId>) {
        self.named_args = named_args;
    }

    /// Arguments in wire order
    pub fn args(&self) -> &[Variant] {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut [Variant] {
        &mut self.args
    }

    pub fn named_args(&self) -> &[MemberId] {
        &self.named_args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn named_arg_count(&self) -> usize {
        self.named_args.len()
    }

    /// Argument by its position in the caller's list
    pub fn arg(&self, caller_index: usize) -> Option<&Variant> {
        let len = self.args.len();
        caller_index
            .checked_add(1)
            .and_then(|n| len.checked_sub(n))
            .map(|index| &self.args[index])
    }
}
