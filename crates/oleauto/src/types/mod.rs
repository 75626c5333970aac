//! Core automation types
//!
//! - Identifiers: IID, LCID, member ids (DISPID)
//! - Status codes: HRESULT
//! - The crate error type

mod error;
mod status;
mod identifiers;

pub use error::*;
pub use status::{hresult, HResult};
pub use identifiers::{Iid, Lcid, MemberId};

/// Well-known interface ids
pub mod iid {
    use super::Iid;

    /// Null IID, passed where an interface id is reserved
    pub const NULL: Iid = Iid::NIL;
    /// IUnknown
    pub const IUNKNOWN: Iid = Iid::from_u128(0x00000000_0000_0000_c000_000000000046);
    /// IDispatch
    pub const IDISPATCH: Iid = Iid::from_u128(0x00020400_0000_0000_c000_000000000046);
    /// ITypeInfo
    pub const ITYPEINFO: Iid = Iid::from_u128(0x00020401_0000_0000_c000_000000000046);
}
