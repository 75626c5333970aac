//! Automation identifier types
//!
//! - IID: 128-bit interface identifier, the type tag of a remote reference
//! - LCID: locale passed along with name resolution and invocation
//! - DISPID: member identifier returned by name resolution

use std::fmt;

/// Interface Identifier (16 bytes / GUID)
///
/// Field layout follows the foreign GUID structure: one 32-bit, two 16-bit
/// and eight single-byte parts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Iid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Iid {
    /// Size of an IID in bytes
    pub const SIZE: usize = 16;

    /// Nil IID (all zeros)
    pub const NIL: Self = Self::from_u128(0);

    /// Build from the big-endian value of the canonical text form
    pub const fn from_u128(value: u128) -> Self {
        Self {
            data1: (value >> 96) as u32,
            data2: (value >> 80) as u16,
            data3: (value >> 64) as u16,
            data4: (value as u64).to_be_bytes(),
        }
    }

    /// Parse "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx", braces optional
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(s);
        uuid::Uuid::try_parse(s).ok().map(Self::from)
    }

    /// Generate a random v4 IID
    pub fn generate() -> Self {
        Self::from(uuid::Uuid::new_v4())
    }

    /// Check if this is the nil IID
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }
}

impl From<uuid::Uuid> for Iid {
    fn from(uuid: uuid::Uuid) -> Self {
        let (data1, data2, data3, data4) = uuid.as_fields();
        Self {
            data1,
            data2,
            data3,
            data4: *data4,
        }
    }
}

impl From<Iid> for uuid::Uuid {
    fn from(iid: Iid) -> Self {
        uuid::Uuid::from_fields(iid.data1, iid.data2, iid.data3, &iid.data4)
    }
}

impl fmt::Debug for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IID({})", self)
    }
}

impl fmt::Display for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from(*self).hyphenated())
    }
}

/// Locale Identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lcid(pub u32);

impl Lcid {
    /// Language neutral
    pub const NEUTRAL: Self = Self(0x0000);
    /// Default locale of the calling user
    pub const USER_DEFAULT: Self = Self(0x0400);
    /// Default locale of the system
    pub const SYSTEM_DEFAULT: Self = Self(0x0800);
}

impl Default for Lcid {
    fn default() -> Self {
        Self::USER_DEFAULT
    }
}

impl fmt::Debug for Lcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LCID(0x{:04x})", self.0)
    }
}

/// Member identifier (DISPID)
///
/// Names one method or property of a remote object's type. Obtained by name
/// resolution and valid for every object of that type in the session.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId(pub i32);

impl MemberId {
    /// Default member
    pub const VALUE: Self = Self(0);
    /// Returned for names the object does not know
    pub const UNKNOWN: Self = Self(-1);
    /// Tags the value argument of a property put
    pub const PROPERTYPUT: Self = Self(-3);
    /// Enumerator member
    pub const NEWENUM: Self = Self(-4);
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DISPID({})", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
