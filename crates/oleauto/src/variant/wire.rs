//! Foreign tagged values (VARIANT)

use std::fmt;

use super::Bstr;
use crate::remote::ComPtr;

/// `VARIANT_BOOL` true
pub const VARIANT_TRUE: i16 = -1;
/// `VARIANT_BOOL` false
pub const VARIANT_FALSE: i16 = 0;

/// Variant type codes (VARTYPE)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum VarType {
    Empty = 0,
    Null = 1,
    I2 = 2,
    I4 = 3,
    R4 = 4,
    R8 = 5,
    Date = 7,
    Bstr = 8,
    Dispatch = 9,
    Error = 10,
    Bool = 11,
    Unknown = 13,
    I1 = 16,
    Ui1 = 17,
    Ui2 = 18,
    Ui4 = 19,
    I8 = 20,
    Ui8 = 21,
}

impl VarType {
    /// Wire name of the tag
    pub fn name(self) -> &'static str {
        match self {
            VarType::Empty => "VT_EMPTY",
            VarType::Null => "VT_NULL",
            VarType::I2 => "VT_I2",
            VarType::I4 => "VT_I4",
            VarType::R4 => "VT_R4",
            VarType::R8 => "VT_R8",
            VarType::Date => "VT_DATE",
            VarType::Bstr => "VT_BSTR",
            VarType::Dispatch => "VT_DISPATCH",
            VarType::Error => "VT_ERROR",
            VarType::Bool => "VT_BOOL",
            VarType::Unknown => "VT_UNKNOWN",
            VarType::I1 => "VT_I1",
            VarType::Ui1 => "VT_UI1",
            VarType::Ui2 => "VT_UI2",
            VarType::Ui4 => "VT_UI4",
            VarType::I8 => "VT_I8",
            VarType::Ui8 => "VT_UI8",
        }
    }
}

impl TryFrom<u16> for VarType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, u16> {
        Ok(match value {
            0 => VarType::Empty,
            1 => VarType::Null,
            2 => VarType::I2,
            3 => VarType::I4,
            4 => VarType::R4,
            5 => VarType::R8,
            7 => VarType::Date,
            8 => VarType::Bstr,
            9 => VarType::Dispatch,
            10 => VarType::Error,
            11 => VarType::Bool,
            13 => VarType::Unknown,
            16 => VarType::I1,
            17 => VarType::Ui1,
            18 => VarType::Ui2,
            19 => VarType::Ui4,
            20 => VarType::I8,
            21 => VarType::Ui8,
            other => return Err(other),
        })
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value as it crosses the foreign boundary
///
/// Strings and object references are owned: dropping a `Variant` frees its
/// string and releases its reference, as clearing a VARIANT does.
#[derive(Clone, Debug, Default)]
pub enum Variant {
    #[default]
    Empty,
    Null,
    /// `VARIANT_BOOL`: [`VARIANT_TRUE`] or [`VARIANT_FALSE`]
    Bool(i16),
    I1(i8),
    I2(i16),
    I4(i32),
    I8(i64),
    Ui1(u8),
    Ui2(u16),
    Ui4(u32),
    Ui8(u64),
    R4(f32),
    R8(f64),
    /// Days since 1899-12-30
    Date(f64),
    Bstr(Bstr),
    Dispatch(ComPtr),
    Unknown(ComPtr),
    /// SCODE
    Error(i32),
}

impl Variant {
    /// Type tag
    pub fn vt(&self) -> VarType {
        match self {
            Variant::Empty => VarType::Empty,
            Variant::Null => VarType::Null,
            Variant::Bool(_) => VarType::Bool,
            Variant::I1(_) => VarType::I1,
            Variant::I2(_) => VarType::I2,
            Variant::I4(_) => VarType::I4,
            Variant::I8(_) => VarType::I8,
            Variant::Ui1(_) => VarType::Ui1,
            Variant::Ui2(_) => VarType::Ui2,
            Variant::Ui4(_) => VarType::Ui4,
            Variant::Ui8(_) => VarType::Ui8,
            Variant::R4(_) => VarType::R4,
            Variant::R8(_) => VarType::R8,
            Variant::Date(_) => VarType::Date,
            Variant::Bstr(_) => VarType::Bstr,
            Variant::Dispatch(_) => VarType::Dispatch,
            Variant::Unknown(_) => VarType::Unknown,
            Variant::Error(_) => VarType::Error,
        }
    }

    /// Free the payload and reset to empty
    pub fn clear(&mut self) {
        *self = Variant::Empty;
    }

    /// Move the value out, leaving empty behind
    pub fn take(&mut self) -> Variant {
        std::mem::take(self)
    }
}
