//! Marshallable values
//!
//! [`DynamicValue`] is the host-side closed union callers build arguments
//! from and receive results as. [`Variant`] is its wire form: text becomes a
//! [`Bstr`], dates become OLE automation dates and object handles become
//! counted references.

mod bstr;
mod date;
mod wire;

pub use bstr::Bstr;
pub use date::{from_ole_date, to_ole_date};
pub use wire::{VarType, Variant, VARIANT_FALSE, VARIANT_TRUE};

use chrono::NaiveDateTime;
use wstr::ScratchBufferPool;

use crate::remote::RemoteRef;
use crate::types::{iid, Error, Result};
use crate::ReleaseTracker;

/// A value passed to or returned from a late-bound call
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DynamicValue {
    #[default]
    Empty,
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Date(NaiveDateTime),
    Text(String),
    /// Handle to a reference owned by a tracker
    Object(RemoteRef),
    /// SCODE, as returned for missing optional arguments
    Error(i32),
}

macro_rules! accessor {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $ty:ty, $vt:ident) => {
        $(#[$doc])*
        pub fn $name(&self) -> Result<$ty> {
            match self {
                DynamicValue::$variant(value) => Ok(*value),
                other => Err(other.mismatch(VarType::$vt)),
            }
        }
    };
}

impl DynamicValue {
    /// Wire type this value marshals to
    pub fn var_type(&self) -> VarType {
        match self {
            DynamicValue::Empty => VarType::Empty,
            DynamicValue::Null => VarType::Null,
            DynamicValue::Bool(_) => VarType::Bool,
            DynamicValue::I8(_) => VarType::I1,
            DynamicValue::I16(_) => VarType::I2,
            DynamicValue::I32(_) => VarType::I4,
            DynamicValue::I64(_) => VarType::I8,
            DynamicValue::U8(_) => VarType::Ui1,
            DynamicValue::U16(_) => VarType::Ui2,
            DynamicValue::U32(_) => VarType::Ui4,
            DynamicValue::U64(_) => VarType::Ui8,
            DynamicValue::F32(_) => VarType::R4,
            DynamicValue::F64(_) => VarType::R8,
            DynamicValue::Date(_) => VarType::Date,
            DynamicValue::Text(_) => VarType::Bstr,
            DynamicValue::Object(remote) if remote.is_dispatch() => VarType::Dispatch,
            DynamicValue::Object(_) => VarType::Unknown,
            DynamicValue::Error(_) => VarType::Error,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DynamicValue::Empty)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    fn mismatch(&self, expected: VarType) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.var_type(),
        }
    }

    accessor!(as_bool, Bool, bool, Bool);
    accessor!(as_i8, I8, i8, I1);
    accessor!(as_i16, I16, i16, I2);
    accessor!(
        /// The value of a 32-bit integer, such as a collection `Count`
        as_i32, I32, i32, I4
    );
    accessor!(as_i64, I64, i64, I8);
    accessor!(as_u8, U8, u8, Ui1);
    accessor!(as_u16, U16, u16, Ui2);
    accessor!(as_u32, U32, u32, Ui4);
    accessor!(as_u64, U64, u64, Ui8);
    accessor!(as_f32, F32, f32, R4);
    accessor!(as_f64, F64, f64, R8);
    accessor!(as_date, Date, NaiveDateTime, Date);
    accessor!(
        /// The SCODE of an error value
        as_error, Error, i32, Error
    );

    pub fn as_str(&self) -> Result<&str> {
        match self {
            DynamicValue::Text(text) => Ok(text),
            other => Err(other.mismatch(VarType::Bstr)),
        }
    }

    pub fn as_object(&self) -> Result<&RemoteRef> {
        match self {
            DynamicValue::Object(remote) => Ok(remote),
            other => Err(other.mismatch(VarType::Dispatch)),
        }
    }

    pub fn into_object(self) -> Result<RemoteRef> {
        match self {
            DynamicValue::Object(remote) => Ok(remote),
            other => Err(other.mismatch(VarType::Dispatch)),
        }
    }

    /// Build the wire form.
    ///
    /// Object handles gain one counted reference, owned by the returned
    /// variant; a released handle fails with [`Error::Released`].
    pub fn to_variant(&self, pool: &ScratchBufferPool) -> Result<Variant> {
        Ok(match self {
            DynamicValue::Empty => Variant::Empty,
            DynamicValue::Null => Variant::Null,
            DynamicValue::Bool(value) => Variant::Bool(if *value { VARIANT_TRUE } else { VARIANT_FALSE }),
            DynamicValue::I8(value) => Variant::I1(*value),
            DynamicValue::I16(value) => Variant::I2(*value),
            DynamicValue::I32(value) => Variant::I4(*value),
            DynamicValue::I64(value) => Variant::I8(*value),
            DynamicValue::U8(value) => Variant::Ui1(*value),
            DynamicValue::U16(value) => Variant::Ui2(*value),
            DynamicValue::U32(value) => Variant::Ui4(*value),
            DynamicValue::U64(value) => Variant::Ui8(*value),
            DynamicValue::F32(value) => Variant::R4(*value),
            DynamicValue::F64(value) => Variant::R8(*value),
            DynamicValue::Date(value) => Variant::Date(to_ole_date(value)?),
            DynamicValue::Text(text) => Variant::Bstr(Bstr::from_str_in(text, pool)),
            DynamicValue::Object(remote) if remote.is_dispatch() => Variant::Dispatch(remote.counted()?),
            DynamicValue::Object(remote) => Variant::Unknown(remote.counted()?),
            DynamicValue::Error(scode) => Variant::Error(*scode),
        })
    }

    /// Decode a wire value, consuming it.
    ///
    /// References it carries are handed to `tracker`.
    pub fn from_variant(value: Variant, tracker: &mut ReleaseTracker, pool: &ScratchBufferPool) -> Result<Self> {
        Ok(match value {
            Variant::Empty => DynamicValue::Empty,
            Variant::Null => DynamicValue::Null,
            Variant::Bool(value) => DynamicValue::Bool(value != VARIANT_FALSE),
            Variant::I1(value) => DynamicValue::I8(value),
            Variant::I2(value) => DynamicValue::I16(value),
            Variant::I4(value) => DynamicValue::I32(value),
            Variant::I8(value) => DynamicValue::I64(value),
            Variant::Ui1(value) => DynamicValue::U8(value),
            Variant::Ui2(value) => DynamicValue::U16(value),
            Variant::Ui4(value) => DynamicValue::U32(value),
            Variant::Ui8(value) => DynamicValue::U64(value),
            Variant::R4(value) => DynamicValue::F32(value),
            Variant::R8(value) => DynamicValue::F64(value),
            Variant::Date(value) => DynamicValue::Date(from_ole_date(value)?),
            Variant::Bstr(text) => DynamicValue::Text(text.to_string_in(pool)),
            Variant::Dispatch(ptr) => DynamicValue::Object(ptr.into_tracked(tracker, iid::IDISPATCH)),
            Variant::Unknown(ptr) => DynamicValue::Object(ptr.into_tracked(tracker, iid::IUNKNOWN)),
            Variant::Error(scode) => DynamicValue::Error(scode),
        })
    }
}

macro_rules! from_host {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(value: $ty) -> Self {
                    DynamicValue::$variant(value)
                }
            }
        )*
    };
}

from_host! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    NaiveDateTime => Date,
    String => Text,
    RemoteRef => Object,
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::Text(value.to_owned())
    }
}

impl From<&RemoteRef> for DynamicValue {
    fn from(value: &RemoteRef) -> Self {
        DynamicValue::Object(value.clone())
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DynamicValue::Null, Into::into)
    }
}
