//! Length-prefixed wide strings
//!
//! Layout:
//! ```text
//! byte_len: u32       # little endian, terminator not counted
//! units[byte_len / 2] # UTF-16LE
//! 0x0000              # terminator
//! ```

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use wstr::ScratchBufferPool;

const PREFIX_LEN: usize = 4;
const TERMINATOR_LEN: usize = 2;

/// Foreign-allocated text, owned by whoever holds it
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Bstr(Bytes);

impl Bstr {
    /// Allocate from UTF-16 code units
    pub fn from_wide(units: &[u16]) -> Self {
        let byte_len = units.len() * 2;
        let mut buf = BytesMut::with_capacity(PREFIX_LEN + byte_len + TERMINATOR_LEN);
        buf.put_u32_le(byte_len as u32);
        for &unit in units {
            buf.put_u16_le(unit);
        }
        buf.put_u16_le(0);
        Self(buf.freeze())
    }

    /// Allocate from host text, transcoding through the scratch pool
    pub fn from_str_in(s: &str, pool: &ScratchBufferPool) -> Self {
        let mut scratch = pool.acquire_or_private(wstr::encoded_len(s));
        scratch.push_str(s);
        Self::from_wide(scratch.as_slice())
    }

    /// Length in bytes, excluding the terminator
    pub fn byte_len(&self) -> usize {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]) as usize
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.byte_len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.byte_len() == 0
    }

    /// The code units, in order
    pub fn units(&self) -> impl Iterator<Item = u16> + '_ {
        self.0[PREFIX_LEN..PREFIX_LEN + self.byte_len()]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Whole allocation, prefix and terminator included
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode into host text through the scratch pool
    pub fn to_string_in(&self, pool: &ScratchBufferPool) -> String {
        let mut scratch = pool.acquire_or_private(self.len());
        scratch.extend_units(self.units());
        scratch.to_string_lossy()
    }
}

impl fmt::Debug for Bstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units: Vec<u16> = self.units().collect();
        write!(f, "Bstr({:?})", wstr::decode(&units))
    }
}
