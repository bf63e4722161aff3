// Fixed-capacity inline text used by record fields.
use std::fmt;

use serde::{Serialize, Serializer};

/// UTF-8 text stored inline in at most `N` bytes.
///
/// Input longer than `N` bytes is truncated silently at the last character
/// boundary that fits. Bytes past `len` are always zero, so the derived
/// equality and hashing only ever see the stored text.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundedText<const N: usize> {
    bytes: [u8; N],
    len: u8,
}

impl<const N: usize> BoundedText<N> {
    /// Maximum number of bytes the field can hold.
    pub const CAPACITY: usize = N;

    const LEN_FITS_U8: () = assert!(N <= u8::MAX as usize, "capacity must fit in a u8 length");

    pub fn new(text: &str) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LEN_FITS_U8;
        let end = floor_char_boundary(text, N);
        let mut bytes = [0u8; N];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self {
            bytes,
            len: end as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        // `new` only ever stores a prefix ending on a char boundary.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether storing `text` would cut it short.
    pub fn would_truncate(text: &str) -> bool {
        text.len() > N
    }
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    if text.len() <= max {
        return text.len();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

impl<const N: usize> Default for BoundedText<N> {
    fn default() -> Self {
        Self {
            bytes: [0u8; N],
            len: 0,
        }
    }
}

impl<const N: usize> From<&str> for BoundedText<N> {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl<const N: usize> AsRef<str> for BoundedText<N> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> PartialEq<str> for BoundedText<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for BoundedText<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> fmt::Debug for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> Serialize for BoundedText<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
