use std::{fmt, str};

use fstr::FStr;

/// Represents a Universally Unique IDentifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid(pub(crate) [u8; 16]);

/// Optional prefix accepted by [`validate`] and the strict parser.
const URN_PREFIX: &str = "urn:uuid:";

/// Lookup table from a byte to its two lowercase hexadecimal digits.
const HEX_PAIRS: [[u8; 2]; 256] = {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut table = [[0u8; 2]; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = [DIGITS[i >> 4], DIGITS[i & 15]];
        i += 1;
    }
    table
};

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the variant field value of the UUID.
    pub const fn variant(&self) -> Variant {
        match self.0[8] >> 4 {
            0x0..=0x7 => Variant::Var0,
            0x8..=0xb => Variant::Var10,
            0xc..=0xd => Variant::Var110,
            _ => Variant::VarReserved,
        }
    }

    /// Returns the version field value of the UUID or `None` if the UUID does not have the RFC
    /// 4122 variant `10`.
    pub const fn version(&self) -> Option<u8> {
        match self.variant() {
            Variant::Var10 => Some(self.0[6] >> 4),
            _ => None,
        }
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// string that can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid14::Uuid;
    ///
    /// let x = "d9428888-122b-11e1-b85c-61cd3cbb3210".parse::<Uuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "d9428888-122b-11e1-b85c-61cd3cbb3210");
    /// assert_eq!(format!("{}", y), "d9428888-122b-11e1-b85c-61cd3cbb3210");
    /// # Ok::<(), uuid14::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        let mut buffer = [0u8; 36];
        let mut pos = 0;
        for (i, e) in self.0.iter().enumerate() {
            buffer[pos..pos + 2].copy_from_slice(&HEX_PAIRS[*e as usize]);
            pos += 2;
            if i == 3 || i == 5 || i == 7 || i == 9 {
                buffer[pos] = b'-';
                pos += 1;
            }
        }
        debug_assert!(buffer.is_ascii());
        // SAFETY: the buffer consists of hex digits and hyphens only
        unsafe { FStr::from_inner_unchecked(buffer) }
    }

    /// Creates an object from any string, collecting every pair of adjacent hexadecimal digits
    /// in order and ignoring all other characters.
    ///
    /// This parser accepts sloppy input such as stray text or odd separators. Only the first 16
    /// pairs are used, and missing trailing bytes are filled with zeros. Use [`validate`] or
    /// [`str::parse`] when the input has to be in the canonical form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid14::Uuid;
    ///
    /// let x = Uuid::parse_lenient("{d9428888:122b:11e1:b85c:61cd3cbb3210}");
    /// assert_eq!(x.to_string(), "d9428888-122b-11e1-b85c-61cd3cbb3210");
    ///
    /// let y = Uuid::parse_lenient("d9428888");
    /// assert_eq!(y.to_string(), "d9428888-0000-0000-0000-000000000000");
    /// ```
    pub fn parse_lenient(src: &str) -> Self {
        let src = src.as_bytes();
        let mut dst = [0u8; 16];
        let mut n = 0;
        let mut i = 0;
        while n < dst.len() && i + 1 < src.len() {
            match (hex_value(src[i]), hex_value(src[i + 1])) {
                (Some(hi), Some(lo)) => {
                    dst[n] = (hi << 4) | lo;
                    n += 1;
                    i += 2;
                }
                _ => i += 1,
            }
        }
        Self(dst)
    }

    /// Copies the 16 bytes into `buf` starting at `offset`, returning the written region or
    /// `None` if the buffer is too short.
    pub fn write_to<'a>(&self, buf: &'a mut [u8], offset: usize) -> Option<&'a mut [u8]> {
        let dst = buf.get_mut(offset..offset.checked_add(16)?)?;
        dst.copy_from_slice(&self.0);
        Some(dst)
    }
}

/// Renders the 16 bytes of `buf` starting at `offset` as the 8-4-4-4-12 lowercase hexadecimal
/// string, or returns `None` if fewer than 16 bytes are available.
///
/// No validation is performed; any byte sequence is formatted as is.
///
/// # Examples
///
/// ```rust
/// let buf = [0xffu8, 0x28, 0xc2, 0x76, 0x4e, 0x7c, 0xcf, 0x11, 0xe4, 0xb1, 0x16, 0x12, 0x3b, 0x93, 0xf7, 0x5c, 0xba];
/// let s = uuid14::stringify(&buf, 1).unwrap();
/// assert_eq!(&s as &str, "28c2764e-7ccf-11e4-b116-123b93f75cba");
/// assert!(uuid14::stringify(&buf, 2).is_none());
/// ```
pub fn stringify(buf: &[u8], offset: usize) -> Option<FStr<36>> {
    let src = buf.get(offset..offset.checked_add(16)?)?;
    <[u8; 16]>::try_from(src).ok().map(|e| Uuid(e).encode())
}

/// Tests if a string is a canonical RFC 4122 UUID.
///
/// Accepts an optional `urn:uuid:` prefix followed by 8-4-4-4-12 hexadecimal digits in either
/// case, where the version digit is `1` to `5` and the variant digit is one of `8`, `9`, `a`, or
/// `b`.
///
/// # Examples
///
/// ```rust
/// assert!(uuid14::validate("28c2764e-7ccf-11e4-b116-123b93f75cba"));
/// assert!(uuid14::validate("urn:uuid:f81d4fae-7dec-11d0-a765-00a0c91e6bf6"));
/// assert!(!uuid14::validate("28c2764e-7ccf-61e4-b116-123b93f75cba"));
/// ```
pub fn validate(src: &str) -> bool {
    parse_canonical(src).is_some()
}

/// Decodes the canonical string form, rejecting anything [`validate`] would reject.
fn parse_canonical(src: &str) -> Option<[u8; 16]> {
    let src = src.strip_prefix(URN_PREFIX).unwrap_or(src).as_bytes();
    if src.len() != 36 {
        return None;
    }

    let mut dst = [0u8; 16];
    let mut iter = src.iter();
    for (i, e) in dst.iter_mut().enumerate() {
        let hi = hex_value(*iter.next()?)?;
        let lo = hex_value(*iter.next()?)?;
        *e = (hi << 4) | lo;
        if (i == 3 || i == 5 || i == 7 || i == 9) && *iter.next()? != b'-' {
            return None;
        }
    }

    if !(1..=5).contains(&(dst[6] >> 4)) || dst[8] & 0xc0 != 0x80 {
        return None;
    }
    Some(dst)
}

fn hex_value(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|e| e as u8)
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from the canonical string representation accepted by [`validate`].
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        parse_canonical(src).map(Self).ok_or(ParseError)
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// UUID variants defined by RFC 4122.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variant {
    /// NCS-reserved variant (`0xx`).
    Var0,
    /// The RFC 4122 variant (`10x`) emitted by this crate.
    Var10,
    /// Microsoft-reserved variant (`110`).
    Var110,
    /// Variant reserved for future definition (`111`).
    VarReserved,
}

/// Error parsing a string that is not a canonical RFC 4122 UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("invalid string representation")]
pub struct ParseError;

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
