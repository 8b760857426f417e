//! UUIDv4-related functionality

use crate::entropy::EntropySource;
use crate::Uuid;

impl Uuid {
    /// Creates a UUIDv4 object from 16 random bytes, overwriting the version and variant bits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid14::Uuid;
    ///
    /// let uuid = Uuid::from_random_v4([0xff; 16]);
    /// assert_eq!(uuid.to_string(), "ffffffff-ffff-4fff-bfff-ffffffffffff");
    /// ```
    pub const fn from_random_v4(mut bytes: [u8; 16]) -> Self {
        bytes[6] = 0x40 | (bytes[6] & 0x0f);
        bytes[8] = 0x80 | (bytes[8] & 0x3f);
        Self(bytes)
    }
}

/// Generates a UUIDv4 object from the entropy source given.
///
/// Errors from the source are returned as is.
pub fn uuid4_from<E: EntropySource + ?Sized>(source: &mut E) -> Result<Uuid, rand::Error> {
    source.next_16_bytes().map(Uuid::from_random_v4)
}
